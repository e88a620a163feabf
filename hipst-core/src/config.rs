//! Renderer Configuration
//!
//! Options shared by the DOM renderer and the string renderer. Every field
//! has a default, so a partial JSON document is enough:
//!
//! ```rust,ignore
//! let config = RenderConfig::from_json(r#"{ "write_title": false }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options shared by the live renderer and string rendering.
///
/// Every field has a default, so a partial JSON object is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Remove pre-existing children of a container before mounting into it.
    pub clear_container: bool,
    /// Let documents drive the host title.
    pub write_title: bool,
    /// Convert `camelCase` style keys to `kebab-case` property names.
    pub kebab_case_styles: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_container: true,
            write_title: true,
            kebab_case_styles: true,
        }
    }
}

impl RenderConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Host property name for a style key.
    pub fn style_property(&self, key: &str) -> String {
        if self.kebab_case_styles {
            kebab_case(key)
        } else {
            key.to_owned()
        }
    }
}

/// `backgroundColor` → `background-color`. Custom properties (`--x`) and
/// keys without uppercase letters are returned unchanged.
pub fn kebab_case(key: &str) -> String {
    if key.starts_with("--") {
        return key.to_owned();
    }
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = RenderConfig::from_json(r#"{ "write_title": false }"#).unwrap();
        assert!(!config.write_title);
        assert!(config.clear_container);
        assert!(config.kebab_case_styles);

        assert_eq!(RenderConfig::from_json("{}").unwrap(), RenderConfig::default());
        assert!(RenderConfig::from_json("{ \"write_title\": 3 }").is_err());
    }

    #[test]
    fn style_keys() {
        assert_eq!(kebab_case("backgroundColor"), "background-color");
        assert_eq!(kebab_case("display"), "display");
        assert_eq!(kebab_case("--accentColor"), "--accentColor");

        let raw = RenderConfig {
            kebab_case_styles: false,
            ..RenderConfig::default()
        };
        assert_eq!(raw.style_property("fontSize"), "fontSize");
    }
}
