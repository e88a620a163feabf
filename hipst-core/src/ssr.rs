//! Server-side string rendering.
//!
//! One pass over the tree, every producer resolved exactly once, nothing
//! subscribed. Attribute and style values follow the same rules as the live
//! renderer ([`attribute_text`], [`style_text`]).

use tracing::warn;

use crate::component::{Child, Component};
use crate::config::RenderConfig;
use crate::reactive::untracked;
use crate::render::{attribute_text, style_text};

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Render a tree to markup with the default [`RenderConfig`].
///
/// Documents render as a full page with doctype and head.
pub fn render_to_string(component: &Component) -> String {
    render_to_string_with(component, &RenderConfig::default())
}

/// Render a tree to markup with explicit options.
pub fn render_to_string_with(component: &Component, config: &RenderConfig) -> String {
    let mut out = String::new();
    untracked(|| {
        if component.is_document() {
            write_document(component, config, &mut out);
        } else {
            write_node(component, config, &mut out);
        }
    });
    out
}

/// Escape text for element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Whether `name` can be written as a tag or attribute name as is. Names
/// that could close the tag or start a new attribute are refused.
fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|ch| ch.is_whitespace() || ch.is_control() || matches!(ch, '"' | '\'' | '<' | '>' | '/' | '='))
}

fn write_document(document: &Component, config: &RenderConfig, out: &mut String) {
    let ctx = document.context();
    out.push_str("<!doctype html><html><head><meta charset=\"utf-8\">");
    if let Some(head) = document.head() {
        if let Some(title) = head.title(&ctx) {
            out.push_str("<title>");
            out.push_str(&escape(&title.to_string()));
            out.push_str("</title>");
        }
        for (name, slot) in head.metas() {
            let content = slot.resolve(&ctx);
            out.push_str(&format!(
                "<meta name=\"{}\" content=\"{}\">",
                escape(&name),
                escape(&content.to_string())
            ));
        }
    }
    out.push_str("</head><body>");
    write_children(document, config, out);
    out.push_str("</body></html>");
}

fn write_node(component: &Component, config: &RenderConfig, out: &mut String) {
    if !valid_name(component.tag()) {
        warn!(tag = component.tag(), "skipping element with an invalid tag name");
        return;
    }
    let tag = component.tag();
    out.push('<');
    out.push_str(tag);

    let attributes = component.attributes();
    for name in attributes.keys() {
        if !valid_name(&name) {
            warn!(%name, tag, "skipping invalid attribute name");
            continue;
        }
        match attribute_text(&attributes.get(&name)) {
            Some(value) if value.is_empty() => {
                out.push(' ');
                out.push_str(&name);
            }
            Some(value) => out.push_str(&format!(" {}=\"{}\"", name, escape(&value))),
            None => {}
        }
    }

    let styles = component.styles();
    let css: String = styles
        .keys()
        .into_iter()
        .filter_map(|key| {
            style_text(&styles.get(&key))
                .map(|value| format!("{}:{};", config.style_property(&key), value))
        })
        .collect();
    if !css.is_empty() {
        out.push_str(&format!(" style=\"{}\"", escape(&css)));
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&tag) {
        return;
    }
    write_children(component, config, out);
    out.push_str(&format!("</{tag}>"));
}

fn write_children(component: &Component, config: &RenderConfig, out: &mut String) {
    let ctx = component.context();
    for child in component.children() {
        match child {
            Child::Node(node) => write_node(&node, config, out),
            Child::Text(text) => out.push_str(&escape(&text)),
            Child::Producer(producer) => out.push_str(&escape(&producer(&ctx).to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{dynamic, Document, Value};

    #[test]
    fn escapes_text_and_attributes() {
        let node = Component::new("p")
            .attr("title", "a \"quote\" & <tag>")
            .text("1 < 2 & 'x'");

        assert_eq!(
            render_to_string(&node),
            "<p title=\"a &quot;quote&quot; &amp; &lt;tag&gt;\">1 &lt; 2 &amp; &#39;x&#39;</p>"
        );
    }

    #[test]
    fn boolean_attributes_and_styles() {
        let node = Component::new("input")
            .attr("type", "checkbox")
            .attr("checked", true)
            .attr("disabled", false)
            .style("backgroundColor", "red")
            .style("display", Value::Null);

        assert_eq!(
            render_to_string(&node),
            "<input type=\"checkbox\" checked style=\"background-color:red;\">"
        );
    }

    #[test]
    fn producers_resolve_once() {
        let node = Component::new("ul")
            .with_state("n", 2)
            .child(Component::new("li").child(dynamic(|ctx| {
                let n = ctx.parent().map(|p| p.state().get("n")).unwrap_or_default();
                format!("n={n}")
            })));

        assert_eq!(render_to_string(&node), "<ul><li>n=2</li></ul>");
    }

    #[test]
    fn documents_render_head() {
        let doc = Document::new()
            .title("A & B")
            .meta("description", "demo")
            .child(Component::new("main").text("hi"));

        assert_eq!(
            render_to_string(&doc),
            "<!doctype html><html><head><meta charset=\"utf-8\"><title>A &amp; B</title>\
             <meta name=\"description\" content=\"demo\"></head><body><main>hi</main></body></html>"
        );
    }

    #[test]
    fn invalid_names_are_skipped() {
        let node = Component::new("div")
            .attr("onclick\" x=\"1", "a")
            .attr("a b", "c")
            .attr("data-ok", "yes")
            .child(Component::new("img src=x"))
            .child(Component::new("span>").text("hidden"))
            .text("kept");

        assert_eq!(render_to_string(&node), "<div data-ok=\"yes\">kept</div>");
    }

    #[test]
    fn name_validation() {
        assert!(valid_name("data-id"));
        assert!(valid_name("aria-label"));
        assert!(!valid_name(""));
        assert!(!valid_name("a b"));
        assert!(!valid_name("x\"y"));
        assert!(!valid_name("p>"));
        assert!(!valid_name("a=b"));
    }

    #[test]
    fn raw_style_keys_when_configured() {
        let node = Component::new("div").style("fontSize", "2em");
        let config = RenderConfig {
            kebab_case_styles: false,
            ..RenderConfig::default()
        };
        assert_eq!(render_to_string_with(&node, &config), "<div style=\"fontSize:2em;\"></div>");
    }
}
