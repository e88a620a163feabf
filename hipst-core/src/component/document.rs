//! Document roots.

use std::ops::Deref;

use super::{Child, Component, Slot};

/// A root component carrying head declarations (title, meta tags).
///
/// Mounting a document sets the host title and places its children directly
/// into the container. A document has no host element of its own, so event
/// handlers registered on it are never bound; put them on a child instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    root: Component,
}

impl Document {
    /// An empty document with no title or metas.
    pub fn new() -> Self {
        Self {
            root: Component::document(),
        }
    }

    /// Declare the title. A producer keeps the host title in sync.
    pub fn title(self, value: impl Into<Slot>) -> Self {
        if let Some(head) = self.root.head() {
            head.set_title(value.into());
        }
        self
    }

    /// Declare `<meta name=… content=…>`. Later declarations of the same
    /// name replace earlier ones.
    pub fn meta(self, name: &str, content: impl Into<Slot>) -> Self {
        if let Some(head) = self.root.head() {
            head.set_meta(name, content.into());
        }
        self
    }

    /// Seed a state key on the document root.
    pub fn with_state(self, key: &str, value: impl Into<Slot>) -> Self {
        self.root.state().set(key, value);
        self
    }

    /// Append a body child.
    pub fn child(self, child: impl Into<Child>) -> Self {
        Self {
            root: self.root.child(child),
        }
    }

    /// Append several body children.
    pub fn extend<I, C>(self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        Self {
            root: self.root.extend(children),
        }
    }

    /// The underlying root component.
    pub fn component(&self) -> &Component {
        &self.root
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Document {
    type Target = Component;

    fn deref(&self) -> &Component {
        &self.root
    }
}

impl From<Document> for Component {
    fn from(document: Document) -> Self {
        document.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{dynamic, Value};

    #[test]
    fn document_is_the_root_of_its_children() {
        let leaf = Component::new("p");
        let doc = Document::new().title("Home").child(&leaf);

        assert!(doc.is_document());
        assert_eq!(leaf.root(), *doc.component());
    }

    #[test]
    fn title_resolves_against_document_state() {
        let doc = Document::new()
            .with_state("page", "About")
            .title(dynamic(|ctx| format!("Site | {}", ctx.state().get("page"))));

        let head = doc.head().unwrap();
        assert_eq!(head.title(&doc.context()), Some(Value::from("Site | About")));
    }
}
