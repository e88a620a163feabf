//! The host boundary.
//!
//! The renderer never touches a platform directly: it drives a [`Host`],
//! which owns the platform's node handles. [`MemoryDom`](super::MemoryDom)
//! is the in-process implementation used by tests and benchmarks.

use std::hash::Hash;
use std::rc::Rc;

use crate::component::Value;

/// A platform event delivered to component handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    kind: String,
    detail: Value,
}

impl Event {
    /// An event of `kind` with no detail.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            detail: Value::Null,
        }
    }

    /// An event carrying a scalar payload, such as an input value.
    pub fn with_detail(kind: impl Into<String>, detail: impl Into<Value>) -> Self {
        Self {
            kind: kind.into(),
            detail: detail.into(),
        }
    }

    /// Event kind, e.g. `"click"`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Payload, [`Value::Null`] when absent.
    pub fn detail(&self) -> &Value {
        &self.detail
    }
}

/// A listener installed on a host node.
pub type Listener = Rc<dyn Fn(&Event)>;

/// Primitive operations on a host node tree.
///
/// Node handles are cheap clones compared by identity.
pub trait Host: 'static {
    type Node: Clone + Eq + Hash + 'static;

    fn create_element(&self, tag: &str) -> Self::Node;
    fn create_text(&self, text: &str) -> Self::Node;
    fn set_text(&self, node: &Self::Node, text: &str);

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
    fn get_attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn remove_attribute(&self, node: &Self::Node, name: &str);

    fn set_style(&self, node: &Self::Node, property: &str, value: &str);
    fn remove_style(&self, node: &Self::Node, property: &str);

    fn append_child(&self, parent: &Self::Node, child: &Self::Node);
    fn remove_child(&self, parent: &Self::Node, child: &Self::Node);
    fn first_child(&self, parent: &Self::Node) -> Option<Self::Node>;

    fn add_event_listener(&self, node: &Self::Node, kind: &str, listener: Listener);

    fn set_title(&self, title: &str);
}
