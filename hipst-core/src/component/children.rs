//! The ordered child list of a component.
//!
//! The whole list is tracked and triggered under the single [`Key::List`]
//! pseudo-key. There is no per-index tracking: any mutation invalidates
//! every consumer of the list.

use std::cell::RefCell;
use std::fmt;

use crate::reactive::{Dependencies, Key};

use super::{Component, Producer, Slot};

/// One element of a child list.
#[derive(Clone)]
pub enum Child {
    /// Literal text, rendered as a static text node.
    Text(String),
    /// A nested component.
    Node(Component),
    /// A value-producer rendered to text, resolved against the owning
    /// component's context.
    Producer(Producer),
}

impl Child {
    /// The component, if this child is one.
    pub fn as_node(&self) -> Option<&Component> {
        match self {
            Child::Node(node) => Some(node),
            _ => None,
        }
    }
}

impl fmt::Debug for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Child::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Child::Node(node) => f.debug_tuple("Node").field(&node.tag()).finish(),
            Child::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_owned())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<Component> for Child {
    fn from(node: Component) -> Self {
        Child::Node(node)
    }
}

impl From<&Component> for Child {
    fn from(node: &Component) -> Self {
        Child::Node(node.clone())
    }
}

impl From<Slot> for Child {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Value(value) => Child::Text(value.to_string()),
            Slot::Producer(producer) => Child::Producer(producer),
        }
    }
}

/// The trackable child list.
#[derive(Default)]
pub struct ChildList {
    deps: Dependencies,
    items: RefCell<Vec<Child>>,
}

impl ChildList {
    /// Dependency table holding the `List` key.
    pub fn deps(&self) -> &Dependencies {
        &self.deps
    }

    /// Tracked copy of the current list.
    pub fn snapshot(&self) -> Vec<Child> {
        self.deps.track(Key::List);
        self.items.borrow().clone()
    }

    /// Tracked length.
    pub fn len(&self) -> usize {
        self.deps.track(Key::List);
        self.items.borrow().len()
    }

    /// Tracked, like [`ChildList::len`].
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn push(&self, child: Child) {
        self.items.borrow_mut().push(child);
        self.deps.trigger(Key::List);
    }

    /// Swap in a new list, returning the old one.
    pub(crate) fn replace(&self, children: Vec<Child>) -> Vec<Child> {
        let old = std::mem::replace(&mut *self.items.borrow_mut(), children);
        self.deps.trigger(Key::List);
        old
    }

    /// Remove every occurrence of `node`. Triggers only if something was
    /// removed.
    pub(crate) fn remove_node(&self, node: &Component) -> bool {
        let removed = {
            let mut items = self.items.borrow_mut();
            let before = items.len();
            items.retain(|child| child.as_node() != Some(node));
            items.len() != before
        };
        if removed {
            self.deps.trigger(Key::List);
        }
        removed
    }
}

impl fmt::Debug for ChildList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.borrow().iter()).finish()
    }
}
