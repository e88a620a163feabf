//! Rendering context.
//!
//! A [`Context`] is what producers, event handlers, side effects and
//! operations receive: the component itself, its parent and root, live
//! accessors for its bags and its call-time arguments, and, once mounted,
//! the host node it was materialized into.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::reactive::Key;

use super::{Bag, BagKind, Component, Value};

/// What producers, handlers and side effects receive: the component
/// they belong to plus, once mounted, its host node.
#[derive(Clone)]
pub struct Context {
    node: Component,
    element: Option<Rc<dyn Any>>,
}

impl Context {
    pub(crate) fn new(node: Component) -> Self {
        Self {
            node,
            element: None,
        }
    }

    pub(crate) fn with_element<N: Any>(node: Component, element: N) -> Self {
        Self {
            node,
            element: Some(Rc::new(element)),
        }
    }

    /// The component this context belongs to.
    pub fn node(&self) -> &Component {
        &self.node
    }

    /// Parent of the current component.
    pub fn parent(&self) -> Option<Component> {
        self.node.parent()
    }

    /// Topmost ancestor, or the component itself.
    pub fn root(&self) -> Component {
        self.node.root()
    }

    /// State of the current component.
    pub fn state(&self) -> Bag {
        Bag::new(self.clone(), BagKind::State)
    }

    /// Inline styles of the current component.
    pub fn styles(&self) -> Bag {
        Bag::new(self.clone(), BagKind::Styles)
    }

    /// Attributes of the current component.
    pub fn attributes(&self) -> Bag {
        Bag::new(self.clone(), BagKind::Attributes)
    }

    /// Call-time arguments. Tracked: an effect reading them re-runs when
    /// the component is invoked again.
    pub fn args(&self) -> Vec<Value> {
        self.node.args()
    }

    /// One call-time argument, [`Value::Null`] when out of range.
    pub fn arg(&self, index: usize) -> Value {
        let args = self.node.args_slot();
        args.deps.track(Key::Args);
        args.values.borrow().get(index).cloned().unwrap_or_default()
    }

    /// The host node this component is mounted as, if the context was built
    /// by the renderer and `N` is the host's node type.
    pub fn element<N: Any>(&self) -> Option<&N> {
        self.element.as_ref()?.downcast_ref::<N>()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("node", &self.node)
            .field("mounted", &self.element.is_some())
            .finish()
    }
}
