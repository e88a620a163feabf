//! Event-listener table: event kind → ordered handlers.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::render::Event;

use super::Context;

/// A handler receives a fresh rendering context and the platform event.
pub type Handler = Rc<dyn Fn(&Context, &Event)>;

/// Handlers of one component, grouped by event kind.
#[derive(Default)]
pub struct Events {
    handlers: RefCell<IndexMap<String, Vec<Handler>>>,
}

impl Events {
    pub(crate) fn add(&self, kind: &str, handler: Handler) {
        self.handlers
            .borrow_mut()
            .entry(kind.to_owned())
            .or_default()
            .push(handler);
    }

    /// Declared event kinds, in declaration order.
    pub fn kinds(&self) -> Vec<String> {
        self.handlers.borrow().keys().cloned().collect()
    }

    /// Copy of the handlers currently registered for `kind`.
    pub fn handlers(&self, kind: &str) -> Vec<Handler> {
        self.handlers
            .borrow()
            .get(kind)
            .cloned()
            .unwrap_or_default()
    }

    /// Run every handler of `kind`, each with a fresh context from `make_ctx`.
    pub(crate) fn dispatch(&self, kind: &str, event: &Event, make_ctx: impl Fn() -> Context) {
        // Handlers may register further handlers; iterate over a copy.
        for handler in self.handlers(kind) {
            handler(&make_ctx(), event);
        }
    }
}

impl fmt::Debug for Events {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.handlers
                    .borrow()
                    .iter()
                    .map(|(kind, handlers)| (kind.clone(), handlers.len())),
            )
            .finish()
    }
}
