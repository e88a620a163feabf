//! Per-host-node bookkeeping.
//!
//! Every host node the renderer creates gets a [`HostRecord`]: the effects
//! registered on it, the records of the host children it materialized, and
//! caches of what was last written to the host. The caches are what make
//! re-runs cheap: a write only reaches the host when it differs.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;

use crate::reactive::Effect;

use super::Host;

pub(crate) struct HostRecord<H: Host> {
    pub(crate) node: H::Node,
    effects: RefCell<Vec<Effect>>,
    attr_effects: RefCell<IndexMap<String, Effect>>,
    style_effects: RefCell<IndexMap<String, Effect>>,
    children: RefCell<Vec<Rc<HostRecord<H>>>>,
    /// Absent key: nothing applied.
    attr_cache: RefCell<HashMap<String, String>>,
    style_cache: RefCell<HashMap<String, String>>,
    text_cache: RefCell<Option<String>>,
}

impl<H: Host> HostRecord<H> {
    pub(crate) fn new(node: H::Node) -> Rc<Self> {
        Self::with_text(node, None)
    }

    /// A record whose host node already displays `text`.
    pub(crate) fn with_text(node: H::Node, text: Option<String>) -> Rc<Self> {
        Rc::new(Self {
            node,
            effects: RefCell::new(Vec::new()),
            attr_effects: RefCell::new(IndexMap::new()),
            style_effects: RefCell::new(IndexMap::new()),
            children: RefCell::new(Vec::new()),
            attr_cache: RefCell::new(HashMap::new()),
            style_cache: RefCell::new(HashMap::new()),
            text_cache: RefCell::new(text),
        })
    }

    pub(crate) fn keep(&self, effect: Effect) {
        self.effects.borrow_mut().push(effect);
    }

    pub(crate) fn push_child(&self, child: Rc<HostRecord<H>>) {
        self.children.borrow_mut().push(child);
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    // ------------------------------------------------------------------
    // Diff-before-write
    // ------------------------------------------------------------------

    /// Returns whether the host was touched.
    pub(crate) fn apply_attribute(&self, host: &H, name: &str, value: Option<&str>) -> bool {
        let mut cache = self.attr_cache.borrow_mut();
        if cache.get(name).map(String::as_str) == value {
            return false;
        }
        match value {
            Some(value) => {
                trace!(name, value, "set attribute");
                host.set_attribute(&self.node, name, value);
                cache.insert(name.to_owned(), value.to_owned());
            }
            None => {
                trace!(name, "remove attribute");
                host.remove_attribute(&self.node, name);
                cache.remove(name);
            }
        }
        true
    }

    pub(crate) fn apply_style(&self, host: &H, property: &str, value: Option<&str>) -> bool {
        let mut cache = self.style_cache.borrow_mut();
        if cache.get(property).map(String::as_str) == value {
            return false;
        }
        match value {
            Some(value) => {
                trace!(property, value, "set style");
                host.set_style(&self.node, property, value);
                cache.insert(property.to_owned(), value.to_owned());
            }
            None => {
                trace!(property, "remove style");
                host.remove_style(&self.node, property);
                cache.remove(property);
            }
        }
        true
    }

    pub(crate) fn apply_text(&self, host: &H, text: &str) -> bool {
        let mut cache = self.text_cache.borrow_mut();
        if cache.as_deref() == Some(text) {
            return false;
        }
        trace!(text, "set text");
        host.set_text(&self.node, text);
        *cache = Some(text.to_owned());
        true
    }

    // ------------------------------------------------------------------
    // Per-key effects
    // ------------------------------------------------------------------

    pub(crate) fn has_attr_effect(&self, name: &str) -> bool {
        self.attr_effects.borrow().contains_key(name)
    }

    pub(crate) fn set_attr_effect(&self, name: &str, effect: Effect) {
        self.attr_effects.borrow_mut().insert(name.to_owned(), effect);
    }

    pub(crate) fn attr_effect_names(&self) -> Vec<String> {
        self.attr_effects.borrow().keys().cloned().collect()
    }

    pub(crate) fn drop_attr_effect(&self, name: &str) {
        let effect = self.attr_effects.borrow_mut().shift_remove(name);
        if let Some(effect) = effect {
            effect.dispose();
        }
    }

    pub(crate) fn has_style_effect(&self, key: &str) -> bool {
        self.style_effects.borrow().contains_key(key)
    }

    pub(crate) fn set_style_effect(&self, key: &str, effect: Effect) {
        self.style_effects.borrow_mut().insert(key.to_owned(), effect);
    }

    pub(crate) fn style_effect_keys(&self) -> Vec<String> {
        self.style_effects.borrow().keys().cloned().collect()
    }

    pub(crate) fn drop_style_effect(&self, key: &str) {
        let effect = self.style_effects.borrow_mut().shift_remove(key);
        if let Some(effect) = effect {
            effect.dispose();
        }
    }

    // ------------------------------------------------------------------
    // Disposal
    // ------------------------------------------------------------------

    /// Dispose every effect registered on this node and, recursively, on
    /// every host child it created. The host tree itself is left alone.
    pub(crate) fn dispose(&self) {
        let effects: Vec<Effect> = self.effects.borrow_mut().drain(..).collect();
        for effect in effects {
            effect.dispose();
        }
        let attrs: Vec<Effect> = self.attr_effects.borrow_mut().drain(..).map(|(_, e)| e).collect();
        for effect in attrs {
            effect.dispose();
        }
        let styles: Vec<Effect> = self.style_effects.borrow_mut().drain(..).map(|(_, e)| e).collect();
        for effect in styles {
            effect.dispose();
        }
        let children: Vec<Rc<HostRecord<H>>> = self.children.borrow().clone();
        for child in children {
            child.dispose();
        }
    }

    /// Dispose, then detach from the host, every child created so far.
    pub(crate) fn detach_children(&self, host: &H) {
        let children: Vec<Rc<HostRecord<H>>> = self.children.borrow_mut().drain(..).collect();
        for child in children {
            child.dispose();
            host.remove_child(&self.node, &child.node);
        }
    }
}
