//! Dependency Registry
//!
//! Per-target, per-key bookkeeping of which effects read which values.
//!
//! Every trackable object (a store, a child list, a document head) owns a
//! [`Dependencies`] table. There is no global map keyed by object identity:
//! the table lives and dies with its owner, so a component tree that becomes
//! unreachable takes all of its registry entries with it.
//!
//! # Ownership
//!
//! - A table owns its entries (`Rc<Dep>`).
//! - An entry holds its subscribers weakly (`Weak<EffectInner>`).
//! - An effect holds the entries it is subscribed to weakly (`Weak<Dep>`).
//! - An entry holds its owning table weakly, so it can remove itself once
//!   its last subscriber leaves.
//!
//! Nothing in the registry keeps an owner or an effect alive.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::trace;

use super::context::ReactiveContext;
use super::effect::EffectInner;
use super::EffectId;

/// A key within a tracked object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A named entry of a store.
    Name(Rc<str>),
    /// The set of keys of a store changed (insertions and removals).
    KeySet,
    /// The ordered child list changed as a whole.
    List,
    /// The call-time arguments were replaced.
    Args,
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(Rc::from(name))
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(Rc::from(name))
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Key::Name(Rc::from(name.as_str()))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => f.write_str(name),
            Key::KeySet => f.write_str("<keys>"),
            Key::List => f.write_str("<list>"),
            Key::Args => f.write_str("<args>"),
        }
    }
}

type Table = RefCell<IndexMap<Key, Rc<Dep>>>;

/// A single registry entry: the effects subscribed to one (owner, key) pair.
pub(crate) struct Dep {
    key: Key,
    owner: Weak<Table>,
    /// Insertion-ordered so triggers run subscribers in subscription order.
    subscribers: RefCell<IndexMap<EffectId, Weak<EffectInner>>>,
}

impl Dep {
    /// Subscribe an effect. Returns false if it was already subscribed.
    fn subscribe(&self, effect: &Rc<EffectInner>) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        if subscribers.contains_key(&effect.id()) {
            return false;
        }
        subscribers.insert(effect.id(), Rc::downgrade(effect));
        true
    }

    /// Remove an effect, pruning the entry once it has no subscribers left.
    pub(crate) fn unsubscribe(&self, id: EffectId) {
        let now_empty = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.shift_remove(&id);
            subscribers.is_empty()
        };
        if now_empty {
            self.prune();
        }
    }

    /// Live subscribers in subscription order. Dead weak references are
    /// dropped along the way.
    fn snapshot(&self) -> Vec<Rc<EffectInner>> {
        let (live, now_empty) = {
            let mut subscribers = self.subscribers.borrow_mut();
            let mut live = Vec::with_capacity(subscribers.len());
            subscribers.retain(|_, weak| match weak.upgrade() {
                Some(effect) => {
                    live.push(effect);
                    true
                }
                None => false,
            });
            (live, subscribers.is_empty())
        };
        if now_empty {
            self.prune();
        }
        live
    }

    fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    fn prune(&self) {
        let Some(table) = self.owner.upgrade() else {
            return;
        };
        let mut table = table.borrow_mut();
        let is_self = table
            .get(&self.key)
            .is_some_and(|dep| std::ptr::eq(Rc::as_ptr(dep), self));
        if is_self {
            table.shift_remove(&self.key);
        }
    }
}

/// The dependency table owned by one trackable object.
#[derive(Default)]
pub struct Dependencies {
    table: Rc<Table>,
}

impl Dependencies {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe the running effect, if any, to `key`.
    ///
    /// Outside of an effect run this is a no-op.
    pub fn track(&self, key: impl Into<Key>) {
        let Some(effect) = ReactiveContext::current() else {
            return;
        };
        if effect.is_disposed() {
            return;
        }

        let key = key.into();
        let dep = {
            let mut table = self.table.borrow_mut();
            let dep = table.entry(key.clone()).or_insert_with(|| {
                Rc::new(Dep {
                    key,
                    owner: Rc::downgrade(&self.table),
                    subscribers: RefCell::new(IndexMap::new()),
                })
            });
            Rc::clone(dep)
        };

        if dep.subscribe(&effect) {
            effect.record(Rc::downgrade(&dep));
        }
    }

    /// Run every effect subscribed to `key`.
    ///
    /// The subscriber set is snapshotted first: effects that subscribe
    /// during this trigger wait for the next one.
    pub fn trigger(&self, key: impl Into<Key>) {
        let key = key.into();
        let dep = self.table.borrow().get(&key).cloned();
        let Some(dep) = dep else {
            return;
        };

        let snapshot = dep.snapshot();
        trace!(%key, subscribers = snapshot.len(), "trigger");

        for effect in snapshot {
            effect.run();
        }
    }

    /// Number of effects currently subscribed to `key`.
    pub fn subscriber_count(&self, key: impl Into<Key>) -> usize {
        self.table
            .borrow()
            .get(&key.into())
            .map(|dep| dep.len())
            .unwrap_or(0)
    }

    /// Number of live entries in the table.
    pub fn len(&self) -> usize {
        self.table.borrow().len()
    }

    /// Whether no key is currently tracked.
    pub fn is_empty(&self) -> bool {
        self.table.borrow().is_empty()
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.borrow();
        f.debug_map()
            .entries(table.iter().map(|(key, dep)| (key.to_string(), dep.len())))
            .finish()
    }
}

/// Subscribe the running effect to `(target, key)`.
pub fn track(target: &Dependencies, key: impl Into<Key>) {
    target.track(key);
}

/// Run every effect subscribed to `(target, key)`.
pub fn trigger(target: &Dependencies, key: impl Into<Key>) {
    target.trigger(key);
}
