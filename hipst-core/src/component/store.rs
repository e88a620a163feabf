//! Reactive Stores
//!
//! A [`Store`] is a trackable key→[`Slot`] bag. Components own three of them:
//! state, styles and attributes.
//!
//! # Tracking
//!
//! - Reading key `k` tracks `k`.
//! - Writing key `k` triggers `k`. Stores whose key *set* matters to the
//!   renderer (styles and attributes) also trigger [`Key::KeySet`] on every
//!   write; every store triggers it when a key is inserted or removed.
//! - Enumerating keys tracks [`Key::KeySet`].
//!
//! Writes always trigger, even when the new value equals the old one;
//! filtering redundant work is the consumer's business (the renderer diffs
//! against what it last applied).
//!
//! Keys are never removed implicitly. Writing [`Value::Null`] is a reset: the
//! key stays enumerable. Only [`Store::remove`] deletes it.

use std::cell::RefCell;

use indexmap::IndexMap;

use crate::error::Result;
use crate::reactive::{untracked, Dependencies, Key};

use super::{Context, Slot, Value};

/// Which of a component's bags a [`Bag`] handle addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BagKind {
    State,
    Styles,
    Attributes,
}

/// A trackable key→slot bag.
pub struct Store {
    deps: Dependencies,
    entries: RefCell<IndexMap<String, Slot>>,
    /// Trigger the key-set pseudo-key on every write, not only on inserts.
    watch_keys: bool,
}

impl Store {
    pub(crate) fn new(watch_keys: bool) -> Self {
        Self {
            deps: Dependencies::new(),
            entries: RefCell::new(IndexMap::new()),
            watch_keys,
        }
    }

    /// The dependency table of this store.
    pub fn deps(&self) -> &Dependencies {
        &self.deps
    }

    /// Tracked read of the raw slot.
    pub fn slot(&self, key: &str) -> Option<Slot> {
        self.deps.track(key);
        self.entries.borrow().get(key).cloned()
    }

    /// Tracked read, resolving producers against `ctx`.
    pub fn get(&self, key: &str, ctx: &Context) -> Value {
        // The borrow is released before resolving: producers may read this
        // store again.
        self.slot(key)
            .map(|slot| slot.resolve(ctx))
            .unwrap_or_default()
    }

    /// Store `slot` under `key` and trigger its dependents.
    pub fn set(&self, key: &str, slot: Slot) {
        let inserted = self
            .entries
            .borrow_mut()
            .insert(key.to_owned(), slot)
            .is_none();

        self.deps.trigger(key);
        if inserted || self.watch_keys {
            self.deps.trigger(Key::KeySet);
        }
    }

    /// Delete `key`. Returns the removed slot, if there was one.
    pub fn remove(&self, key: &str) -> Option<Slot> {
        let removed = self.entries.borrow_mut().shift_remove(key);
        if removed.is_some() {
            self.deps.trigger(key);
            self.deps.trigger(Key::KeySet);
        }
        removed
    }

    /// Tracked enumeration of the current keys, in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.deps.track(Key::KeySet);
        self.entries.borrow().keys().cloned().collect()
    }

    /// Tracked membership test.
    pub fn contains(&self, key: &str) -> bool {
        self.deps.track(key);
        self.entries.borrow().contains_key(key)
    }

    /// Number of keys. Tracks the key set.
    pub fn len(&self) -> usize {
        self.deps.track(Key::KeySet);
        self.entries.borrow().len()
    }

    /// Whether there are no keys. Tracks the key set.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every entry, untracked.
    pub(crate) fn entries(&self) -> Vec<(String, Slot)> {
        self.entries
            .borrow()
            .iter()
            .map(|(key, slot)| (key.clone(), slot.clone()))
            .collect()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.entries.borrow().iter()).finish()
    }
}

/// A live handle on one of a component's bags.
///
/// The handle carries the rendering context used to resolve producers, so
/// `get` always returns a resolved [`Value`].
#[derive(Clone)]
pub struct Bag {
    ctx: Context,
    kind: BagKind,
}

impl Bag {
    pub(crate) fn new(ctx: Context, kind: BagKind) -> Self {
        Self { ctx, kind }
    }

    fn store(&self) -> &Store {
        self.ctx.node().store(self.kind)
    }

    /// Which store this bag fronts.
    pub fn kind(&self) -> BagKind {
        self.kind
    }

    /// Tracked, resolved read. Missing keys read as [`Value::Null`].
    pub fn get(&self, key: &str) -> Value {
        self.store().get(key, &self.ctx)
    }

    /// Resolved read that subscribes nothing.
    pub fn get_untracked(&self, key: &str) -> Value {
        untracked(|| self.get(key))
    }

    /// Write a constant or a producer.
    pub fn set(&self, key: &str, value: impl Into<Slot>) {
        self.store().set(key, value.into());
    }

    /// Read-modify-write of a resolved value. The read is untracked.
    pub fn update(&self, key: &str, f: impl FnOnce(Value) -> Value) {
        let next = f(self.get_untracked(key));
        self.set(key, next);
    }

    /// Bulk initialization, one trigger per key.
    pub fn merge<K, V, I>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Slot>,
    {
        for (key, value) in entries {
            self.set(key.as_ref(), value);
        }
    }

    /// Bulk initialization from a JSON object of scalar values, as embedded
    /// by a server render for hydration.
    pub fn merge_json(&self, json: &str) -> Result<()> {
        let entries: IndexMap<String, Value> = serde_json::from_str(json)?;
        self.merge(entries);
        Ok(())
    }

    /// Explicitly delete a key.
    pub fn remove(&self, key: &str) -> Option<Slot> {
        self.store().remove(key)
    }

    /// Keys in insertion order. Tracks the key set.
    pub fn keys(&self) -> Vec<String> {
        self.store().keys()
    }

    /// Whether `key` is present, even if it holds `Null`.
    pub fn contains(&self, key: &str) -> bool {
        self.store().contains(key)
    }

    /// Number of keys. Tracks the key set.
    pub fn len(&self) -> usize {
        self.store().len()
    }

    /// Whether there are no keys. Tracks the key set.
    pub fn is_empty(&self) -> bool {
        self.store().is_empty()
    }
}

impl std::fmt::Debug for Bag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bag")
            .field("kind", &self.kind)
            .field("entries", self.store())
            .finish()
    }
}
