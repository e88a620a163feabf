//! Reactive Primitives
//!
//! This module implements the dependency-tracking runtime: the registry
//! that records which effects read which keys, and the effects themselves.
//!
//! # Concepts
//!
//! ## Tracking
//!
//! While an effect runs, every tracked read (`track(owner, key)`) subscribes
//! the running effect to that (owner, key) pair. Reads outside of an effect
//! are plain reads.
//!
//! ## Triggering
//!
//! A write calls `trigger(owner, key)`, which synchronously re-runs every
//! effect subscribed to that pair, in subscription order. There is no
//! scheduler and no batching: the cascade completes before the write returns.
//!
//! ## Effects
//!
//! An Effect re-subscribes on every run to exactly what it read during that
//! run. Effects are used by the renderer to keep host nodes in sync with
//! component stores, and by applications for their own side effects.
//!
//! # Implementation Notes
//!
//! The currently running effect is found through a thread-local stack
//! (see [`ReactiveContext`]). Dependency tables are owned by the objects they
//! describe rather than by a global map, so they are freed with their owner.

mod subscriber;
mod context;
mod registry;
mod effect;

pub use subscriber::EffectId;
pub use context::{untracked, ReactiveContext};
pub use registry::{track, trigger, Dependencies, Key};
pub use effect::{effect, stop, Effect};
