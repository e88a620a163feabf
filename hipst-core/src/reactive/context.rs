//! Reactive Context
//!
//! The reactive context tracks which effect is currently running. This
//! enables automatic dependency tracking: when a store key is read, the
//! registry asks the context for the running effect and subscribes it.
//!
//! # Implementation
//!
//! We use a thread-local stack. Running an effect pushes it; the guard
//! returned by [`ReactiveContext::enter`] pops it when dropped, including
//! during unwinding, so a panicking effect never leaves a stale entry behind.
//!
//! Effects created while another effect runs (the renderer does this for
//! every nested component) push their own entry, so reads made by the inner
//! effect are never attributed to the outer one.
//!
//! [`ReactiveContext::suspend`] pushes an untracked entry: reads made while
//! it is on top of the stack subscribe nothing.

use std::cell::RefCell;
use std::rc::Rc;

use super::effect::EffectInner;
use super::EffectId;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<ContextEntry>> = const { RefCell::new(Vec::new()) };
}

/// An entry in the reactive context stack.
#[derive(Clone)]
enum ContextEntry {
    /// An effect is running; reads subscribe it.
    Tracking(Rc<EffectInner>),
    /// Tracking is suspended.
    Untracked,
}

impl ContextEntry {
    fn id(&self) -> Option<EffectId> {
        match self {
            ContextEntry::Tracking(effect) => Some(effect.id()),
            ContextEntry::Untracked => None,
        }
    }
}

/// Guard that pops the context when dropped.
pub struct ReactiveContext {
    id: Option<EffectId>,
}

impl ReactiveContext {
    /// Enter the context of a running effect.
    pub(crate) fn enter(effect: &Rc<EffectInner>) -> Self {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow_mut()
                .push(ContextEntry::Tracking(Rc::clone(effect)));
        });

        Self {
            id: Some(effect.id()),
        }
    }

    /// Suspend tracking until the returned guard is dropped.
    pub fn suspend() -> Self {
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().push(ContextEntry::Untracked);
        });

        Self { id: None }
    }

    /// Check if reads are currently being tracked.
    pub fn is_active() -> bool {
        CONTEXT_STACK.with(|stack| {
            matches!(stack.borrow().last(), Some(ContextEntry::Tracking(_)))
        })
    }

    /// Get the ID of the effect being tracked, if any.
    pub fn current_effect() -> Option<EffectId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().and_then(ContextEntry::id))
    }

    /// Number of entries on the stack, tracked or not.
    pub fn depth() -> usize {
        CONTEXT_STACK.with(|stack| stack.borrow().len())
    }

    pub(crate) fn current() -> Option<Rc<EffectInner>> {
        CONTEXT_STACK.with(|stack| match stack.borrow().last() {
            Some(ContextEntry::Tracking(effect)) => Some(Rc::clone(effect)),
            _ => None,
        })
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            if let Some(entry) = popped {
                debug_assert_eq!(
                    entry.id(),
                    self.id,
                    "ReactiveContext mismatch: expected {:?}, got {:?}",
                    self.id,
                    entry.id()
                );
            }
        });
    }
}

/// Run `f` with dependency tracking suspended.
///
/// Reads made inside `f` do not subscribe the surrounding effect.
pub fn untracked<T>(f: impl FnOnce() -> T) -> T {
    let _ctx = ReactiveContext::suspend();
    f()
}
