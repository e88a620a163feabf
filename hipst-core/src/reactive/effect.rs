//! Effect Implementation
//!
//! An Effect is a side-effecting computation that runs whenever its
//! dependencies change.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its function immediately to establish
//!    initial dependencies.
//!
//! 2. When any dependency is triggered, the effect re-runs synchronously,
//!    inside the call that performed the write.
//!
//! 3. Before re-running, the effect unsubscribes from every entry it was
//!    subscribed to and tracks new ones during execution. A run that takes a
//!    different branch than the previous one therefore sheds the keys it no
//!    longer reads.
//!
//! # Lifecycle
//!
//! An effect is either active or disposed. [`Effect::dispose`] (or
//! [`stop`]) unsubscribes it and makes further runs no-ops. Disposal is
//! idempotent.
//!
//! Registry entries hold effects weakly. An effect whose last [`Effect`]
//! handle is dropped stops running even without an explicit dispose, so
//! callers keep the handle for as long as the effect should live. The
//! renderer keeps the handles of the effects it creates on the host records
//! they target.
//!
//! # Re-entrancy
//!
//! An effect is never re-entered. A trigger that reaches an effect while it
//! runs marks it dirty instead, and the effect runs again as soon as the
//! current pass returns, so it always ends up seeing the latest write. An
//! effect that keeps dirtying itself is cut off after [`MAX_RERUNS`] passes.
//!
//! # Panics
//!
//! A panic inside the effect function unwinds through whatever triggered
//! the run. The tracking stack and the running flag are restored by guards.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use smallvec::SmallVec;
use tracing::{trace, warn};

use super::context::ReactiveContext;
use super::registry::Dep;
use super::subscriber::EffectId;

/// Passes one run may chain through self-triggered re-runs.
pub const MAX_RERUNS: usize = 100;

/// Shared state of an effect.
pub(crate) struct EffectInner {
    id: EffectId,

    /// The effect function.
    run: Box<dyn Fn()>,

    /// Entries this effect is subscribed to since its last run started.
    dependencies: RefCell<SmallVec<[Weak<Dep>; 4]>>,

    disposed: Cell<bool>,

    running: Cell<bool>,

    /// Triggered while running; re-run once the current pass returns.
    dirty: Cell<bool>,

    run_count: Cell<usize>,
}

/// Clears the running flag on drop, including during unwinding.
struct RunningGuard<'a>(&'a Cell<bool>);

impl<'a> RunningGuard<'a> {
    fn new(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl EffectInner {
    pub(crate) fn id(&self) -> EffectId {
        self.id
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    pub(crate) fn record(&self, dep: Weak<Dep>) {
        self.dependencies.borrow_mut().push(dep);
    }

    /// Run the effect function inside its own tracking context.
    pub(crate) fn run(self: &Rc<Self>) {
        if self.disposed.get() {
            return;
        }
        if self.running.get() {
            self.dirty.set(true);
            return;
        }

        let _running = RunningGuard::new(&self.running);
        let mut passes = 0;
        loop {
            self.dirty.set(false);
            self.cleanup();
            {
                let _ctx = ReactiveContext::enter(self);
                (self.run)();
            }
            self.run_count.set(self.run_count.get() + 1);
            passes += 1;

            if !self.dirty.get() || self.disposed.get() {
                break;
            }
            if passes >= MAX_RERUNS {
                warn!(effect = self.id.raw(), passes, "effect keeps re-triggering itself, giving up");
                self.dirty.set(false);
                break;
            }
            trace!(effect = self.id.raw(), "re-running dirty effect");
        }
    }

    fn cleanup(&self) {
        let dependencies = std::mem::take(&mut *self.dependencies.borrow_mut());
        for dep in dependencies {
            if let Some(dep) = dep.upgrade() {
                dep.unsubscribe(self.id);
            }
        }
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.cleanup();
        trace!(effect = self.id.raw(), "effect disposed");
    }
}

/// A side-effecting computation that runs when dependencies change.
///
/// # Example
///
/// ```rust,ignore
/// let counter = Component::new("div").with_state("count", 0);
///
/// let state = counter.state();
/// let effect = Effect::new(move || {
///     println!("Count is: {}", state.get("count"));
/// });
///
/// counter.state().set("count", 5);  // Prints: "Count is: 5"
/// ```
#[derive(Clone)]
#[must_use = "dropping the handle disposes the effect"]
pub struct Effect {
    inner: Rc<EffectInner>,
}

impl Effect {
    /// Create a new effect with the given function.
    ///
    /// The function runs immediately to establish initial dependencies.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn() + 'static,
    {
        let effect = Self::new_lazy(run);
        trace!(effect = effect.id().raw(), "effect created");

        // Run immediately to establish dependencies
        effect.execute();

        effect
    }

    /// Create a new effect without running it.
    ///
    /// It subscribes to nothing until [`execute`](Self::execute) is called.
    pub fn new_lazy<F>(run: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            inner: Rc::new(EffectInner {
                id: EffectId::new(),
                run: Box::new(run),
                dependencies: RefCell::new(SmallVec::new()),
                disposed: Cell::new(false),
                running: Cell::new(false),
                dirty: Cell::new(false),
                run_count: Cell::new(0),
            }),
        }
    }

    /// Get the effect's unique ID.
    pub fn id(&self) -> EffectId {
        self.inner.id
    }

    /// Run the effect now, re-tracking its dependencies.
    ///
    /// Does nothing if the effect is disposed or already running.
    pub fn execute(&self) {
        self.inner.run();
    }

    /// Dispose of the effect.
    ///
    /// After disposal, the effect will not run again.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Check if the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// Check if the effect function is currently on the stack.
    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    /// Get the number of completed runs.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.get()
    }

    /// Get the number of registry entries this effect is subscribed to.
    pub fn dependency_count(&self) -> usize {
        self.inner
            .dependencies
            .borrow()
            .iter()
            .filter(|dep| dep.strong_count() > 0)
            .count()
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.id())
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Create an effect and run it once.
///
/// The effect lives as long as the returned handle (or a clone of it).
#[must_use = "dropping the handle disposes the effect"]
pub fn effect<F>(run: F) -> Effect
where
    F: Fn() + 'static,
{
    Effect::new(run)
}

/// Dispose of an effect. Calling this more than once is harmless.
pub fn stop(effect: &Effect) {
    effect.dispose();
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
