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
//! 2. When any dependency changes, the effect re-runs synchronously, inside
//!    the `set` call that caused the change. There is no queue: if the effect
//!    writes other signals, their dependents run before `set` returns.
//!
//! 3. Dependencies are never cleared between runs. The dependency set is the
//!    union of everything the effect has read across all of its runs.
//!
//! # Differences from Computed
//!
//! - Computeds return a value; effects do not.
//! - Computeds are lazy (compute on access); effects are eager (run when deps change).
//! - Computeds cache results; effects just run their side effect.
//!
//! # Lifetime
//!
//! There is no way to stop an effect. The [`Runtime`](super::Runtime) keeps
//! every effect alive for the rest of the process, so dropping the handle
//! returned by [`Effect::new`] does not unsubscribe it. An effect whose first
//! run panics is never retained.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexSet;
use parking_lot::Mutex;
use tracing::debug;

use super::context::ReactiveContext;
use super::observer::{Observer, ObserverId, ObserverKind, ObserverRef};
use super::runtime::Runtime;
use super::source::SourceId;

/// A side-effecting computation that runs when dependencies change.
///
/// # Example
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use ripple_core::reactive::{Effect, Signal};
///
/// let count = Signal::new(0);
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let effect = {
///     let (count, seen) = (count.clone(), seen.clone());
///     Effect::new(move || seen.lock().unwrap().push(count.get()))
/// };
///
/// count.set(5);
/// assert_eq!(*seen.lock().unwrap(), vec![0, 5]);
/// assert_eq!(effect.run_count(), 2);
/// ```
pub struct Effect {
    inner: Arc<EffectInner>,
}

struct EffectInner {
    id: ObserverId,

    run: Box<dyn Fn() + Send + Sync>,

    stale: AtomicBool,

    /// Every source this effect has ever read.
    dependencies: Mutex<IndexSet<SourceId>>,

    /// Number of times the effect has started running.
    run_count: AtomicUsize,

    this: Weak<EffectInner>,
}

impl Effect {
    /// Create a new effect with the given function.
    ///
    /// The function runs immediately to establish initial dependencies.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let inner = Arc::new_cyclic(|this| EffectInner {
            id: ObserverId::new(),
            run: Box::new(run),
            stale: AtomicBool::new(true),
            dependencies: Mutex::new(IndexSet::new()),
            run_count: AtomicUsize::new(0),
            this: this.clone(),
        });

        // Run immediately to establish dependencies. Retain only once the
        // first run completed: if it panics, nothing keeps the effect alive
        // and its sources prune it on their next write.
        inner.execute();

        Runtime::retain(inner.clone());

        Self { inner }
    }

    /// Get the effect's unique ID.
    pub fn id(&self) -> ObserverId {
        self.inner.id
    }

    /// Get the number of times the effect has run.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.load(Ordering::SeqCst)
    }

    /// Get the number of dependencies.
    pub fn dependency_count(&self) -> usize {
        self.inner.dependencies.lock().len()
    }

    /// Whether `source` is among this effect's dependencies.
    pub fn depends_on(&self, source: SourceId) -> bool {
        self.inner.dependencies.lock().contains(&source)
    }

    /// Whether the last run did not complete.
    pub fn is_stale(&self) -> bool {
        self.inner.stale.load(Ordering::SeqCst)
    }
}

impl EffectInner {
    fn observer_ref(&self) -> ObserverRef {
        let this: Weak<dyn Observer> = self.this.clone();
        ObserverRef::new(self.id, this)
    }

    /// Run the effect function within a reactive context.
    fn execute(&self) {
        let _ctx = ReactiveContext::enter(self.observer_ref());

        let run = self.run_count.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(observer = %self.id, run, "running effect");

        (self.run)();

        let reads = ReactiveContext::get_dependencies();
        self.dependencies.lock().extend(reads);
        self.stale.store(false, Ordering::SeqCst);
    }
}

impl Observer for EffectInner {
    fn id(&self) -> ObserverId {
        self.id
    }

    fn on_invalidate(&self) {
        self.stale.store(true, Ordering::SeqCst);
        self.execute();
    }

    fn kind(&self) -> ObserverKind {
        ObserverKind::Effect
    }
}

impl Clone for Effect {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.inner.id)
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("stale", &self.is_stale())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
