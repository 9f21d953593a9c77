//! Computed Implementation
//!
//! A Computed is a cached derived value that re-evaluates only when one of
//! its dependencies changed since it was last read.
//!
//! # How Computeds Work
//!
//! 1. Creating a computed runs nothing. It starts stale with no value.
//!
//! 2. On read, a stale computed runs its function inside a reactive context,
//!    caches the result, and becomes fresh. Every source read during the run
//!    registers the computed as a dependent.
//!
//! 3. While fresh, reads return the cached value without running the function.
//!
//! 4. When a dependency changes, the computed is marked stale and passes the
//!    invalidation on to its own dependents. It does not recompute until the
//!    next read.
//!
//! Dependencies discovered across runs accumulate: a source read once stays a
//! dependency even if later runs no longer read it.
//!
//! # Explicit Dependencies
//!
//! [`Computed::with_dependencies`] skips discovery. The computed subscribes to
//! the given sources up front and runs its function untracked, so the
//! dependency list is fixed for its whole life.

use std::any::Any;
use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexSet;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use super::context::{untrack, ReactiveContext};
use super::observer::{Observer, ObserverId, ObserverKind, ObserverRef};
use super::source::{Dependents, Source, SourceId};
use crate::error::{ReactiveError, Result};

/// How a computed finds its dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tracking {
    /// Whatever the function reads.
    Auto,
    /// A list fixed at construction.
    Explicit,
}

/// A lazily evaluated, cached derived value.
///
/// # Example
///
/// ```rust
/// use ripple_core::reactive::{Computed, Signal};
///
/// let count = Signal::new(2);
/// let doubled = {
///     let count = count.clone();
///     Computed::new(move || count.get() * 2)
/// };
///
/// assert_eq!(doubled.get(), 4);
/// count.set(5);
/// assert!(doubled.is_stale());
/// assert_eq!(doubled.get(), 10);
/// ```
pub struct Computed<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: Arc<ComputedInner<T>>,
}

struct ComputedInner<T> {
    /// Identity as a source others can depend on.
    id: SourceId,

    /// Identity as an observer of its own dependencies.
    observer_id: ObserverId,

    compute: Box<dyn Fn() -> T + Send + Sync>,

    /// The cached value (None if never computed).
    value: RwLock<Option<T>>,

    stale: AtomicBool,

    tracking: Tracking,

    /// Every source this computed has ever depended on.
    dependencies: Mutex<IndexSet<SourceId>>,

    dependents: Dependents,

    this: Weak<ComputedInner<T>>,
}

impl<T> Computed<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new computed with the given computation function.
    ///
    /// The computation is not run immediately. It runs on first access.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::build(Box::new(compute), Tracking::Auto)
    }

    /// Create a computed that depends on exactly the given sources.
    ///
    /// Reads made by `compute` are not tracked.
    pub fn with_dependencies<F>(compute: F, dependencies: &[&dyn Source]) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let computed = Self::build(Box::new(compute), Tracking::Explicit);
        let observer = computed.inner.observer_ref();
        let mut ids = computed.inner.dependencies.lock();
        for dependency in dependencies {
            dependency.subscribe(observer.clone());
            ids.insert(dependency.source_id());
        }
        drop(ids);
        computed
    }

    fn build(compute: Box<dyn Fn() -> T + Send + Sync>, tracking: Tracking) -> Self {
        let inner = Arc::new_cyclic(|this| ComputedInner {
            id: SourceId::new(),
            observer_id: ObserverId::new(),
            compute,
            value: RwLock::new(None),
            stale: AtomicBool::new(true),
            tracking,
            dependencies: Mutex::new(IndexSet::new()),
            dependents: Dependents::new(),
            this: this.clone(),
        });
        Self { inner }
    }

    /// Get the computed's ID as a source.
    pub fn id(&self) -> SourceId {
        self.inner.id
    }

    /// Get the computed's ID as an observer.
    pub fn observer_id(&self) -> ObserverId {
        self.inner.observer_id
    }

    /// Get the current value, recomputing if stale.
    ///
    /// If called within a reactive context, this also registers the current
    /// computation as a dependent. A panic in the compute function propagates
    /// to the caller and leaves the computed stale.
    pub fn get(&self) -> T {
        self.inner.dependents.track(self.inner.id);
        self.inner.read()
    }

    /// Get the current value without tracking dependencies.
    pub fn get_untracked(&self) -> T {
        self.inner.read()
    }

    /// Like [`get`](Self::get), but a panicking compute function is turned
    /// into an error instead of unwinding through the caller.
    pub fn try_get(&self) -> Result<T> {
        self.inner.dependents.track(self.inner.id);
        panic::catch_unwind(AssertUnwindSafe(|| self.inner.read())).map_err(|payload| {
            ReactiveError::ComputationPanicked {
                computed: self.inner.id,
                message: panic_message(payload.as_ref()),
            }
        })
    }

    /// Mark the computed stale, as if a dependency had changed.
    pub fn mark_stale(&self) {
        self.inner.on_invalidate();
    }

    /// Whether the next read will recompute.
    pub fn is_stale(&self) -> bool {
        self.inner.stale.load(Ordering::SeqCst)
    }

    /// Check if the computed has a cached value.
    pub fn has_value(&self) -> bool {
        self.inner.value.read().is_some()
    }

    /// Get the number of sources this computed depends on.
    pub fn dependency_count(&self) -> usize {
        self.inner.dependencies.lock().len()
    }

    /// Whether `source` is among this computed's dependencies.
    pub fn depends_on(&self, source: SourceId) -> bool {
        self.inner.dependencies.lock().contains(&source)
    }

    /// Get the number of dependents.
    pub fn dependent_count(&self) -> usize {
        self.inner.dependents.len()
    }
}

impl<T> ComputedInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn observer_ref(&self) -> ObserverRef {
        let this: Weak<dyn Observer> = self.this.clone();
        ObserverRef::new(self.observer_id, this)
    }

    fn read(&self) -> T {
        if !self.stale.load(Ordering::SeqCst) {
            if let Some(value) = self.value.read().as_ref() {
                return value.clone();
            }
        }
        self.recompute()
    }

    /// Run the compute function and cache the result.
    ///
    /// No lock is held while the function runs.
    fn recompute(&self) -> T {
        let value = match self.tracking {
            Tracking::Auto => {
                let _ctx = ReactiveContext::enter(self.observer_ref());
                let value = (self.compute)();
                let reads = ReactiveContext::get_dependencies();
                self.dependencies.lock().extend(reads);
                value
            }
            Tracking::Explicit => untrack(|| (self.compute)()),
        };

        *self.value.write() = Some(value.clone());
        self.stale.store(false, Ordering::SeqCst);

        debug!(
            source = %self.id,
            observer = %self.observer_id,
            dependencies = self.dependencies.lock().len(),
            "computed recomputed"
        );
        value
    }
}

impl<T> Observer for ComputedInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn id(&self) -> ObserverId {
        self.observer_id
    }

    /// Mark stale and forward the invalidation to dependents.
    ///
    /// Forwarding happens even if already stale: an explicit subscriber may
    /// have registered before this computed ever ran.
    fn on_invalidate(&self) {
        let was_stale = self.stale.swap(true, Ordering::SeqCst);
        trace!(source = %self.id, was_stale, "computed invalidated");
        self.dependents.notify(self.id);
    }

    fn kind(&self) -> ObserverKind {
        ObserverKind::Computed
    }
}

impl<T> Source for Computed<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn source_id(&self) -> SourceId {
        self.inner.id
    }

    fn subscribe(&self, observer: ObserverRef) {
        self.inner.dependents.insert(observer);
    }

    fn dependent_count(&self) -> usize {
        self.inner.dependents.len()
    }
}

impl<T> Clone for Computed<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Computed<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computed")
            .field("id", &self.inner.id)
            .field("stale", &self.is_stale())
            .field("value", &*self.inner.value.read())
            .field("dependency_count", &self.dependency_count())
            .field("dependent_count", &self.dependent_count())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
