//! Reactive sources and their dependent sets.
//!
//! A source is anything that can be read inside an observer: signals and
//! computeds. Every source owns a [`Dependents`] set. Reading the source while
//! an observer is running adds that observer to the set; changing the source
//! walks the set and invalidates each observer in insertion order.
//!
//! Edges only accumulate. An observer that stops reading a source stays in
//! that source's set until the observer itself is dropped.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{trace, warn};

use super::context::ReactiveContext;
use super::observer::{ObserverId, ObserverRef};

/// Unique identifier for a reactive source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    /// Generate a new unique source ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Something observers can depend on.
pub trait Source {
    /// Get the source's unique ID.
    fn source_id(&self) -> SourceId;

    /// Register an observer explicitly, outside of any tracking context.
    fn subscribe(&self, observer: ObserverRef);

    /// Get the number of registered dependents.
    fn dependent_count(&self) -> usize;
}

/// The set of observers registered on one source.
///
/// Keyed by observer identity, so re-registering is a no-op. Iteration follows
/// first-registration order.
#[derive(Default)]
pub struct Dependents {
    observers: Mutex<IndexMap<ObserverId, ObserverRef>>,
}

impl Dependents {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the active observer, if any, as a dependent of `source`.
    ///
    /// Called on every tracked read.
    pub fn track(&self, source: SourceId) {
        let Some(observer) = ReactiveContext::current() else {
            return;
        };

        ReactiveContext::track_dependency(source);
        self.insert(observer);
    }

    /// Add an observer to the set. Returns `false` if it was already present.
    ///
    /// Adding a new observer also drops entries whose observer is gone, so a
    /// source that is read often but never written does not grow without
    /// bound.
    pub fn insert(&self, observer: ObserverRef) -> bool {
        let mut observers = self.observers.lock();
        if observers.contains_key(&observer.id()) {
            return false;
        }
        prune(&mut observers);
        observers.insert(observer.id(), observer);
        true
    }

    /// Invalidate every live dependent, in registration order.
    ///
    /// The set is snapshotted and the lock released before any callback runs:
    /// an effect re-run may read this source again, or write it.
    ///
    /// If a dependent panics, the remaining dependents are still invalidated
    /// and the first panic is resumed once the pass is complete.
    pub fn notify(&self, source: SourceId) {
        let snapshot: Vec<ObserverRef> = {
            let mut observers = self.observers.lock();
            let pruned = prune(&mut observers);
            if pruned > 0 {
                trace!(%source, pruned, "pruned dropped dependents");
            }
            observers.values().cloned().collect()
        };

        let mut first_panic = None;
        for observer in snapshot {
            let Some(observer) = observer.upgrade() else {
                continue;
            };
            trace!(
                %source,
                observer = %observer.id(),
                eager = observer.is_eager(),
                "invalidating dependent"
            );

            let result = panic::catch_unwind(AssertUnwindSafe(|| observer.on_invalidate()));
            if let Err(payload) = result {
                if observer.is_eager() {
                    warn!(%source, observer = %observer.id(), "effect panicked during cascade");
                }
                first_panic.get_or_insert(payload);
            }
        }

        if let Some(payload) = first_panic {
            panic::resume_unwind(payload);
        }
    }

    /// Number of registered dependents, including any not yet pruned.
    pub fn len(&self) -> usize {
        self.observers.lock().len()
    }

    /// Whether no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.observers.lock().is_empty()
    }

    /// Whether the given observer is registered.
    pub fn contains(&self, id: ObserverId) -> bool {
        self.observers.lock().contains_key(&id)
    }
}

/// Remove entries whose observer was dropped. Returns how many were removed.
fn prune(observers: &mut IndexMap<ObserverId, ObserverRef>) -> usize {
    let before = observers.len();
    observers.retain(|_, observer| !observer.is_dead());
    before - observers.len()
}

impl fmt::Debug for Dependents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.observers.lock().keys())
            .finish()
    }
}
