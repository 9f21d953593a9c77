//! Observer types for the reactive system.
//!
//! An Observer is any computation that can be registered as a dependent of a
//! reactive source by reading it while it runs. Computeds and effects are the
//! two kinds of observer.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Unique identifier for an observer.
///
/// Dependent sets are keyed by this ID, so membership is by identity and an
/// observer can never be registered twice on the same source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Generate a new unique observer ID.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "o{}", self.0)
    }
}

/// The two kinds of observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverKind {
    /// Lazy: invalidation only marks the cached value stale.
    Computed,

    /// Eager: invalidation re-runs the computation immediately.
    Effect,
}

/// A computation that is notified when one of its dependencies changes.
pub trait Observer: Send + Sync {
    /// Get the observer's unique ID.
    fn id(&self) -> ObserverId;

    /// Called by a source when its value changed.
    fn on_invalidate(&self);

    /// What kind of observer this is.
    fn kind(&self) -> ObserverKind;

    /// Whether invalidation re-runs this observer right away.
    fn is_eager(&self) -> bool {
        self.kind() == ObserverKind::Effect
    }
}

/// A non-owning handle to an observer.
///
/// Sources keep these in their dependent sets, and the reactive context keeps
/// one per running computation. Holding an `ObserverRef` never keeps the
/// observer alive.
#[derive(Clone)]
pub struct ObserverRef {
    id: ObserverId,
    observer: Weak<dyn Observer>,
}

impl ObserverRef {
    /// Create a handle from a weak reference to an observer.
    pub fn new(id: ObserverId, observer: Weak<dyn Observer>) -> Self {
        Self { id, observer }
    }

    /// Create a handle pointing at a live observer.
    pub fn from_arc<O>(observer: &Arc<O>) -> Self
    where
        O: Observer + 'static,
    {
        let weak = Arc::downgrade(observer);
        let weak: Weak<dyn Observer> = weak;
        Self {
            id: observer.id(),
            observer: weak,
        }
    }

    /// The ID of the referenced observer.
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Upgrade to a strong reference if the observer is still alive.
    pub fn upgrade(&self) -> Option<Arc<dyn Observer>> {
        self.observer.upgrade()
    }

    /// Whether the referenced observer has been dropped.
    pub fn is_dead(&self) -> bool {
        self.observer.strong_count() == 0
    }
}

impl fmt::Debug for ObserverRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRef")
            .field("id", &self.id)
            .field("alive", &!self.is_dead())
            .finish()
    }
}
