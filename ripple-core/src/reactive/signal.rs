//! Signal Implementation
//!
//! A Signal is the fundamental reactive primitive. It holds a value and
//! tracks which computations depend on it.
//!
//! # How Signals Work
//!
//! 1. When a signal is read within a reactive context (computed/effect), the
//!    signal registers that context as a dependent.
//!
//! 2. When a signal is written with a value that differs from the current one,
//!    every dependent is invalidated, in registration order.
//!
//! 3. Computeds only mark themselves stale. Effects re-run before `set`
//!    returns, so one write can cascade depth-first through the graph.
//!
//! Writing an equal value does nothing at all.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use super::observer::ObserverRef;
use super::source::{Dependents, Source, SourceId};

/// A reactive signal holding a value of type T.
///
/// # Type Parameters
///
/// - `T`: The type of value stored in the signal. `PartialEq` decides whether
///   a write is a change.
///
/// # Example
///
/// ```rust
/// use ripple_core::reactive::Signal;
///
/// let count = Signal::new(0);
///
/// // Read the value
/// assert_eq!(count.get(), 0);
///
/// // Update the value (notifies dependents)
/// assert!(count.set(5));
///
/// // Same value again: no-op
/// assert!(!count.set(5));
/// ```
pub struct Signal<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    inner: Arc<SignalInner<T>>,
}

struct SignalInner<T> {
    id: SourceId,
    value: RwLock<T>,
    dependents: Dependents,
}

impl<T> Signal<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a new signal with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                id: SourceId::new(),
                value: RwLock::new(value),
                dependents: Dependents::new(),
            }),
        }
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> SourceId {
        self.inner.id
    }

    /// Get the current value.
    ///
    /// If called within a reactive context, this also registers the
    /// current computation as a dependent.
    pub fn get(&self) -> T {
        self.inner.dependents.track(self.inner.id);
        self.inner.value.read().clone()
    }

    /// Get the current value without tracking dependencies.
    pub fn get_untracked(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Borrow the current value, tracking the read.
    ///
    /// The value stays locked for the duration of `f`; do not write this
    /// signal from inside it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.dependents.track(self.inner.id);
        f(&self.inner.value.read())
    }

    /// Set a new value and notify dependents.
    ///
    /// Returns `false`, without notifying anyone, if the new value equals the
    /// current one.
    pub fn set(&self, value: T) -> bool {
        {
            let mut guard = self.inner.value.write();
            if *guard == value {
                trace!(source = %self.inner.id, "equal write skipped");
                return false;
            }
            *guard = value;
        }

        debug!(
            source = %self.inner.id,
            dependents = self.inner.dependents.len(),
            "signal changed"
        );
        self.inner.dependents.notify(self.inner.id);
        true
    }

    /// Update the value using a function of the current one.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        let new_value = f(&self.inner.value.read());
        self.set(new_value)
    }

    /// Get the number of dependents.
    pub fn dependent_count(&self) -> usize {
        self.inner.dependents.len()
    }
}

impl<T> Source for Signal<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
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

impl<T> Clone for Signal<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Signal<T>
where
    T: Clone + PartialEq + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.read())
            .field("dependents", &self.inner.dependents)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
