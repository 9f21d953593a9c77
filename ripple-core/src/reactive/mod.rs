//! Reactive Primitives
//!
//! This module implements the core reactive system: signals, computeds, and
//! effects.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state. When a signal's value is read
//! within a tracking context (such as a computed or effect), the signal
//! automatically registers that context as a dependent. When the signal's
//! value changes, all dependents are notified.
//!
//! ## Computeds
//!
//! A Computed is a derived value that caches its result. Notification only
//! marks it stale; it re-evaluates on the next read.
//!
//! ## Effects
//!
//! An Effect is a side-effecting computation that re-runs, synchronously,
//! every time one of its dependencies is notified.
//!
//! # Implementation Notes
//!
//! The reactive system uses a thread-local tracking stack to automatically
//! detect dependencies. When a source is read, we check if there is an active
//! observer on top of the stack and, if so, register it.
//!
//! Propagation is immediate and unbatched. An observer that reads two sources
//! invalidated by the same write can run in between the two notifications and
//! see one old value and one new one. There is no cycle detection: a
//! computation that writes a source it depends on recurses until the stack
//! runs out.

mod context;
mod observer;
mod source;
mod signal;
mod computed;
mod effect;
mod runtime;

pub use context::{untrack, ReactiveContext};
pub use observer::{Observer, ObserverId, ObserverKind, ObserverRef};
pub use source::{Dependents, Source, SourceId};
pub use signal::Signal;
pub use computed::Computed;
pub use effect::Effect;
pub use runtime::Runtime;

/// Create a signal.
pub fn signal<T>(value: T) -> Signal<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    Signal::new(value)
}

/// Create a lazily evaluated computed value.
pub fn computed<T, F>(compute: F) -> Computed<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    Computed::new(compute)
}

/// Create an effect and run it once.
pub fn effect<F>(run: F) -> Effect
where
    F: Fn() + Send + Sync + 'static,
{
    Effect::new(run)
}
