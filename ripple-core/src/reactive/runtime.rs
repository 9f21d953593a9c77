//! Reactive Runtime
//!
//! The runtime owns what nothing else owns: effects. Sources only keep weak
//! references to their dependents, and an effect handle is usually dropped
//! right after creation, so the runtime holds a strong reference to every
//! effect ever created. Effects have no disposal, so the registry only grows.
//!
//! It also exposes the tracking state of the calling thread.
//!
//! # Thread Safety
//!
//! The effect registry is process-wide behind a mutex. Tracking state is
//! per thread (see [`ReactiveContext`]).

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::trace;

use super::context::ReactiveContext;
use super::observer::{Observer, ObserverId};

/// The global reactive runtime.
pub struct Runtime;

// Every retained observer, in creation order.
static REGISTRY: OnceLock<Mutex<Vec<Arc<dyn Observer>>>> = OnceLock::new();

fn get_registry() -> &'static Mutex<Vec<Arc<dyn Observer>>> {
    REGISTRY.get_or_init(|| Mutex::new(Vec::new()))
}

impl Runtime {
    /// Keep an observer alive for the rest of the process.
    pub fn retain(observer: Arc<dyn Observer>) {
        trace!(observer = %observer.id(), "retaining observer");
        get_registry().lock().push(observer);
    }

    /// Number of observers retained so far.
    pub fn effect_count() -> usize {
        get_registry().lock().len()
    }

    /// Get the observer that reads on this thread currently register, if any.
    pub fn current_observer() -> Option<ObserverId> {
        ReactiveContext::current_observer()
    }

    /// Check if reads on this thread are being tracked.
    pub fn is_tracking() -> bool {
        ReactiveContext::is_active()
    }
}
