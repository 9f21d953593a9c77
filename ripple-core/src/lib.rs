//! Ripple Core
//!
//! This crate provides the core runtime for the Ripple reactive dataflow
//! library. It implements:
//!
//! - Reactive primitives (signals, computeds, effects)
//! - Automatic dependency tracking through a scoped context stack
//! - Synchronous, depth-first invalidation on write
//!
//! # Architecture
//!
//! - `reactive`: Core reactive primitives and dependency tracking
//! - `error`: Error types for the fallible APIs
//!
//! The crate never installs a `tracing` subscriber; hosts that want the
//! debug output install their own.
//!
//! # Example
//!
//! ```rust
//! use ripple_core::reactive::{Computed, Effect, Signal};
//!
//! // Create a signal
//! let count = Signal::new(0);
//!
//! // Create a derived value
//! let doubled = {
//!     let count = count.clone();
//!     Computed::new(move || count.get() * 2)
//! };
//!
//! // Create an effect
//! {
//!     let (count, doubled) = (count.clone(), doubled.clone());
//!     Effect::new(move || {
//!         println!("Count: {}, Doubled: {}", count.get(), doubled.get());
//!     });
//! }
//!
//! // Update the signal. The effect re-runs once for `count` and once more
//! // when `doubled` is invalidated; the last line is "Count: 5, Doubled: 10".
//! count.set(5);
//! ```

pub mod error;
pub mod reactive;

pub use error::{ReactiveError, Result};
pub use reactive::{computed, effect, signal, Computed, Effect, Signal};
