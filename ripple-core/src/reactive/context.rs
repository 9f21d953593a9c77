//! Reactive Context
//!
//! The reactive context tracks which computation is currently running.
//! This enables automatic dependency tracking: when a signal is read,
//! we can register the current computation as a dependent.
//!
//! # Implementation
//!
//! We use a thread-local stack to track the currently executing computation.
//! When entering a reactive context (e.g., running a computed or effect), we
//! push the observer onto the stack. When the computation completes, the guard
//! pops it and the previous occupant becomes current again.
//!
//! Popping happens in `Drop`, so the stack is restored on every exit path,
//! including a panic unwinding out of the computation. A stuck entry would
//! otherwise attach every later read to an observer that is no longer running.
//!
//! An entry may also be "untracked": reads made while it is on top register
//! nothing, even if an observer further down the stack is running.

use std::cell::RefCell;

use smallvec::SmallVec;

use super::observer::{ObserverId, ObserverRef};
use super::source::SourceId;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<ContextEntry>> = const { RefCell::new(Vec::new()) };
}

/// An entry in the reactive context stack.
#[derive(Debug)]
struct ContextEntry {
    /// The running observer, or `None` for an untracked section.
    observer: Option<ObserverRef>,
    /// Sources read during this computation, in read order.
    dependencies: SmallVec<[SourceId; 4]>,
}

/// Guard that pops the context when dropped.
pub struct ReactiveContext {
    observer: Option<ObserverId>,
    depth: usize,
}

impl ReactiveContext {
    /// Enter a new reactive context for the given observer.
    ///
    /// While this context is active, any source that is read will register
    /// the observer as a dependent.
    ///
    /// The context is automatically exited when the returned guard is dropped.
    pub fn enter(observer: ObserverRef) -> Self {
        let id = observer.id();
        Self::push(Some(observer), Some(id))
    }

    /// Enter a section in which reads are not tracked.
    pub fn untracked() -> Self {
        Self::push(None, None)
    }

    fn push(observer: Option<ObserverRef>, id: Option<ObserverId>) -> Self {
        let depth = CONTEXT_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(ContextEntry {
                observer,
                dependencies: SmallVec::new(),
            });
            stack.len()
        });

        Self {
            observer: id,
            depth,
        }
    }

    /// Check if there is an active observer that reads would register.
    pub fn is_active() -> bool {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .is_some_and(|entry| entry.observer.is_some())
        })
    }

    /// Get the observer that reads currently register, if any.
    pub fn current() -> Option<ObserverRef> {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .and_then(|entry| entry.observer.clone())
        })
    }

    /// Get the current observer ID, if any.
    pub fn current_observer() -> Option<ObserverId> {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .and_then(|entry| entry.observer.as_ref().map(ObserverRef::id))
        })
    }

    /// Number of entries on this thread's stack.
    pub fn depth() -> usize {
        CONTEXT_STACK.with(|stack| stack.borrow().len())
    }

    /// Record a read of the given source.
    ///
    /// This is called by sources when they are read. Untracked sections
    /// ignore it.
    pub fn track_dependency(source: SourceId) {
        CONTEXT_STACK.with(|stack| {
            if let Some(entry) = stack.borrow_mut().last_mut() {
                if entry.observer.is_some() {
                    entry.dependencies.push(source);
                }
            }
        });
    }

    /// Get the dependencies collected in the current context.
    pub fn get_dependencies() -> Vec<SourceId> {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .map(|entry| entry.dependencies.to_vec())
                .unwrap_or_default()
        })
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            debug_assert_eq!(
                stack.len(),
                self.depth,
                "ReactiveContext dropped out of order"
            );

            let popped = stack.pop();
            if let Some(entry) = popped {
                debug_assert_eq!(
                    entry.observer.as_ref().map(ObserverRef::id),
                    self.observer,
                    "ReactiveContext mismatch: expected {:?}",
                    self.observer
                );
            }
        });
    }
}

/// Run `f` without registering any of its reads.
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    let _ctx = ReactiveContext::untracked();
    f()
}
