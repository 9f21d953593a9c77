//! Integration Tests for Reactive System
//!
//! These tests verify that signals, computeds, and effects work together correctly.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use ripple_core::reactive::{
    computed, effect, signal, untrack, Computed, Effect, ReactiveContext, Runtime, Signal,
};

/// Writing the current value again notifies no one.
#[test]
fn equal_write_does_not_notify() {
    let count = Signal::new(3);
    let runs = Arc::new(AtomicI32::new(0));
    let (count_clone, runs_clone) = (count.clone(), runs.clone());

    let _effect = Effect::new(move || {
        count_clone.get();
        runs_clone.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    assert!(!count.set(3));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

/// Creating a computed never runs its function.
#[test]
fn computed_is_lazy_until_read() {
    let calls = Arc::new(AtomicI32::new(0));
    let calls_clone = calls.clone();

    let lazy = Computed::new(move || {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        "value".to_string()
    });

    assert!(lazy.is_stale());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert_eq!(lazy.get(), "value");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Two reads with no write in between compute once.
#[test]
fn computed_caches_between_writes() {
    let source = Signal::new(1);
    let calls = Arc::new(AtomicI32::new(0));
    let (source_clone, calls_clone) = (source.clone(), calls.clone());

    let derived = Computed::new(move || {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        source_clone.get() * 100
    });

    assert_eq!(derived.get(), 100);
    assert_eq!(derived.get(), 100);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    source.set(2);
    assert_eq!(derived.get(), 200);
    assert_eq!(derived.get(), 200);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

/// count * multiplier follows both signals.
#[test]
fn product_tracks_both_signals() {
    let count = signal(0);
    let multiplier = signal(2);

    let (c, m) = (count.clone(), multiplier.clone());
    let product = computed(move || c.get() * m.get());

    assert_eq!(product.get(), 0);

    count.set(4);
    assert_eq!(product.get(), 8);

    multiplier.set(5);
    assert_eq!(product.get(), 20);
}

/// The original two-step demo, with the dependency list given up front.
#[test]
fn product_with_explicit_dependencies() {
    let count = Signal::new(0);
    let multiplier = Signal::new(2);

    let (c, m) = (count.clone(), multiplier.clone());
    let product = Computed::with_dependencies(move || c.get() * m.get(), &[&count, &multiplier]);

    assert_eq!(product.get(), 0);

    count.set(4);
    assert_eq!(product.get(), 8);

    multiplier.set(5);
    assert_eq!(product.get(), 20);
}

/// An effect runs at creation and again on every distinct write.
#[test]
fn effect_logs_each_change() {
    let count = Signal::new(0);
    let log = Arc::new(Mutex::new(Vec::new()));
    let (count_clone, log_clone) = (count.clone(), log.clone());

    let _effect = effect(move || {
        log_clone.lock().push(count_clone.get());
    });
    assert_eq!(*log.lock(), vec![0]);

    count.set(1);
    assert_eq!(*log.lock(), vec![0, 1]);

    count.set(1);
    assert_eq!(*log.lock(), vec![0, 1]);
}

/// A dependency that is no longer read still invalidates.
#[test]
fn dependency_edges_accumulate() {
    let use_a = Signal::new(true);
    let a = Signal::new(1);
    let b = Signal::new(2);

    let (use_a_c, a_c, b_c) = (use_a.clone(), a.clone(), b.clone());
    let pick = Computed::new(move || if use_a_c.get() { a_c.get() } else { b_c.get() });

    assert_eq!(pick.get(), 1);
    assert!(pick.depends_on(a.id()));
    assert!(!pick.depends_on(b.id()));

    use_a.set(false);
    assert_eq!(pick.get(), 2);
    assert!(pick.depends_on(a.id()));
    assert!(pick.depends_on(b.id()));

    // `a` is not read any more, but the edge is still there.
    assert!(!pick.is_stale());
    a.set(50);
    assert!(pick.is_stale());
    assert_eq!(pick.get(), 2);
}

/// Every effect on a signal runs once per write, in a stable order.
#[test]
fn independent_effects_run_in_registration_order() {
    let count = Signal::new(0);
    let log = Arc::new(Mutex::new(Vec::new()));

    let effects: Vec<Effect> = ["first", "second", "third"]
        .into_iter()
        .map(|name| {
            let (count, log) = (count.clone(), log.clone());
            Effect::new(move || {
                let value = count.get();
                log.lock().push((name, value));
            })
        })
        .collect();

    log.lock().clear();
    count.set(1);
    count.set(2);

    assert_eq!(
        *log.lock(),
        vec![
            ("first", 1),
            ("second", 1),
            ("third", 1),
            ("first", 2),
            ("second", 2),
            ("third", 2),
        ]
    );
    for effect in &effects {
        assert_eq!(effect.run_count(), 3);
    }
}

/// An effect that writes another signal cascades before `set` returns.
#[test]
fn cascade_is_synchronous_and_depth_first() {
    let celsius = Signal::new(0);
    let fahrenheit = Signal::new(32);
    let log = Arc::new(Mutex::new(Vec::new()));

    {
        let (celsius, fahrenheit) = (celsius.clone(), fahrenheit.clone());
        Effect::new(move || {
            fahrenheit.set(celsius.get() * 9 / 5 + 32);
        });
    }
    {
        let (fahrenheit, log) = (fahrenheit.clone(), log.clone());
        Effect::new(move || {
            log.lock().push(fahrenheit.get());
        });
    }

    celsius.set(100);
    assert_eq!(fahrenheit.get(), 212);
    assert_eq!(*log.lock(), vec![32, 212]);
}

/// Reads inside `untrack` register nothing.
#[test]
fn untracked_reads_are_not_dependencies() {
    let tracked = Signal::new(1);
    let hidden = Signal::new(10);

    let (t, h) = (tracked.clone(), hidden.clone());
    let sum = Computed::new(move || t.get() + untrack(|| h.get()));

    assert_eq!(sum.get(), 11);
    assert_eq!(hidden.dependent_count(), 0);

    hidden.set(20);
    assert!(!sum.is_stale());
    assert_eq!(sum.get(), 11);

    tracked.set(2);
    assert_eq!(sum.get(), 22);
}

/// A panicking computation does not leave its observer on the context stack.
#[test]
fn panic_restores_context() {
    let trigger = Signal::new(0);
    let trigger_clone = trigger.clone();
    let fragile = Computed::new(move || {
        let value = trigger_clone.get();
        assert!(value < 10, "value too large");
        value
    });

    assert_eq!(fragile.get(), 0);
    trigger.set(11);

    let depth = ReactiveContext::depth();
    let result = std::panic::catch_unwind(AssertUnwindSafe(|| fragile.get_untracked()));
    assert!(result.is_err());
    assert_eq!(ReactiveContext::depth(), depth);
    assert!(!Runtime::is_tracking());
    assert!(fragile.is_stale());

    // A later read elsewhere is attributed correctly.
    let other = Signal::new(5);
    let other_clone = other.clone();
    let independent = Computed::new(move || other_clone.get());
    assert_eq!(independent.get(), 5);
    assert_eq!(other.dependent_count(), 1);
    assert!(!fragile.depends_on(other.id()));
}

/// Dropping a computed removes it from its sources on the next write.
#[test]
fn dropped_computed_is_pruned() {
    let source = Signal::new(0);
    let source_clone = source.clone();
    let derived = Computed::new(move || source_clone.get());
    derived.get();
    assert_eq!(source.dependent_count(), 1);

    drop(derived);
    source.set(1);
    assert_eq!(source.dependent_count(), 0);
}

/// An effect panicking inside `set` reaches the caller, and the rest of the
/// cascade still runs.
#[test]
fn effect_panic_in_set_reaches_caller() {
    let source = Signal::new(0);

    let source_clone = source.clone();
    let _guard = Effect::new(move || {
        assert!(source_clone.get() != 1, "rejected value");
    });

    let source_clone = source.clone();
    let mirror = Computed::new(move || source_clone.get());
    assert_eq!(mirror.get(), 0);

    let result = std::panic::catch_unwind(AssertUnwindSafe(|| source.set(1)));
    assert!(result.is_err());

    // The write happened and the computed registered after the effect was
    // still invalidated.
    assert_eq!(source.get(), 1);
    assert!(mirror.is_stale());
    assert_eq!(mirror.get(), 1);
}

/// Tracking works normally after an effect panicked inside `set`.
#[test]
fn tracking_recovers_after_effect_panic() {
    let source = Signal::new(0);
    let source_clone = source.clone();
    let guard = Effect::new(move || {
        assert!(source_clone.get() != 1, "rejected value");
    });

    let depth = ReactiveContext::depth();
    let result = std::panic::catch_unwind(AssertUnwindSafe(|| source.set(1)));
    assert!(result.is_err());
    assert_eq!(ReactiveContext::depth(), depth);
    assert!(!Runtime::is_tracking());

    let other = Signal::new(10);
    let log = Arc::new(Mutex::new(Vec::new()));
    let (other_clone, log_clone) = (other.clone(), log.clone());
    let watcher = Effect::new(move || {
        log_clone.lock().push(other_clone.get());
    });

    other.set(11);
    assert_eq!(*log.lock(), vec![10, 11]);
    assert!(watcher.depends_on(other.id()));
    assert_eq!(other.dependent_count(), 1);

    // The effect keeps running on later accepted writes.
    source.set(2);
    assert_eq!(guard.run_count(), 3);
}
