use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use rate_guard_strategies::clock::ManualClock;
use rate_guard_strategies::rate_limiters::{FixedWindowCounter, FixedWindowCounterConfig};
use rate_guard_strategies::RateLimitError;

fn counter(
    window_size_ms: u64,
    max_requests: u64,
    start: u64,
) -> (FixedWindowCounter<ManualClock>, ManualClock) {
    let clock = ManualClock::new(start);
    let counter =
        FixedWindowCounter::with_clock(window_size_ms, max_requests, clock.clone()).unwrap();
    (counter, clock)
}

#[test]
fn test_new_with_zero_parameters() {
    assert!(matches!(
        FixedWindowCounter::new(0, 10),
        Err(RateLimitError::InvalidConfiguration { parameter: "window_size_ms", .. })
    ));
    assert!(matches!(
        FixedWindowCounter::new(1000, 0),
        Err(RateLimitError::InvalidConfiguration { parameter: "max_requests", .. })
    ));
}

#[test]
fn test_window_reset() {
    let (counter, clock) = counter(1000, 3, 0);

    let results: Vec<bool> = (0..4).map(|_| counter.try_consume()).collect();
    assert_eq!(results, [true, true, true, false]);

    clock.advance_millis(1000);
    assert!(counter.try_consume());
    assert_eq!(counter.current_count(), 1);
}

#[test]
fn test_boundary_burst_is_allowed() {
    // Last millisecond of window 0
    let (counter, clock) = counter(1000, 3, 999);
    for _ in 0..3 {
        assert!(counter.try_consume());
    }
    assert!(!counter.try_consume());

    // First millisecond of window 1: another full quota, 6 admitted within 2ms
    clock.advance_millis(1);
    for _ in 0..3 {
        assert!(counter.try_consume());
    }
    assert!(!counter.try_consume());
}

#[test]
fn test_windows_align_to_clock_not_construction() {
    // Built halfway through window 1 [1000-1999]
    let (counter, clock) = counter(1000, 2, 1500);
    assert!(counter.try_consume());
    assert!(counter.try_consume());

    clock.advance_millis(499); // tick 1999, same window
    assert!(!counter.try_consume());

    clock.advance_millis(1); // tick 2000, window 2
    assert!(counter.try_consume());
}

#[test]
fn test_skip_windows() {
    let (counter, clock) = counter(10, 5, 0);
    for _ in 0..5 {
        assert!(counter.try_consume());
    }

    // Jump to window 3 [30-39]
    clock.advance_millis(35);
    assert_eq!(counter.current_count(), 0);
    for _ in 0..5 {
        assert!(counter.try_consume());
    }
    assert!(!counter.try_consume());
}

#[test]
fn test_rejection_does_not_increment() {
    let (counter, _clock) = counter(1000, 2, 0);
    assert!(counter.try_consume());
    assert!(counter.try_consume());
    for _ in 0..10 {
        assert!(!counter.try_consume());
    }
    assert_eq!(counter.current_count(), 2);
}

#[test]
fn test_concurrent_consumers_within_window() {
    let clock = ManualClock::new(0);
    let counter = Arc::new(FixedWindowCounter::with_clock(1000, 100, clock).unwrap());
    let admitted = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let counter = Arc::clone(&counter);
            let admitted = Arc::clone(&admitted);
            thread::spawn(move || {
                for _ in 0..50 {
                    if counter.try_consume() {
                        admitted.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(admitted.load(Ordering::Relaxed), 100);
}

#[test]
fn test_concurrent_rotation_has_single_winner() {
    let (counter, clock) = counter(1000, 10, 0);
    for _ in 0..10 {
        assert!(counter.try_consume());
    }

    // Every thread sees the new window at once; only one may reset the count
    clock.advance_millis(1000);
    let counter = Arc::new(counter);
    let barrier = Arc::new(Barrier::new(8));
    let admitted = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let counter = Arc::clone(&counter);
            let barrier = Arc::clone(&barrier);
            let admitted = Arc::clone(&admitted);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..5 {
                    if counter.try_consume() {
                        admitted.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(admitted.load(Ordering::Relaxed), 10);
}

#[test]
fn test_from_config() {
    let counter: FixedWindowCounter =
        FixedWindowCounter::try_from(FixedWindowCounterConfig::new(60_000, 100)).unwrap();
    assert_eq!(counter.window_size_ms(), 60_000);
    assert_eq!(counter.max_requests(), 100);
}
