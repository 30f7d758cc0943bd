use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use rate_guard_strategies::clock::ManualClock;
use rate_guard_strategies::rate_limiters::{SlidingWindowLog, SlidingWindowLogConfig};
use rate_guard_strategies::RateLimitError;

fn log(window_size_ms: u64, max_requests: u64) -> (SlidingWindowLog<ManualClock>, ManualClock) {
    let clock = ManualClock::new(0);
    let log = SlidingWindowLog::with_clock(window_size_ms, max_requests, clock.clone()).unwrap();
    (log, clock)
}

#[test]
fn test_new_with_zero_parameters() {
    assert!(matches!(
        SlidingWindowLog::new(0, 3),
        Err(RateLimitError::InvalidConfiguration { parameter: "window_size_ms", .. })
    ));
    assert!(matches!(
        SlidingWindowLog::new(1000, 0),
        Err(RateLimitError::InvalidConfiguration { parameter: "max_requests", .. })
    ));
}

#[test]
fn test_slot_frees_exactly_at_expiry() {
    let (log, clock) = log(1000, 3);

    let results: Vec<bool> = (0..4).map(|_| log.try_consume()).collect();
    assert_eq!(results, [true, true, true, false]);

    // Half a window later nothing has expired
    clock.advance_millis(500);
    assert!(!log.try_consume());

    // Tick 999: still inside the window
    clock.advance_millis(499);
    assert!(!log.try_consume());

    // Tick 1000: entries at tick 0 fall out
    clock.advance_millis(1);
    assert!(log.try_consume());
    assert_eq!(log.logged(), 1);
}

#[test]
fn test_window_slides_per_request() {
    let (log, clock) = log(1000, 3);

    // Admissions at ticks 0, 400, 800
    assert!(log.try_consume());
    clock.advance_millis(400);
    assert!(log.try_consume());
    clock.advance_millis(400);
    assert!(log.try_consume());

    clock.advance_millis(100); // tick 900
    assert!(!log.try_consume());

    clock.advance_millis(100); // tick 1000, tick 0 expires
    assert!(log.try_consume());

    clock.advance_millis(399); // tick 1399
    assert!(!log.try_consume());

    clock.advance_millis(1); // tick 1400, tick 400 expires
    assert!(log.try_consume());
}

#[test]
fn test_no_boundary_burst() {
    let (log, clock) = log(1000, 3);
    clock.advance_millis(999);
    for _ in 0..3 {
        assert!(log.try_consume());
    }

    // Where a fixed window would reset, the log still remembers
    clock.advance_millis(1);
    assert!(!log.try_consume());
}

#[test]
fn test_rejections_do_not_grow_log() {
    let (log, clock) = log(1000, 5);
    for _ in 0..5 {
        assert!(log.try_consume());
    }

    // Spinning on rejections with a frozen clock
    for _ in 0..1000 {
        assert!(!log.try_consume());
    }
    assert_eq!(log.logged(), 5);

    clock.advance_millis(1000);
    assert_eq!(log.logged(), 0);
    assert!(log.try_consume());
    assert_eq!(log.logged(), 1);
}

#[test]
fn test_concurrent_consumers_never_over_admit() {
    let clock = ManualClock::new(0);
    let log = Arc::new(SlidingWindowLog::with_clock(1000, 64, clock).unwrap());
    let admitted = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let log = Arc::clone(&log);
            let admitted = Arc::clone(&admitted);
            thread::spawn(move || {
                for _ in 0..40 {
                    if log.try_consume() {
                        admitted.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(admitted.load(Ordering::Relaxed), 64);
    assert_eq!(log.logged(), 64);
}

#[test]
fn test_from_config() {
    let log: SlidingWindowLog =
        SlidingWindowLog::try_from(SlidingWindowLogConfig::new(500, 7)).unwrap();
    assert_eq!(log.window_size_ms(), 500);
    assert_eq!(log.max_requests(), 7);
}
