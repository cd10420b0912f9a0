use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tempo::search::thread_handler::ThreadHandler;

#[test]
fn worker_result_is_returned_and_flag_lowered() {
    let running = Arc::new(AtomicBool::new(false));
    let handler = ThreadHandler::new(Arc::clone(&running));

    let result = handler.run_with_deadline(Duration::from_secs(10), || 7 * 6);

    assert_eq!(result, 42);
    assert!(!running.load(Ordering::Acquire));
}

#[test]
fn finished_worker_wakes_the_watchdog_early() {
    let running = Arc::new(AtomicBool::new(false));
    let handler = ThreadHandler::new(Arc::clone(&running));

    let started = Instant::now();
    handler.run_with_deadline(Duration::from_secs(60), || ());
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_secs(5),
        "a 60s deadline must not stall a worker that finished instantly, took {elapsed:?}"
    );
}

#[test]
fn watchdog_cancels_a_worker_that_overruns() {
    let running = Arc::new(AtomicBool::new(false));
    let handler = ThreadHandler::new(Arc::clone(&running));
    let observed = Arc::clone(&running);

    let started = Instant::now();
    let spins = handler.run_with_deadline(Duration::from_millis(200), move || {
        // Cooperative worker: loop until the watchdog lowers the flag.
        let mut spins = 0u64;
        while observed.load(Ordering::Acquire) {
            spins += 1;
            std::thread::sleep(Duration::from_millis(1));
        }
        spins
    });
    let elapsed = started.elapsed();

    assert!(spins > 0, "worker observed the raised flag first");
    assert!(
        elapsed >= Duration::from_millis(200),
        "watchdog fires no earlier than the deadline"
    );
    assert!(
        elapsed < Duration::from_millis(200 + 1000),
        "cancellation must be prompt, took {elapsed:?}"
    );
    assert!(!running.load(Ordering::Acquire));
}

#[test]
fn stop_requests_cooperative_cancellation() {
    let running = Arc::new(AtomicBool::new(false));
    let handler = ThreadHandler::new(Arc::clone(&running));

    running.store(true, Ordering::Release);
    handler.stop();
    assert!(!running.load(Ordering::Acquire));
}

#[test]
fn handler_is_reusable_after_a_run() {
    let running = Arc::new(AtomicBool::new(false));
    let handler = ThreadHandler::new(Arc::clone(&running));

    let first = handler.run_with_deadline(Duration::from_secs(5), || 1);
    let second = handler.run_with_deadline(Duration::from_secs(5), || 2);
    assert_eq!((first, second), (1, 2));
}
