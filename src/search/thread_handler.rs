//! Worker/watchdog thread pair for deadline-bounded searches.
//!
//! The worker runs the search; the watchdog sleeps on a condition variable up
//! to the deadline and clears the shared running flag on timeout. A finishing
//! worker notifies the condvar so the watchdog wakes early. Both threads are
//! joined before `run_with_deadline` returns, so the caller observes a fully
//! quiesced engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

/// The search recursion carries a fixed-capacity move buffer per frame, so the
/// worker gets a roomier stack than the platform default.
const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

pub struct ThreadHandler {
    running_flag: Arc<AtomicBool>,
}

impl ThreadHandler {
    pub fn new(running_flag: Arc<AtomicBool>) -> Self {
        ThreadHandler { running_flag }
    }

    /// Request cooperative cancellation of the active worker, if any.
    pub fn stop(&self) {
        self.running_flag.store(false, Ordering::Release);
    }

    /// Run `worker` on its own thread with the watchdog armed. Returns the
    /// worker's result after both threads have joined. The running flag is
    /// raised before the worker starts and is false afterwards.
    pub fn run_with_deadline<T, F>(&self, deadline: Duration, worker: F) -> T
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        self.running_flag.store(true, Ordering::Release);
        let finished = Arc::new((Mutex::new(false), Condvar::new()));

        let result = thread::scope(|scope| {
            let watchdog = {
                let finished = Arc::clone(&finished);
                let running_flag = Arc::clone(&self.running_flag);
                scope.spawn(move || {
                    let (lock, condvar) = &*finished;
                    let guard = lock.lock().expect("watchdog mutex poisoned");
                    let (guard, wait) = condvar
                        .wait_timeout_while(guard, deadline, |done| !*done)
                        .expect("watchdog mutex poisoned");
                    if wait.timed_out() && !*guard {
                        running_flag.store(false, Ordering::Release);
                    }
                })
            };

            let worker_finished = Arc::clone(&finished);
            let worker_thread = thread::Builder::new()
                .name("tempo-search".to_string())
                .stack_size(WORKER_STACK_SIZE)
                .spawn_scoped(scope, move || {
                    let output = worker();
                    let (lock, condvar) = &*worker_finished;
                    *lock.lock().expect("watchdog mutex poisoned") = true;
                    condvar.notify_one();
                    output
                })
                .expect("failed to spawn search worker");

            let output = worker_thread.join().expect("search worker panicked");
            watchdog.join().expect("watchdog panicked");
            output
        });

        self.running_flag.store(false, Ordering::Release);
        result
    }
}
