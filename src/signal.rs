//! One-shot completion signal
//!
//! This module provides the broadcast primitive which deferred results use to
//! tell their readers that a final outcome is available. It can only go from
//! "not fired" to "fired", exactly once, and any number of threads may block
//! until that happens.

use parking_lot::{Condvar, Mutex};


/// One-shot broadcast signal
pub struct CompletionSignal {
    /// Whether the signal has been fired (mutex-protected)
    fired_lock: Mutex<bool>,

    /// Condition variable used to wake up waiters when the signal fires
    fired_cv: Condvar,
}
//
impl CompletionSignal {
    /// Create a signal which has not fired yet
    pub fn new() -> Self {
        CompletionSignal {
            fired_lock: Mutex::new(false),
            fired_cv: Condvar::new(),
        }
    }

    /// Fire the signal, waking up every waiter
    ///
    /// Returns false if the signal had already fired, in which case nothing
    /// happens.
    ///
    pub fn fire(&self) -> bool {
        let mut fired = self.fired_lock.lock();
        if *fired {
            return false;
        }
        *fired = true;
        self.fired_cv.notify_all();
        true
    }

    /// Check whether the signal has fired, without blocking
    pub fn is_fired(&self) -> bool {
        *self.fired_lock.lock()
    }

    /// Block the calling thread until the signal fires
    pub fn wait(&self) {
        let mut fired = self.fired_lock.lock();
        while !*fired {
            self.fired_cv.wait(&mut fired);
        }
    }
}
//
impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}


/// Unit tests
#[cfg(test)]
mod tests {
    use crate::signal::*;
    use std::sync::{Arc, Condvar, Mutex};
    use std::thread;
    use std::time::Duration;

    /// Check the initial state of the signal
    #[test]
    fn initial_state() {
        let signal = CompletionSignal::new();
        assert!(!signal.is_fired());
    }

    /// Check that the signal can only fire once
    #[test]
    fn fire_once() {
        let signal = CompletionSignal::new();
        assert!(signal.fire());
        assert!(signal.is_fired());
        assert!(!signal.fire());
        assert!(signal.is_fired());

        // Waiting on a fired signal should return immediately
        signal.wait();
    }

    /// Check that waiting blocks until the signal fires
    #[test]
    fn wait() {
        let signal = Arc::new(CompletionSignal::new());
        let worker_signal = signal.clone();

        // Since this test involves blocking, we'll need another worker thread.
        // Setup some shared state so that we can synchronize with it.
        let shared_state = Arc::new((Mutex::new(0), Condvar::new()));
        let worker_shared = shared_state.clone();

        // Create the worker thread, which will do all the waiting
        let worker = thread::spawn(move || {
            // Tell the test code that we are alive
            *worker_shared.0.lock().unwrap() = 1;
            worker_shared.1.notify_all();

            // This wait should block until the signal fires
            worker_signal.wait();

            // Tell the test code when we are done
            *worker_shared.0.lock().unwrap() = 2;
            worker_shared.1.notify_all();
        });

        // Wait for the worker to be alive
        let mut shared_lock = shared_state.0.lock().unwrap();
        while *shared_lock == 0 {
            shared_lock = shared_state.1.wait(shared_lock).unwrap();
        }

        // Make sure that the worker does wait for the signal
        let wait_result = shared_state.1.wait_timeout(
            shared_lock,
            Duration::from_millis(100)
        );
        let (shared_lock, timeout_result) = wait_result.unwrap();
        assert!(timeout_result.timed_out());
        assert_eq!(*shared_lock, 1);

        // Fire the signal, the worker should move forward after that
        assert!(signal.fire());
        let wait_result = shared_state.1.wait_timeout_while(
            shared_lock,
            Duration::from_secs(5),
            |state| *state != 2
        );
        let (shared_lock, timeout_result) = wait_result.unwrap();
        assert!(!timeout_result.timed_out());
        assert_eq!(*shared_lock, 2);
        drop(shared_lock);

        worker.join().unwrap();
    }

    /// Check that every waiter gets woken up
    #[test]
    fn broadcast() {
        let signal = Arc::new(CompletionSignal::new());
        let waiters = (0..4).map(|_| {
            let signal = signal.clone();
            thread::spawn(move || signal.wait())
        }).collect::<Vec<_>>();
        signal.fire();
        for waiter in waiters {
            waiter.join().unwrap();
        }
    }
}
