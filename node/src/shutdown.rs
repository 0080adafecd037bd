//! Graceful shutdown coordination across the five worker threads.
//!
//! Each loop checks [`ShutdownController::is_stopped`] on every iteration
//! and drains its queue before exiting. `stop()` sets the flag and notifies
//! every waiting condition variable so blocked threads wake up immediately
//! rather than waiting out their next poll interval.

use std::sync::{Arc, Condvar, Mutex};

/// Shared stop flag plus a condvar so threads parked on an empty inbox
/// wake up as soon as shutdown is requested, instead of only on the next
/// item or timeout.
#[derive(Clone)]
pub struct ShutdownController {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self {
            inner: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.inner.0.lock().unwrap()
    }

    /// Request shutdown and wake every thread parked on [`Self::wait_timeout`].
    pub fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock.lock().unwrap();
        *stopped = true;
        cvar.notify_all();
    }

    /// Park for up to `timeout`, or until [`Self::stop`] is called.
    /// Returns immediately if already stopped.
    pub fn wait_timeout(&self, timeout: std::time::Duration) {
        let (lock, cvar) = &*self.inner;
        let stopped = lock.lock().unwrap();
        if *stopped {
            return;
        }
        let _ = cvar.wait_timeout(stopped, timeout).unwrap();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn stop_wakes_a_parked_waiter() {
        let controller = ShutdownController::new();
        let waiter = controller.clone();
        let handle = std::thread::spawn(move || {
            waiter.wait_timeout(Duration::from_secs(30));
            waiter.is_stopped()
        });
        std::thread::sleep(Duration::from_millis(20));
        controller.stop();
        assert!(handle.join().unwrap());
    }

    #[test]
    fn already_stopped_returns_immediately() {
        let controller = ShutdownController::new();
        controller.stop();
        let start = std::time::Instant::now();
        controller.wait_timeout(Duration::from_secs(30));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
