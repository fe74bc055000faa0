//! Periodic blink ticker.
//!
//! Toggles a shared blink-phase flag at a fixed interval and invokes a
//! redraw callback, but only while armed: the compositor arms the clock
//! after composing a frame that contained blinking cells or a blinking
//! cursor, so inert frames cost nothing.
//!
//! The worker thread parks on a condition variable so `stop()` wakes it
//! immediately instead of waiting out the interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug)]
struct ClockShared {
    phase: AtomicBool,
    armed: AtomicBool,
    stopped: Mutex<bool>,
    wake: Condvar,
}

/// Owned periodic ticker with an idempotent start/stop lifecycle.
#[derive(Debug)]
pub struct BlinkClock {
    interval: Duration,
    shared: Arc<ClockShared>,
    worker: Option<JoinHandle<()>>,
}

impl BlinkClock {
    pub fn new(interval: Duration) -> Self {
        BlinkClock {
            interval,
            shared: Arc::new(ClockShared {
                phase: AtomicBool::new(false),
                armed: AtomicBool::new(false),
                stopped: Mutex::new(false),
                wake: Condvar::new(),
            }),
            worker: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Current blink phase; `true` is the "on" half of the cycle.
    pub fn phase(&self) -> bool {
        self.shared.phase.load(Ordering::SeqCst)
    }

    /// Arm or disarm redraw signaling. Fed from
    /// [`FrameReport::blinking_content`](crate::FrameReport::blinking_content);
    /// disarmed ticks still toggle the phase but stay silent.
    pub fn set_armed(&self, armed: bool) {
        self.shared.armed.store(armed, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Start the ticker. Starting an already-running clock is a no-op.
    pub fn start<F>(&mut self, redraw: F)
    where
        F: Fn() + Send + 'static,
    {
        if self.worker.is_some() {
            return;
        }
        log::debug!("blink clock started, interval {:?}", self.interval);

        // A previous stop() leaves the flag set; reset so the worker runs.
        if let Ok(mut stopped) = self.shared.stopped.lock() {
            *stopped = false;
        }

        let shared = Arc::clone(&self.shared);
        let interval = self.interval;
        self.worker = Some(thread::spawn(move || loop {
            {
                let guard = match shared.stopped.lock() {
                    Ok(guard) => guard,
                    Err(_) => return,
                };
                let (guard, timeout) = match shared.wake.wait_timeout(guard, interval) {
                    Ok(result) => result,
                    Err(_) => return,
                };
                if *guard {
                    return;
                }
                if !timeout.timed_out() {
                    // Spurious wakeup without stop; wait again.
                    continue;
                }
            }
            shared.phase.fetch_xor(true, Ordering::SeqCst);
            if shared.armed.load(Ordering::SeqCst) {
                redraw();
            }
        }));
    }

    /// Stop the ticker and join the worker. Stopping an already-stopped
    /// clock is a no-op.
    pub fn stop(&mut self) {
        let worker = match self.worker.take() {
            Some(worker) => worker,
            None => return,
        };
        if let Ok(mut stopped) = self.shared.stopped.lock() {
            *stopped = true;
        }
        self.shared.wake.notify_all();
        if worker.join().is_err() {
            log::warn!("blink clock worker panicked");
        }
        log::debug!("blink clock stopped");
    }
}

impl Drop for BlinkClock {
    fn drop(&mut self) {
        self.stop();
    }
}
