//! Session timer with pause/resume and time penalties.
//!
//! The timer keeps a start reference, an end reference frozen by [`Timer::stop`],
//! and a penalty that behaves like moving the start reference backwards.
//! [`Timer::elapsed`] measures against "now" while the timer is running, so it is
//! always safe to read.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct Timer {
    start: Option<Instant>,
    end: Option<Instant>,
    penalty: Duration,
    running: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart the clock from now, discarding earlier elapsed time and penalties.
    pub fn start(&mut self) {
        self.start = Some(Instant::now());
        self.end = None;
        self.penalty = Duration::ZERO;
        self.running = true;
    }

    /// Resume counting from the existing start reference.
    ///
    /// Wall-clock time spent stopped is not subtracted. A timer that was never
    /// started behaves like [`Timer::start`].
    pub fn un_pause(&mut self) {
        if self.start.is_none() {
            self.start();
            return;
        }
        self.end = None;
        self.running = true;
    }

    /// Freeze the end reference.
    pub fn stop(&mut self) {
        if self.running {
            self.end = Some(Instant::now());
            self.running = false;
        }
    }

    /// Inflate elapsed time by `ms` milliseconds.
    pub fn add_penalty(&mut self, ms: u64) {
        self.penalty += Duration::from_millis(ms);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_started(&self) -> bool {
        self.start.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        let Some(start) = self.start else {
            return self.penalty;
        };
        let end = if self.running {
            Instant::now()
        } else {
            self.end.unwrap_or(start)
        };
        end.saturating_duration_since(start) + self.penalty
    }

    /// Elapsed time in whole milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
    }
}
