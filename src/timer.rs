//! Wallclock timer
use std::time::Instant;

/// Measures total runtime and time between splits
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
    last_split: Instant,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Start timing now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_split: now,
        }
    }

    /// Seconds since the previous split (or start), restarts the split
    pub fn split(&mut self) -> f64 {
        let now = Instant::now();
        let diff = now.duration_since(self.last_split).as_secs_f64();
        self.last_split = now;
        diff
    }

    /// Seconds since start
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}
