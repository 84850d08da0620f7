use instant::Duration;

/// Fixed-rate gate for outbound streams.
///
/// Elapsed frame time accumulates; every full interval releases one send.
/// The carried remainder is capped at one interval, so a long stall
/// yields at most one catch-up send instead of a burst.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    accumulated: Duration,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
        }
    }

    /// Throttle releasing `hz` sends per second
    pub fn from_hz(hz: u32) -> Self {
        Self::new(Duration::from_secs(1) / hz.max(1))
    }

    /// Account for `elapsed` and report whether a send is due
    pub fn ready(&mut self, elapsed: Duration) -> bool {
        self.accumulated += elapsed;

        if self.accumulated < self.interval {
            return false;
        }

        self.accumulated -= self.interval;
        if self.accumulated >= self.interval {
            self.accumulated = self.interval;
        }
        true
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }
}
