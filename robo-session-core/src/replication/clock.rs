use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic millisecond clock
pub trait TimeSource: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Wall-independent clock anchored at construction
#[derive(Debug, Clone)]
pub struct SystemTimeSource {
    origin: instant::Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: instant::Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock for tests and simulations. Clones share one reading.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Arc<AtomicU64>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Clock that stands still while paused.
///
/// Readings exclude every paused span, so timers and interpolation resume
/// exactly where they stopped.
#[derive(Clone)]
pub struct PausableClock {
    source: Arc<dyn TimeSource>,
    paused_at: Option<u64>,
    paused_total: u64,
}

impl PausableClock {
    pub fn new(source: Arc<dyn TimeSource>) -> Self {
        Self {
            source,
            paused_at: None,
            paused_total: 0,
        }
    }

    /// Game time in milliseconds
    pub fn now_ms(&self) -> u64 {
        let raw = self.paused_at.unwrap_or_else(|| self.source.now_ms());
        raw.saturating_sub(self.paused_total)
    }

    /// Underlying reading, unaffected by pause
    pub fn raw_ms(&self) -> u64 {
        self.source.now_ms()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(self.source.now_ms());
        }
    }

    pub fn resume(&mut self) {
        if let Some(at) = self.paused_at.take() {
            self.paused_total += self.source.now_ms().saturating_sub(at);
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        if paused {
            self.pause();
        } else {
            self.resume();
        }
    }
}

impl fmt::Debug for PausableClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PausableClock")
            .field("now_ms", &self.now_ms())
            .field("paused", &self.is_paused())
            .field("paused_total", &self.paused_total)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_source_shared_between_clones() {
        let source = ManualTimeSource::new();
        let handle = source.clone();

        handle.advance(250);
        assert_eq!(source.now_ms(), 250);

        handle.set(1_000);
        assert_eq!(source.now_ms(), 1_000);
    }

    #[test]
    fn test_pause_freezes_reading() {
        let source = ManualTimeSource::new();
        let mut clock = PausableClock::new(Arc::new(source.clone()));

        source.advance(100);
        clock.pause();
        source.advance(5_000);

        assert!(clock.is_paused());
        assert_eq!(clock.now_ms(), 100);
        assert_eq!(clock.raw_ms(), 5_100);
    }

    #[test]
    fn test_resume_excludes_paused_span() {
        let source = ManualTimeSource::new();
        let mut clock = PausableClock::new(Arc::new(source.clone()));

        source.advance(100);
        clock.set_paused(true);
        source.advance(1_000);
        clock.set_paused(false);
        source.advance(50);

        assert_eq!(clock.now_ms(), 150);
    }

    #[test]
    fn test_double_pause_is_noop() {
        let source = ManualTimeSource::new();
        let mut clock = PausableClock::new(Arc::new(source.clone()));

        clock.pause();
        source.advance(100);
        clock.pause();
        source.advance(100);
        clock.resume();
        clock.resume();

        assert_eq!(clock.now_ms(), 0);
    }

    #[test]
    fn test_system_source_is_monotonic() {
        let source = SystemTimeSource::new();
        let a = source.now_ms();
        let b = source.now_ms();
        assert!(b >= a);
    }
}
