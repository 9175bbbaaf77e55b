use std::time::Instant;

/// Milliseconds since the render loop started. Sampled once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ElapsedTime(u64);

impl ElapsedTime {
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }
}

/// Abstraction over where timestamps originate from.
pub trait Clock {
    /// Monotonic milliseconds since an arbitrary origin.
    fn now_millis(&mut self) -> u64;
}

/// Clock backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose origin is `Instant::now()`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_millis(&mut self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Clock that reports whatever time it was last set to.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: u64,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self { now }
    }

    pub fn set(&mut self, now: u64) {
        self.now = now;
    }

    pub fn advance(&mut self, millis: u64) {
        self.now = self.now.saturating_add(millis);
    }
}

impl Clock for ManualClock {
    fn now_millis(&mut self) -> u64 {
        self.now
    }
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now_millis(&mut self) -> u64 {
        (**self).now_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let mut clock = SystemClock::new();
        let first = clock.now_millis();
        let second = clock.now_millis();
        assert!(second >= first);
    }

    #[test]
    fn manual_clock_advances_saturating() {
        let mut clock = ManualClock::new(u64::MAX - 1);
        clock.advance(10);
        assert_eq!(clock.now_millis(), u64::MAX);
    }
}
