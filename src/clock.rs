//! Frame-rate limiter for the driving loop

use std::time::{Duration, Instant};

pub const DEFAULT_FPS: u32 = 20;
pub const MAX_FPS: u32 = 240;

/// Paces a loop to a fixed number of ticks per second.
///
/// [`FrameClock::tick`] sleeps until the next tick boundary. A tick that
/// overran its budget starts the next one immediately instead of trying
/// to catch up.
#[derive(Debug, Clone)]
pub struct FrameClock {
    period: Duration,
    next: Option<Instant>,
    ticks: u64,
    paced: bool,
}

impl FrameClock {
    /// `fps` is clamped into `[1, 240]`.
    pub fn new(fps: u32) -> Self {
        let fps = fps.clamp(1, MAX_FPS);
        Self {
            period: Duration::from_secs(1) / fps,
            next: None,
            ticks: 0,
            paced: true,
        }
    }

    /// A clock whose ticks never sleep. Used headless.
    pub fn unpaced() -> Self {
        Self {
            paced: false,
            ..Self::new(DEFAULT_FPS)
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Block until the next tick boundary.
    pub fn tick(&mut self) {
        self.ticks += 1;
        if !self.paced {
            return;
        }

        let now = Instant::now();
        let target = self.next.unwrap_or(now);
        if target > now {
            std::thread::sleep(target - now);
            self.next = Some(target + self.period);
        } else {
            self.next = Some(now + self.period);
        }
    }

    /// Time left until the next tick boundary, for event polling timeouts.
    pub fn remaining(&self) -> Duration {
        match self.next {
            Some(next) if self.paced => next.saturating_duration_since(Instant::now()),
            _ => Duration::ZERO,
        }
    }

    /// Sleep for `duration`, or not at all when unpaced.
    pub fn wait(&self, duration: Duration) {
        if self.paced && !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_from_fps() {
        assert_eq!(FrameClock::new(20).period(), Duration::from_millis(50));
        assert_eq!(FrameClock::new(0).period(), Duration::from_secs(1));
        assert_eq!(FrameClock::new(10_000).period(), Duration::from_secs(1) / MAX_FPS);
    }

    #[test]
    fn test_unpaced_never_sleeps() {
        let mut clock = FrameClock::unpaced();
        let start = Instant::now();
        for _ in 0..1000 {
            clock.tick();
        }
        assert_eq!(clock.ticks(), 1000);
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(clock.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_paced_ticks_take_at_least_one_period() {
        let mut clock = FrameClock::new(100);
        let start = Instant::now();
        clock.tick();
        clock.tick();
        clock.tick();
        // First tick starts the schedule, the next two each wait a period
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
