//! Clock and pacing utilities.
//!
//! The live pass anchors its informational timing to a monotonic epoch
//! taken when recording starts, and paces preview iterations with a
//! [`RateController`].

use std::time::{Duration, Instant};

/// A session clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment recording started).
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant recording started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get seconds elapsed since the epoch.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at the epoch.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// The underlying epoch instant.
    pub fn epoch(&self) -> Instant {
        self.epoch
    }
}

/// Fixed-rate ticker for the preview loop.
#[derive(Debug)]
pub struct RateController {
    target_interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl RateController {
    /// Create a controller targeting the given Hz rate.
    pub fn new(target_hz: u32) -> Self {
        Self {
            target_interval_ns: 1_000_000_000 / target_hz.max(1) as u64,
            last_tick_ns: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns >= last + self.target_interval_ns => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }

    /// Time left until the next tick is due.
    pub fn remaining(&self, current_ns: u64) -> Duration {
        match self.last_tick_ns {
            None => Duration::ZERO,
            Some(last) => {
                let due = last + self.target_interval_ns;
                Duration::from_nanos(due.saturating_sub(current_ns))
            }
        }
    }

    /// Target interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.target_interval_ns
    }
}

/// Format seconds as `m:ss`.
pub fn format_minutes(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = SessionClock::start();
        assert!(clock.elapsed_secs() < 1.0);
        assert!(!clock.epoch_wall().is_empty());
    }

    #[test]
    fn test_rate_controller() {
        let mut ctrl = RateController::new(33);
        assert!(ctrl.should_tick(0));
        assert!(!ctrl.should_tick(10_000_000));
        assert!(ctrl.should_tick(31_000_000));
    }

    #[test]
    fn test_rate_controller_remaining() {
        let mut ctrl = RateController::new(10);
        assert_eq!(ctrl.remaining(0), Duration::ZERO);
        ctrl.should_tick(0);
        assert_eq!(ctrl.remaining(40_000_000), Duration::from_millis(60));
        assert_eq!(ctrl.remaining(500_000_000), Duration::ZERO);
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0.0), "0:00");
        assert_eq!(format_minutes(75.9), "1:15");
        assert_eq!(format_minutes(-3.0), "0:00");
    }
}
