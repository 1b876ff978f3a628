use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveTime, Timelike};

/// Wall-clock abstraction used for schedule-aware decisions.
///
/// Only the local time of day matters to callers; dates are never consulted.
pub trait WallClock {
    fn time_of_day(&self) -> NaiveTime;

    /// Minutes since local midnight, handy for logging.
    fn minute_of_day(&self) -> u32 {
        let t = self.time_of_day();
        t.hour() * 60 + t.minute()
    }
}

/// Real clock backed by the host's local timezone.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl LocalClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl WallClock for LocalClock {
    #[inline]
    fn time_of_day(&self) -> NaiveTime {
        chrono::Local::now().time()
    }
}

/// Clock frozen at a single time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveTime);

impl FixedClock {
    /// Returns `None` when `hour`/`minute` are out of range.
    pub fn at(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }
}

impl WallClock for FixedClock {
    #[inline]
    fn time_of_day(&self) -> NaiveTime {
        self.0
    }
}

/// Deterministic clock whose time of day can be moved manually.
///
/// Clones share the same underlying time, so a test can keep a handle while the
/// code under test owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<NaiveTime>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(NaiveTime::MIN)
    }
}

impl ManualClock {
    pub fn new(start: NaiveTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Advance the clock, wrapping past midnight.
    pub fn advance(&self, d: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now = now.overflowing_add_signed(d).0;
        }
    }

    pub fn set(&self, t: NaiveTime) {
        if let Ok(mut now) = self.now.lock() {
            *now = t;
        }
    }
}

impl WallClock for ManualClock {
    fn time_of_day(&self) -> NaiveTime {
        self.now.lock().map(|g| *g).unwrap_or(NaiveTime::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_rejects_bad_hour() {
        assert!(FixedClock::at(24, 0).is_none());
        assert!(FixedClock::at(23, 59).is_some());
    }

    #[test]
    fn manual_clock_wraps_midnight() {
        let clock = ManualClock::new(NaiveTime::from_hms_opt(23, 30, 0).unwrap());
        let handle = clock.clone();
        handle.advance(Duration::minutes(45));
        assert_eq!(
            clock.time_of_day(),
            NaiveTime::from_hms_opt(0, 15, 0).unwrap()
        );
        assert_eq!(clock.minute_of_day(), 15);
    }
}
