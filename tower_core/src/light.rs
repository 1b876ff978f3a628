//! Light-status inference from a binary sensor and the expected schedule.

use chrono::NaiveTime;

use crate::schema::{LIGHT_OFF, LIGHT_ON};

/// Observed light state relative to the expected schedule.
///
/// The ordinal values are stored in the time series and read by dashboards;
/// they must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LightStatus {
    On = 1,
    Off = 2,
    /// Light is off, but it should be on.
    OnExpected = 3,
    /// Light is on, but it should be off.
    OffExpected = 4,
}

impl LightStatus {
    #[inline]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Stored representation: the ordinal as a float (1.0..=4.0).
    #[inline]
    pub fn to_field_value(self) -> f64 {
        f64::from(self.ordinal())
    }
}

/// True when `t` lies in the closed interval `[start, end]`, which may wrap midnight.
#[inline]
pub fn time_in_range(start: NaiveTime, end: NaiveTime, t: NaiveTime) -> bool {
    if start <= end {
        start <= t && t <= end
    } else {
        start <= t || t <= end
    }
}

/// Expected "lights on" window, from the configured switch-on to switch-off time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightSchedule {
    pub on: NaiveTime,
    pub off: NaiveTime,
}

impl LightSchedule {
    pub fn new(on: NaiveTime, off: NaiveTime) -> Self {
        Self { on, off }
    }

    /// Returns `None` when any hour/minute is out of range.
    pub fn from_hm(on: (u8, u8), off: (u8, u8)) -> Option<Self> {
        let on = NaiveTime::from_hms_opt(u32::from(on.0), u32::from(on.1), 0)?;
        let off = NaiveTime::from_hms_opt(u32::from(off.0), u32::from(off.1), 0)?;
        Some(Self { on, off })
    }

    pub fn expects_on(&self, now: NaiveTime) -> bool {
        time_in_range(self.on, self.off, now)
    }

    /// Inside the window the reading is reported as observed; outside it, a lit
    /// sensor is `OffExpected` and a dark one `OnExpected`.
    pub fn classify(&self, light_on: bool, now: NaiveTime) -> LightStatus {
        match (self.expects_on(now), light_on) {
            (true, true) => LightStatus::On,
            (true, false) => LightStatus::Off,
            (false, true) => LightStatus::OffExpected,
            (false, false) => LightStatus::OnExpected,
        }
    }

    /// Classify a raw sensor integer; anything but 0 or 1 is rejected.
    pub fn classify_raw(&self, raw: i64, now: NaiveTime) -> Option<LightStatus> {
        match raw {
            LIGHT_ON => Some(self.classify(true, now)),
            LIGHT_OFF => Some(self.classify(false, now)),
            _ => None,
        }
    }
}
