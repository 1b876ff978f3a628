//! `From` implementations bridging `tower_config` types to `tower_core` types.

use crate::convert::WaterLevel;
use crate::error::BridgeError;
use crate::light::LightSchedule;

// ── WaterLevel ───────────────────────────────────────────────────────────────

impl From<&tower_config::WaterLevelCfg> for WaterLevel {
    fn from(c: &tower_config::WaterLevelCfg) -> Self {
        Self {
            sensor_height: c.sensor_height,
            max_level: c.max_water_level,
            min_level: c.min_water_level,
        }
    }
}

// ── LightSchedule ────────────────────────────────────────────────────────────

impl TryFrom<&tower_config::LightSensorCfg> for LightSchedule {
    type Error = BridgeError;

    fn try_from(c: &tower_config::LightSensorCfg) -> Result<Self, Self::Error> {
        LightSchedule::from_hm(c.expected_on(), c.expected_off()).ok_or_else(|| {
            BridgeError::ConfigInvalid(format!(
                "light_sensor schedule {:02}:{:02}-{:02}:{:02} is not a valid time range",
                c.expected_start_on_hour,
                c.expected_start_on_min,
                c.expected_start_off_hour,
                c.expected_start_off_min
            ))
        })
    }
}

// ── ConfigError ──────────────────────────────────────────────────────────────

impl From<tower_config::ConfigError> for BridgeError {
    fn from(e: tower_config::ConfigError) -> Self {
        match e {
            tower_config::ConfigError::MissingKeys(keys) => {
                BridgeError::ConfigMissing(keys.into_iter().map(str::to_string).collect())
            }
            other => BridgeError::ConfigInvalid(other.to_string()),
        }
    }
}
