#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Device configuration for a tower telemetry bridge.
//!
//! - `Config` and its sections are deserialized from JSON and validated.
//! - Loading reports every absent top-level section at once, before any typed parsing.
//! - Saving re-checks the same rules and never leaves a half-written file behind.
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Default on-disk location, relative to the working directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// Port used when `arduino.serial_port` is absent.
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyACM1";

pub const KEY_MEASUREMENT: &str = "measurement";
pub const KEY_TAGS: &str = "tags";
pub const KEY_DB: &str = "db";
pub const KEY_ARDUINO: &str = "arduino";
pub const KEY_WATER_LEVEL: &str = "water_level";
pub const KEY_LIGHT_SENSOR: &str = "light_sensor";

/// Top-level sections that must all be present for a config to be usable.
pub const REQUIRED_KEYS: [&str; 6] = [
    KEY_MEASUREMENT,
    KEY_TAGS,
    KEY_DB,
    KEY_ARDUINO,
    KEY_WATER_LEVEL,
    KEY_LIGHT_SENSOR,
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("config is missing required keys: {}", .0.join(", "))]
    MissingKeys(Vec<&'static str>),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("unable to write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags {
    #[serde(rename = "towerName")]
    pub tower_name: String,
    #[serde(rename = "towerGroup")]
    pub tower_group: String,
}

impl Tags {
    pub const TOWER_NAME: &'static str = "towerName";
    pub const TOWER_GROUP: &'static str = "towerGroup";

    /// Tag set keyed by the stored tag names.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (Self::TOWER_NAME.to_string(), self.tower_name.clone()),
            (Self::TOWER_GROUP.to_string(), self.tower_group.clone()),
        ])
    }
}

/// Connection parameters for the time-series database.
///
/// The password is never stored here; it is supplied out of band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Db {
    pub host_name: String,
    pub host_port: u16,
    pub dbname: String,
    pub username: String,
    /// Talk HTTPS with certificate verification (default: true)
    #[serde(default = "default_ssl")]
    pub ssl: bool,
}

fn default_ssl() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arduino {
    pub baud_rate: u32,
    #[serde(default = "default_serial_port")]
    pub serial_port: String,
}

fn default_serial_port() -> String {
    DEFAULT_SERIAL_PORT.to_string()
}

/// Water-level calibration, all in the sensor's distance unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterLevelCfg {
    /// Distance from the sensor to the tank floor
    pub sensor_height: f64,
    pub max_water_level: f64,
    pub min_water_level: f64,
}

/// Expected light schedule; the "on" window runs from start-on to start-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightSensorCfg {
    pub expected_start_on_hour: u8,
    pub expected_start_on_min: u8,
    pub expected_start_off_hour: u8,
    pub expected_start_off_min: u8,
}

impl LightSensorCfg {
    /// `(hour, minute)` at which the lights are expected to switch on.
    pub fn expected_on(&self) -> (u8, u8) {
        (self.expected_start_on_hour, self.expected_start_on_min)
    }

    /// `(hour, minute)` at which the lights are expected to switch off.
    pub fn expected_off(&self) -> (u8, u8) {
        (self.expected_start_off_hour, self.expected_start_off_min)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>, // path to .log (JSON lines)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<String>,
}

impl Logging {
    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.level.is_none() && self.rotation.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub measurement: String,
    pub tags: Tags,
    pub db: Db,
    pub arduino: Arduino,
    pub water_level: WaterLevelCfg,
    pub light_sensor: LightSensorCfg,
    /// Optional override of the positional field order emitted by the device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Logging::is_empty")]
    pub logging: Logging,
}

/// Names of the required top-level keys absent from `value`, in schema order.
///
/// A non-object root is missing every key.
pub fn missing_keys(value: &Value) -> Vec<&'static str> {
    match value.as_object() {
        Some(map) => REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|k| !map.contains_key(*k))
            .collect(),
        None => REQUIRED_KEYS.to_vec(),
    }
}

/// Parse, check required keys, deserialize and validate a config document.
pub fn from_json_str(s: &str) -> Result<Config, ConfigError> {
    let value: Value = serde_json::from_str(s).map_err(ConfigError::Malformed)?;
    from_value(value)
}

/// Same as [`from_json_str`] for an already-parsed document.
pub fn from_value(value: Value) -> Result<Config, ConfigError> {
    let missing = missing_keys(&value);
    if !missing.is_empty() {
        for key in &missing {
            tracing::error!(key = *key, "missing config key");
        }
        return Err(ConfigError::MissingKeys(missing));
    }
    if value
        .get(KEY_DB)
        .and_then(|db| db.get("password"))
        .is_some()
    {
        tracing::warn!("ignoring db.password in config file; supply it via the environment");
    }
    let cfg: Config =
        serde_json::from_value(value).map_err(|e| ConfigError::Invalid(e.to_string()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Read and validate the config file at `path`.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg = from_json_str(&text)?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(cfg)
}

/// Persist a raw document after the same checks `load` applies.
///
/// The document is written to a sibling temp file and renamed into place, so a
/// rejected or failed write leaves the existing file untouched.
pub fn write_value(path: &Path, value: &Value) -> Result<(), ConfigError> {
    // Round-trip through the typed model so unknown keys and passwords are dropped.
    let cfg = from_value(value.clone())?;
    let text = cfg.to_json_pretty()?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| CONFIG_FILENAME.to_string());
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));
    let write_err = |source: std::io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    fs::write(&tmp, text.as_bytes()).map_err(write_err)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(e));
    }
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

impl Config {
    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn water_level(&self) -> &WaterLevelCfg {
        &self.water_level
    }

    pub fn light_schedule(&self) -> &LightSensorCfg {
        &self.light_sensor
    }

    pub fn baud_rate(&self) -> u32 {
        self.arduino.baud_rate
    }

    pub fn serial_port(&self) -> &str {
        &self.arduino.serial_port
    }

    /// Pretty-printed JSON in schema key order.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Validate and atomically write this config to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let value = serde_json::to_value(self).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        write_value(path, &value)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(msg: impl Into<String>) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid(msg.into()))
        }

        if self.measurement.trim().is_empty() {
            return invalid("measurement must not be empty");
        }

        // Tags
        if self.tags.tower_name.trim().is_empty() {
            return invalid("tags.towerName must not be empty");
        }
        if self.tags.tower_group.trim().is_empty() {
            return invalid("tags.towerGroup must not be empty");
        }

        // Database
        if self.db.host_name.trim().is_empty() {
            return invalid("db.host_name must not be empty");
        }
        if self.db.host_port == 0 {
            return invalid("db.host_port must be in [1, 65535]");
        }
        if self.db.dbname.trim().is_empty() {
            return invalid("db.dbname must not be empty");
        }

        // Device
        if self.arduino.baud_rate == 0 {
            return invalid("arduino.baud_rate must be > 0");
        }
        if self.arduino.serial_port.trim().is_empty() {
            return invalid("arduino.serial_port must not be empty");
        }

        // Water level
        let wl = &self.water_level;
        if !(wl.sensor_height.is_finite()
            && wl.max_water_level.is_finite()
            && wl.min_water_level.is_finite())
        {
            return invalid("water_level values must be finite numbers");
        }
        if wl.max_water_level <= wl.min_water_level {
            return invalid("water_level.max_water_level must be > water_level.min_water_level");
        }

        // Light schedule
        let ls = &self.light_sensor;
        for (name, hour) in [
            ("expected_start_on_hour", ls.expected_start_on_hour),
            ("expected_start_off_hour", ls.expected_start_off_hour),
        ] {
            if hour > 23 {
                return invalid(format!("light_sensor.{name} must be in [0, 23]"));
            }
        }
        for (name, minute) in [
            ("expected_start_on_min", ls.expected_start_on_min),
            ("expected_start_off_min", ls.expected_start_off_min),
        ] {
            if minute > 59 {
                return invalid(format!("light_sensor.{name} must be in [0, 59]"));
            }
        }

        // Field order override
        if let Some(fields) = &self.fields {
            if fields.is_empty() {
                return invalid("fields must list at least one field when present");
            }
            let mut seen = HashSet::new();
            for f in fields {
                if f.trim().is_empty() {
                    return invalid("fields must not contain empty names");
                }
                if !seen.insert(f.as_str()) {
                    return invalid(format!("fields contains duplicate name '{f}'"));
                }
            }
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "hourly" | "daily")
        {
            return invalid("logging.rotation must be one of never|hourly|daily");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "measurement": "rhok",
        "tags": { "towerName": "tower-1", "towerGroup": "north" },
        "db": { "host_name": "db.example.org", "host_port": 8086, "dbname": "towers", "username": "bridge" },
        "arduino": { "baud_rate": 9600 },
        "water_level": { "sensor_height": 60.0, "max_water_level": 40.0, "min_water_level": 10.0 },
        "light_sensor": {
            "expected_start_on_hour": 8, "expected_start_on_min": 0,
            "expected_start_off_hour": 20, "expected_start_off_min": 0
        }
    }"#;

    #[test]
    fn defaults_fill_optional_sections() {
        let cfg = from_json_str(SAMPLE).unwrap();
        assert!(cfg.db.ssl);
        assert_eq!(cfg.serial_port(), DEFAULT_SERIAL_PORT);
        assert!(cfg.fields.is_none());
        assert!(cfg.logging.is_empty());
    }

    #[test]
    fn non_object_root_misses_everything() {
        assert_eq!(missing_keys(&Value::Array(vec![])), REQUIRED_KEYS.to_vec());
    }

    #[test]
    fn tags_map_uses_stored_names() {
        let cfg = from_json_str(SAMPLE).unwrap();
        let tags = cfg.tags().to_map();
        assert_eq!(tags.get("towerName").map(String::as_str), Some("tower-1"));
        assert_eq!(tags.get("towerGroup").map(String::as_str), Some("north"));
    }

    #[test]
    fn password_in_file_is_ignored() {
        let mut v: Value = serde_json::from_str(SAMPLE).unwrap();
        v["db"]["password"] = Value::String("hunter2".into());
        let cfg = from_value(v).unwrap();
        assert!(!cfg.to_json_pretty().unwrap().contains("hunter2"));
    }
}
