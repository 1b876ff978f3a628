//! Per-field token converters, built once from a config snapshot.
//!
//! Converters capture their calibration at construction time. Editing the
//! config afterwards has no effect until the registry is rebuilt.

use tower_config::Config;
use tower_traits::{FieldValue, WallClock};

use crate::error::{BridgeError, ConvertError};
use crate::light::LightSchedule;
use crate::schema::{FIELD_ORDER, F_AIR_HUMIDITY, F_AIR_TEMP, F_PH, F_WATER_LEVEL, F_WATER_TEMP};

/// Parse a token as a finite float. Surrounding whitespace is ignored.
pub fn parse_float(token: &str) -> Result<f64, ConvertError> {
    let t = token.trim();
    let v: f64 = t
        .parse()
        .map_err(|_| ConvertError::NotNumeric(t.to_string()))?;
    if !v.is_finite() {
        return Err(ConvertError::NonFinite(t.to_string()));
    }
    Ok(v)
}

/// Parse a token as a base-10 integer. Surrounding whitespace is ignored.
pub fn parse_int(token: &str) -> Result<i64, ConvertError> {
    let t = token.trim();
    t.parse()
        .map_err(|_| ConvertError::NotInteger(t.to_string()))
}

/// Water-level calibration captured by value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterLevel {
    pub sensor_height: f64,
    pub max_level: f64,
    pub min_level: f64,
}

impl WaterLevel {
    /// Percentage of full scale for a raw distance reading:
    /// `((sensor_height - raw - min) / (max - min)) * 100`.
    pub fn percent(&self, raw: f64) -> Result<f64, ConvertError> {
        let span = self.max_level - self.min_level;
        if span == 0.0 {
            return Err(ConvertError::DegenerateCalibration);
        }
        let pct = (self.sensor_height - raw - self.min_level) / span * 100.0;
        if !pct.is_finite() {
            return Err(ConvertError::NonFinite(pct.to_string()));
        }
        Ok(pct)
    }
}

/// How one positional token becomes a stored field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Converter {
    /// Store the token as text, unmodified. Used for names the schema doesn't know.
    Passthrough,
    /// Plain floating-point measurement.
    Float,
    /// Distance-to-surface reading converted to percent full.
    WaterLevel(WaterLevel),
    /// Binary light sensor classified against the expected schedule.
    LightStatus(LightSchedule),
}

impl Converter {
    /// Converter used for `name` under the given calibration.
    pub fn for_field(name: &str, water: WaterLevel, schedule: LightSchedule) -> Self {
        match name {
            F_WATER_LEVEL => Converter::WaterLevel(water),
            F_AIR_HUMIDITY | F_AIR_TEMP | F_WATER_TEMP | F_PH => Converter::Float,
            n if crate::schema::is_light_field(n) => Converter::LightStatus(schedule),
            _ => Converter::Passthrough,
        }
    }

    pub fn convert(&self, token: &str, clock: &dyn WallClock) -> Result<FieldValue, ConvertError> {
        match self {
            Converter::Passthrough => Ok(FieldValue::Text(token.to_string())),
            Converter::Float => parse_float(token).map(FieldValue::from),
            Converter::WaterLevel(wl) => {
                let raw = parse_float(token)?;
                wl.percent(raw).map(FieldValue::from)
            }
            Converter::LightStatus(schedule) => {
                let raw = parse_int(token)?;
                let status = schedule
                    .classify_raw(raw, clock.time_of_day())
                    .ok_or(ConvertError::SensorOutOfRange(raw))?;
                Ok(FieldValue::from(status.to_field_value()))
            }
        }
    }
}

/// Ordered field names with their converters. Order is the device's emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRegistry {
    fields: Vec<(String, Converter)>,
}

impl FieldRegistry {
    /// Registry for `names` (in order) under the given calibration.
    pub fn with_names<I, S>(names: I, water: WaterLevel, schedule: LightSchedule) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = names
            .into_iter()
            .map(|n| {
                let name: String = n.into();
                let conv = Converter::for_field(&name, water, schedule);
                (name, conv)
            })
            .collect();
        Self { fields }
    }

    /// Registry in schema v1 order.
    pub fn standard(water: WaterLevel, schedule: LightSchedule) -> Self {
        Self::with_names(FIELD_ORDER, water, schedule)
    }

    /// Build from a validated config, honouring its optional field-order override.
    pub fn from_config(cfg: &Config) -> Result<Self, BridgeError> {
        let water = WaterLevel::from(cfg.water_level());
        let schedule = LightSchedule::try_from(cfg.light_schedule())?;
        let registry = match cfg.fields.as_deref() {
            Some(names) => Self::with_names(names.iter().cloned(), water, schedule),
            None => Self::standard(water, schedule),
        };
        tracing::debug!(fields = ?registry.names().collect::<Vec<_>>(), "field registry built");
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Converter)> {
        self.fields.iter().map(|(n, c)| (n.as_str(), c))
    }

    pub fn get(&self, name: &str) -> Option<&Converter> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }
}
