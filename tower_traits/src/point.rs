//! Measurement record shared between the assembler and the stores.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One field value as stored in the time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// A tagged point ready for the store: `{measurement, tags, fields}`.
///
/// `fields` may be empty when every token of a reading was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl MeasurementRecord {
    pub fn new(measurement: impl Into<String>, tags: BTreeMap<String, String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags,
            fields: BTreeMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_numbers_and_text_untagged() {
        let mut rec = MeasurementRecord::new("rhok", BTreeMap::new());
        rec.fields.insert("pH".into(), FieldValue::Float(6.5));
        rec.fields.insert("note".into(), FieldValue::Text("ok".into()));
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(
            json,
            r#"{"measurement":"rhok","tags":{},"fields":{"note":"ok","pH":6.5}}"#
        );
    }
}
