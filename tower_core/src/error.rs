use thiserror::Error;

/// Why a single token could not be turned into a field value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("'{0}' is not a number")]
    NotNumeric(String),
    #[error("'{0}' is not an integer")]
    NotInteger(String),
    #[error("'{0}' is not a finite number")]
    NonFinite(String),
    #[error("water level calibration is degenerate (max_water_level == min_water_level)")]
    DegenerateCalibration,
    #[error("light sensor value {0} is neither 0 nor 1")]
    SensorOutOfRange(i64),
}

/// Bridge failures, split into startup-fatal, session-fatal and per-reading conditions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BridgeError {
    #[error("configuration is missing required keys: {}", .0.join(", "))]
    ConfigMissing(Vec<String>),
    #[error("configuration invalid: {0}")]
    ConfigInvalid(String),
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("database unavailable: {0}")]
    DatabaseUnavailable(String),
    #[error("sensor data length mismatch: received {received} values, expected {expected}")]
    ShapeMismatch { expected: usize, received: usize },
    #[error("field {field} rejected token '{token}': {source}")]
    FieldParse {
        field: String,
        token: String,
        #[source]
        source: ConvertError,
    },
    #[error("write failed: {0}")]
    WriteFailure(String),
    #[error("device disconnected: {0}")]
    DeviceDisconnected(String),
}

impl BridgeError {
    /// Fatal errors end startup or the session; the rest only cost one reading or field.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            BridgeError::ShapeMismatch { .. }
                | BridgeError::FieldParse { .. }
                | BridgeError::WriteFailure(_)
        )
    }
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_reading_conditions_are_recoverable() {
        assert!(
            !BridgeError::ShapeMismatch {
                expected: 9,
                received: 8
            }
            .is_fatal()
        );
        assert!(!BridgeError::WriteFailure("503".into()).is_fatal());
        assert!(
            !BridgeError::FieldParse {
                field: "pH".into(),
                token: "abc".into(),
                source: ConvertError::NotNumeric("abc".into()),
            }
            .is_fatal()
        );
    }

    #[test]
    fn startup_and_session_conditions_are_fatal() {
        assert!(BridgeError::ConfigMissing(vec!["db".into()]).is_fatal());
        assert!(BridgeError::DeviceUnavailable("/dev/ttyACM1".into()).is_fatal());
        assert!(BridgeError::DatabaseUnavailable("refused".into()).is_fatal());
        assert!(BridgeError::DeviceDisconnected("EIO".into()).is_fatal());
    }
}
