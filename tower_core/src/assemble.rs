//! Turns one positional row of tokens into a tagged measurement record.

use std::collections::BTreeMap;

use tower_config::Config;
use tower_traits::{LocalClock, MeasurementRecord, WallClock};

use crate::convert::FieldRegistry;
use crate::error::{BridgeError, ConvertError};
use crate::schema::NOT_APPLICABLE;

/// Split one device line into positional tokens.
///
/// Surrounding whitespace (including the line terminator) is stripped first.
pub fn decode_line(line: &str) -> Vec<&str> {
    line.trim().split(',').collect()
}

/// A field dropped from a record because its token did not convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedField {
    pub field: String,
    pub token: String,
    pub error: ConvertError,
}

impl From<RejectedField> for BridgeError {
    fn from(r: RejectedField) -> Self {
        BridgeError::FieldParse {
            field: r.field,
            token: r.token,
            source: r.error,
        }
    }
}

/// Assembled record plus what was left out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub record: MeasurementRecord,
    /// Fields whose token failed conversion.
    pub rejected: Vec<RejectedField>,
    /// Positions carrying the not-applicable sentinel.
    pub not_applicable: usize,
}

/// Builds records from raw rows using an immutable field registry.
#[derive(Debug, Clone)]
pub struct ReadingAssembler<C = LocalClock> {
    registry: FieldRegistry,
    measurement: String,
    tags: BTreeMap<String, String>,
    clock: C,
}

impl ReadingAssembler<LocalClock> {
    /// Assembler over the host's local clock.
    pub fn from_config(cfg: &Config) -> Result<Self, BridgeError> {
        Self::from_config_with_clock(cfg, LocalClock::new())
    }
}

impl<C: WallClock> ReadingAssembler<C> {
    pub fn new(
        registry: FieldRegistry,
        measurement: impl Into<String>,
        tags: BTreeMap<String, String>,
        clock: C,
    ) -> Self {
        Self {
            registry,
            measurement: measurement.into(),
            tags,
            clock,
        }
    }

    pub fn from_config_with_clock(cfg: &Config, clock: C) -> Result<Self, BridgeError> {
        let registry = FieldRegistry::from_config(cfg)?;
        Ok(Self::new(
            registry,
            cfg.measurement(),
            cfg.tags().to_map(),
            clock,
        ))
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    /// Assemble one row. A wrong token count rejects the whole row; a bad token
    /// only drops its own field.
    pub fn assemble<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Assembly, BridgeError> {
        let expected = self.registry.len();
        if tokens.len() != expected {
            return Err(BridgeError::ShapeMismatch {
                expected,
                received: tokens.len(),
            });
        }

        let mut record = MeasurementRecord::new(self.measurement.clone(), self.tags.clone());
        let mut rejected = Vec::new();
        let mut not_applicable = 0;

        for ((name, converter), token) in self.registry.iter().zip(tokens) {
            let token = token.as_ref();
            if token.trim() == NOT_APPLICABLE {
                not_applicable += 1;
                continue;
            }
            match converter.convert(token, &self.clock) {
                Ok(value) => {
                    record.fields.insert(name.to_string(), value);
                }
                Err(error) => rejected.push(RejectedField {
                    field: name.to_string(),
                    token: token.to_string(),
                    error,
                }),
            }
        }

        Ok(Assembly {
            record,
            rejected,
            not_applicable,
        })
    }

    /// Decode and assemble one raw device line.
    pub fn assemble_line(&self, line: &str) -> Result<Assembly, BridgeError> {
        self.assemble(&decode_line(line))
    }
}
