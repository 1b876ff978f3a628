#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Reading pipeline for the tower telemetry bridge (device-agnostic).
//!
//! All device and store interactions go through `tower_traits::LineSource` and
//! `tower_traits::PointSink`; wall-clock decisions go through `tower_traits::WallClock`.
//!
//! ## Architecture
//!
//! - **Schema**: positional field order emitted by the device (`schema` module)
//! - **Light status**: schedule-aware classification of binary light sensors (`light`)
//! - **Converters**: per-field token conversion, built once from a config snapshot (`convert`)
//! - **Assembler**: raw token row to tagged measurement record (`assemble`)
//! - **Runner**: read/convert/write loop with optional queued reader (`runner`, `reader`)

pub mod assemble;
pub mod conversions;
pub mod convert;
pub mod error;
pub mod light;
pub mod mocks;
pub mod reader;
pub mod runner;
pub mod schema;
pub mod status;

pub use assemble::{Assembly, ReadingAssembler, RejectedField, decode_line};
pub use convert::{Converter, FieldRegistry, WaterLevel};
pub use error::{BridgeError, ConvertError};
pub use light::{LightSchedule, LightStatus};
pub use runner::{PipelineMode, RunStats, RunSummary, StopReason};
pub use status::ReadingStatus;
