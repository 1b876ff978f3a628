//! Device and store adapters for the tower bridge.
//!
//! - `stream`: line sources over byte streams (serial ports, capture files)
//! - `serial`: serial port opening (feature `serial`)
//! - `influx`: InfluxDB HTTP writer (feature `influx`)
//! - `jsonl`: JSON-lines sink for dry runs

pub mod error;
pub mod jsonl;
pub mod line_protocol;
pub mod stream;
pub mod util;

#[cfg(feature = "influx")]
pub mod influx;
#[cfg(feature = "serial")]
pub mod serial;

pub use error::IoError;
pub use jsonl::JsonLinesSink;
pub use stream::{EofPolicy, ReplaySource, StreamSource, open_replay};

#[cfg(feature = "influx")]
pub use influx::{InfluxSettings, InfluxWriter};
#[cfg(feature = "serial")]
pub use serial::{SerialLineSource, open_serial};
