use std::time::Duration;

use serialport::SerialPort;

use crate::error::{IoError, Result};
use crate::stream::{EofPolicy, StreamSource};

/// Read timeout; bounds how long a shutdown request can go unnoticed.
pub const READ_TIMEOUT: Duration = Duration::from_millis(200);

pub type SerialLineSource = StreamSource<Box<dyn SerialPort>>;

/// Open the microcontroller's serial port at `baud_rate`.
pub fn open_serial(port: &str, baud_rate: u32) -> Result<SerialLineSource> {
    let handle = serialport::new(port, baud_rate)
        .timeout(READ_TIMEOUT)
        .open()
        .map_err(|e| IoError::Open {
            port: port.to_string(),
            reason: e.to_string(),
        })?;
    tracing::info!(port, baud_rate, "serial port open");
    Ok(StreamSource::new(handle, EofPolicy::Idle))
}

/// Serial devices visible to the host, for error hints.
pub fn available_ports() -> Vec<String> {
    serialport::available_ports()
        .map(|ports| ports.into_iter().map(|p| p.port_name).collect())
        .unwrap_or_default()
}
