pub mod clock;
pub mod point;

pub use clock::{FixedClock, LocalClock, ManualClock, WallClock};
pub use point::{FieldValue, MeasurementRecord};

/// Result of one poll of a line-oriented device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One complete record, without its line terminator.
    Line(String),
    /// Nothing complete arrived within the source's poll window.
    Idle,
    /// The source has no more data (end of a replay file).
    Closed,
}

/// A device that yields newline-terminated text records.
///
/// An `Err` is a hard failure (e.g. the device was unplugged) and ends the session.
pub trait LineSource {
    fn read_line(&mut self) -> Result<ReadOutcome, Box<dyn std::error::Error + Send + Sync>>;
}

/// A time-series store accepting batches of measurement records.
pub trait PointSink {
    fn write_points(
        &mut self,
        points: &[MeasurementRecord],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: LineSource + ?Sized> LineSource for Box<T> {
    fn read_line(&mut self) -> Result<ReadOutcome, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_line()
    }
}

impl<T: PointSink + ?Sized> PointSink for Box<T> {
    fn write_points(
        &mut self,
        points: &[MeasurementRecord],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).write_points(points)
    }
}
