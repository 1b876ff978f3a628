//! Line sources over any byte stream.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use tower_traits::{LineSource, ReadOutcome};

use crate::error::Result;
use crate::util::LineSplitter;

const CHUNK: usize = 256;

/// What a zero-length read means for this stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EofPolicy {
    /// End of data; the source reports `Closed` once buffered lines are drained.
    Close,
    /// Nothing available yet (serial ports); the source reports `Idle`.
    Idle,
}

/// Reads `\n`-terminated lines from `R`.
///
/// A read timeout is reported as `Idle` so the caller can check for shutdown.
#[derive(Debug)]
pub struct StreamSource<R> {
    inner: R,
    splitter: LineSplitter,
    eof: EofPolicy,
    closed: bool,
}

impl<R: Read> StreamSource<R> {
    pub fn new(inner: R, eof: EofPolicy) -> Self {
        Self {
            inner,
            splitter: LineSplitter::new(),
            eof,
            closed: false,
        }
    }
}

impl<R: Read> LineSource for StreamSource<R> {
    fn read_line(&mut self) -> std::result::Result<ReadOutcome, Box<dyn std::error::Error + Send + Sync>> {
        if let Some(line) = self.splitter.next_line() {
            return Ok(ReadOutcome::Line(line));
        }
        if self.closed {
            return Ok(ReadOutcome::Closed);
        }

        let mut buf = [0u8; CHUNK];
        match self.inner.read(&mut buf) {
            Ok(0) => match self.eof {
                EofPolicy::Idle => Ok(ReadOutcome::Idle),
                EofPolicy::Close => {
                    self.closed = true;
                    Ok(self
                        .splitter
                        .take_rest()
                        .map_or(ReadOutcome::Closed, ReadOutcome::Line))
                }
            },
            Ok(n) => {
                self.splitter.push(&buf[..n]);
                Ok(self
                    .splitter
                    .next_line()
                    .map_or(ReadOutcome::Idle, ReadOutcome::Line))
            }
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                Ok(ReadOutcome::Idle)
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(ReadOutcome::Idle),
            Err(e) => Err(Box::new(e)),
        }
    }
}

/// Replays a capture file of device lines, then closes.
pub type ReplaySource = StreamSource<File>;

pub fn open_replay(path: &Path) -> Result<ReplaySource> {
    let file = File::open(path)?;
    tracing::info!(path = %path.display(), "replaying captured readings");
    Ok(StreamSource::new(file, EofPolicy::Close))
}
