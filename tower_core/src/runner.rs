use std::slice;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use tower_traits::{LineSource, PointSink, ReadOutcome, WallClock};

use crate::assemble::ReadingAssembler;
use crate::error::{BridgeError, Result as CoreResult};
use crate::reader::{LineReader, ReaderEvent};
use crate::status::ReadingStatus;

/// How often the queued consumer re-checks the shutdown flag while idle.
const QUEUE_POLL: Duration = Duration::from_millis(100);

/// How reading and writing are orchestrated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineMode {
    /// Read, convert and write one line at a time on the calling thread
    #[default]
    Sequential,
    /// Read on a background thread into a bounded queue of `capacity` lines
    Queued { capacity: usize },
}

/// Counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub lines: u64,
    pub written: u64,
    pub shape_mismatches: u64,
    /// Rows dropped by the assembler for any reason other than their shape.
    pub unassembled: u64,
    pub field_errors: u64,
    /// Rows where every field was skipped; nothing is sent for them.
    pub empty_records: u64,
    pub write_failures: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown flag was raised.
    Shutdown,
    /// The source reported end of data.
    SourceClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub stats: RunStats,
    pub reason: StopReason,
}

/// Convert and store one raw line, updating `stats`.
pub fn process_line<C, W>(
    line: &str,
    assembler: &ReadingAssembler<C>,
    sink: &mut W,
    stats: &mut RunStats,
) -> ReadingStatus
where
    C: WallClock,
    W: PointSink + ?Sized,
{
    stats.lines += 1;

    let assembly = match assembler.assemble_line(line) {
        Ok(a) => a,
        Err(e) => {
            match &e {
                BridgeError::ShapeMismatch { expected, received } => {
                    tracing::warn!(
                        expected,
                        received,
                        "sensor data length mismatch, ignoring reading"
                    );
                    stats.shape_mismatches += 1;
                }
                other => {
                    report(other, "reading dropped");
                    stats.unassembled += 1;
                }
            }
            return ReadingStatus::Dropped(e);
        }
    };

    let skipped: Vec<BridgeError> = assembly
        .rejected
        .into_iter()
        .map(BridgeError::from)
        .collect();
    for e in &skipped {
        report(e, "skipping field");
        stats.field_errors += 1;
    }

    let record = assembly.record;
    if record.fields.is_empty() {
        tracing::debug!(
            not_applicable = assembly.not_applicable,
            skipped = skipped.len(),
            "reading has no fields, nothing to write"
        );
        stats.empty_records += 1;
        return ReadingStatus::Empty(skipped);
    }

    if tracing::enabled!(tracing::Level::DEBUG) {
        match serde_json::to_string(slice::from_ref(&record)) {
            Ok(json) => tracing::debug!(record = %json, "reading assembled"),
            Err(e) => tracing::warn!(error = %e, "unable to serialize reading for echo"),
        }
    }

    match sink.write_points(slice::from_ref(&record)) {
        Ok(()) => {
            stats.written += 1;
            ReadingStatus::Written(skipped)
        }
        Err(e) => {
            let err = BridgeError::WriteFailure(e.to_string());
            report(&err, "unable to write reading");
            stats.write_failures += 1;
            ReadingStatus::WriteFailed(err)
        }
    }
}

/// Log at `error` for conditions that end the session, `warn` for the rest.
fn report(err: &BridgeError, what: &str) {
    if err.is_fatal() {
        tracing::error!(error = %err, "{what}");
    } else {
        tracing::warn!(error = %err, "{what}");
    }
}

/// Run the bridge until shutdown, end of data, or a device failure.
///
/// A device failure is returned as `BridgeError::DeviceDisconnected`; every
/// per-reading problem is logged, counted and skipped.
pub fn run<S, W, C>(
    source: S,
    sink: &mut W,
    assembler: &ReadingAssembler<C>,
    mode: PipelineMode,
    shutdown: Arc<AtomicBool>,
) -> CoreResult<RunSummary>
where
    S: LineSource + Send + 'static,
    W: PointSink + ?Sized,
    C: WallClock,
{
    tracing::info!(
        ?mode,
        fields = assembler.registry().len(),
        measurement = assembler.measurement(),
        "bridge start"
    );
    let summary = match mode {
        PipelineMode::Sequential => run_sequential(source, sink, assembler, &shutdown),
        PipelineMode::Queued { capacity } => {
            run_queued(source, sink, assembler, capacity, &shutdown)
        }
    }?;
    let s = summary.stats;
    tracing::info!(
        reason = ?summary.reason,
        lines = s.lines,
        written = s.written,
        shape_mismatches = s.shape_mismatches,
        unassembled = s.unassembled,
        field_errors = s.field_errors,
        empty_records = s.empty_records,
        write_failures = s.write_failures,
        "bridge stopped"
    );
    Ok(summary)
}

fn run_sequential<S, W, C>(
    mut source: S,
    sink: &mut W,
    assembler: &ReadingAssembler<C>,
    shutdown: &AtomicBool,
) -> CoreResult<RunSummary>
where
    S: LineSource,
    W: PointSink + ?Sized,
    C: WallClock,
{
    let mut stats = RunStats::default();
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return Ok(RunSummary {
                stats,
                reason: StopReason::Shutdown,
            });
        }
        match source.read_line() {
            Ok(ReadOutcome::Line(line)) => {
                process_line(&line, assembler, sink, &mut stats);
            }
            Ok(ReadOutcome::Idle) => continue,
            Ok(ReadOutcome::Closed) => {
                return Ok(RunSummary {
                    stats,
                    reason: StopReason::SourceClosed,
                });
            }
            Err(e) => {
                let err = BridgeError::DeviceDisconnected(e.to_string());
                report(&err, "unable to read device");
                return Err(err.into());
            }
        }
    }
}

fn run_queued<S, W, C>(
    source: S,
    sink: &mut W,
    assembler: &ReadingAssembler<C>,
    capacity: usize,
    shutdown: &AtomicBool,
) -> CoreResult<RunSummary>
where
    S: LineSource + Send + 'static,
    W: PointSink + ?Sized,
    C: WallClock,
{
    let reader = LineReader::spawn(source, capacity);
    let mut stats = RunStats::default();
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return Ok(RunSummary {
                stats,
                reason: StopReason::Shutdown,
            });
        }
        match reader.recv_timeout(QUEUE_POLL) {
            Ok(ReaderEvent::Line(line)) => {
                process_line(&line, assembler, sink, &mut stats);
            }
            Ok(ReaderEvent::Failed(msg)) => {
                let err = BridgeError::DeviceDisconnected(msg);
                report(&err, "unable to read device");
                return Err(err.into());
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                return Ok(RunSummary {
                    stats,
                    reason: StopReason::SourceClosed,
                });
            }
        }
    }
}
