//! Background line reading for the queued pipeline.
//!
//! Spawns a thread that owns the `LineSource` and pushes complete lines into a
//! bounded channel, so a slow store write does not hold up the device.
//!
//! Each `LineReader` owns exactly one thread, which is shut down and joined
//! when the reader is dropped.
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tower_traits::{LineSource, ReadOutcome};

/// How long a blocked send waits before re-checking the shutdown flag.
const SEND_POLL: Duration = Duration::from_millis(50);

/// Item delivered by the reader thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderEvent {
    Line(String),
    /// The source failed; no further events follow.
    Failed(String),
}

pub struct LineReader {
    rx: xch::Receiver<ReaderEvent>,
    /// Shutdown flag for immediate response (atomic for lock-free check)
    shutdown: Arc<AtomicBool>,
    /// Join handle for graceful thread cleanup
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl LineReader {
    pub fn spawn<S: LineSource + Send + 'static>(mut source: S, capacity: usize) -> Self {
        let (tx, rx) = xch::bounded(capacity.max(1));
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let join_handle = std::thread::spawn(move || {
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("line reader received shutdown signal");
                    break;
                }

                match source.read_line() {
                    Ok(ReadOutcome::Line(line)) => {
                        if !deliver(&tx, ReaderEvent::Line(line), &shutdown_clone) {
                            break;
                        }
                    }
                    Ok(ReadOutcome::Idle) => {}
                    Ok(ReadOutcome::Closed) => {
                        tracing::debug!("line source closed");
                        break;
                    }
                    Err(e) => {
                        deliver(&tx, ReaderEvent::Failed(e.to_string()), &shutdown_clone);
                        break;
                    }
                }
            }
            tracing::trace!("line reader thread exiting cleanly");
        });

        Self {
            rx,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Wait up to `timeout` for the next event.
    ///
    /// `Disconnected` means the source closed and every queued line was consumed.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<ReaderEvent, xch::RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Number of lines waiting in the queue.
    pub fn backlog(&self) -> usize {
        self.rx.len()
    }
}

/// Push one event, waiting for queue space. Returns false when the reader should stop.
fn deliver(tx: &xch::Sender<ReaderEvent>, event: ReaderEvent, shutdown: &AtomicBool) -> bool {
    let mut pending = event;
    loop {
        match tx.send_timeout(pending, SEND_POLL) {
            Ok(()) => return true,
            Err(xch::SendTimeoutError::Timeout(ev)) => {
                if shutdown.load(Ordering::Relaxed) {
                    return false;
                }
                pending = ev;
            }
            Err(xch::SendTimeoutError::Disconnected(_)) => {
                tracing::debug!("line consumer disconnected, exiting thread");
                return false;
            }
        }
    }
}

impl Drop for LineReader {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // The thread exits after its current read returns (bounded by the
        // source's poll window) or within one SEND_POLL if it is blocked on a
        // full queue.
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("line reader thread joined successfully");
                }
                Err(e) => {
                    tracing::warn!(?e, "line reader thread panicked during shutdown");
                }
            }
        }
    }
}
