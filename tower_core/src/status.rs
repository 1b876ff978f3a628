//! Outcome of processing one line from the device.

use crate::error::BridgeError;

#[derive(Debug, Clone, PartialEq)]
pub enum ReadingStatus {
    /// Record accepted by the store; carries the fields that were skipped.
    Written(Vec<BridgeError>),
    /// Every field was skipped or not applicable; nothing was sent.
    Empty(Vec<BridgeError>),
    /// Reading discarded before assembly (wrong shape).
    Dropped(BridgeError),
    /// Record assembled but the store rejected it; not retried.
    WriteFailed(BridgeError),
}
