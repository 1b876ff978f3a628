/// Longest partial line kept while waiting for a terminator.
pub const MAX_PENDING: usize = 4096;

/// Accumulates raw bytes and hands back complete `\n`-terminated lines.
///
/// Reads from a serial port may stop anywhere, including mid-line, so bytes
/// are buffered until a terminator arrives. A fragment longer than
/// `MAX_PENDING` (line noise, wrong baud rate) is dropped, and so is the rest
/// of it up to the next terminator.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
    /// `pending[..scanned]` holds no terminator.
    scanned: usize,
    /// Inside an overlong fragment; bytes up to the next terminator are junk.
    discarding: bool,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
        if self.pending.len() > MAX_PENDING && self.find_terminator().is_none() {
            if !self.discarding {
                tracing::warn!(
                    bytes = self.pending.len(),
                    limit = MAX_PENDING,
                    "no line terminator from device, dropping input"
                );
            }
            self.pending.clear();
            self.scanned = 0;
            self.discarding = true;
        }
    }

    /// Offset of the first terminator, scanning only bytes not seen before.
    fn find_terminator(&mut self) -> Option<usize> {
        match self.pending[self.scanned..].iter().position(|&b| b == b'\n') {
            Some(i) => Some(self.scanned + i),
            None => {
                self.scanned = self.pending.len();
                None
            }
        }
    }

    /// Next complete line without its terminator. Invalid UTF-8 is replaced.
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let end = self.find_terminator()?;
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            self.scanned = 0;
            if self.discarding {
                self.discarding = false;
                continue;
            }
            return Some(decode(&line[..end]));
        }
    }

    /// Whatever is left after the final terminator, if anything.
    pub fn take_rest(&mut self) -> Option<String> {
        self.scanned = 0;
        let line = std::mem::take(&mut self.pending);
        if std::mem::take(&mut self.discarding) || line.is_empty() {
            return None;
        }
        Some(decode(&line))
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn decode(bytes: &[u8]) -> String {
    let s = String::from_utf8_lossy(bytes);
    s.strip_suffix('\r').unwrap_or(&s).to_string()
}
