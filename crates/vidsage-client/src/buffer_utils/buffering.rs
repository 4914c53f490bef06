use std::collections::VecDeque;
use std::str::Utf8Error;

/// Longest line kept before the buffer starts dropping bytes
pub const DEFAULT_MAX_LINE_LEN: usize = 4 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] Utf8Error),

    #[error("line longer than {0} bytes dropped")]
    Overflow(usize),
}

/// Byte buffer that hands out complete lines
///
/// Bytes are kept undecoded until a newline arrives, so a multi-byte character
/// split across two network chunks is reassembled before UTF-8 decoding.
/// Bytes already searched for a newline are not searched again, and a line
/// that outgrows `max_line_len` is reported once and discarded up to its
/// terminating newline.
pub struct CircularLineBuffer {
    buffer: VecDeque<u8>,
    scanned: usize,
    max_line_len: usize,
    discarding: bool,
}

impl CircularLineBuffer {
    /// Create a new buffer with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            scanned: 0,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            discarding: false,
        }
    }

    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    /// Add bytes to the buffer
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract next line (up to \n), trimmed
    /// Returns None if no complete line is available
    pub fn next_line(&mut self) -> Option<Result<String, BufferError>> {
        loop {
            let found = self
                .buffer
                .range(self.scanned..)
                .position(|&b| b == b'\n')
                .map(|offset| self.scanned + offset);

            let Some(newline_pos) = found else {
                if self.discarding {
                    self.buffer.clear();
                    self.scanned = 0;
                    return None;
                }
                if self.buffer.len() > self.max_line_len {
                    self.buffer.clear();
                    self.scanned = 0;
                    self.discarding = true;
                    return Some(Err(BufferError::Overflow(self.max_line_len)));
                }
                self.scanned = self.buffer.len();
                return None;
            };

            self.scanned = 0;
            if self.discarding {
                self.buffer.drain(..=newline_pos);
                self.discarding = false;
                continue;
            }
            if newline_pos > self.max_line_len {
                self.buffer.drain(..=newline_pos);
                return Some(Err(BufferError::Overflow(self.max_line_len)));
            }

            let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            return Some(
                std::str::from_utf8(&line_bytes)
                    .map(|line| line.trim().to_string())
                    .map_err(BufferError::from),
            );
        }
    }

    /// Terminate a trailing partial line so `next_line` returns it
    ///
    /// Called once the body has ended.
    pub fn close(&mut self) {
        if self.discarding {
            self.buffer.clear();
            self.scanned = 0;
            self.discarding = false;
            return;
        }
        if self.buffer.back().is_some_and(|&b| b != b'\n') {
            self.buffer.push_back(b'\n');
        }
    }

    /// Current buffer size
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
