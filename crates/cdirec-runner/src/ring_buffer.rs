//! Bounded capture of a child's output
//!
//! A solve can log for hours; only the most recent bytes are kept.

use std::collections::VecDeque;
use std::fmt;

/// Keeps the last `max_bytes` bytes written to it.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    buffer: VecDeque<u8>,
    max_bytes: usize,
    total_bytes_written: usize,
}

impl RingBuffer {
    #[must_use]
    pub fn new(max_bytes: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(max_bytes.min(8192)),
            max_bytes,
            total_bytes_written: 0,
        }
    }

    /// Append `data`, dropping the oldest bytes past `max_bytes`.
    pub fn write(&mut self, data: &[u8]) {
        self.total_bytes_written += data.len();

        let keep = &data[data.len().saturating_sub(self.max_bytes)..];
        let overflow = (self.buffer.len() + keep.len()).saturating_sub(self.max_bytes);
        self.buffer.drain(..overflow);
        self.buffer.extend(keep);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes written over the buffer's lifetime, including dropped ones.
    #[must_use]
    pub const fn total_bytes_written(&self) -> usize {
        self.total_bytes_written
    }

    #[must_use]
    pub const fn was_truncated(&self) -> bool {
        self.total_bytes_written > self.max_bytes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.into()
    }
}

impl fmt::Display for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (front, back) = self.buffer.as_slices();
        let bytes = [front, back].concat();
        f.write_str(&String::from_utf8_lossy(&bytes))
    }
}
