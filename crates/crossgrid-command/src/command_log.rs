//! The binary command log.
//!
//! The log is a byte buffer: a `u16` little-endian cursor followed by the
//! encoded records of every command on the stack, oldest first. An offset
//! table remembers where each record starts so that records past the cursor
//! can be cut off and the last record rewritten in place.

use log::{trace, warn};

/// Size of the cursor header.
pub(crate) const HEADER_LEN: usize = 2;

/// The serialized history of a [`CommandStack`](crate::CommandStack).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLog {
    data: Vec<u8>,
    offsets: Vec<usize>,
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandLog {
    /// Creates an empty log with cursor zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: vec![0; HEADER_LEN],
            offsets: Vec::new(),
        }
    }

    /// Returns the log bytes, ready to be stored.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns `true` if the log holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns the stored cursor.
    #[must_use]
    pub fn cursor(&self) -> u16 {
        u16::from_le_bytes([self.data[0], self.data[1]])
    }

    /// Returns the bytes of record `index`.
    #[must_use]
    pub fn record(&self, index: usize) -> Option<&[u8]> {
        let start = *self.offsets.get(index)?;
        let end = self.offsets.get(index + 1).copied().unwrap_or(self.data.len());
        self.data.get(start..end)
    }

    pub(crate) fn set_cursor(&mut self, cursor: u16) {
        self.data[..HEADER_LEN].copy_from_slice(&cursor.to_le_bytes());
    }

    /// Drops every record from `len` on.
    pub(crate) fn truncate(&mut self, len: usize) {
        if let Some(&end) = self.offsets.get(len) {
            self.data.truncate(end);
            self.offsets.truncate(len);
        }
    }

    /// Appends `record` as record number `index`.
    ///
    /// If the offset table does not end right before `index`, the log is
    /// reset and `false` is returned; the caller rebuilds it.
    pub(crate) fn append_at(&mut self, index: usize, record: &[u8]) -> bool {
        if index != self.offsets.len() {
            warn!(
                "command log offset table holds {} records, cannot append record {index}; resetting",
                self.offsets.len()
            );
            self.reset();
            return false;
        }
        trace!("record {index} at byte {}", self.data.len());
        self.offsets.push(self.data.len());
        self.data.extend_from_slice(record);
        true
    }

    /// Replaces the last record.
    pub(crate) fn overwrite_last(&mut self, record: &[u8]) {
        if let Some(&start) = self.offsets.last() {
            trace!("rewriting record {} at byte {start}", self.offsets.len() - 1);
            self.data.truncate(start);
            self.data.extend_from_slice(record);
        }
    }

    /// Removes all records and sets the cursor to zero.
    pub(crate) fn reset(&mut self) {
        self.data.clear();
        self.data.resize(HEADER_LEN, 0);
        self.offsets.clear();
    }
}
