//! # Ring log store.
//!
//! Fixed array of [`LogRecord`] slots with overwrite-oldest semantics.
//!
//! ```text
//!            tail (oldest)            head (next write)
//!              ▼                         ▼
//!   [ .. | r3 | r4 | r5 | r6 | r7 | .. | free | .. ]
//!              └────── count = 5 ──────┘
//! ```
//!
//! ## Rules
//! - `append` never fails; when full it recycles the slot at `tail`
//!   and advances `tail`, so `count` stays at capacity.
//! - Reads are oldest-first; overwritten records are skipped, never reordered.
//! - `total` counts every accepted append and only wraps at `usize::MAX`.
//!
//! The store itself is not synchronized; [`Logger`](crate::Logger) keeps it
//! behind one mutex.

use super::level::Level;
use super::record::{LogRecord, MAX_LOGS};

/// Circular buffer of `N` log records.
pub struct RingStore<const N: usize = MAX_LOGS> {
    slots: [LogRecord; N],
    head: usize,
    tail: usize,
    count: usize,
    total: usize,
}

impl<const N: usize> RingStore<N> {
    /// Creates an empty store with all slots preallocated.
    pub fn new() -> Self {
        assert!(N > 0, "ring store needs at least one slot");
        Self {
            slots: std::array::from_fn(|_| LogRecord::default()),
            head: 0,
            tail: 0,
            count: 0,
            total: 0,
        }
    }

    /// Writes a record, overwriting the oldest one when full.
    pub fn append(&mut self, tag: &str, level: Level, message: &str) {
        self.slots[self.head].overwrite(tag, level, message);
        self.head = (self.head + 1) % N;

        if self.count == N {
            self.tail = (self.tail + 1) % N;
        } else {
            self.count += 1;
        }
        self.total = self.total.wrapping_add(1);
    }

    /// Removes and returns the oldest live record.
    pub fn take_oldest(&mut self) -> Option<LogRecord> {
        if self.count == 0 {
            return None;
        }
        let record = self.slots[self.tail].clone();
        self.tail = (self.tail + 1) % N;
        self.count -= 1;
        Some(record)
    }

    /// Copies the record `offset` positions after the oldest one.
    pub fn peek(&self, offset: usize) -> Option<LogRecord> {
        if offset >= self.count {
            return None;
        }
        Some(self.slots[(self.tail + offset) % N].clone())
    }

    /// Live records.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Records accepted since creation (wrapping).
    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for RingStore<N> {
    fn default() -> Self {
        Self::new()
    }
}
