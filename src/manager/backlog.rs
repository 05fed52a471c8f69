//! # Publish backlog.
//!
//! Bounded FIFO of messages that could not be sent immediately.
//!
//! ## Rules
//! - `try_push` on a full backlog rejects the **new** item and hands it back;
//!   queued items are never overwritten.
//! - Only the background loop consumes, via `front` + `pop_front`: an item is
//!   removed only after its send succeeded, so a failed send leaves it at the
//!   head for the next cycle.
//! - Storage is reserved up front and never grows past the capacity.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One outbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishItem {
    pub topic: String,
    pub payload: String,
    pub retained: bool,
}

impl PublishItem {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>, retained: bool) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            retained,
        }
    }
}

/// Bounded, thread-safe FIFO of [`PublishItem`]s.
#[derive(Debug)]
pub struct Backlog {
    items: Mutex<VecDeque<PublishItem>>,
    capacity: usize,
}

impl Backlog {
    /// Creates a backlog holding at most `capacity` items (min 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    fn items(&self) -> MutexGuard<'_, VecDeque<PublishItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `item`; returns the new depth, or the item back when full.
    pub fn try_push(&self, item: PublishItem) -> Result<usize, PublishItem> {
        let mut items = self.items();
        if items.len() >= self.capacity {
            return Err(item);
        }
        items.push_back(item);
        Ok(items.len())
    }

    /// Copy of the oldest item.
    pub fn front(&self) -> Option<PublishItem> {
        self.items().front().cloned()
    }

    /// Removes the oldest item.
    pub fn pop_front(&self) -> Option<PublishItem> {
        self.items().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
