//! Bounded diagnostic logging.
//!
//! ## Contents
//! - [`Level`], [`FilterLevel`]  severity and the acceptance gate
//! - [`LogRecord`]               fixed-capacity record (no heap per entry)
//! - [`RingStore`]               circular buffer with overwrite-oldest policy
//! - [`Dispatch`], [`Observe`]   synchronous callback/observer fan-out
//! - [`Logger`]                  facade and process-wide instance
//!
//! ## Wiring
//! ```text
//! caller ──► Logger::log ──► FilterLevel ──► RingStore (mutex) ──► Dispatch
//!                                                                  ├─► callback
//!                                                                  └─► observers...
//! reader ──► Logger::get_next_log / peek_next_log / *_json ──► RingStore (mutex)
//! ```

#[cfg(feature = "logging")]
mod console;
mod dispatch;
mod level;
mod logger;
mod record;
mod ring;

#[cfg(feature = "logging")]
pub use console::ConsoleObserver;
pub use dispatch::{Dispatch, Observe, ObserverRef};
pub use level::{FilterLevel, Level};
pub use logger::Logger;
pub use record::{
    DEFAULT_TAG, LOG_SIZE, LogRecord, MAX_LOGS, MESSAGE_CAPACITY, OVERFLOW_MARKER, TAG_CAPACITY,
    TAG_SIZE,
};
pub use ring::RingStore;
