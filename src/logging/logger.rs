//! # Logger facade.
//!
//! [`Logger`] composes the [`RingStore`], the [`FilterLevel`] gate and the
//! [`Dispatch`] fan-out behind one small API.
//!
//! ## Flow
//! ```text
//! log(tag, level, msg)
//!   ├─► level < filter ──► return (nothing stored, nothing dispatched)
//!   ├─► lock(store) ─► append ─► unlock
//!   └─► dispatch.emit(tag, level, msg)      (callback, then observers)
//! ```
//!
//! The store lock is released before handlers run, so a slow handler never
//! holds up readers of the buffer.
//!
//! ## Process-wide instance
//! [`Logger::instance`] returns a lazily built, never torn down instance.
//! Independent loggers can still be built with [`Logger::new`].

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use super::dispatch::{Dispatch, Observe};
use super::level::{FilterLevel, Level};
use super::record::{FormatBuffer, LogRecord};
use super::ring::RingStore;

static INSTANCE: OnceLock<Logger> = OnceLock::new();

/// Thread-safe bounded logger.
pub struct Logger {
    store: Mutex<RingStore>,
    filter: FilterLevel,
    dispatch: Dispatch,
}

impl Logger {
    /// Creates an independent logger with an empty store and `Debug` filter.
    pub fn new() -> Self {
        Self {
            store: Mutex::new(RingStore::new()),
            filter: FilterLevel::default(),
            dispatch: Dispatch::new(),
        }
    }

    /// Returns the process-wide logger, creating it on first use.
    pub fn instance() -> &'static Logger {
        INSTANCE.get_or_init(Logger::new)
    }

    fn store(&self) -> MutexGuard<'_, RingStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the minimum accepted level.
    pub fn set_filter_level(&self, level: Level) {
        self.filter.set(level);
    }

    /// Current minimum accepted level.
    pub fn filter_level(&self) -> Level {
        self.filter.get()
    }

    /// Installs the single callback (replaces a previous one).
    pub fn set_callback(&self, callback: impl Observe) {
        self.dispatch.set_callback(Arc::new(callback));
    }

    /// Removes the single callback.
    pub fn clear_callback(&self) {
        self.dispatch.clear_callback();
    }

    /// Registers an observer; observers run after the callback, in registration order.
    pub fn add_observer(&self, observer: impl Observe) {
        self.dispatch.add_observer(Arc::new(observer));
    }

    /// Logs a plain message.
    ///
    /// Messages longer than the record capacity are stored truncated with the
    /// overflow marker; handlers receive the stored text.
    pub fn log(&self, tag: &str, level: Level, message: &str) {
        if !self.filter.accepts(level) {
            return;
        }
        let record = LogRecord::new(tag, level, message);
        self.commit(&record);
    }

    /// Logs pre-formatted arguments, rendered into a fixed stack buffer.
    ///
    /// ## Example
    /// ```rust
    /// use linkvisor::{Level, Logger};
    ///
    /// let logger = Logger::new();
    /// logger.log_fmt("WIFI", Level::Info, format_args!("rssi={}", -61));
    /// assert_eq!(logger.get_next_log().unwrap().message(), "rssi=-61");
    /// ```
    pub fn log_fmt(&self, tag: &str, level: Level, args: fmt::Arguments<'_>) {
        if !self.filter.accepts(level) {
            return;
        }
        let text = FormatBuffer::render(args).into_text();
        let record = LogRecord::new(tag, level, &text);
        self.commit(&record);
    }

    fn commit(&self, record: &LogRecord) {
        self.store()
            .append(record.tag(), record.level(), record.message());
        self.dispatch
            .emit(record.tag(), record.level(), record.message());
    }

    /// Removes and returns the oldest record.
    pub fn get_next_log(&self) -> Option<LogRecord> {
        self.store().take_oldest()
    }

    /// Returns the record `offset` positions after the oldest, without removing it.
    pub fn peek_next_log(&self, offset: usize) -> Option<LogRecord> {
        self.store().peek(offset)
    }

    /// Removes the oldest record and returns it as JSON (`""` when empty).
    pub fn get_next_log_json(&self) -> String {
        self.get_next_log()
            .map(|r| r.to_json())
            .unwrap_or_default()
    }

    /// Peeks a record as JSON (`""` when `offset` is out of range).
    pub fn peek_next_log_json(&self, offset: usize) -> String {
        self.peek_next_log(offset)
            .map(|r| r.to_json())
            .unwrap_or_default()
    }

    /// Live records in the buffer.
    pub fn valid_log_count(&self) -> usize {
        self.store().len()
    }

    /// Records accepted since startup (monotonic, wraps at `usize::MAX`).
    pub fn total_log_count(&self) -> usize {
        self.store().total()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("filter", &self.filter_level())
            .field("valid", &self.valid_log_count())
            .field("total", &self.total_log_count())
            .field("callback", &self.dispatch.has_callback())
            .field("observers", &self.dispatch.observer_names())
            .finish()
    }
}

/// Logs through [`Logger::instance`] at `Debug`.
///
/// ```rust
/// linkvisor::log_debug!("BOOT", "heap free: {} bytes", 42_000);
/// ```
#[macro_export]
macro_rules! log_debug {
    ($tag:expr, $($arg:tt)+) => {
        $crate::Logger::instance().log_fmt($tag, $crate::Level::Debug, format_args!($($arg)+))
    };
}

/// Logs through [`Logger::instance`] at `Info`.
#[macro_export]
macro_rules! log_info {
    ($tag:expr, $($arg:tt)+) => {
        $crate::Logger::instance().log_fmt($tag, $crate::Level::Info, format_args!($($arg)+))
    };
}

/// Logs through [`Logger::instance`] at `Warning`.
#[macro_export]
macro_rules! log_warning {
    ($tag:expr, $($arg:tt)+) => {
        $crate::Logger::instance().log_fmt($tag, $crate::Level::Warning, format_args!($($arg)+))
    };
}

/// Logs through [`Logger::instance`] at `Error`.
#[macro_export]
macro_rules! log_error {
    ($tag:expr, $($arg:tt)+) => {
        $crate::Logger::instance().log_fmt($tag, $crate::Level::Error, format_args!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::record::{MAX_LOGS, MESSAGE_CAPACITY, OVERFLOW_MARKER};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_records_read_back_oldest_first() {
        let logger = Logger::new();
        for i in 0..10 {
            logger.log("T", Level::Info, &format!("m{i}"));
        }

        assert_eq!(logger.valid_log_count(), 10);
        for i in 0..10 {
            assert_eq!(logger.get_next_log().unwrap().message(), format!("m{i}"));
        }
        assert!(logger.get_next_log().is_none());
    }

    #[test]
    fn test_window_after_overflowing_capacity() {
        let logger = Logger::new();
        let n = MAX_LOGS + 37;
        for i in 0..n {
            logger.log("T", Level::Debug, &format!("m{i}"));
        }

        assert_eq!(logger.valid_log_count(), MAX_LOGS);
        assert_eq!(logger.total_log_count(), n);
        assert_eq!(logger.peek_next_log(0).unwrap().message(), "m37");
        assert_eq!(
            logger.peek_next_log(MAX_LOGS - 1).unwrap().message(),
            format!("m{}", n - 1)
        );
    }

    #[test]
    fn test_filtered_calls_are_neither_stored_nor_dispatched() {
        let logger = Logger::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        logger.add_observer(move |_: &str, _: Level, _: &str| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        logger.set_filter_level(Level::Warning);

        logger.log("T", Level::Debug, "dropped");
        logger.log_fmt("T", Level::Info, format_args!("dropped {}", 1));
        logger.log("T", Level::Error, "kept");

        assert_eq!(logger.valid_log_count(), 1);
        assert_eq!(logger.total_log_count(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(logger.get_next_log().unwrap().message(), "kept");
    }

    #[test]
    fn test_peek_keeps_count_and_get_decrements() {
        let logger = Logger::new();
        logger.log("T", Level::Info, "a");
        logger.log("T", Level::Info, "b");

        assert_eq!(logger.peek_next_log(1).unwrap().message(), "b");
        assert_eq!(logger.valid_log_count(), 2);
        assert!(logger.peek_next_log(2).is_none());

        logger.get_next_log();
        assert_eq!(logger.valid_log_count(), 1);
        assert_eq!(logger.total_log_count(), 2);
    }

    #[test]
    fn test_handlers_receive_truncated_text() {
        let logger = Logger::new();
        let seen = Arc::new(Mutex::new(String::new()));
        let s = seen.clone();
        logger.set_callback(move |_: &str, _: Level, msg: &str| {
            *s.lock().unwrap() = msg.to_string();
        });

        logger.log("T", Level::Info, &"q".repeat(500));

        let got = seen.lock().unwrap().clone();
        assert_eq!(got.len(), MESSAGE_CAPACITY);
        assert!(got.ends_with(OVERFLOW_MARKER));
    }

    #[test]
    fn test_json_accessors() {
        let logger = Logger::new();
        assert_eq!(logger.get_next_log_json(), "");
        assert_eq!(logger.peek_next_log_json(0), "");

        logger.log("OTA", Level::Error, "bad image");
        let peeked = logger.peek_next_log_json(0);
        assert_eq!(peeked, r#"{"tag":"OTA","level":"ERROR","message":"bad image"}"#);
        assert_eq!(logger.valid_log_count(), 1);

        assert_eq!(logger.get_next_log_json(), peeked);
        assert_eq!(logger.valid_log_count(), 0);
    }

    #[test]
    fn test_concurrent_writers_never_exceed_capacity() {
        let logger = Arc::new(Logger::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let logger = logger.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        logger.log_fmt("W", Level::Info, format_args!("t{t} i{i}"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(logger.total_log_count(), 400);
        assert_eq!(logger.valid_log_count(), MAX_LOGS);
    }

    #[cfg(feature = "logging")]
    #[test]
    fn test_debug_lists_handlers_by_name() {
        let logger = Logger::new();
        assert!(format!("{logger:?}").contains("callback: false"));

        logger.set_callback(|_: &str, _: Level, _: &str| {});
        logger.add_observer(crate::logging::ConsoleObserver::new());
        let shown = format!("{logger:?}");

        assert!(shown.contains("callback: true"), "{shown}");
        assert!(shown.contains(r#"observers: ["ConsoleObserver"]"#), "{shown}");
    }

    #[test]
    fn test_instance_is_shared() {
        let a = Logger::instance() as *const Logger;
        let b = Logger::instance() as *const Logger;
        assert_eq!(a, b);
    }
}
