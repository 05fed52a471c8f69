//! # Severity levels and the acceptance filter.
//!
//! [`Level`] orders records from least to most severe:
//! `Debug < Info < Warning < Error`.
//!
//! [`FilterLevel`] is the single atomic gate read before every log attempt.
//! Calls below the filter are discarded before formatting or storage.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;

/// Severity of a log record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// Verbose diagnostics (default filter, most permissive).
    #[default]
    Debug,
    /// Normal operational messages.
    Info,
    /// Recoverable problems.
    Warning,
    /// Failures that need attention.
    Error,
}

impl Level {
    /// Returns the upper-case name used in JSON output and console lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }

    #[inline]
    fn as_u8(self) -> u8 {
        self as u8
    }

    #[inline]
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warning,
            _ => Level::Error,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic minimum level; records strictly below it are dropped.
#[derive(Debug)]
pub struct FilterLevel(AtomicU8);

impl FilterLevel {
    /// Creates a filter starting at `level`.
    pub const fn new(level: Level) -> Self {
        Self(AtomicU8::new(level as u8))
    }

    /// Current filter level.
    #[inline]
    pub fn get(&self) -> Level {
        Level::from_u8(self.0.load(Ordering::Relaxed))
    }

    /// Replaces the filter level.
    #[inline]
    pub fn set(&self, level: Level) {
        self.0.store(level.as_u8(), Ordering::Relaxed);
    }

    /// True if a record at `level` passes the filter.
    #[inline]
    pub fn accepts(&self, level: Level) -> bool {
        level >= self.get()
    }
}

impl Default for FilterLevel {
    fn default() -> Self {
        Self::new(Level::Debug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered_by_severity() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warning);
        assert!(Level::Warning < Level::Error);
    }

    #[test]
    fn test_filter_defaults_to_debug() {
        let filter = FilterLevel::default();
        assert_eq!(filter.get(), Level::Debug);
        assert!(filter.accepts(Level::Debug));
    }

    #[test]
    fn test_filter_rejects_below_threshold() {
        let filter = FilterLevel::default();
        filter.set(Level::Warning);

        assert!(!filter.accepts(Level::Debug));
        assert!(!filter.accepts(Level::Info));
        assert!(filter.accepts(Level::Warning));
        assert!(filter.accepts(Level::Error));
    }

    #[test]
    fn test_level_serializes_by_name() {
        let json = serde_json::to_string(&Level::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
    }
}
