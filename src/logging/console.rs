//! # ConsoleObserver: simple record printer
//!
//! A minimal observer that prints accepted records to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [INFO] MQTT: connected to broker.example.com:8883 as linkvisor-1a2b3c4d
//! [WARNING] MQTT: connect attempt 2 failed: timed out after 1s
//! [ERROR] MQTT: giving up after 5 failed attempts
//! ```

use crate::logging::{Level, Observe};

/// Stdout observer.
#[derive(Default)]
pub struct ConsoleObserver {
    min_level: Level,
}

impl ConsoleObserver {
    /// Prints every record the logger accepts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints only records at or above `min_level`.
    #[must_use]
    pub fn with_min_level(min_level: Level) -> Self {
        Self { min_level }
    }

    fn render(tag: &str, level: Level, message: &str) -> String {
        format!("[{level}] {tag}: {message}")
    }
}

impl Observe for ConsoleObserver {
    fn on_log(&self, tag: &str, level: Level, message: &str) {
        if level >= self.min_level {
            println!("{}", Self::render(tag, level, message));
        }
    }

    fn name(&self) -> &'static str {
        "ConsoleObserver"
    }
}
