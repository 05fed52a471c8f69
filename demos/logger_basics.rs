//! # Example: logger_basics
//!
//! Shows the bounded diagnostic log: filtering, the callback, observers,
//! overflow of the ring store and JSON reads.
//!
//! ## Flow
//! ```text
//! log_info!/log_error! ──► FilterLevel ──► RingStore ──► callback
//!                                                     └─► ConsoleObserver
//! main ──► peek_next_log_json(0) / get_next_log() drain
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example logger_basics --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use linkvisor::{ConsoleObserver, Level, Logger, MAX_LOGS, log_debug, log_error, log_info};

fn main() {
    let logger = Logger::instance();

    // 1. Drop debug noise, print everything else.
    logger.set_filter_level(Level::Info);
    logger.add_observer(ConsoleObserver::new());

    // 2. The single callback runs before any observer.
    let errors = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&errors);
    logger.set_callback(move |_tag: &str, level: Level, _msg: &str| {
        if level == Level::Error {
            seen.fetch_add(1, Ordering::Relaxed);
        }
    });

    log_debug!("BOOT", "filtered out, never stored");
    log_info!("BOOT", "firmware {} starting", env!("CARGO_PKG_VERSION"));
    log_error!("OTA", "image checksum mismatch: {:#010x}", 0xdead_beef_u32);

    println!("stored: {}", logger.valid_log_count());
    println!("oldest as json: {}", logger.peek_next_log_json(0));

    // 3. Overflow the ring: only the newest MAX_LOGS survive.
    logger.clear_callback();
    logger.set_filter_level(Level::Warning);
    for i in 0..MAX_LOGS + 20 {
        logger.log("BULK", Level::Warning, &format!("sample {i}"));
    }
    println!(
        "valid={} total={} errors_seen={}",
        logger.valid_log_count(),
        logger.total_log_count(),
        errors.load(Ordering::Relaxed)
    );

    if let Some(first) = logger.get_next_log() {
        println!("oldest surviving: [{}] {}", first.tag(), first.message());
    }
}
