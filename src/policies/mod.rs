//! Reconnect delay policies.
//!
//! ## Contents
//! - [`BackoffPolicy`] how long to wait between failed connect attempts
//! - [`JitterPolicy`]  randomization to keep many devices from reconnecting in lockstep
//!
//! ## Wiring
//! ```text
//! Config { reconnect_interval, jitter }
//!      └─► Config::backoff() ─► BackoffPolicy
//!           └─► manager: RetryBackoff waits backoff.delay()
//! ```

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
