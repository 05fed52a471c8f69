//! # Jitter for reconnect delays.
//!
//! A fleet of devices that lose the broker at the same moment will otherwise
//! reconnect in lockstep. [`JitterPolicy`] spreads those attempts out.
//!
//! - [`JitterPolicy::None`] exact delay (default)
//! - [`JitterPolicy::Equal`] `delay/2 + random[0, delay/2]`, never below half

use rand::Rng;
use std::time::Duration;

/// Randomization applied to the reconnect interval.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No randomization.
    #[default]
    None,
    /// `delay/2 + random[0, delay/2]`.
    Equal,
}

impl JitterPolicy {
    /// Applies jitter to `delay`.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Equal => {
                let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                let half = ms / 2;
                if half == 0 {
                    return delay;
                }
                Duration::from_millis(half + rand::rng().random_range(0..=ms - half))
            }
        }
    }
}
