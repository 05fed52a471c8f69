//! # Reconnect backoff.
//!
//! [`BackoffPolicy`] decides how long the manager waits in `RetryBackoff`
//! before the next connect attempt: the fixed reconnect interval, optionally
//! spread by [`JitterPolicy`].
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use linkvisor::BackoffPolicy;
//!
//! let backoff = BackoffPolicy::fixed(Duration::from_millis(500));
//! assert_eq!(backoff.delay(), Duration::from_millis(500));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Delay between reconnect attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Wait after a failed attempt or a dropped link.
    pub interval: Duration,
    /// Randomization applied to `interval`.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Fixed 5s interval, no jitter.
    fn default() -> Self {
        Self::fixed(Duration::from_secs(5))
    }
}

impl BackoffPolicy {
    /// A fixed-interval policy without jitter.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            jitter: JitterPolicy::None,
        }
    }

    /// Delay before the next connect attempt.
    pub fn delay(&self) -> Duration {
        self.jitter.apply(self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_interval_is_constant() {
        let p = BackoffPolicy::fixed(Duration::from_millis(250));
        for _ in 0..20 {
            assert_eq!(p.delay(), Duration::from_millis(250));
        }
    }

    #[test]
    fn test_default_is_fixed_five_seconds() {
        assert_eq!(BackoffPolicy::default().delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_jitter_never_exceeds_interval() {
        let p = BackoffPolicy {
            interval: Duration::from_millis(100),
            jitter: JitterPolicy::Equal,
        };
        for _ in 0..50 {
            let d = p.delay();
            assert!(d >= Duration::from_millis(50));
            assert!(d <= Duration::from_millis(100));
        }
    }
}
