//! # Connection state.
//!
//! ```text
//!                 begin()
//! Uninitialized ──────────► Connecting ──── ok ────► Connected
//!                             ▲    │                    │
//!                   backoff   │    │ fail               │ link lost
//!                   elapsed   │    ▼                    │
//!                           RetryBackoff ◄──────────────┘
//!                                  │
//!                                  │ retries exhausted
//!                                  ▼
//!   any state ─── stop() ───►  Stopped  (terminal)
//! ```
//!
//! [`StateCell`] stores the state atomically so snapshots never wait on the
//! session lock. The background loop moves between states with
//! [`StateCell::transition`] (compare-and-swap), so it can never overwrite a
//! concurrent `stop()`.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of the manager's broker connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectionState {
    /// Constructed, `begin()` not called yet.
    #[default]
    Uninitialized = 0,
    /// A connect attempt is pending or in flight.
    Connecting = 1,
    /// Session open; publishes go straight to the transport.
    Connected = 2,
    /// Waiting before the next connect attempt.
    RetryBackoff = 3,
    /// Terminal: stopped explicitly or retries exhausted.
    Stopped = 4,
}

impl ConnectionState {
    /// Short stable name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Uninitialized => "uninitialized",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::RetryBackoff => "retry_backoff",
            ConnectionState::Stopped => "stopped",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ConnectionState::Uninitialized,
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::RetryBackoff,
            _ => ConnectionState::Stopped,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic holder for [`ConnectionState`].
#[derive(Debug, Default)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn load(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Unconditional store; used only for the terminal `Stopped`.
    #[inline]
    pub fn store(&self, state: ConnectionState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Moves `from → to` only if the current state is `from`.
    #[inline]
    pub fn transition(&self, from: ConnectionState, to: ConnectionState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    #[inline]
    pub fn is(&self, state: ConnectionState) -> bool {
        self.load() == state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConnectionState::*;

    #[test]
    fn test_starts_uninitialized() {
        assert_eq!(StateCell::new().load(), Uninitialized);
    }

    #[test]
    fn test_transition_requires_expected_state() {
        let cell = StateCell::new();
        assert!(cell.transition(Uninitialized, Connecting));
        assert!(!cell.transition(Uninitialized, Connecting));
        assert!(cell.transition(Connecting, Connected));
        assert!(cell.is(Connected));
    }

    #[test]
    fn test_stop_is_not_overwritten_by_transition() {
        let cell = StateCell::new();
        cell.transition(Uninitialized, Connecting);
        cell.store(Stopped);

        assert!(!cell.transition(Connecting, Connected));
        assert_eq!(cell.load(), Stopped);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(RetryBackoff.to_string(), "retry_backoff");
    }
}
