//! # linkvisor
//!
//! **Linkvisor** is a small connectivity toolkit for devices that must keep
//! talking to a broker over unreliable links.
//!
//! It provides two independent building blocks:
//! - a bounded, thread-safe diagnostic [`Logger`] with a fixed-size ring
//!   store, a severity filter and synchronous callback/observer fan-out;
//! - an auto-reconnecting [`MqttManager`] that drives a pluggable
//!   [`Transport`] through a connection state machine, buffers outbound
//!   messages while offline and replays subscriptions after every reconnect.
//!
//! ## Architecture
//! ```text
//!  application code (any task / thread)
//!     │                         │
//!     ▼                         ▼
//! ┌──────────────────┐   ┌───────────────────────────────────────────┐
//! │ Logger           │   │ MqttManager                               │
//! │ - FilterLevel    │◄──┤ - Backlog (bounded FIFO)                  │
//! │ - RingStore<100> │   │ - Session (transport, subscriptions,      │
//! │ - Dispatch       │   │            retry counter, message callback)│
//! └────┬─────────────┘   │ - StateCell (atomic snapshot)             │
//!      ▼                 └──────┬────────────────────────────────────┘
//!   callback,                   ▼
//!   observers...         runner loop (tokio task)
//!                          ├─► step state machine
//!                          ├─► drain backlog while connected
//!                          └─► sleep(poll_interval), cancellable
//!                               │
//!                               ▼
//!                        Transport ──► SecureStream (TLS)
//! ```
//!
//! ### Connection lifecycle
//! ```text
//! Uninitialized ─begin()─► Connecting ─ok─► Connected ─link lost─► RetryBackoff
//!                              ▲  └─fail──────────────────────────►   │   │
//!                              └──────────── backoff elapsed ─────────┘   │
//!                                                     retries exhausted ─►│
//!                                         any state ─stop()─► Stopped ◄──┘
//! ```
//!
//! ## Features
//! | Area              | Description                                               | Key types / traits                      |
//! |-------------------|-----------------------------------------------------------|-----------------------------------------|
//! | **Logging**       | Bounded log store, filter, callback and observers.        | [`Logger`], [`Level`], [`Observe`]      |
//! | **Manager**       | Reconnecting client with backlog and resubscription.      | [`MqttManager`], [`ConnectionState`]    |
//! | **Collaborators** | Pluggable protocol client and TLS stream.                 | [`Transport`], [`SecureStream`]         |
//! | **Policies**      | Reconnect delay and jitter.                               | [`BackoffPolicy`], [`JitterPolicy`]     |
//! | **Errors**        | Typed errors for the manager and its collaborators.       | [`ManagerError`], [`TransportError`]    |
//! | **Configuration** | Broker address, credentials and timing.                   | [`Config`], [`AuthMode`]                |
//!
//! ## Optional features
//! - `logging`: exports a simple stdout [`ConsoleObserver`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use linkvisor::{Level, Logger, log_info};
//!
//! let logger = Logger::instance();
//! logger.set_filter_level(Level::Info);
//! logger.add_observer(|tag: &str, level: Level, msg: &str| {
//!     let _ = (tag, level, msg);
//! });
//!
//! log_info!("BOOT", "firmware {} ready", "1.4.2");
//! let record = logger.get_next_log().expect("record stored");
//! assert_eq!(record.message(), "firmware 1.4.2 ready");
//! ```
mod config;
mod error;
mod logging;
mod manager;
mod policies;
mod transport;

// ---- Public re-exports ----

pub use config::{AuthMode, Config};
pub use error::{ConfigError, ManagerError, TransportError};
pub use logging::{
    DEFAULT_TAG, Dispatch, FilterLevel, LOG_SIZE, Level, LogRecord, Logger, MAX_LOGS,
    MESSAGE_CAPACITY, OVERFLOW_MARKER, Observe, ObserverRef, RingStore, TAG_CAPACITY, TAG_SIZE,
};
pub use manager::{ConnectionState, MqttManager, PublishItem};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use transport::{Credentials, MessageCallback, QoS, SecureStream, TlsMaterial, Transport};

// Optional: expose a simple stdout observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use logging::ConsoleObserver;
