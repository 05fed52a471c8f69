//! Auto-reconnecting client manager.
//!
//! The only public API from this module is [`MqttManager`], plus the
//! [`ConnectionState`] snapshot type and [`PublishItem`].
//!
//! Internal modules:
//! - [`state`]: connection states and the atomic state cell;
//! - [`backlog`]: bounded FIFO for messages sent while disconnected;
//! - [`machine`]: shared session and the one-step state machine;
//! - [`runner`]: background loop driving the machine and draining the backlog;
//! - [`facade`]: the public manager type.

mod backlog;
mod facade;
mod machine;
mod runner;
mod state;

pub use backlog::PublishItem;
pub use facade::MqttManager;
pub use state::ConnectionState;
