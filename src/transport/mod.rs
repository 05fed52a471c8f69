//! # Collaborator interfaces.
//!
//! The manager treats the publish/subscribe protocol client and the TLS
//! socket as opaque collaborators:
//!
//! ```text
//! MqttManager ──► Transport (protocol client: connect/publish/subscribe/poll)
//!                     └─► SecureStream (TLS socket: configure before connect)
//! ```
//!
//! Framing, keep-alive and acknowledgements belong to the [`Transport`]
//! implementation. The manager only calls the methods below, always while
//! holding its session lock, so implementations need no internal locking.

#[cfg(test)]
pub(crate) mod mock;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;

/// Handler for messages arriving on subscribed topics: `(topic, payload)`.
pub type MessageCallback = Arc<dyn Fn(&str, &[u8]) + Send + Sync>;

/// Delivery guarantee requested for a subscription.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum QoS {
    /// Fire and forget.
    #[default]
    AtMostOnce = 0,
    /// Acknowledged delivery, duplicates possible.
    AtLeastOnce = 1,
    /// Exactly-once handshake.
    ExactlyOnce = 2,
}

impl TryFrom<u8> for QoS {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            other => Err(other),
        }
    }
}

impl fmt::Display for QoS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// PEM material handed to the secure stream before connecting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TlsMaterial<'a> {
    /// Trust anchor for the broker certificate.
    pub root_ca: Option<&'a str>,
    /// Client certificate (certificate auth only).
    pub client_cert: Option<&'a str>,
    /// Client private key (certificate auth only).
    pub client_key: Option<&'a str>,
}

/// Credentials presented in the protocol-level connect.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Credentials<'a> {
    /// Identity comes from the TLS client certificate.
    Certificate,
    /// Username and optional password.
    UserPassword {
        username: &'a str,
        password: Option<&'a str>,
    },
}

impl fmt::Debug for Credentials<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Certificate => f.write_str("Certificate"),
            Credentials::UserPassword { username, .. } => f
                .debug_struct("UserPassword")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// TLS socket layer.
pub trait SecureStream: Send {
    /// Installs trust anchors and, optionally, the client identity.
    fn configure(&mut self, tls: &TlsMaterial<'_>) -> Result<(), TransportError>;
}

/// Publish/subscribe protocol client running over a [`SecureStream`].
///
/// # Example
/// ```rust
/// use async_trait::async_trait;
/// use linkvisor::{
///     Credentials, MessageCallback, QoS, SecureStream, TlsMaterial, Transport, TransportError,
/// };
///
/// struct NoTls;
/// impl SecureStream for NoTls {
///     fn configure(&mut self, _tls: &TlsMaterial<'_>) -> Result<(), TransportError> {
///         Ok(())
///     }
/// }
///
/// struct Offline(NoTls);
///
/// #[async_trait]
/// impl Transport for Offline {
///     type Stream = NoTls;
///     fn stream_mut(&mut self) -> &mut NoTls { &mut self.0 }
///     async fn connect(&mut self, _id: &str, _c: &Credentials<'_>) -> Result<(), TransportError> {
///         Err(TransportError::ConnectFailed { reason: "offline".into() })
///     }
///     async fn disconnect(&mut self) {}
///     async fn publish(&mut self, _t: &str, _p: &[u8], _r: bool) -> Result<(), TransportError> {
///         Err(TransportError::NotConnected)
///     }
///     async fn subscribe(&mut self, _t: &str, _q: QoS) -> Result<(), TransportError> {
///         Err(TransportError::NotConnected)
///     }
///     async fn poll(&mut self) -> Result<(), TransportError> { Ok(()) }
///     fn is_connected(&self) -> bool { false }
///     fn set_message_callback(&mut self, _cb: MessageCallback) {}
/// }
/// ```
#[async_trait]
pub trait Transport: Send + 'static {
    /// Secure stream the client runs over.
    type Stream: SecureStream;

    /// Access to the stream for TLS setup before connecting.
    fn stream_mut(&mut self) -> &mut Self::Stream;

    /// Opens the TLS session and performs the protocol connect.
    async fn connect(
        &mut self,
        client_id: &str,
        credentials: &Credentials<'_>,
    ) -> Result<(), TransportError>;

    /// Closes the session; idempotent.
    async fn disconnect(&mut self);

    /// Sends one message.
    async fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        retained: bool,
    ) -> Result<(), TransportError>;

    /// Requests a subscription.
    async fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), TransportError>;

    /// Services the connection (keep-alive, inbound delivery). Called once per cycle.
    async fn poll(&mut self) -> Result<(), TransportError>;

    /// Whether the protocol session is currently open.
    fn is_connected(&self) -> bool;

    /// Installs the handler for inbound messages.
    fn set_message_callback(&mut self, callback: MessageCallback);
}
