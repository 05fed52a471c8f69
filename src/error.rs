//! Error types used by the manager, its collaborators and its configuration.
//!
//! This module defines three enums:
//!
//! - [`ManagerError`] returned across the [`MqttManager`](crate::MqttManager) API.
//! - [`TransportError`] reported by [`Transport`](crate::Transport) implementations.
//! - [`ConfigError`] raised when a [`Config`](crate::Config) cannot be used.
//!
//! Each provides `as_label` (stable snake_case) for logs and counters.

use std::time::Duration;
use thiserror::Error;

/// # Errors returned by the manager facade.
///
/// Nothing panics across the manager boundary; every failure surfaces as one
/// of these values.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManagerError {
    /// `begin()` has not been called yet.
    #[error("manager not started")]
    NotStarted,

    /// `begin()` was already called (or the call is only valid before it).
    #[error("manager already started")]
    AlreadyStarted,

    /// The manager was stopped or exhausted its retries; it cannot be reused.
    #[error("manager stopped")]
    Stopped,

    /// The outbound backlog is full; the new message was dropped.
    #[error("publish backlog full (capacity {capacity}); message dropped")]
    BacklogFull {
        /// Configured backlog capacity.
        capacity: usize,
    },

    /// Configuration rejected by `begin()`.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The transport rejected an immediate operation.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl ManagerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use linkvisor::ManagerError;
    ///
    /// let err = ManagerError::BacklogFull { capacity: 5 };
    /// assert_eq!(err.as_label(), "manager_backlog_full");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ManagerError::NotStarted => "manager_not_started",
            ManagerError::AlreadyStarted => "manager_already_started",
            ManagerError::Stopped => "manager_stopped",
            ManagerError::BacklogFull { .. } => "manager_backlog_full",
            ManagerError::InvalidConfig(_) => "manager_invalid_config",
            ManagerError::Transport(_) => "manager_transport",
        }
    }
}

/// # Errors reported by transport and secure-stream collaborators.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Handshake or protocol-level connect was refused.
    #[error("connect failed: {reason}")]
    ConnectFailed {
        /// Collaborator-provided reason.
        reason: String,
    },

    /// The operation did not finish within the configured bound.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// Bound that was exceeded.
        timeout: Duration,
    },

    /// The operation needs an open session.
    #[error("not connected")]
    NotConnected,

    /// A publish was not accepted.
    #[error("publish to '{topic}' failed")]
    PublishFailed {
        /// Target topic.
        topic: String,
    },

    /// A subscribe was not accepted.
    #[error("subscribe to '{topic}' failed")]
    SubscribeFailed {
        /// Requested topic filter.
        topic: String,
    },

    /// TLS material was rejected by the secure stream.
    #[error("tls setup failed: {reason}")]
    Tls {
        /// Collaborator-provided reason.
        reason: String,
    },
}

impl TransportError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TransportError::ConnectFailed { .. } => "transport_connect_failed",
            TransportError::Timeout { .. } => "transport_timeout",
            TransportError::NotConnected => "transport_not_connected",
            TransportError::PublishFailed { .. } => "transport_publish_failed",
            TransportError::SubscribeFailed { .. } => "transport_subscribe_failed",
            TransportError::Tls { .. } => "transport_tls",
        }
    }
}

/// # Errors found when validating a [`Config`](crate::Config).
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Broker host is empty.
    #[error("broker server address is empty")]
    EmptyServer,

    /// Certificate auth without a client certificate.
    #[error("certificate auth requires a client certificate")]
    MissingCertificate,

    /// Certificate auth without a private key.
    #[error("certificate auth requires a client private key")]
    MissingPrivateKey,

    /// Username/password auth without a username.
    #[error("username/password auth requires a username")]
    MissingUsername,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::EmptyServer => "config_empty_server",
            ConfigError::MissingCertificate => "config_missing_certificate",
            ConfigError::MissingPrivateKey => "config_missing_private_key",
            ConfigError::MissingUsername => "config_missing_username",
        }
    }
}
