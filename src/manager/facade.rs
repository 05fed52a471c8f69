//! # MqttManager: public facade.
//!
//! Owns the shared session and the background loop handle.
//!
//! ```text
//! MqttManager::new(config, transport)
//!   └─► begin() ──► validate config ──► Connecting ──► spawn runner::run
//!
//! publish(topic, payload, retained)
//!   ├─ connected → send now (lock + send bounded by publish_timeout)
//!   └─ otherwise / send failed → backlog (full → BacklogFull)
//!
//! subscribe(topic, qos)
//!   └─ record for replay; connected → issue now
//!
//! stop()
//!   └─► log ─► Stopped ─► cancel ─► join loop (abort after publish_timeout) ─► disconnect
//! ```
//!
//! ## Rules
//! - Every call before `begin()` returns [`ManagerError::NotStarted`].
//! - After `stop()` or retry exhaustion every call returns
//!   [`ManagerError::Stopped`] without touching the transport.
//! - Dropping the manager cancels the loop without waiting for it.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::Ordering;

use rand::Rng;
use tokio::{task::JoinHandle, time};

use crate::config::{AuthMode, Config};
use crate::error::{ManagerError, TransportError};
use crate::logging::{Level, Logger};
use crate::manager::backlog::PublishItem;
use crate::manager::machine::{Shared, bounded};
use crate::manager::runner;
use crate::manager::state::ConnectionState;
use crate::transport::{MessageCallback, QoS, Transport};

/// Prefix of generated client identifiers.
const CLIENT_ID_PREFIX: &str = "linkvisor-";

/// Auto-reconnecting publish/subscribe client manager.
///
/// # Example
/// ```rust,no_run
/// # use linkvisor::{Config, MqttManager, QoS, Transport};
/// # async fn demo<T: Transport>(transport: T) -> Result<(), linkvisor::ManagerError> {
/// let mut cfg = Config::new("broker.example.com", 8883);
/// cfg.username = Some("device-7".into());
///
/// let manager = MqttManager::new(cfg, transport);
/// manager.begin().await?;
/// manager.subscribe("devices/7/cmd", QoS::AtLeastOnce).await?;
/// manager.publish("devices/7/state", "online", true).await?;
/// manager.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct MqttManager<T: Transport> {
    shared: Arc<Shared<T>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Transport> MqttManager<T> {
    /// Creates a manager that reports through [`Logger::instance`].
    pub fn new(config: Config, transport: T) -> Self {
        Self::with_logger(config, transport, Logger::instance())
    }

    /// Creates a manager that reports through `logger`.
    pub fn with_logger(config: Config, transport: T, logger: &'static Logger) -> Self {
        let client_id = if config.client_id.is_empty() {
            generate_client_id()
        } else {
            config.client_id.clone()
        };
        Self {
            shared: Arc::new(Shared::new(config, client_id, transport, logger)),
            worker: Mutex::new(None),
        }
    }

    /// Client identifier presented to the broker.
    pub fn client_id(&self) -> &str {
        &self.shared.client_id
    }

    pub fn config(&self) -> &Config {
        &self.shared.cfg
    }

    /// Changes the authentication mode; only valid before [`begin`](Self::begin).
    pub fn set_auth_mode(&mut self, mode: AuthMode) -> Result<(), ManagerError> {
        if !self.shared.state.is(ConnectionState::Uninitialized) {
            return Err(ManagerError::AlreadyStarted);
        }
        let shared = Arc::get_mut(&mut self.shared).ok_or(ManagerError::AlreadyStarted)?;
        shared.cfg.auth_mode = mode;
        Ok(())
    }

    /// Validates the configuration and starts the background loop.
    ///
    /// Returns once the loop is running; the connection is established
    /// asynchronously. Must be called from within a tokio runtime.
    pub async fn begin(&self) -> Result<(), ManagerError> {
        let shared = &self.shared;
        if let Err(e) = shared.cfg.validate() {
            shared.report(Level::Error, format_args!("refusing to start: {e}"));
            return Err(e.into());
        }

        {
            let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
            if !shared
                .state
                .transition(ConnectionState::Uninitialized, ConnectionState::Connecting)
            {
                return Err(match shared.state.load() {
                    ConnectionState::Stopped => ManagerError::Stopped,
                    _ => ManagerError::AlreadyStarted,
                });
            }
            *worker = Some(tokio::spawn(runner::run(Arc::clone(shared))));
        }

        shared.report(
            Level::Info,
            format_args!(
                "starting: broker {}:{} as {}",
                shared.cfg.server, shared.cfg.port, shared.client_id
            ),
        );
        Ok(())
    }

    /// Publishes now when connected, otherwise queues for the background loop.
    pub async fn publish(
        &self,
        topic: &str,
        payload: &str,
        retained: bool,
    ) -> Result<(), ManagerError> {
        self.ensure_running()?;

        if self.shared.is_connected() {
            match self.send_now(topic, payload, retained).await {
                Ok(()) => return Ok(()),
                Err(e) => self.shared.report(
                    Level::Debug,
                    format_args!("immediate publish to {topic} failed ({e}); queueing"),
                ),
            }
        }

        let capacity = self.shared.backlog.capacity();
        match self
            .shared
            .backlog
            .try_push(PublishItem::new(topic, payload, retained))
        {
            Ok(depth) => {
                self.shared.report(
                    Level::Debug,
                    format_args!("queued message for {topic} ({depth}/{capacity})"),
                );
                Ok(())
            }
            Err(_dropped) => {
                self.shared.report(
                    Level::Error,
                    format_args!("publish backlog full ({capacity}); dropped message for {topic}"),
                );
                Err(ManagerError::BacklogFull { capacity })
            }
        }
    }

    async fn send_now(
        &self,
        topic: &str,
        payload: &str,
        retained: bool,
    ) -> Result<(), TransportError> {
        let timeout = self.shared.cfg.publish_timeout;
        let mut session = time::timeout(timeout, self.shared.session.lock())
            .await
            .map_err(|_| TransportError::Timeout { timeout })?;
        if !self.shared.state.is(ConnectionState::Connected) {
            return Err(TransportError::NotConnected);
        }
        let publish = session.transport.publish(topic, payload.as_bytes(), retained);
        bounded(timeout, publish).await
    }

    /// Records a subscription and issues it now when connected.
    ///
    /// The subscription is replayed after every reconnect, even when the
    /// immediate request fails.
    pub async fn subscribe(&self, topic: &str, qos: QoS) -> Result<(), ManagerError> {
        self.ensure_running()?;

        let timeout = self.shared.cfg.publish_timeout;
        let issued = {
            let mut session = time::timeout(timeout, self.shared.session.lock())
                .await
                .map_err(|_| TransportError::Timeout { timeout })?;
            session.record(topic, qos);

            if self.shared.state.is(ConnectionState::Connected) {
                let request = session.transport.subscribe(topic, qos);
                Some(bounded(timeout, request).await)
            } else {
                None
            }
        };

        match issued {
            None => {
                self.shared.report(
                    Level::Debug,
                    format_args!("subscription to {topic} deferred until connected"),
                );
                Ok(())
            }
            Some(Ok(())) => {
                self.shared
                    .report(Level::Info, format_args!("subscribed to {topic} (qos {qos})"));
                Ok(())
            }
            Some(Err(e)) => {
                self.shared
                    .report(Level::Warning, format_args!("subscribe to {topic} failed: {e}"));
                Err(e.into())
            }
        }
    }

    /// Installs the handler for inbound messages; kept across reconnects.
    pub async fn set_incoming_message_callback<F>(&self, callback: F)
    where
        F: Fn(&str, &[u8]) + Send + Sync + 'static,
    {
        let callback: MessageCallback = Arc::new(callback);
        let mut session = self.shared.session.lock().await;
        session.on_message = Some(Arc::clone(&callback));
        session.transport.set_message_callback(callback);
    }

    /// Stops the loop and disconnects. Terminal and idempotent.
    pub async fn stop(&self) {
        let shared = &self.shared;
        if shared.token.is_cancelled() {
            return;
        }
        shared.report(
            Level::Info,
            format_args!("stopping (state {})", shared.state.load()),
        );

        shared.state.store(ConnectionState::Stopped);
        shared.connected.store(false, Ordering::Release);
        shared.token.cancel();

        let limit = shared.cfg.publish_timeout;
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut handle) = handle {
            if time::timeout(limit, &mut handle).await.is_err() {
                handle.abort();
                let _ = handle.await;
            }
        }

        if let Ok(mut session) = time::timeout(limit, shared.session.lock()).await {
            session.close(limit).await;
        }
    }

    /// Runs `f` with exclusive access to the underlying transport.
    ///
    /// The session lock is held for the duration of `f`; acquiring it is
    /// bounded by `publish_timeout`. Do not log from `f`.
    pub async fn with_transport<R>(
        &self,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, ManagerError> {
        let timeout = self.shared.cfg.publish_timeout;
        let mut session = time::timeout(timeout, self.shared.session.lock())
            .await
            .map_err(|_| TransportError::Timeout { timeout })?;
        Ok(f(&mut session.transport))
    }

    /// Lock-free snapshot of the connected flag.
    pub fn is_connected(&self) -> bool {
        self.shared.is_connected()
    }

    /// Lock-free snapshot of the connection state.
    pub fn state(&self) -> ConnectionState {
        self.shared.state.load()
    }

    /// Number of messages waiting in the backlog.
    pub fn backlog_len(&self) -> usize {
        self.shared.backlog.len()
    }

    fn ensure_running(&self) -> Result<(), ManagerError> {
        match self.shared.state.load() {
            ConnectionState::Uninitialized => Err(ManagerError::NotStarted),
            ConnectionState::Stopped => Err(ManagerError::Stopped),
            _ => Ok(()),
        }
    }
}

impl<T: Transport> fmt::Debug for MqttManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MqttManager")
            .field("client_id", &self.shared.client_id)
            .field("state", &self.shared.state.load())
            .field("backlog", &self.shared.backlog.len())
            .finish()
    }
}

impl<T: Transport> Drop for MqttManager<T> {
    fn drop(&mut self) {
        self.shared.state.store(ConnectionState::Stopped);
        self.shared.connected.store(false, Ordering::Release);
        self.shared.token.cancel();
    }
}

fn generate_client_id() -> String {
    let suffix: u32 = rand::rng().random();
    format!("{CLIENT_ID_PREFIX}{suffix:08x}")
}
