//! # Connection state machine.
//!
//! [`Shared`] is the state owned jointly by the facade and the background
//! loop. One call to [`Shared::step`] advances the machine by at most one
//! transition:
//!
//! ```text
//! Connecting   ──► configure TLS ─► connect (bounded by publish_timeout)
//!                     ├─ ok   → reset retries, resubscribe all, Connected
//!                     └─ err  → retries left? RetryBackoff : Stopped
//! RetryBackoff ──► sleep(backoff) raced against cancel ─► Connecting
//! Connected    ──► poll transport ─► link lost? RetryBackoff
//! ```
//!
//! ## Rules
//! - Every transition is a compare-and-swap on [`StateCell`]; a concurrent
//!   `stop()` always wins.
//! - The session guard is dropped before anything is logged.
//! - Nothing is logged once the cancellation token has fired.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::{select, sync::Mutex, time};
use tokio_util::sync::CancellationToken;

use crate::config::{AuthMode, Config};
use crate::error::TransportError;
use crate::logging::{Level, Logger};
use crate::manager::backlog::Backlog;
use crate::manager::state::{ConnectionState, StateCell};
use crate::transport::{Credentials, MessageCallback, QoS, SecureStream, TlsMaterial, Transport};

/// Tag used for the manager's own diagnostics.
pub(crate) const LOG_TAG: &str = "MQTT";

/// A recorded subscription, replayed after every (re)connect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Subscription {
    pub topic: String,
    pub qos: QoS,
}

/// Everything guarded by the session lock.
pub(crate) struct Session<T> {
    pub transport: T,
    pub subscriptions: Vec<Subscription>,
    /// Consecutive failed connect attempts.
    pub failures: u32,
    pub on_message: Option<MessageCallback>,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            subscriptions: Vec::new(),
            failures: 0,
            on_message: None,
        }
    }

    /// Records `topic`; an existing entry keeps its position and takes the new QoS.
    pub fn record(&mut self, topic: &str, qos: QoS) {
        match self.subscriptions.iter_mut().find(|s| s.topic == topic) {
            Some(existing) => existing.qos = qos,
            None => self.subscriptions.push(Subscription {
                topic: topic.to_string(),
                qos,
            }),
        }
    }

    /// Re-issues every subscription in order, each bounded by `limit`;
    /// returns the ones that failed.
    async fn resubscribe(&mut self, limit: Duration) -> Vec<(String, TransportError)> {
        let Session {
            transport,
            subscriptions,
            ..
        } = self;

        let mut failed = Vec::new();
        for sub in subscriptions.iter() {
            let request = transport.subscribe(&sub.topic, sub.qos);
            if let Err(e) = bounded(limit, request).await {
                failed.push((sub.topic.clone(), e));
            }
        }
        failed
    }

    /// Closes the transport session, giving up after `limit`.
    pub async fn close(&mut self, limit: Duration) {
        let _ = time::timeout(limit, self.transport.disconnect()).await;
    }
}

/// Awaits a transport call, mapping an elapsed `limit` to [`TransportError::Timeout`].
pub(crate) async fn bounded<F>(limit: Duration, call: F) -> Result<(), TransportError>
where
    F: Future<Output = Result<(), TransportError>>,
{
    time::timeout(limit, call)
        .await
        .unwrap_or(Err(TransportError::Timeout { timeout: limit }))
}

/// Result of one connect attempt, reported after the session guard is released.
enum Attempt {
    Connected {
        attempt: u32,
        failed: Vec<(String, TransportError)>,
    },
    Retrying {
        failures: u32,
        error: TransportError,
    },
    Exhausted {
        failures: u32,
        error: TransportError,
    },
    /// `stop()` won the race; nothing to report.
    Superseded,
}

/// State shared between the facade and the background loop.
pub(crate) struct Shared<T> {
    pub cfg: Config,
    pub client_id: String,
    pub session: Mutex<Session<T>>,
    pub state: StateCell,
    pub connected: AtomicBool,
    pub backlog: Backlog,
    pub token: CancellationToken,
    pub logger: &'static Logger,
}

impl<T: Transport> Shared<T> {
    pub fn new(cfg: Config, client_id: String, transport: T, logger: &'static Logger) -> Self {
        let backlog = Backlog::new(cfg.backlog_capacity());
        Self {
            cfg,
            client_id,
            session: Mutex::new(Session::new(transport)),
            state: StateCell::new(),
            connected: AtomicBool::new(false),
            backlog,
            token: CancellationToken::new(),
            logger,
        }
    }

    /// Emits a diagnostic unless teardown has begun.
    pub fn report(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.token.is_cancelled() {
            self.logger.log_fmt(LOG_TAG, level, args);
        }
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Advances the state machine by one step.
    pub async fn step(&self) {
        match self.state.load() {
            ConnectionState::Connecting => self.attempt_connect().await,
            ConnectionState::RetryBackoff => self.wait_backoff().await,
            ConnectionState::Connected => self.check_link().await,
            ConnectionState::Uninitialized | ConnectionState::Stopped => {}
        }
    }

    async fn attempt_connect(&self) {
        let outcome = {
            let mut session = self.session.lock().await;
            let attempt = session.failures + 1;

            match self.open(&mut session).await {
                Ok(()) => {
                    session.failures = 0;
                    if let Some(cb) = session.on_message.clone() {
                        session.transport.set_message_callback(cb);
                    }
                    let failed = session.resubscribe(self.cfg.publish_timeout).await;

                    // Published under the lock so a concurrent subscribe either
                    // lands in the replay above or sees Connected.
                    if self
                        .state
                        .transition(ConnectionState::Connecting, ConnectionState::Connected)
                    {
                        self.connected.store(true, Ordering::Release);
                        Attempt::Connected { attempt, failed }
                    } else {
                        Attempt::Superseded
                    }
                }
                Err(error) => {
                    session.failures = session.failures.saturating_add(1);
                    let failures = session.failures;
                    let exhausted = self.cfg.retry_limit().is_some_and(|limit| failures >= limit);
                    let next = if exhausted {
                        ConnectionState::Stopped
                    } else {
                        ConnectionState::RetryBackoff
                    };

                    if !self.state.transition(ConnectionState::Connecting, next) {
                        Attempt::Superseded
                    } else if exhausted {
                        Attempt::Exhausted { failures, error }
                    } else {
                        Attempt::Retrying { failures, error }
                    }
                }
            }
        };

        match outcome {
            Attempt::Connected { attempt, failed } => {
                self.report(
                    Level::Info,
                    format_args!(
                        "connected to {}:{} as {} (attempt {attempt})",
                        self.cfg.server, self.cfg.port, self.client_id
                    ),
                );
                for (topic, error) in failed {
                    self.report(
                        Level::Warning,
                        format_args!("resubscribe to {topic} failed: {error}"),
                    );
                }
            }
            Attempt::Retrying { failures, error } => {
                let delay = self.cfg.reconnect_interval;
                self.report(
                    Level::Warning,
                    format_args!("connect attempt {failures} failed: {error}; retrying in {delay:?}"),
                );
            }
            Attempt::Exhausted { failures, error } => {
                self.report(
                    Level::Error,
                    format_args!("giving up after {failures} failed connect attempts: {error}"),
                );
            }
            Attempt::Superseded => {}
        }
    }

    /// Configures TLS and performs the bounded protocol connect.
    async fn open(&self, session: &mut Session<T>) -> Result<(), TransportError> {
        let cfg = &self.cfg;
        let cert_mode = cfg.auth_mode == AuthMode::Cert;
        let tls = TlsMaterial {
            root_ca: cfg.root_ca.as_deref(),
            client_cert: cfg.client_cert.as_deref().filter(|_| cert_mode),
            client_key: cfg.client_key.as_deref().filter(|_| cert_mode),
        };
        session.transport.stream_mut().configure(&tls)?;

        let credentials = match cfg.auth_mode {
            AuthMode::Cert => Credentials::Certificate,
            AuthMode::UserPassword => Credentials::UserPassword {
                username: cfg.username.as_deref().unwrap_or_default(),
                password: cfg.password.as_deref(),
            },
        };

        let connect = session.transport.connect(&self.client_id, &credentials);
        let res = bounded(cfg.publish_timeout, connect).await;
        if matches!(res, Err(TransportError::Timeout { .. })) {
            session.close(cfg.publish_timeout).await;
        }
        res
    }

    async fn wait_backoff(&self) {
        let delay = self.cfg.backoff().delay();

        select! {
            _ = time::sleep(delay) => {}
            _ = self.token.cancelled() => return,
        }
        self.state
            .transition(ConnectionState::RetryBackoff, ConnectionState::Connecting);
    }

    /// Polls the transport once; a failed link or a stalled poll counts as lost.
    async fn check_link(&self) {
        let limit = self.cfg.publish_timeout;
        let lost = {
            let mut session = self.session.lock().await;
            let polled = time::timeout(limit, session.transport.poll()).await;

            match polled {
                Ok(res) if session.transport.is_connected() => res.err().map(|e| (false, e)),
                polled => {
                    let error = match polled {
                        Ok(res) => res.err().unwrap_or(TransportError::NotConnected),
                        Err(_elapsed) => {
                            session.close(limit).await;
                            TransportError::Timeout { timeout: limit }
                        }
                    };
                    if self
                        .state
                        .transition(ConnectionState::Connected, ConnectionState::RetryBackoff)
                    {
                        self.connected.store(false, Ordering::Release);
                        Some((true, error))
                    } else {
                        None
                    }
                }
            }
        };

        match lost {
            Some((true, error)) => {
                let delay = self.cfg.reconnect_interval;
                self.report(
                    Level::Warning,
                    format_args!("connection lost ({error}); reconnecting in {delay:?}"),
                );
            }
            Some((false, error)) => {
                self.report(Level::Debug, format_args!("poll failed: {error}"));
            }
            None => {}
        }
    }

    /// Sends queued items oldest first; stops at the first failure.
    pub async fn drain_backlog(&self) {
        while self.state.is(ConnectionState::Connected) {
            let Some(item) = self.backlog.front() else {
                break;
            };

            let sent = {
                let mut session = self.session.lock().await;
                if !self.state.is(ConnectionState::Connected) {
                    break;
                }
                let publish =
                    session
                        .transport
                        .publish(&item.topic, item.payload.as_bytes(), item.retained);
                bounded(self.cfg.publish_timeout, publish).await
            };

            match sent {
                Ok(()) => {
                    self.backlog.pop_front();
                    self.report(
                        Level::Debug,
                        format_args!(
                            "flushed queued message to {} ({} left)",
                            item.topic,
                            self.backlog.len()
                        ),
                    );
                }
                Err(error) => {
                    self.report(
                        Level::Warning,
                        format_args!(
                            "queued publish to {} failed: {error}; {} still queued",
                            item.topic,
                            self.backlog.len()
                        ),
                    );
                    break;
                }
            }
        }
    }
}
