//! Scripted in-memory transport for manager tests.

use std::collections::VecDeque;
use std::future;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Credentials, MessageCallback, QoS, SecureStream, TlsMaterial, Transport};
use crate::error::TransportError;

#[derive(Default)]
pub(crate) struct MockState {
    /// Results for upcoming connect attempts; `connect_default` once drained.
    pub connect_script: VecDeque<bool>,
    pub connect_default: bool,
    pub connect_attempts: usize,
    pub last_client_id: Option<String>,
    pub last_username: Option<String>,
    pub used_certificate: bool,
    pub connected: bool,
    pub disconnects: usize,
    pub polls: usize,
    pub publish_ok: bool,
    pub published: Vec<(String, String, bool)>,
    pub publish_calls: usize,
    pub failing_subscriptions: Vec<String>,
    pub subscribed: Vec<(String, QoS)>,
    pub tls: Option<(Option<String>, Option<String>, Option<String>)>,
    /// Calls that never complete once invoked.
    pub stall_subscribe: bool,
    pub stall_poll: bool,
    pub stall_disconnect: bool,
    pub callback: Option<MessageCallback>,
}

/// Cloneable view into the mock's state.
#[derive(Clone, Default)]
pub(crate) struct MockHandle(Arc<Mutex<MockState>>);

impl MockHandle {
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.0.lock().unwrap()
    }

    /// Simulates the broker dropping the session.
    pub fn drop_link(&self) {
        self.state().connected = false;
    }

    /// Delivers an inbound message through the installed callback.
    pub fn deliver(&self, topic: &str, payload: &[u8]) {
        let cb = self.state().callback.clone();
        if let Some(cb) = cb {
            cb(topic, payload);
        }
    }

    pub fn transport_calls(&self) -> usize {
        let s = self.state();
        s.connect_attempts + s.publish_calls + s.subscribed.len()
    }
}

pub(crate) struct MockStream(MockHandle);

impl SecureStream for MockStream {
    fn configure(&mut self, tls: &TlsMaterial<'_>) -> Result<(), TransportError> {
        self.0.state().tls = Some((
            tls.root_ca.map(str::to_owned),
            tls.client_cert.map(str::to_owned),
            tls.client_key.map(str::to_owned),
        ));
        Ok(())
    }
}

pub(crate) struct MockTransport {
    handle: MockHandle,
    stream: MockStream,
}

impl MockTransport {
    /// A transport whose connects always succeed and sends always work.
    pub fn online() -> (Self, MockHandle) {
        Self::with(|s| {
            s.connect_default = true;
            s.publish_ok = true;
        })
    }

    /// A transport whose connects always fail.
    pub fn offline() -> (Self, MockHandle) {
        Self::with(|s| {
            s.connect_default = false;
            s.publish_ok = true;
        })
    }

    pub fn with(setup: impl FnOnce(&mut MockState)) -> (Self, MockHandle) {
        let handle = MockHandle::default();
        setup(&mut handle.state());
        let transport = Self {
            handle: handle.clone(),
            stream: MockStream(handle.clone()),
        };
        (transport, handle)
    }
}

#[async_trait]
impl Transport for MockTransport {
    type Stream = MockStream;

    fn stream_mut(&mut self) -> &mut MockStream {
        &mut self.stream
    }

    async fn connect(
        &mut self,
        client_id: &str,
        credentials: &Credentials<'_>,
    ) -> Result<(), TransportError> {
        let mut s = self.handle.state();
        s.connect_attempts += 1;
        s.last_client_id = Some(client_id.to_string());
        match credentials {
            Credentials::Certificate => s.used_certificate = true,
            Credentials::UserPassword { username, .. } => {
                s.last_username = Some((*username).to_string())
            }
        }
        let ok = s.connect_script.pop_front().unwrap_or(s.connect_default);
        s.connected = ok;
        if ok {
            Ok(())
        } else {
            Err(TransportError::ConnectFailed {
                reason: "broker unreachable".into(),
            })
        }
    }

    async fn disconnect(&mut self) {
        let stall = {
            let mut s = self.handle.state();
            s.disconnects += 1;
            s.stall_disconnect
        };
        if stall {
            future::pending::<()>().await;
        }
        self.handle.state().connected = false;
    }

    async fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        retained: bool,
    ) -> Result<(), TransportError> {
        let mut s = self.handle.state();
        s.publish_calls += 1;
        if !s.connected || !s.publish_ok {
            return Err(TransportError::PublishFailed {
                topic: topic.to_string(),
            });
        }
        s.published.push((
            topic.to_string(),
            String::from_utf8_lossy(payload).into_owned(),
            retained,
        ));
        Ok(())
    }

    async fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), TransportError> {
        let stall = {
            let mut s = self.handle.state();
            s.subscribed.push((topic.to_string(), qos));
            s.stall_subscribe
        };
        if stall {
            future::pending::<()>().await;
        }
        let s = self.handle.state();
        if !s.connected || s.failing_subscriptions.iter().any(|t| t == topic) {
            return Err(TransportError::SubscribeFailed {
                topic: topic.to_string(),
            });
        }
        Ok(())
    }

    async fn poll(&mut self) -> Result<(), TransportError> {
        let stall = {
            let mut s = self.handle.state();
            s.polls += 1;
            s.stall_poll
        };
        if stall {
            future::pending::<()>().await;
        }
        if self.handle.state().connected {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }

    fn is_connected(&self) -> bool {
        self.handle.state().connected
    }

    fn set_message_callback(&mut self, callback: MessageCallback) {
        self.handle.state().callback = Some(callback);
    }
}
