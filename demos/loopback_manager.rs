//! # Example: loopback_manager
//!
//! Runs [`MqttManager`] against an in-memory loopback transport that refuses
//! the first connect, then echoes every publish back to matching
//! subscriptions.
//!
//! ## Flow
//! ```text
//! begin() ──► Connecting ──► connect #1 refused ──► RetryBackoff(200ms)
//!                         ──► connect #2 ok ──► Connected
//!                              ├─► resubscribe "demo/echo"
//!                              └─► drain backlog (2 messages queued while offline)
//! publish() while connected ──► sent immediately ──► echoed to callback
//! stop() ──► join loop ──► disconnect
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example loopback_manager
//! ```

use std::time::Duration;

use async_trait::async_trait;
use linkvisor::{
    Config, Credentials, Level, Logger, MessageCallback, MqttManager, QoS, SecureStream,
    TlsMaterial, Transport, TransportError,
};

/// Accepts any TLS material.
struct PlainStream;

impl SecureStream for PlainStream {
    fn configure(&mut self, tls: &TlsMaterial<'_>) -> Result<(), TransportError> {
        println!("[loopback] tls configured (root ca: {})", tls.root_ca.is_some());
        Ok(())
    }
}

/// Loopback broker living inside the transport.
struct Loopback {
    stream: PlainStream,
    refuse_connects: usize,
    connected: bool,
    topics: Vec<String>,
    callback: Option<MessageCallback>,
}

impl Loopback {
    fn new(refuse_connects: usize) -> Self {
        Self {
            stream: PlainStream,
            refuse_connects,
            connected: false,
            topics: Vec::new(),
            callback: None,
        }
    }
}

#[async_trait]
impl Transport for Loopback {
    type Stream = PlainStream;

    fn stream_mut(&mut self) -> &mut PlainStream {
        &mut self.stream
    }

    async fn connect(
        &mut self,
        client_id: &str,
        _credentials: &Credentials<'_>,
    ) -> Result<(), TransportError> {
        if self.refuse_connects > 0 {
            self.refuse_connects -= 1;
            return Err(TransportError::ConnectFailed {
                reason: "broker still booting".into(),
            });
        }
        println!("[loopback] session open for {client_id}");
        self.connected = true;
        self.topics.clear();
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.connected = false;
    }

    async fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        _retained: bool,
    ) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        if self.topics.iter().any(|t| t == topic) {
            if let Some(cb) = &self.callback {
                cb(topic, payload);
            }
        }
        Ok(())
    }

    async fn subscribe(&mut self, topic: &str, _qos: QoS) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.topics.push(topic.to_string());
        Ok(())
    }

    async fn poll(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn set_message_callback(&mut self, callback: MessageCallback) {
        self.callback = Some(callback);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Print the manager's own diagnostics.
    let logger = Logger::instance();
    logger.add_observer(|tag: &str, level: Level, msg: &str| {
        println!("[{level}] {tag}: {msg}");
    });

    // 2. Configure: fast retries, small backlog.
    let mut cfg = Config::new("loopback.local", 8883);
    cfg.username = Some("demo".into());
    cfg.reconnect_interval = Duration::from_millis(200);
    cfg.publish_buffer_size = 4;

    let manager = MqttManager::new(cfg, Loopback::new(1));
    manager
        .set_incoming_message_callback(|topic, payload| {
            println!("[app] {topic} <- {}", String::from_utf8_lossy(payload));
        })
        .await;

    // 3. Start; subscriptions and publishes before the link is up are kept.
    manager.begin().await?;
    manager.subscribe("demo/echo", QoS::AtLeastOnce).await?;
    manager.publish("demo/echo", "queued #1", false).await?;
    manager.publish("demo/echo", "queued #2", false).await?;
    println!("[app] backlog while offline: {}", manager.backlog_len());

    // 4. Wait for the reconnect and the backlog drain.
    while !manager.is_connected() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("[app] backlog after reconnect: {}", manager.backlog_len());

    // 5. Connected publishes go straight out.
    manager.publish("demo/echo", "live", false).await?;

    manager.stop().await;
    println!("[app] final state: {}", manager.state());
    Ok(())
}
