//! # Background loop.
//!
//! ```text
//! loop {
//!   ├─► cancelled? → exit
//!   ├─► shared.step()             (one state-machine transition)
//!   ├─► Stopped?   → exit         (retries exhausted)
//!   ├─► Connected? → drain backlog (FIFO, stop at first failure)
//!   └─► sleep(poll_interval) raced against cancel
//! }
//! ```

use std::sync::Arc;

use tokio::{select, time};

use crate::manager::machine::Shared;
use crate::manager::state::ConnectionState;
use crate::transport::Transport;

/// Drives the state machine until stopped or cancelled.
pub(crate) async fn run<T: Transport>(shared: Arc<Shared<T>>) {
    let token = shared.token.clone();

    loop {
        if token.is_cancelled() {
            break;
        }

        shared.step().await;

        match shared.state.load() {
            ConnectionState::Stopped => break,
            ConnectionState::Connected => shared.drain_backlog().await,
            _ => {}
        }

        select! {
            _ = time::sleep(shared.cfg.poll_interval) => {}
            _ = token.cancelled() => break,
        }
    }
}
