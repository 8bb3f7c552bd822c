//! Delivery queue between the session worker and the consumer
//!
//! The producer side is unbounded so the network task never blocks on a slow
//! consumer; the consumer side drains in bounded attempts so a quiet peer
//! never blocks the caller indefinitely.

use std::time::Duration;

use eventsub_models::RawMessage;
use tokio::sync::{Mutex, mpsc};
use tokio::time::timeout;

/// Create a connected producer/consumer pair.
pub(crate) fn channel() -> (QueueSender, MessageQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (QueueSender { tx }, MessageQueue { rx: Mutex::new(rx) })
}

/// Producer half, held by the session worker.
#[derive(Clone)]
pub(crate) struct QueueSender {
    tx: mpsc::UnboundedSender<RawMessage>,
}

impl QueueSender {
    /// Append a payload. Returns false if the consumer side is gone.
    pub(crate) fn push(&self, message: RawMessage) -> bool {
        self.tx.send(message).is_ok()
    }
}

/// Consumer half: an ordered FIFO of raw payloads.
///
/// Drains through a shared handle serialize on an internal lock, so the
/// exactly-once guarantee holds with multiple consumers.
pub struct MessageQueue {
    rx: Mutex<mpsc::UnboundedReceiver<RawMessage>>,
}

impl MessageQueue {
    /// Remove and return queued payloads in arrival order.
    ///
    /// Performs at most `max_attempts` receive attempts, each waiting up to
    /// `poll_timeout`; an attempt that times out is skipped silently, so the
    /// result may hold fewer than `max_attempts` items. A later call resumes
    /// where this one left off and never re-delivers a consumed item.
    pub async fn drain(&self, max_attempts: usize, poll_timeout: Duration) -> Vec<RawMessage> {
        let mut rx = self.rx.lock().await;
        let mut drained = Vec::new();

        for _ in 0..max_attempts {
            match timeout(poll_timeout, rx.recv()).await {
                Ok(Some(message)) => drained.push(message),
                // Producer gone and queue fully consumed.
                Ok(None) => break,
                // Empty attempt.
                Err(_) => continue,
            }
        }

        drained
    }
}
