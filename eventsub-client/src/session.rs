//! Session handle and shared session state
//!
//! The worker is the single writer of `id`, `active`, and the terminal error;
//! the orchestrator, registry, and consumer only read them. The stop token is
//! the one-shot cancellation signal: once set it is never cleared.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, OnceLock};
use std::time::Duration;

use eventsub_models::RawMessage;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::queue::MessageQueue;

/// State shared between the worker and everything observing it.
pub(crate) struct SessionState {
    id: OnceLock<String>,
    active: AtomicBool,
    stop: CancellationToken,
    terminal_error: StdMutex<Option<SessionError>>,
}

impl SessionState {
    pub(crate) fn new() -> Self {
        Self {
            id: OnceLock::new(),
            active: AtomicBool::new(false),
            stop: CancellationToken::new(),
            terminal_error: StdMutex::new(None),
        }
    }

    pub(crate) fn id(&self) -> Option<&str> {
        self.id.get().map(String::as_str)
    }

    /// Record the session id from a handshake. A handshake on a retried
    /// connection never overwrites an id assigned earlier.
    pub(crate) fn set_id(&self, id: &str) {
        if self.id.set(id.to_string()).is_err() {
            debug!(id, "session id already assigned; keeping the original");
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Release);
    }

    pub(crate) fn stop_token(&self) -> &CancellationToken {
        &self.stop
    }

    /// Record the terminal failure; only the first one sticks.
    pub(crate) fn record_error(&self, error: SessionError) {
        let mut slot = self
            .terminal_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.is_none() {
            *slot = Some(error);
        }
    }

    pub(crate) fn take_error(&self) -> Option<SessionError> {
        self.terminal_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

/// A live (or closing) session.
///
/// Cheap to share behind an [`Arc`]; the registry and the consumer hold the
/// same handle the orchestrator returned.
pub struct SessionHandle {
    url: String,
    state: Arc<SessionState>,
    queue: MessageQueue,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SessionHandle {
    pub(crate) fn new(
        url: String,
        state: Arc<SessionState>,
        queue: MessageQueue,
        worker: JoinHandle<()>,
    ) -> Self {
        Self {
            url,
            state,
            queue,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// The endpoint this session was opened against.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The session id assigned by the handshake, or `None` before it lands.
    /// Once assigned it never changes.
    pub fn id(&self) -> Option<&str> {
        self.state.id()
    }

    /// True while the worker loop is running.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// True once close has been requested. Never reverts.
    pub fn stop_requested(&self) -> bool {
        self.state.stop_token().is_cancelled()
    }

    pub(crate) fn take_terminal_error(&self) -> Option<SessionError> {
        self.state.take_error()
    }

    /// Drain queued payloads; see [`MessageQueue::drain`].
    pub async fn drain(&self, max_attempts: usize, poll_timeout: Duration) -> Vec<RawMessage> {
        self.queue.drain(max_attempts, poll_timeout).await
    }

    /// Signal the worker to stop and wait for it to exit.
    ///
    /// Idempotent: the first call joins the worker, later calls return
    /// immediately.
    pub async fn close(&self) {
        self.state.stop_token().cancel();

        let worker = self.worker.lock().await.take();
        if let Some(worker) = worker {
            debug!(url = %self.url, "waiting for session worker to exit");
            if let Err(error) = worker.await {
                warn!(url = %self.url, %error, "session worker did not exit cleanly");
            }
        }
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("url", &self.url)
            .field("id", &self.id())
            .field("active", &self.is_active())
            .field("stop_requested", &self.stop_requested())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue;

    fn stub_state() -> Arc<SessionState> {
        Arc::new(SessionState::new())
    }

    #[test]
    fn id_is_assigned_at_most_once() {
        let state = stub_state();
        assert!(state.id().is_none());

        state.set_id("S1");
        state.set_id("S2");
        assert_eq!(state.id(), Some("S1"));
    }

    #[test]
    fn terminal_error_is_recorded_at_most_once() {
        let state = stub_state();
        state.record_error(SessionError::HandshakeTimeout {
            url: "ws://a".to_string(),
        });
        state.record_error(SessionError::NotRegistered);

        let error = state.take_error().unwrap();
        assert!(matches!(error, SessionError::HandshakeTimeout { .. }));
        assert!(state.take_error().is_none());
    }

    #[tokio::test]
    async fn close_is_idempotent_and_joins_once() {
        let state = stub_state();
        let (_tx, message_queue) = queue::channel();

        let worker_state = Arc::clone(&state);
        worker_state.set_active(true);
        let worker = tokio::spawn({
            let worker_state = Arc::clone(&worker_state);
            async move {
                worker_state.stop_token().cancelled().await;
                worker_state.set_active(false);
            }
        });

        let handle = SessionHandle::new("ws://a".to_string(), state, message_queue, worker);
        assert!(handle.is_active());

        handle.close().await;
        assert!(!handle.is_active());
        assert!(handle.stop_requested());

        // Second close must neither hang nor error.
        handle.close().await;
        assert!(!handle.is_active());
    }
}
