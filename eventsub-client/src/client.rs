//! Orchestrator: the synchronous face of session establishment
//!
//! `get_session` spawns a supervisor worker and polls the shared state at a
//! fixed interval until the handshake lands, the worker records a terminal
//! error, or the overall timeout elapses. Every exit path either returns a
//! registered handle or reclaims the worker before failing.

use std::sync::Arc;
use std::time::Instant;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::queue;
use crate::registry::SessionRegistry;
use crate::session::{SessionHandle, SessionState};
use crate::supervisor;

/// Spawn a supervisor worker for `url` and return its handle immediately.
///
/// Most callers want [`EventSubClient::get_session`], which also waits for
/// the handshake; this primitive exists for callers that manage the wait
/// themselves.
pub fn start_session(url: &str, config: ClientConfig) -> Arc<SessionHandle> {
    let state = Arc::new(SessionState::new());
    let (sender, message_queue) = queue::channel();

    let worker = tokio::spawn(supervisor::run(
        Arc::clone(&state),
        url.to_string(),
        config,
        sender,
    ));

    Arc::new(SessionHandle::new(
        url.to_string(),
        state,
        message_queue,
        worker,
    ))
}

/// Entry point for establishing and tracking sessions.
pub struct EventSubClient {
    config: ClientConfig,
    registry: SessionRegistry,
}

impl EventSubClient {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            registry: SessionRegistry::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Establish a session against `url` and register it.
    ///
    /// Returns once the handshake has assigned a session id, or fails with
    /// the worker's terminal error or [`SessionError::OverallTimeout`]. On
    /// either failure the worker is closed before the error is returned, so
    /// no background task leaks.
    ///
    /// If a handshake lands in the same tick in which an earlier terminal
    /// error was recorded, the handshake wins: a session that came up after
    /// retries is still a session.
    pub async fn get_session(&self, url: &str) -> Result<Arc<SessionHandle>, SessionError> {
        let handle = start_session(url, self.config.clone());
        let started = Instant::now();

        loop {
            if let Some(id) = handle.id() {
                info!(url, id, "session ready");
                self.registry.register(Arc::clone(&handle)).await?;
                return Ok(handle);
            }

            if let Some(error) = handle.take_terminal_error() {
                debug!(url, %error, "session failed; reclaiming worker");
                handle.close().await;
                return Err(error);
            }

            if started.elapsed() >= self.config.overall_timeout {
                debug!(url, "overall timeout elapsed; reclaiming worker");
                handle.close().await;
                return Err(SessionError::OverallTimeout {
                    url: url.to_string(),
                    waited: started.elapsed(),
                });
            }

            sleep(self.config.poll_interval).await;
        }
    }

    /// Close one registered session; see [`SessionRegistry::close`].
    pub async fn close_session(&self, id: &str) {
        self.registry.close(id).await;
    }

    /// Close every registered session; see [`SessionRegistry::close_all`].
    pub async fn close_all(&self) {
        self.registry.close_all().await;
    }
}

impl Default for EventSubClient {
    fn default() -> Self {
        Self::new()
    }
}
