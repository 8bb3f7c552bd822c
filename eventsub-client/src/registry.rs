//! Registry of live sessions
//!
//! An explicit value owned by the application (no global state), so tests can
//! run independent registries side by side. Entries are added only after the
//! handshake assigned an id and removed when a session is closed.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::SessionError;
use crate::session::SessionHandle;

/// Tracks live session handles by session id.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handle, keyed by its session id.
    ///
    /// Fails with [`SessionError::NotRegistered`] if the handshake has not
    /// assigned an id yet.
    pub async fn register(&self, handle: Arc<SessionHandle>) -> Result<(), SessionError> {
        let id = handle
            .id()
            .ok_or(SessionError::NotRegistered)?
            .to_string();
        debug!(%id, url = handle.url(), "registering session");
        self.sessions.write().await.insert(id, handle);
        Ok(())
    }

    /// Close one session and drop it from the registry.
    ///
    /// A no-op for an unknown id, and safe to call twice for the same id.
    pub async fn close(&self, id: &str) {
        let handle = self.sessions.write().await.remove(id);
        if let Some(handle) = handle {
            debug!(id, "closing session");
            handle.close().await;
        }
    }

    /// Close every registered session and empty the registry.
    pub async fn close_all(&self) {
        let handles: Vec<_> = self.sessions.write().await.drain().collect();
        for (id, handle) in handles {
            debug!(%id, "closing session");
            handle.close().await;
        }
    }

    /// Ids of every registered session, in no particular order.
    pub async fn session_ids(&self) -> Vec<String> {
        self.sessions.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
