//! Error types for eventsub-client

use std::time::Duration;

use eventsub_models::FrameError;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors surfaced by session establishment and supervision.
///
/// Transient transport failures are absorbed by the supervisor's retry loop;
/// callers only ever see [`SessionError::RetriesExhausted`],
/// [`SessionError::OverallTimeout`], or a fatal handshake failure.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Transport-level failure while opening the connection.
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    /// The peer accepted the connection but sent nothing in time.
    #[error("no handshake received from {url} within the handshake timeout")]
    HandshakeTimeout { url: String },

    /// The connection dropped before the handshake completed.
    #[error("connection to {url} closed before the handshake")]
    ConnectionClosed { url: String },

    /// The first frame was not a usable `session_welcome`.
    #[error("handshake failed: {0}")]
    Handshake(#[from] FrameError),

    /// Transient failures persisted past the retry budget.
    #[error("connection to {url} failed after {retries} retries")]
    RetriesExhausted {
        url: String,
        retries: u32,
        #[source]
        source: Box<SessionError>,
    },

    /// Neither a session id nor a terminal error arrived in time.
    #[error("no session established for {url} within {waited:?}")]
    OverallTimeout { url: String, waited: Duration },

    /// The handle has no session id yet, so it cannot be registered.
    #[error("session has no id yet; cannot register")]
    NotRegistered,
}

impl SessionError {
    /// Whether the supervisor may retry the connect attempt that produced
    /// this error. Handshake parse failures are fatal: a peer that speaks the
    /// wrong protocol will not start speaking the right one on retry.
    pub(crate) fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::HandshakeTimeout { .. } | Self::ConnectionClosed { .. }
        )
    }
}
