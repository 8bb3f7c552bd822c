//! Error types for frame parsing

use thiserror::Error;

/// Errors from parsing an inbound frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The frame body was not valid JSON or did not match the envelope shape.
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    /// The first frame was not a welcome, so it cannot carry the session id.
    #[error("expected a session_welcome frame, got message_type '{got}'")]
    UnexpectedType { got: String },

    /// A welcome frame whose session id is empty is unusable.
    #[error("welcome frame carries no session id")]
    MissingSessionId,
}
