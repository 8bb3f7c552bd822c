//! EventSub frame envelopes
//!
//! Every frame the service sends wraps its body in a `metadata` header plus a
//! `payload` object. The session layer only ever parses the welcome frame; the
//! metadata header is exposed so consumers can branch on `message_type` for
//! the frames delivered after the handshake.

use serde::Deserialize;

use crate::error::FrameError;

/// The `message_type` value carried by the handshake frame.
pub const MESSAGE_TYPE_WELCOME: &str = "session_welcome";

/// Header common to every frame.
#[derive(Debug, Clone, Deserialize)]
pub struct FrameMetadata {
    pub message_id: String,
    pub message_type: String,
    pub message_timestamp: String,
}

/// Known `message_type` discriminators.
///
/// The session layer itself only branches on [`MessageKind::Welcome`];
/// the rest exist for consumers dispatching drained payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Welcome,
    Keepalive,
    Notification,
    Reconnect,
    Revocation,
    Other(String),
}

impl MessageKind {
    /// Map a raw `message_type` string to its discriminator.
    pub fn from_type(message_type: &str) -> Self {
        match message_type {
            MESSAGE_TYPE_WELCOME => Self::Welcome,
            "session_keepalive" => Self::Keepalive,
            "notification" => Self::Notification,
            "session_reconnect" => Self::Reconnect,
            "revocation" => Self::Revocation,
            other => Self::Other(other.to_string()),
        }
    }
}

/// The handshake frame: first frame received after connecting.
#[derive(Debug, Clone, Deserialize)]
pub struct WelcomeFrame {
    pub metadata: FrameMetadata,
    pub payload: WelcomePayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WelcomePayload {
    pub session: WelcomeSession,
}

/// Session descriptor nested inside the welcome payload.
#[derive(Debug, Clone, Deserialize)]
pub struct WelcomeSession {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub connected_at: Option<String>,
    #[serde(default)]
    pub keepalive_timeout_seconds: Option<u64>,
    #[serde(default)]
    pub reconnect_url: Option<String>,
}

/// Envelope used to read the metadata header before committing to a shape.
#[derive(Debug, Deserialize)]
struct Envelope {
    metadata: FrameMetadata,
    #[serde(default)]
    payload: serde_json::Value,
}

impl WelcomeFrame {
    /// Parse the first inbound frame as a handshake.
    ///
    /// The `message_type` is checked before the session id is trusted: a
    /// keepalive or notification arriving first is rejected rather than
    /// misread as a welcome.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        if envelope.metadata.message_type != MESSAGE_TYPE_WELCOME {
            return Err(FrameError::UnexpectedType {
                got: envelope.metadata.message_type,
            });
        }

        let payload: WelcomePayload = serde_json::from_value(envelope.payload)?;
        if payload.session.id.is_empty() {
            return Err(FrameError::MissingSessionId);
        }

        Ok(Self {
            metadata: envelope.metadata,
            payload,
        })
    }

    /// The session id assigned by the service.
    pub fn session_id(&self) -> &str {
        &self.payload.session.id
    }
}
