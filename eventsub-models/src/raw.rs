//! Opaque message payloads

use crate::frame::{FrameMetadata, MessageKind};

/// A raw message payload as delivered by the peer.
///
/// The session layer does not interpret these beyond the handshake; they are
/// queued and drained in arrival order. [`RawMessage::kind`] is a convenience
/// for consumers that want to dispatch on the frame's `message_type` without
/// committing to a payload schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage(String);

impl RawMessage {
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Peek at the frame's metadata header, if it has one.
    pub fn metadata(&self) -> Option<FrameMetadata> {
        #[derive(serde::Deserialize)]
        struct Header {
            metadata: FrameMetadata,
        }
        serde_json::from_str::<Header>(&self.0)
            .ok()
            .map(|h| h.metadata)
    }

    /// The frame's message kind, if the payload carries a metadata header.
    pub fn kind(&self) -> Option<MessageKind> {
        self.metadata()
            .map(|m| MessageKind::from_type(&m.message_type))
    }
}

impl From<String> for RawMessage {
    fn from(payload: String) -> Self {
        Self(payload)
    }
}

impl std::fmt::Display for RawMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
