//! eventsub-models: wire-frame types for the EventSub WebSocket protocol.
//!
//! This crate covers only the envelope the session layer needs to understand:
//! the `session_welcome` handshake frame and the `metadata` header common to
//! every frame. Everything after the handshake is delivered to consumers as an
//! opaque [`RawMessage`]; interpreting notification payloads is their job.

pub mod error;
pub mod frame;
pub mod raw;

pub use error::FrameError;
pub use frame::{FrameMetadata, MessageKind, WelcomeFrame, WelcomePayload, WelcomeSession};
pub use raw::RawMessage;
