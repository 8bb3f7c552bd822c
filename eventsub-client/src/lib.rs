//! eventsub-client: session lifecycle supervisor for EventSub WebSocket
//! connections.
//!
//! This crate provides:
//!
//! - **Session establishment** - [`EventSubClient::get_session`] connects,
//!   waits for the `session_welcome` handshake, and returns a live
//!   [`SessionHandle`] or a typed error
//! - **Supervision** - a background worker per session with bounded
//!   linear-backoff retry on transient connect failures
//! - **Delivery** - an ordered queue of raw payloads drained in bounded
//!   attempts via [`SessionHandle::drain`]
//! - **Teardown** - cooperative, idempotent close of one session or every
//!   registered session through [`SessionRegistry`]
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use eventsub_client::EventSubClient;
//!
//! # async fn example() -> Result<(), eventsub_client::SessionError> {
//! let client = EventSubClient::new();
//! let session = client.get_session("wss://eventsub.wss.twitch.tv/ws").await?;
//!
//! for message in session.drain(10, Duration::from_millis(100)).await {
//!     println!("{message}");
//! }
//!
//! client.close_all().await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod queue;
pub mod registry;
pub mod session;

mod supervisor;

pub use client::{EventSubClient, start_session};
pub use config::ClientConfig;
pub use error::SessionError;
pub use eventsub_models::RawMessage;
pub use queue::MessageQueue;
pub use registry::SessionRegistry;
pub use session::SessionHandle;
