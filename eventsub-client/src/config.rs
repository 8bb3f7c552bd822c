//! Client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for session establishment and supervision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Maximum connect retries before the worker gives up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries; the actual delay is linear in the
    /// attempt number, so the first retry happens immediately.
    #[serde(default = "default_base_backoff", with = "humantime_serde")]
    pub base_backoff: Duration,

    /// How long to wait for the welcome frame after a connection opens.
    #[serde(default = "default_handshake_timeout", with = "humantime_serde")]
    pub handshake_timeout: Duration,

    /// Tick of the wait loop inside [`get_session`](crate::EventSubClient::get_session).
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Overall bound on session establishment, covering all retries.
    #[serde(default = "default_overall_timeout", with = "humantime_serde")]
    pub overall_timeout: Duration,
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_backoff() -> Duration {
    Duration::from_secs(1)
}

fn default_handshake_timeout() -> Duration {
    Duration::from_secs(3)
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(100)
}

fn default_overall_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_backoff: default_base_backoff(),
            handshake_timeout: default_handshake_timeout(),
            poll_interval: default_poll_interval(),
            overall_timeout: default_overall_timeout(),
        }
    }
}

impl ClientConfig {
    /// Delay before the given retry attempt (0-indexed): zero for the first
    /// retry, then `base_backoff`, `2 * base_backoff`, and so on.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_backoff * attempt
    }
}
