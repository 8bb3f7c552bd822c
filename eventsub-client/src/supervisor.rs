//! Connection supervisor: the per-session background worker
//!
//! The worker owns the physical connection. It runs an explicit bounded retry
//! loop for the connect-and-handshake phase (Connecting -> Retrying ->
//! Active | Failed), then pumps frames into the delivery queue until the stop
//! token fires or the stream ends (Active -> Closed). A drop after the
//! handshake is not retried; re-establishment is the caller's policy.

use std::sync::Arc;

use eventsub_models::{RawMessage, WelcomeFrame};
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::queue::QueueSender;
use crate::session::SessionState;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Worker entry point, spawned once per session.
pub(crate) async fn run(
    state: Arc<SessionState>,
    url: String,
    config: ClientConfig,
    queue: QueueSender,
) {
    state.set_active(true);

    let established = tokio::select! {
        _ = state.stop_token().cancelled() => {
            debug!(%url, "stop requested before the session was established");
            None
        }
        result = establish(&state, &url, &config) => Some(result),
    };

    match established {
        Some(Ok(ws)) => {
            info!(%url, id = state.id(), "session established");
            read_loop(&state, &url, ws, &queue).await;
        }
        Some(Err(error)) => {
            warn!(%url, %error, "session could not be established");
            state.record_error(error);
        }
        None => {}
    }

    state.set_active(false);
}

/// Bounded connect-and-handshake loop.
///
/// Transient failures (refused, reset, handshake timeout) are retried up to
/// `max_retries` times with linear backoff; a fatal handshake failure or an
/// exhausted budget ends the loop.
async fn establish(
    state: &SessionState,
    url: &str,
    config: &ClientConfig,
) -> Result<WsStream, SessionError> {
    let mut attempt = 0u32;

    loop {
        match connect_and_handshake(state, url, config).await {
            Ok(ws) => return Ok(ws),
            Err(error) if error.is_transient() && attempt < config.max_retries => {
                let delay = config.backoff_delay(attempt);
                warn!(url, attempt, ?delay, %error, "connect attempt failed; retrying");
                sleep(delay).await;
                attempt += 1;
            }
            Err(error) if error.is_transient() => {
                return Err(SessionError::RetriesExhausted {
                    url: url.to_string(),
                    retries: config.max_retries,
                    source: Box::new(error),
                });
            }
            Err(error) => return Err(error),
        }
    }
}

/// One connect attempt: open the connection, read the first frame within the
/// handshake window, and record the session id it carries.
async fn connect_and_handshake(
    state: &SessionState,
    url: &str,
    config: &ClientConfig,
) -> Result<WsStream, SessionError> {
    let (mut ws, _response) =
        connect_async(url)
            .await
            .map_err(|source| SessionError::Connect {
                url: url.to_string(),
                source,
            })?;

    let first = match timeout(config.handshake_timeout, next_text_frame(&mut ws)).await {
        Ok(Some(text)) => text,
        Ok(None) => {
            return Err(SessionError::ConnectionClosed {
                url: url.to_string(),
            });
        }
        Err(_) => {
            return Err(SessionError::HandshakeTimeout {
                url: url.to_string(),
            });
        }
    };

    let welcome = WelcomeFrame::parse(&first)?;
    state.set_id(welcome.session_id());

    Ok(ws)
}

/// Next Text frame, skipping control and binary frames. `None` means the
/// stream ended first.
async fn next_text_frame(ws: &mut WsStream) -> Option<String> {
    while let Some(frame) = ws.next().await {
        match frame {
            Ok(Message::Text(text)) => return Some(text.to_string()),
            Ok(Message::Close(_)) => return None,
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
    None
}

/// Pump frames into the delivery queue until stopped or disconnected.
async fn read_loop(state: &SessionState, url: &str, mut ws: WsStream, queue: &QueueSender) {
    loop {
        tokio::select! {
            _ = state.stop_token().cancelled() => {
                debug!(url, "stop requested; leaving read loop");
                break;
            }
            frame = ws.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if !queue.push(RawMessage::new(text.to_string())) {
                        debug!(url, "delivery queue dropped; leaving read loop");
                        break;
                    }
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                Some(Ok(Message::Binary(_) | Message::Frame(_))) => {}
                Some(Ok(Message::Close(_))) => {
                    debug!(url, "peer closed the connection");
                    break;
                }
                Some(Err(error)) => {
                    warn!(url, %error, "connection dropped mid-session");
                    break;
                }
                None => {
                    debug!(url, "stream ended");
                    break;
                }
            }
        }
    }

    // Best-effort goodbye; the peer may already be gone.
    let _ = ws.close(None).await;
}
