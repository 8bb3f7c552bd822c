//! In-process mock EventSub server for integration tests
//!
//! Accepts WebSocket connections on an ephemeral port. Depending on the mode
//! it greets each connection with a `session_welcome` frame (unique or fixed
//! id) or stays silent; frames pushed via `send_frame` go to every live
//! connection in order.
//!
//! Note: some helpers may appear unused because each integration test file is
//! compiled independently.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

/// How the server treats a freshly accepted connection.
#[derive(Debug, Clone, Copy)]
pub enum ServerMode {
    /// Send a welcome with a unique `mock_session_id:{uuid}` id.
    Welcome,
    /// Send a welcome with this exact session id.
    WelcomeWithId(&'static str),
    /// Accept the connection but never send anything.
    Silent,
}

pub struct MockEventServer {
    addr: SocketAddr,
    frames: broadcast::Sender<String>,
}

impl MockEventServer {
    pub async fn start(mode: ServerMode) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");
        let (frames, _) = broadcast::channel(64);

        let accept_frames = frames.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(handle_connection(stream, mode, accept_frames.subscribe()));
            }
        });

        Self { addr, frames }
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Push a text frame to every live connection.
    #[allow(dead_code)]
    pub fn send_frame(&self, frame: impl Into<String>) {
        let _ = self.frames.send(frame.into());
    }

    /// A well-formed `session_welcome` frame for the given session id.
    pub fn welcome_frame(session_id: &str) -> String {
        serde_json::json!({
            "metadata": {
                "message_id": Uuid::new_v4().to_string(),
                "message_type": "session_welcome",
                "message_timestamp": "2025-09-09T03:19:44.990Z",
            },
            "payload": {
                "session": {
                    "id": session_id,
                    "status": "connected",
                    "connected_at": "2025-09-09T03:19:44.986Z",
                    "keepalive_timeout_seconds": 10,
                    "reconnect_url": null,
                }
            }
        })
        .to_string()
    }

    /// A notification frame with a recognizable payload.
    #[allow(dead_code)]
    pub fn notification_frame(body: &str) -> String {
        serde_json::json!({
            "metadata": {
                "message_id": Uuid::new_v4().to_string(),
                "message_type": "notification",
                "message_timestamp": "2025-09-09T03:19:45.000Z",
            },
            "payload": {"event": {"message": body}},
        })
        .to_string()
    }
}

async fn handle_connection(
    stream: TcpStream,
    mode: ServerMode,
    mut frames: broadcast::Receiver<String>,
) {
    let Ok(mut ws) = accept_async(stream).await else {
        return;
    };

    match mode {
        ServerMode::Welcome => {
            let id = format!("mock_session_id:{}", Uuid::new_v4());
            let greeting = MockEventServer::welcome_frame(&id);
            if ws.send(Message::Text(greeting.into())).await.is_err() {
                return;
            }
        }
        ServerMode::WelcomeWithId(id) => {
            let greeting = MockEventServer::welcome_frame(id);
            if ws.send(Message::Text(greeting.into())).await.is_err() {
                return;
            }
        }
        ServerMode::Silent => {}
    }

    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(text) => {
                    if ws.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            incoming = ws.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
}
