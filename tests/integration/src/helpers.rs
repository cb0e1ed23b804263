//! Test helpers for integration tests
//!
//! Provides a fake gateway that speaks real WebSocket, a fake REST API on
//! axum, and recording sinks for the bridge.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use relay_bridge::{ActivityLog, ChatSink};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

/// How long any single wait in a test may take
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Fake gateway
// ============================================================================

/// WebSocket server standing in for the platform gateway
pub struct FakeGateway {
    pub addr: SocketAddr,
    peers: mpsc::Receiver<GatewayPeer>,
    _handle: JoinHandle<()>,
}

impl FakeGateway {
    /// Bind to a free local port and start accepting
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (tx, peers) = mpsc::channel(16);

        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                match tokio_tungstenite::accept_async(stream).await {
                    Ok(ws) => {
                        if tx.send(GatewayPeer { ws }).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => eprintln!("fake gateway handshake failed: {e}"),
                }
            }
        });

        Ok(Self {
            addr,
            peers,
            _handle: handle,
        })
    }

    /// Gateway URL for `SessionConfig`
    pub fn url(&self) -> String {
        format!("ws://{}/?v=10&encoding=json", self.addr)
    }

    /// Wait for the next client connection
    pub async fn accept(&mut self) -> Result<GatewayPeer> {
        tokio::time::timeout(TEST_TIMEOUT, self.peers.recv())
            .await
            .context("timed out waiting for a gateway connection")?
            .context("fake gateway stopped")
    }

    /// Wait for a connection and run the Hello/Identify exchange
    ///
    /// Returns the peer and the Identify frame.
    pub async fn accept_identified(&mut self, heartbeat_ms: u64) -> Result<(GatewayPeer, Value)> {
        let mut peer = self.accept().await?;
        peer.send_json(&crate::fixtures::hello(heartbeat_ms)).await?;
        let identify = peer.recv_op(2).await?;
        Ok((peer, identify))
    }
}

/// Server side of one gateway connection
pub struct GatewayPeer {
    ws: WebSocketStream<TcpStream>,
}

impl GatewayPeer {
    pub async fn send_json(&mut self, frame: &Value) -> Result<()> {
        self.send_text(&frame.to_string()).await
    }

    pub async fn send_text(&mut self, text: &str) -> Result<()> {
        self.ws.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    /// Next JSON text frame from the client
    pub async fn recv_json(&mut self) -> Result<Value> {
        loop {
            let message = tokio::time::timeout(TEST_TIMEOUT, self.ws.next())
                .await
                .context("timed out waiting for a client frame")?
                .context("client disconnected")??;

            match message {
                Message::Text(text) => return Ok(serde_json::from_str(&text)?),
                Message::Close(frame) => anyhow::bail!("client closed: {frame:?}"),
                _ => continue,
            }
        }
    }

    /// Next frame with the given op, skipping heartbeats and anything else
    pub async fn recv_op(&mut self, op: u64) -> Result<Value> {
        loop {
            let frame = self.recv_json().await?;
            if frame["op"] == op {
                return Ok(frame);
            }
        }
    }

    /// Close with a gateway close code
    pub async fn close(&mut self, code: u16, reason: &str) -> Result<()> {
        self.ws
            .close(Some(CloseFrame {
                code: WsCloseCode::from(code),
                reason: reason.to_string().into(),
            }))
            .await?;
        Ok(())
    }

    /// Wait until the client closes the connection
    pub async fn expect_closed(&mut self) -> Result<()> {
        loop {
            let next = tokio::time::timeout(TEST_TIMEOUT, self.ws.next())
                .await
                .context("client did not close the connection")?;
            match next {
                None | Some(Ok(Message::Close(_)) | Err(_)) => return Ok(()),
                Some(Ok(_)) => continue,
            }
        }
    }
}

// ============================================================================
// Fake REST API
// ============================================================================

/// One request received by the fake API
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub channel_id: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

struct ApiState {
    requests: mpsc::UnboundedSender<RecordedRequest>,
    /// Statuses to answer with, in order, before falling back to 200
    scripted: Mutex<VecDeque<StatusCode>>,
}

/// axum server standing in for the platform's REST API
pub struct FakeRestApi {
    pub addr: SocketAddr,
    state: Arc<ApiState>,
    requests: mpsc::UnboundedReceiver<RecordedRequest>,
    _handle: JoinHandle<()>,
}

impl FakeRestApi {
    pub async fn start() -> Result<Self> {
        let (tx, requests) = mpsc::unbounded_channel();
        let state = Arc::new(ApiState {
            requests: tx,
            scripted: Mutex::new(VecDeque::new()),
        });

        let app = Router::new()
            .route("/api/v10/channels/:channel_id/messages", post(create_message))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            requests,
            _handle: handle,
        })
    }

    /// API base for `HttpRestClient`
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v10", self.addr)
    }

    /// Answer the next request with `status`
    pub fn respond_next_with(&self, status: StatusCode) {
        self.state.scripted.lock().push_back(status);
    }

    /// Wait for the next request
    pub async fn next_request(&mut self) -> Result<RecordedRequest> {
        tokio::time::timeout(TEST_TIMEOUT, self.requests.recv())
            .await
            .context("timed out waiting for a REST request")?
            .context("fake API stopped")
    }

    /// Check that no request arrives within `wait`
    pub async fn expect_no_request(&mut self, wait: Duration) -> Result<()> {
        match tokio::time::timeout(wait, self.requests.recv()).await {
            Err(_) => Ok(()),
            Ok(request) => anyhow::bail!("unexpected request: {request:?}"),
        }
    }
}

async fn create_message(
    State(state): State<Arc<ApiState>>,
    Path(channel_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let _ = state.requests.send(RecordedRequest {
        channel_id: channel_id.clone(),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body: body.clone(),
    });

    let status = state.scripted.lock().pop_front().unwrap_or(StatusCode::OK);
    if status.is_success() {
        (
            status,
            Json(json!({"id": "1", "channel_id": channel_id, "content": body["content"]})),
        )
    } else {
        (status, Json(json!({"message": "scripted failure", "code": 0})))
    }
}

// ============================================================================
// Sinks
// ============================================================================

/// Chat sink and activity log that forward every line to a channel
pub struct ChannelSink {
    lines: mpsc::UnboundedSender<String>,
}

impl ChannelSink {
    pub fn channel() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (lines, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { lines }), rx)
    }
}

impl ChatSink for ChannelSink {
    fn broadcast(&self, text: &str) {
        let _ = self.lines.send(text.to_string());
    }
}

impl ActivityLog for ChannelSink {
    fn log_activity(&self, _text: &str) {}
}

/// Receive the next line or fail after [`TEST_TIMEOUT`]
pub async fn next_line(lines: &mut mpsc::UnboundedReceiver<String>) -> Result<String> {
    tokio::time::timeout(TEST_TIMEOUT, lines.recv())
        .await
        .context("timed out waiting for a chat line")?
        .context("sink dropped")
}
