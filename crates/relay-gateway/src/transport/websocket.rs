//! WebSocket transport over `tokio-tungstenite`

use super::{GatewayTransport, InboundFrame, TransportChannels};
use crate::error::TransportError;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Channel buffer size for frames in each direction
const FRAME_BUFFER_SIZE: usize = 100;

/// Connects with `tokio_tungstenite::connect_async` (TLS for `wss://`)
#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    buffer: usize,
}

impl WebSocketTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: FRAME_BUFFER_SIZE,
        }
    }

    #[must_use]
    pub fn with_buffer(buffer: usize) -> Self {
        Self {
            buffer: buffer.max(1),
        }
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GatewayTransport for WebSocketTransport {
    async fn connect(&self, url: &str) -> Result<TransportChannels, TransportError> {
        let (socket, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        tracing::debug!(url = %url, "WebSocket connection established");

        let (mut ws_sink, mut ws_stream) = socket.split();
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(self.buffer);
        let (inbound_tx, inbound_rx) = mpsc::channel::<InboundFrame>(self.buffer);

        // Writer: drains outbound frames until the session drops its sender
        tokio::spawn(async move {
            while let Some(text) = outbound_rx.recv().await {
                if let Err(e) = ws_sink.send(Message::Text(text)).await {
                    tracing::warn!(error = %e, "Failed to write gateway frame");
                    break;
                }
            }

            // Close the WebSocket when channel is closed
            let _ = ws_sink.close().await;
        });

        // Reader: forwards frames until the socket ends
        tokio::spawn(async move {
            let closed = loop {
                let frame = match ws_stream.next().await {
                    Some(Ok(Message::Text(text))) => InboundFrame::Data(text.into_bytes()),
                    Some(Ok(Message::Binary(bytes))) => InboundFrame::Data(bytes),
                    Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                    Some(Ok(Message::Close(frame))) => {
                        break match frame {
                            Some(frame) => InboundFrame::Closed {
                                code: Some(u16::from(frame.code)),
                                reason: frame.reason.into_owned(),
                            },
                            None => InboundFrame::Closed {
                                code: None,
                                reason: "closed without status".to_string(),
                            },
                        };
                    }
                    Some(Err(e)) => {
                        break InboundFrame::Closed {
                            code: None,
                            reason: e.to_string(),
                        };
                    }
                    None => {
                        break InboundFrame::Closed {
                            code: None,
                            reason: "end of stream".to_string(),
                        };
                    }
                };

                if inbound_tx.send(frame).await.is_err() {
                    // Session is gone
                    return;
                }
            };

            let _ = inbound_tx.send(closed).await;
        });

        Ok(TransportChannels {
            outbound: outbound_tx,
            inbound: inbound_rx,
        })
    }
}
