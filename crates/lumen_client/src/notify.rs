//! Notification channel: a long-lived WebSocket that pushes "new messages
//! waiting" summaries while the session is active.
//!
//! Wire contract: the first outbound frame is the JSON access-token frame,
//! with no acknowledgement expected; every inbound text/binary frame is a
//! senderId -> unseen-count map. The first receive error of any kind (frame
//! that does not parse, transport error) stops the loop for good; there is
//! no reconnect. Callers close an idle or errored channel explicitly;
//! [`NotifyChannel::close`] is idempotent.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tracing::debug;

use lumen_proto::api::{AccessTokenFrame, NewMessageSummary};

use crate::error::ClientError;

/// Bounded buffer between the receive loop and the consumer.
const EVENT_BUFFER: usize = 32;

/// Handle to an open notification subscription.
pub struct NotifyChannel {
    events: mpsc::Receiver<NewMessageSummary>,
    reader: Option<JoinHandle<()>>,
}

impl NotifyChannel {
    /// Connect, authenticate with the first frame, and start the receive loop.
    pub(crate) async fn connect(ws_url: &str, access_token: &str) -> Result<Self, ClientError> {
        let (mut socket, _response) = tokio_tungstenite::connect_async(ws_url)
            .await
            .map_err(|e| ClientError::Channel(e.to_string()))?;

        let first = serde_json::to_string(&AccessTokenFrame {
            access_token: access_token.to_string(),
        })
        .map_err(|e| ClientError::Channel(e.to_string()))?;
        socket
            .send(WsMessage::Text(first))
            .await
            .map_err(|e| ClientError::Channel(e.to_string()))?;
        debug!("notification channel open");

        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let reader = tokio::spawn(async move {
            let (_write, mut read) = socket.split();
            while let Some(frame) = read.next().await {
                let payload = match frame {
                    Ok(WsMessage::Text(text)) => text.into_bytes(),
                    Ok(WsMessage::Binary(bytes)) => bytes,
                    // Ping/pong/close are the library's business.
                    Ok(_) => continue,
                    Err(e) => {
                        debug!("notification channel transport error, stopping: {e}");
                        break;
                    }
                };
                let summary: NewMessageSummary = match serde_json::from_slice(&payload) {
                    Ok(summary) => summary,
                    Err(e) => {
                        debug!("unparseable notification frame, stopping: {e}");
                        break;
                    }
                };
                if events_tx.send(summary).await.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            events: events_rx,
            reader: Some(reader),
        })
    }

    /// Next pushed summary. `None` once the channel has stopped, whether by
    /// [`NotifyChannel::close`] or by a receive error.
    pub async fn recv(&mut self) -> Option<NewMessageSummary> {
        self.events.recv().await
    }

    /// Terminate the connection and release its resources. Idempotent.
    pub fn close(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
            debug!("notification channel closed");
        }
        self.events.close();
    }
}

impl Drop for NotifyChannel {
    fn drop(&mut self) {
        self.close();
    }
}
