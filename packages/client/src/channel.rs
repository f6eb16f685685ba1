//! WebSocket transport channel.
//!
//! Wraps one WebSocket connection and exposes:
//! - an [`EventSink`] for outbound `ClientEvent`s (the state machine and the
//!   timer bridge never touch the socket type),
//! - an inbound stream of parsed `ServerEvent`s,
//! - an observable [`ConnectionState`] through a watch channel.
//!
//! Transport failures surface as connection-state transitions, never as
//! panics into the caller. Reconnection is driven by the runner: it observes
//! the state and re-connects with a bounded attempt count and fixed backoff
//! (`MAX_RECONNECT_ATTEMPTS` / `RECONNECT_INTERVAL_SECS`), except after a
//! server-initiated close, which is terminal.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use tomodoro_server::infrastructure::dto::websocket::{ClientEvent, ServerEvent};

use crate::error::ClientError;

/// Bounded retry count for (re)connection attempts
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Fixed backoff between reconnection attempts
pub const RECONNECT_INTERVAL_SECS: u64 = 3;

/// Observable connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    /// Connection lost; the runner may retry
    Disconnected,
    /// The server closed the connection; retry is suppressed
    ClosedByServer,
}

/// Outbound event sink, the seam between the session logic and the socket
pub trait EventSink: Send + Sync {
    /// Queue an event for delivery. Fails fast with `NotConnected` when the
    /// channel is down.
    fn send(&self, event: &ClientEvent) -> Result<(), ClientError>;

    /// Whether the channel currently believes it is connected
    fn is_connected(&self) -> bool;
}

/// Handle to one live WebSocket connection
pub struct SocketChannel {
    outbound: mpsc::UnboundedSender<String>,
    state_rx: watch::Receiver<ConnectionState>,
}

impl SocketChannel {
    /// Connect to the server and split the socket into a write task and a
    /// read task.
    ///
    /// # Returns
    ///
    /// The channel handle plus the inbound stream of parsed server events.
    /// The inbound stream ends when the connection drops; the final
    /// connection state tells the caller whether a retry makes sense.
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ServerEvent>), ClientError> {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);

        let (ws_stream, _response) = connect_async(url)
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

        let _ = state_tx.send(ConnectionState::Connected);
        tracing::info!("Connected to session registry at {}", url);

        let (mut write, mut read) = ws_stream.split();

        // Outbound: serialized events queued by the sink
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<String>();
        let write_state_tx = state_tx.clone();
        tokio::spawn(async move {
            while let Some(json) = outbound_rx.recv().await {
                if let Err(e) = write.send(Message::Text(json.into())).await {
                    tracing::warn!("Failed to send event: {}", e);
                    let _ = write_state_tx.send(ConnectionState::Disconnected);
                    break;
                }
            }
        });

        // Inbound: parsed server events
        let (events_tx, events_rx) = mpsc::unbounded_channel::<ServerEvent>();
        tokio::spawn(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(event) => {
                                if events_tx.send(event).is_err() {
                                    // Receiver gone, the session loop ended.
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(
                                    "Failed to parse server event: {} (payload: {})",
                                    e,
                                    text
                                );
                            }
                        }
                    }
                    Ok(Message::Close(_)) => {
                        tracing::info!("Server closed the connection");
                        let _ = state_tx.send(ConnectionState::ClosedByServer);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        let _ = state_tx.send(ConnectionState::Disconnected);
                        break;
                    }
                    _ => {}
                }
            }

            // Stream ended without an explicit close or error.
            if *state_tx.borrow() == ConnectionState::Connected {
                let _ = state_tx.send(ConnectionState::Disconnected);
            }
        });

        Ok((Self { outbound, state_rx }, events_rx))
    }

    /// Subscribe to connection-state transitions
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }
}

impl EventSink for SocketChannel {
    fn send(&self, event: &ClientEvent) -> Result<(), ClientError> {
        match *self.state_rx.borrow() {
            ConnectionState::Connected => {}
            ConnectionState::ClosedByServer => return Err(ClientError::ClosedByServer),
            _ => return Err(ClientError::NotConnected),
        }
        let json = serde_json::to_string(event)
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
        self.outbound
            .send(json)
            .map_err(|_| ClientError::NotConnected)
    }

    fn is_connected(&self) -> bool {
        *self.state_rx.borrow() == ConnectionState::Connected
    }
}
