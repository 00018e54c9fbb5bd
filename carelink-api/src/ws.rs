//! WebSocket realtime gateway.
//!
//! Connected clients receive live mutation and notification events. Each
//! authenticated user effectively joins their own channel: one tokio
//! broadcast channel fans out [`Outbound`] envelopes to every connection,
//! and a per-connection filter forwards only events scoped to that user
//! (plus unscoped broadcasts).
//!
//! The gateway holds no per-connection durable queue. Events emitted while a
//! user is disconnected are lost at the transport layer and recovered via
//! the next cache-backed read; reconnection is the client's responsibility.

use crate::auth::AuthContext;
use crate::error::ApiResult;
use crate::events::{Outbound, Recipient, WsEvent};
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use carelink_core::UserId;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// WebSocket state shared across the application.
#[derive(Debug)]
pub struct WsState {
    /// Broadcast channel distributing outbound envelopes to all connections.
    /// Each connection subscribes and filters by its own user id.
    tx: broadcast::Sender<Outbound>,
}

impl WsState {
    /// Create a new WebSocket state with the specified channel capacity.
    ///
    /// The capacity determines how many events can be buffered before slow
    /// consumers start dropping messages.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Push an envelope into the fan-out channel.
    ///
    /// Non-blocking. With no connected clients the envelope is dropped,
    /// which is fine: missed events are recovered via the next read.
    pub fn send(&self, outbound: Outbound) {
        let event_type = outbound.event.event_type();
        match self.tx.send(outbound) {
            Ok(receiver_count) => {
                debug!(event_type, receivers = receiver_count, "Pushed event");
            }
            Err(_) => {
                debug!(event_type, "No receivers for event");
            }
        }
    }

    /// Push an event to every connected client.
    pub fn broadcast_all(&self, event: WsEvent) {
        self.send(Outbound::broadcast(event));
    }

    /// Push an event to one user's channel.
    pub fn send_to_user(&self, user_id: UserId, event: WsEvent) {
        self.send(Outbound::to_user(user_id, event));
    }

    /// Subscribe to the envelope stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Outbound> {
        self.tx.subscribe()
    }
}

/// WebSocket upgrade handler for GET /api/v1/ws.
///
/// The client must carry a valid identity; the upgraded connection is bound
/// to `auth.user_id` and that binding is what realizes the per-user channel.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Response> {
    info!(user_id = %auth.user_id, role = %auth.role, "WebSocket connection request");

    let ws_state = Arc::clone(&state.ws);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, ws_state, auth.user_id)))
}

/// Handle an individual WebSocket connection for its lifetime.
async fn handle_socket(socket: WebSocket, state: Arc<WsState>, user_id: UserId) {
    info!(user_id = %user_id, "WebSocket connected");

    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.subscribe();

    // Confirm the channel binding to the client.
    let connected = WsEvent::Connected { user_id };
    if let Err(e) = send_event(&mut sender, connected).await {
        error!(user_id = %user_id, error = %e, "Failed to send connected event");
        return;
    }

    // Drain incoming frames; the protocol is push-only, so anything beyond
    // keepalives and the close frame is ignored.
    let recv_user = user_id;
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    debug!(user_id = %recv_user, "Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    debug!(user_id = %recv_user, "Keepalive frame");
                }
                Ok(Message::Text(text)) => {
                    debug!(user_id = %recv_user, text = %text, "Ignoring inbound text frame");
                }
                Ok(Message::Binary(data)) => {
                    debug!(user_id = %recv_user, len = data.len(), "Ignoring inbound binary frame");
                }
                Err(e) => {
                    warn!(user_id = %recv_user, error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    // Main loop: forward scoped events to the client.
    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(outbound) => {
                        if should_send(&outbound, user_id) {
                            if let Err(e) = send_event(&mut sender, outbound.event).await {
                                error!(
                                    user_id = %user_id,
                                    error = %e,
                                    "Failed to send event, closing connection"
                                );
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(user_id = %user_id, skipped, "Client lagged, events dropped");
                        let lagged = WsEvent::Error {
                            message: format!("Lagged: {} events dropped", skipped),
                        };
                        if let Err(e) = send_event(&mut sender, lagged).await {
                            error!(user_id = %user_id, error = %e, "Failed to send lag notice");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!(user_id = %user_id, "Event channel closed");
                        break;
                    }
                }
            }

            // Client disconnected.
            _ = &mut recv_task => {
                debug!(user_id = %user_id, "Receiver task finished");
                break;
            }
        }
    }

    info!(user_id = %user_id, "WebSocket disconnected");
}

/// Serialize an event and send it as a text frame.
async fn send_event(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    event: WsEvent,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(&event).map_err(|e| {
        error!(error = %e, "Failed to serialize event");
        axum::Error::new(e)
    })?;

    sender.send(Message::Text(json)).await
}

/// Whether an envelope should reach the connection bound to `user_id`.
fn should_send(outbound: &Outbound, user_id: UserId) -> bool {
    match outbound.recipient {
        Recipient::Broadcast => true,
        Recipient::User(recipient) => recipient == user_id,
    }
}
