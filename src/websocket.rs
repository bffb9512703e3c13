//! WebSocket handlers for real-time updates
//!
//! This module handles WebSocket connections for streaming agent status and
//! progress events to connected clients. Clients receive an initial snapshot
//! of the registry, then every `AgentEvent` the orchestrator broadcasts.
//! Supports ping/pong for connection keepalive.

use crate::api::RouterState;
use crate::events::AgentEvent;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{error, info, warn};

/// Control messages clients may send over the socket
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Ping message for connection keepalive
    #[serde(rename = "ping")]
    Ping,
    /// Pong message responding to ping
    #[serde(rename = "pong")]
    Pong,
}

/// WebSocket upgrade handler
///
/// Handles WebSocket connection upgrade and sets up message handlers.
/// Sends initial state to the client and maintains connection with ping/pong.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<RouterState>,
) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: RouterState) {
    let (mut sender, mut receiver) = socket.split();

    info!("WebSocket client connected");

    // Send initial state
    let initial_state = {
        let app = state.orchestrator.state().read().await;
        let agents: Vec<_> = app
            .registry
            .list()
            .iter()
            .map(|agent| {
                serde_json::json!({
                    "id": agent.id,
                    "name": agent.name,
                    "category": agent.category,
                    "status": agent.status,
                    "progress": agent.progress,
                })
            })
            .collect();

        serde_json::json!({
            "type": "initial_state",
            "agents": agents,
        })
    };

    if let Err(e) = sender.send(Message::Text(initial_state.to_string())).await {
        error!("Failed to send initial state: {}", e);
        return;
    }

    // Use a channel to fan sender access between the forwarding tasks
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Message>();

    // Task to forward messages from channel to sender
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = sender.send(msg).await {
                error!("Failed to send message: {}", e);
                break;
            }
        }
    });

    // Task to forward agent events to the client
    let event_tx = tx.clone();
    let events = state.orchestrator.subscribe();
    let mut event_task = tokio::spawn(async move {
        let mut stream = BroadcastStream::new(events);
        while let Some(event) = stream.next().await {
            let event: AgentEvent = match event {
                Ok(event) => event,
                // Lagged subscribers skip missed events and keep going
                Err(_) => continue,
            };
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if event_tx.send(Message::Text(json)).is_err() {
                        break;
                    }
                }
                Err(e) => error!("Failed to serialize agent event: {}", e),
            }
        }
    });

    // Task to send periodic pings
    let ping_tx = tx.clone();
    let mut ping_task = tokio::spawn(async move {
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(30)).await;
            if ping_tx.send(Message::Ping(vec![])).is_err() {
                break;
            }
        }
    });

    // Receive messages
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Ok(client_msg) = serde_json::from_str::<ClientMessage>(&text) {
                        match client_msg {
                            ClientMessage::Ping => {
                                // Respond to ping
                                if let Ok(pong) = serde_json::to_string(&ClientMessage::Pong) {
                                    if tx.send(Message::Text(pong)).is_err() {
                                        break;
                                    }
                                }
                            }
                            other => {
                                warn!("Received unhandled WebSocket message: {:?}", other);
                            }
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    info!("WebSocket client disconnected");
                    break;
                }
                Ok(Message::Pong(_)) => {
                    // Client responded to ping
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for any task to complete
    tokio::select! {
        _ = &mut send_task => {
            event_task.abort();
            ping_task.abort();
            recv_task.abort();
        }
        _ = &mut event_task => {
            send_task.abort();
            ping_task.abort();
            recv_task.abort();
        }
        _ = &mut ping_task => {
            send_task.abort();
            event_task.abort();
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
            event_task.abort();
            ping_task.abort();
        }
    }

    info!("WebSocket connection closed");
}
