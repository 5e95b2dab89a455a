//! Per-connection plumbing: one read pump feeding the router, one write
//! pump draining the bounded outbound queue. The two run as separate
//! tasks; whichever finishes first aborts the other, then the connection
//! is detached and the owning player marked disconnected.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use protocol::frames::ServerFrame;

use crate::hub::ConnectionId;
use crate::router::{self, Control};
use crate::state::AppState;

/// Drives one websocket from accept to teardown.
pub async fn serve_connection(state: Arc<AppState>, socket: WebSocket) {
    let (ws_sender, ws_receiver) = socket.split();
    let connection_id: ConnectionId = Uuid::new_v4();
    let (outbound_tx, outbound_rx) = mpsc::channel(state.config.outbound_queue);
    state.hub.register(connection_id, outbound_tx).await;
    tracing::debug!(connection = %connection_id, "connection registered");

    let write_deadline = Duration::from_millis(state.config.write_deadline_ms);
    let mut send_task =
        tokio::spawn(async move { write_pump(ws_sender, outbound_rx, write_deadline).await });
    let read_state = state.clone();
    let mut receive_task =
        tokio::spawn(async move { read_pump(read_state, connection_id, ws_receiver).await });

    // If any one of the tasks runs to completion, we abort the other.
    tokio::select! {
        _ = &mut send_task => { receive_task.abort(); }
        _ = &mut receive_task => { send_task.abort(); }
    }

    if let Some((game_id, player_id)) = state.hub.remove(&connection_id).await {
        router::mark_disconnected(&state, &game_id, &player_id).await;
    }
    tracing::debug!(connection = %connection_id, "connection closed");
}

/// Decodes inbound frames and hands them to the router. Oversize frames
/// and undecodable payloads are protocol errors that end the connection.
async fn read_pump(
    state: Arc<AppState>,
    connection_id: ConnectionId,
    mut receiver: SplitStream<WebSocket>,
) {
    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                if text.len() > state.config.max_frame_bytes {
                    tracing::warn!(
                        connection = %connection_id,
                        size = text.len(),
                        "oversize frame, closing"
                    );
                    state
                        .hub
                        .send(&connection_id, ServerFrame::error("frame too large"))
                        .await;
                    return;
                }
                match router::handle_frame(&state, connection_id, text.as_str()).await {
                    Control::Continue => {}
                    Control::Close => return,
                }
            }
            Ok(Message::Close(_)) => return,
            // Ping/pong and binary noise are ignored.
            Ok(_) => {}
            Err(error) => {
                tracing::debug!(connection = %connection_id, ?error, "unexpected close");
                return;
            }
        }
    }
}

/// Serializes and writes queued frames under a per-write deadline. Any
/// write failure or timeout ends the connection; a closed queue means
/// the hub detached us (displacement or slow-consumer drop) and we say
/// goodbye cleanly.
async fn write_pump(
    mut sender: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<ServerFrame>,
    deadline: Duration,
) {
    while let Some(frame) = outbound.recv().await {
        let encoded = match serde_json::to_string(&frame) {
            Ok(encoded) => encoded,
            Err(error) => {
                tracing::error!(?error, "failed to encode outbound frame");
                continue;
            }
        };
        match tokio::time::timeout(deadline, sender.send(Message::Text(encoded.into()))).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                tracing::debug!(?error, "write failed, closing");
                return;
            }
            Err(_) => {
                tracing::warn!("write deadline exceeded, closing");
                return;
            }
        }
    }
    let _ = sender.send(Message::Close(None)).await;
}
