//! `WebSocket` handler for real-time board streaming.
//!
//! Clients connect to `GET /ws/board`, immediately receive the cached
//! board, then a JSON-encoded [`BoardBroadcast`] every time the board is
//! rebuilt (refresh tick or write).
//!
//! If a client falls behind, lagged messages are skipped and the client
//! resumes from the most recent board.
//!
//! [`BoardBroadcast`]: crate::state::BoardBroadcast

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::{AppState, BoardBroadcast};

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming boards.
///
/// # Route
///
/// `GET /ws/board`
pub async fn ws_board(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Serialize and send one board. Returns `false` once the client is gone.
async fn send_board(socket: &mut WebSocket, board: &BoardBroadcast) -> bool {
    let json = match serde_json::to_string(board) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize board broadcast: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

/// Handle the `WebSocket` lifecycle: send the cached board, subscribe to
/// the broadcast channel and forward each board as a text frame.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    // Subscribe before reading the cache so no rebuild is missed in between.
    let mut rx = state.subscribe();
    let initial = state.cached_board().await;
    if !send_board(&mut socket, &initial).await {
        debug!("WebSocket client disconnected (initial send failed)");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(board) => {
                        if !send_board(&mut socket, &board).await {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    // Client text and binary frames carry nothing for us.
                    _ => {}
                }
            }
        }
    }
}
