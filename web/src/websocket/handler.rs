use crate::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use log::*;
use std::sync::Arc;
use tokio::sync::mpsc;
use ws::{Frame, Manager, Session};

/// Upgrades `GET /ws` to a WebSocket carrying subscriptions and live updates.
/// Inbound messages larger than the configured payload limit are refused by
/// the protocol layer before they reach the dispatcher.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> Response {
    let max_payload = app_state.config.ws_max_payload_bytes;
    let queue_capacity = app_state.config.ws_send_queue_capacity.max(1);
    let manager = Arc::clone(&app_state.ws_manager);

    ws.max_message_size(max_payload)
        .max_frame_size(max_payload)
        .on_upgrade(move |socket| handle_socket(socket, manager, queue_capacity))
}

async fn handle_socket(socket: WebSocket, manager: Arc<Manager>, queue_capacity: usize) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Frame>(queue_capacity);

    let mut session = Session::open(manager, tx);
    let connection_id = session.id().clone();

    // Writer task: drains the outbound queue in order. It ends once the
    // registry drops the sender or the peer stops accepting writes.
    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = sink.send(Message::Text(frame.to_string())).await {
                debug!("Stopped writing to connection {connection_id}: {e}");
                break;
            }
        }
    });

    while let Some(received) = stream.next().await {
        match received {
            Ok(Message::Text(text)) => {
                session.handle_frame(text.as_bytes());
            }
            Ok(Message::Binary(bytes)) => {
                session.handle_frame(&bytes);
            }
            Ok(Message::Close(_)) => break,
            // axum answers pings itself
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Err(e) => {
                warn!("WebSocket error on connection {}: {e}", session.id());
                writer.abort();
                session.terminate();
                return;
            }
        }
    }

    session.close();
    if let Err(e) = writer.await {
        if !e.is_cancelled() {
            error!("WebSocket writer task failed: {e}");
        }
    }
}
