//! WebSocket endpoint for the live telemetry feed.

use crate::telemetry::FeedMessage;
use crate::web::AppState;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// WebSocket upgrade handler.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one subscriber channel from connect to disconnect.
///
/// The subscriber is attached to the broadcast stream before the initial
/// snapshot is built, so no tick falls between first contact and the first
/// forwarded update. A send failure terminates only this connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4().to_string();
    info!(connection_id = %connection_id, "subscriber connected");

    let mut feed_rx = state.hub.subscribe();
    state.hub.register(&connection_id).await;

    let initial = {
        let registry = state.registry.read().await;
        FeedMessage::initial(registry.readings(), Utc::now())
    };

    let (mut sender, mut receiver) = socket.split();

    match initial.to_json() {
        Ok(payload) => {
            if let Err(e) = sender.send(Message::Text(payload)).await {
                warn!(connection_id = %connection_id, error = %e, "failed to send initial snapshot");
                state.hub.unregister(&connection_id).await;
                return;
            }
        }
        Err(e) => {
            warn!(connection_id = %connection_id, error = %e, "failed to serialize initial snapshot");
            state.hub.unregister(&connection_id).await;
            return;
        }
    }

    // Drain inbound frames; the feed carries no client-to-server payload, so
    // this task only watches for close and errors.
    let recv_connection_id = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    info!(connection_id = %recv_connection_id, "subscriber closed channel");
                    break;
                }
                Ok(other) => {
                    debug!(connection_id = %recv_connection_id, frame = ?other, "ignoring inbound frame");
                }
                Err(e) => {
                    warn!(connection_id = %recv_connection_id, error = %e, "channel error");
                    break;
                }
            }
        }
    });

    // Forward each broadcast payload to this subscriber until the channel
    // fails or the hub is closed.
    let send_connection_id = connection_id.clone();
    let mut hub_closed = state.hub.closed();
    let mut send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                payload = feed_rx.recv() => match payload {
                    Ok(payload) => {
                        if let Err(e) = sender.send(Message::Text(payload.to_string())).await {
                            warn!(connection_id = %send_connection_id, error = %e, "send failed");
                            break;
                        }
                    }
                    Err(e) => {
                        debug!(connection_id = %send_connection_id, error = %e, "feed ended");
                        break;
                    }
                },
                _ = hub_closed.changed() => {
                    info!(connection_id = %send_connection_id, "hub closed, releasing channel");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    }

    state.hub.unregister(&connection_id).await;
    info!(connection_id = %connection_id, "subscriber disconnected");
}
