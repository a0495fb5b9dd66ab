use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::api::ws_types::WsMessage;
use crate::errors::AppError;
use crate::services::messaging::FeedSubscription;
use crate::AppState;

use super::messages::UserQuery;
use super::sessions::find_session;

enum ClientEvent {
    Continue,
    Disconnect,
}

async fn handle_client_msg(
    socket: &mut WebSocket,
    msg: Option<Result<Message, axum::Error>>,
) -> ClientEvent {
    match msg {
        Some(Ok(Message::Close(_))) | None | Some(Err(_)) => ClientEvent::Disconnect,
        Some(Ok(Message::Ping(data))) => {
            if socket.send(Message::Pong(data)).await.is_err() {
                ClientEvent::Disconnect
            } else {
                ClientEvent::Continue
            }
        }
        Some(Ok(_)) => ClientEvent::Continue, // ignore text/binary from client
    }
}

/// Returns false once the client is gone.
async fn send_json(socket: &mut WebSocket, msg: &WsMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json)).await.is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize WsMessage");
            true
        }
    }
}

/// GET /api/sessions/:id/ws: Stream settlement snapshots.
pub async fn session_feed(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = find_session(&state, &id).await?;
    let rx = session.subscribe();
    Ok(ws.on_upgrade(move |socket| stream_snapshots(socket, id, rx)))
}

async fn stream_snapshots(
    mut socket: WebSocket,
    id: Uuid,
    mut rx: tokio::sync::watch::Receiver<crate::engine::SettlementSnapshot>,
) {
    tracing::info!(session = %id, "Snapshot WebSocket client connected");

    let initial = rx.borrow_and_update().clone();
    if !send_json(&mut socket, &WsMessage::Snapshot(initial)).await {
        return;
    }

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    // Session dropped
                    let _ = send_json(&mut socket, &WsMessage::SessionClosed).await;
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                if !send_json(&mut socket, &WsMessage::Snapshot(snapshot)).await {
                    break;
                }
            }
            client_msg = socket.recv() => {
                if let ClientEvent::Disconnect = handle_client_msg(&mut socket, client_msg).await {
                    break;
                }
            }
        }
    }

    tracing::info!(session = %id, "Snapshot WebSocket client disconnected");
}

/// GET /api/messages/ws?user_id=: Live admin messages for one user.
pub async fn message_feed(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> impl IntoResponse {
    let subscription = state.messages.subscribe(&q.user_id);
    ws.on_upgrade(move |socket| stream_messages(socket, q.user_id, subscription))
}

async fn stream_messages(mut socket: WebSocket, user_id: String, mut subscription: FeedSubscription) {
    tracing::info!(user_id = %user_id, "Message feed client connected");

    loop {
        tokio::select! {
            message = subscription.next() => {
                let Some(message) = message else { break };
                if !send_json(&mut socket, &WsMessage::AdminMessage(message)).await {
                    break;
                }
            }
            client_msg = socket.recv() => {
                if let ClientEvent::Disconnect = handle_client_msg(&mut socket, client_msg).await {
                    break;
                }
            }
        }
    }

    subscription.cancel();
    tracing::info!(user_id = %user_id, "Message feed client disconnected");
}
