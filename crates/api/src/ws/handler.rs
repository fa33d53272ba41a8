use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::error::AppError;
use crate::state::AppState;
use crate::ws::protocol::{ClientFrame, ServerFrame, EVENT_ERROR};

/// HTTP handler that upgrades the connection to WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Dispatches inbound chat frames on the current task.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let mut rx = state.ws_manager.add(conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() || closing {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if let Err(err) = dispatch(&state, text.as_str()).await {
                    reply_error(&state, &conn_id, &err).await;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    state.ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Handle one inbound text frame.
///
/// A successful post reaches this client through the relay like any other.
async fn dispatch(state: &AppState, text: &str) -> Result<(), AppError> {
    let frame: ClientFrame = serde_json::from_str(text)
        .map_err(|e| AppError::BadRequest(format!("Invalid frame: {e}")))?;

    match frame {
        ClientFrame::SendMessage {
            sender_name,
            content,
        } => {
            state.chat.post(sender_name, content).await?;
        }
    }
    Ok(())
}

/// Answer a failed frame to the originating connection only.
async fn reply_error(state: &AppState, conn_id: &str, err: &AppError) {
    let (_, body) = err.body();
    match ServerFrame::new(EVENT_ERROR, &body).to_message() {
        Ok(message) => {
            state.ws_manager.send_to(conn_id, message).await;
        }
        Err(e) => tracing::warn!(conn_id = %conn_id, error = %e, "Failed to encode error frame"),
    }
}
