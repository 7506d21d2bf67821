use crate::{AppState, protocol::ClientEvent, registry::OUTBOUND_QUEUE};
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// The entry point for WebSocket connections.
/// This function handles the initial upgrade from HTTP to WebSocket.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// The main logic for a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    // Each connection gets a bounded outbound queue; the relay pushes into
    // it and the send task below drains it in order.
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);
    let registry = state.relay.registry();
    let id = registry.add(tx).await;
    info!("{} has connected, users online: {}", id, registry.len().await);

    // Split the WebSocket into a sender and receiver.
    let (mut sender, mut receiver) = socket.split();

    // Task to forward queued frames to the client.
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    // Task to handle incoming events from the client.
    let relay = state.relay.clone();
    let mode = state.mode;
    let conn_id = id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            let text = match message {
                Message::Text(text) => text,
                Message::Close(_) => break,
                // Ping/pong and binary frames are not part of the protocol.
                _ => continue,
            };

            match ClientEvent::decode(&text) {
                Ok(event) if event.mode() == mode => {
                    let frame = event.into_broadcast().encode();
                    relay.broadcast_from(&conn_id, &frame).await;
                }
                Ok(event) => {
                    warn!(
                        "{} sent '{}' outside {} mode, dropping",
                        conn_id,
                        event.name(),
                        mode
                    );
                }
                Err(err) => {
                    warn!("{} sent a bad event, dropping: {}", conn_id, err);
                }
            }
        }
    });

    // Wait for either task to finish. If one does, the other should be aborted.
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    registry.remove(&id).await;
    info!(
        "{} is disconnected, users online: {}",
        id,
        registry.len().await
    );
}
