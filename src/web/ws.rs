//! WebSocket transport for the relay engine.
//!
//! Each upgraded socket gets a fresh channel handle and two pumps: one
//! forwarding decoded client events into the engine queue, one writing
//! outbound events back to the socket. The handle is detached when
//! either side goes away.

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::protocol::{ChannelHandle, ClientEvent, ServerEvent};

use super::server::AppState;

/// WebSocket upgrade endpoint.
pub async fn chat_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let handle = ChannelHandle::generate();
    tracing::debug!("WebSocket connection {} opened", handle);

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerEvent>();
    state.engine.attach(handle.clone(), outbound_tx.clone());

    let (mut sink, mut stream) = socket.split();

    let write_task = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let frame = match serde_json::to_string(&event) {
                Ok(json) => WsMessage::Text(json),
                Err(e) => {
                    tracing::error!("Failed to encode outbound event: {}", e);
                    continue;
                }
            };
            if sink.send(frame).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = stream.next().await {
        match frame {
            WsMessage::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => state.engine.inbound(handle.clone(), event),
                Err(e) => {
                    tracing::debug!("Undecodable frame on {}: {}", handle, e);
                    if state.settings.validation.is_strict() {
                        let _ = outbound_tx.send(ServerEvent::error(format!(
                            "unrecognized event: {}",
                            e
                        )));
                    }
                }
            },
            WsMessage::Close(_) => break,
            // Pings are answered by axum; binary frames are not part of
            // the protocol.
            _ => {}
        }
    }

    write_task.abort();
    state.engine.detach(handle.clone());
    tracing::debug!("WebSocket connection {} closed", handle);
}
