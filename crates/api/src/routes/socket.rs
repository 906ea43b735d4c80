//! WebSocket endpoint for workers and observers.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use hub::{ConnectionSender, HubHandle};
use hub_core::limits::CONNECTION_SEND_BUFFER;
use hub_core::{ClientRole, Envelope};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::extractors::AuthContext;
use crate::state::AppState;

/// GET /ws/:namespace - upgrade a socket into the namespace's hub.
pub async fn websocket_handler(
    _auth: AuthContext,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Response {
    let hub = state.hubs.handle(&namespace);
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Pump one socket: a writer task drains the hub's outbound channel while
/// this task feeds inbound frames to the actor. Every connection starts as
/// an observer; a register frame promotes it.
async fn handle_socket(socket: WebSocket, hub: HubHandle) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Envelope>(CONNECTION_SEND_BUFFER);

    let conn_id = match hub
        .register(ClientRole::Observer, ConnectionSender::new(tx))
        .await
    {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "socket registration failed");
            return;
        }
    };

    let writer = tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            if ws_sender
                .send(Message::Text(envelope.to_json()))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                hub.inbound(conn_id, text).await;
            }
            Ok(Message::Binary(bin)) => match String::from_utf8(bin) {
                Ok(text) => hub.inbound(conn_id, text).await,
                Err(_) => debug!(connection = %conn_id, "dropping non-utf8 binary frame"),
            },
            Ok(Message::Close(_)) => break,
            Err(e) => {
                debug!(connection = %conn_id, error = %e, "socket error");
                break;
            }
            _ => {}
        }
    }

    hub.unregister(conn_id).await;
    writer.abort();
}
