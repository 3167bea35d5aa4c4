use crate::error::TransportError;
use crate::router::ParsedPath;
use crate::state::GatewayState;
use crate::transports::common::{AttachGuard, NO_SESSION_SENTINEL};
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use sio_protocol::Message;
use sio_session::{ChannelSink, PeriodicTimer, VirtualConnectionHandle};
use tokio::sync::mpsc;

/// Handles both the `websocket` and `flashsocket` protocols (§4.5.1): their
/// post-handshake wire protocol is identical, so the Router sends both
/// here. FlashSocket's distinct HTTP upgrade preamble for layer-7 proxies
/// is a concern of the HTTP server in front of this gateway, not of this
/// state machine (§1 Non-goals).
pub async fn handle(
    upgrade: WebSocketUpgrade,
    state: GatewayState,
    parsed: ParsedPath,
) -> Response {
    let handle = match state.resolve_session(parsed.session_id.as_ref()) {
        Ok(handle) => handle,
        Err(err) => return err.into_response(),
    };
    let Some(conn) = handle.connection() else {
        return TransportError::SessionNotFound.into_response();
    };

    let (tx, rx) = mpsc::unbounded_channel();
    if let Err(err) = conn.attach(Box::new(ChannelSink::new(tx))) {
        return TransportError::from(err).into_response();
    }
    crate::metrics::GatewayMetrics::incr(&state.metrics.transport_attached);

    let heartbeat_interval = state.config.heartbeat_interval;
    upgrade.on_upgrade(move |socket| run(socket, conn, rx, heartbeat_interval, state))
}

async fn run(
    mut socket: WebSocket,
    conn: VirtualConnectionHandle,
    mut rx: mpsc::UnboundedReceiver<Vec<Message>>,
    heartbeat_interval: std::time::Duration,
    state: GatewayState,
) {
    let _guard = AttachGuard::new(conn.clone());
    conn.reset_heartbeat();

    let sentinel = sio_protocol::encode(&[Message::Text(NO_SESSION_SENTINEL.to_owned())]);
    let Ok(sentinel) = String::from_utf8(sentinel) else {
        return;
    };
    if socket.send(WsMessage::Text(sentinel.into())).await.is_err() {
        return;
    }

    let heartbeat_conn = conn.clone();
    let timer = PeriodicTimer::spawn(heartbeat_interval, move || {
        let conn = heartbeat_conn.clone();
        async move { Ok(conn.heartbeat_tick()) }
    });

    loop {
        tokio::select! {
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(WsMessage::Text(text))) => {
                        crate::metrics::GatewayMetrics::incr(&state.metrics.frames_decoded);
                        if conn.raw_message(text.as_bytes()).is_err() {
                            break;
                        }
                    }
                    Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_))) => {}
                    Some(Ok(WsMessage::Binary(bytes))) => {
                        if conn.raw_message(&bytes).is_err() {
                            break;
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Err(_)) => break,
                }
            }
            outbound = rx.recv() => {
                match outbound {
                    Some(messages) => {
                        let encoded = sio_protocol::encode(&messages);
                        crate::metrics::GatewayMetrics::incr(&state.metrics.frames_encoded);
                        let Ok(text) = String::from_utf8(encoded) else { break };
                        if socket.send(WsMessage::Text(text.into())).await.is_err() {
                            break;
                        }
                        conn.delay_heartbeat();
                    }
                    None => break,
                }
            }
        }
    }

    timer.stop();
    crate::metrics::GatewayMetrics::incr(&state.metrics.transport_detached);
}
