use crate::cors::apply_cors;
use crate::error::TransportError;
use crate::router::ParsedPath;
use crate::state::GatewayState;
use crate::transports::common::{AttachGuard, MULTIPART_BOUNDARY};
use axum::body::{Body, Bytes};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use sio_session::{ChannelSink, PeriodicTimer, VirtualConnectionHandle};
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// §4.5.3: binds as the sink, writes the opening boundary, then streams
/// every outbound message as its own MIME part for the life of the
/// connection, with heartbeats keeping it alive in between.
pub async fn get(state: GatewayState, parsed: ParsedPath, headers: HeaderMap) -> Response {
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

    let (body_tx, body_rx) = mpsc::unbounded_channel::<Result<Bytes, Infallible>>();
    let heartbeat_interval = state.config.heartbeat_interval;
    let metrics = state.metrics.clone();
    tokio::spawn(stream_parts(conn, rx, body_tx, heartbeat_interval, metrics));

    let body = Body::from_stream(UnboundedReceiverStream::new(body_rx));
    let mut response = Response::builder()
        .header(
            axum::http::header::CONTENT_TYPE,
            format!("multipart/x-mixed-replace;boundary=\"{MULTIPART_BOUNDARY}\""),
        )
        .header(axum::http::header::CONNECTION, "keep-alive")
        .body(body)
        .expect("static headers are always valid");
    apply_cors(&mut response, &headers, state.origin_policy.as_ref());
    response
}

async fn stream_parts(
    conn: VirtualConnectionHandle,
    mut rx: mpsc::UnboundedReceiver<Vec<sio_protocol::Message>>,
    body_tx: mpsc::UnboundedSender<Result<Bytes, Infallible>>,
    heartbeat_interval: std::time::Duration,
    metrics: std::sync::Arc<crate::metrics::GatewayMetrics>,
) {
    let _guard = AttachGuard::new(conn.clone());
    conn.reset_heartbeat();

    if body_tx
        .send(Ok(Bytes::from(format!("--{MULTIPART_BOUNDARY}\n"))))
        .is_err()
    {
        return;
    }

    let heartbeat_conn = conn.clone();
    let timer = PeriodicTimer::spawn(heartbeat_interval, move || {
        let conn = heartbeat_conn.clone();
        async move { Ok(conn.heartbeat_tick()) }
    });

    while let Some(messages) = rx.recv().await {
        let encoded = sio_protocol::encode(&messages);
        crate::metrics::GatewayMetrics::incr(&metrics.frames_encoded);
        let mut part = Vec::with_capacity(encoded.len() + 64);
        part.extend_from_slice(b"Content-Type: text/plain; charset=us-ascii\n\n");
        part.extend_from_slice(&encoded);
        part.extend_from_slice(format!("\n--{MULTIPART_BOUNDARY}\n").as_bytes());
        if body_tx.send(Ok(Bytes::from(part))).is_err() {
            break;
        }
        conn.delay_heartbeat();
    }

    timer.stop();
    crate::metrics::GatewayMetrics::incr(&metrics.transport_detached);
}
