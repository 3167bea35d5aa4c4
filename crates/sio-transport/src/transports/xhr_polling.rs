use crate::cors::apply_cors;
use crate::error::TransportError;
use crate::router::ParsedPath;
use crate::state::GatewayState;
use crate::transports::common::AttachGuard;
use axum::extract::Form;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use sio_session::OneShotSink;
use tokio::sync::oneshot;

#[derive(Debug, Deserialize)]
pub struct PostData {
    pub data: String,
}

fn text_response(status: StatusCode, body: Vec<u8>) -> Response {
    (
        status,
        [(axum::http::header::CONTENT_TYPE, "text/plain; charset=UTF-8")],
        body,
    )
        .into_response()
}

/// The shared `GET` behavior of §4.5.2: bind as the sink, flush any queued
/// messages immediately, otherwise wait up to `xhr_polling_timeout` and
/// answer with an empty body.
pub async fn get(state: GatewayState, parsed: ParsedPath, headers: HeaderMap) -> Response {
    let handle = match state.resolve_session(parsed.session_id.as_ref()) {
        Ok(handle) => handle,
        Err(err) => return err.into_response(),
    };
    let Some(conn) = handle.connection() else {
        return TransportError::SessionNotFound.into_response();
    };

    let (tx, rx) = oneshot::channel();
    if let Err(err) = conn.attach(Box::new(OneShotSink::new(tx))) {
        return TransportError::from(err).into_response();
    }
    crate::metrics::GatewayMetrics::incr(&state.metrics.transport_attached);
    let _guard = AttachGuard::new(conn.clone());

    let body = tokio::select! {
        received = rx => {
            let messages = received.unwrap_or_default();
            crate::metrics::GatewayMetrics::incr(&state.metrics.frames_encoded);
            sio_protocol::encode(&messages)
        }
        () = tokio::time::sleep(state.config.xhr_polling_timeout) => {
            crate::metrics::GatewayMetrics::incr(&state.metrics.poll_timeouts);
            Vec::new()
        }
    };
    crate::metrics::GatewayMetrics::incr(&state.metrics.transport_detached);

    let mut response = text_response(StatusCode::OK, body);
    apply_cors(&mut response, &headers, state.origin_policy.as_ref());
    response
}

/// The shared `POST` behavior of §4.5.2 (also used, unmodified, by
/// xhr-multipart, htmlfile, and jsonp-polling — all four transports
/// accept inbound traffic the same way, differing only in how `GET`
/// streams outbound traffic back). A `POST` never binds as the sink, so a
/// concurrent `GET` remains attached.
pub async fn post(
    state: GatewayState,
    parsed: ParsedPath,
    headers: HeaderMap,
    Form(form): Form<PostData>,
) -> Response {
    let handle = match state.resolve_session(parsed.session_id.as_ref()) {
        Ok(handle) => handle,
        Err(err) => return err.into_response(),
    };
    let Some(conn) = handle.connection() else {
        return TransportError::SessionNotFound.into_response();
    };

    if let Err(err) = conn.raw_message(form.data.as_bytes()) {
        return TransportError::from(err).into_response();
    }
    crate::metrics::GatewayMetrics::incr(&state.metrics.frames_decoded);

    let mut response = (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain")],
        "ok",
    )
        .into_response();
    apply_cors(&mut response, &headers, state.origin_policy.as_ref());
    response
}
