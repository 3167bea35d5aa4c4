use crate::cors::apply_cors;
use crate::error::TransportError;
use crate::router::ParsedPath;
use crate::state::GatewayState;
use crate::transports::common::{jsonp_wrap, wire_json_string, AttachGuard};
use crate::transports::xhr_polling;
use axum::extract::Form;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use sio_session::OneShotSink;
use tokio::sync::oneshot;

/// §4.5.6: behaves like xhr-polling's `GET` — one-shot, bound until a
/// message is ready or the timeout elapses — but wraps the wire frame as a
/// JSON string literal passed to `io.JSONP[<index>]._(...)` instead of
/// returning it as a bare body, so a `<script src=...>` tag can load it
/// cross-origin without CORS.
pub async fn get(state: GatewayState, parsed: ParsedPath, headers: HeaderMap) -> Response {
    let Some(index) = parsed.trailing.first() else {
        return TransportError::MalformedRequest("missing JSONP index".into()).into_response();
    };
    let index = index.clone();

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

    let encoded = tokio::select! {
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

    let body = jsonp_wrap(&index, &wire_json_string(&encoded));
    let mut response = (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/javascript; charset=UTF-8")],
        body,
    )
        .into_response();
    apply_cors(&mut response, &headers, state.origin_policy.as_ref());
    response
}

/// §4.5.6's `POST` is byte-for-byte the xhr-polling contract — a `data`
/// form field decoded and dispatched, answered with a plain `ok`.
pub async fn post(
    state: GatewayState,
    parsed: ParsedPath,
    headers: HeaderMap,
    form: Form<xhr_polling::PostData>,
) -> Response {
    xhr_polling::post(state, parsed, headers, form).await
}
