//! The HTTP/WebSocket surface: the Router that parses an incoming request's
//! path and dispatches to the matching transport state machine (§4.5,
//! §4.6), plus everything the handlers share (config, session resolution,
//! CORS, metrics, the transport-unknown/disabled error taxonomy).

pub mod config;
pub mod cors;
pub mod error;
pub mod kind;
pub mod metrics;
pub mod origin;
pub mod router;
pub mod state;
pub mod transports;

pub use config::GatewayConfig;
pub use error::TransportError;
pub use kind::TransportKind;
pub use metrics::{GatewayMetrics, GatewayMetricsSnapshot};
pub use origin::{AllowAny, AllowList, OriginPolicy};
pub use state::{ConnectionFactory, GatewayState};

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use router::{parse_rest, strip_resource};
use tower_http::trace::TraceLayer;

/// Builds the axum [`Router`] serving the whole gateway surface under
/// `state.config.resource`. A single wildcard route per method handles
/// every transport (§4.6): the variable-length trailing path segments
/// (`<session_id?>/<protocol_init?>/<jsonp_index?>`) can't be expressed
/// with axum's typed `Path` extractors, so dispatch parses the tail
/// manually via [`router::parse_rest`] instead. Requests are wrapped in
/// [`TraceLayer`] for the ambient per-request span/logging the teacher
/// wires onto every one of its own routers.
pub fn build_router(state: GatewayState) -> Router {
    let path = format!("/{}/*rest", state.config.resource.trim_matches('/'));
    Router::new()
        .route(&path, any(dispatch))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn dispatch(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    upgrade: Option<WebSocketUpgrade>,
    request: Request,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let rest = match strip_resource(&path, &state.config.resource) {
        Ok(rest) => rest,
        Err(err) => return err.into_response(),
    };
    let parsed = match parse_rest(rest) {
        Ok(parsed) => parsed,
        Err(err) => return err.into_response(),
    };
    if !state.config.is_enabled(parsed.protocol) {
        return TransportError::ProtocolDisabled(parsed.protocol).into_response();
    }

    match (parsed.protocol, &method) {
        (
            TransportKind::XhrPolling
            | TransportKind::XhrMultipart
            | TransportKind::HtmlFile
            | TransportKind::JsonpPolling,
            &axum::http::Method::OPTIONS,
        ) => {
            // §4.5.6: an explicit preflight gets an empty body with whatever
            // CORS headers the Origin/Cookie pair earns it, no session work.
            let mut response = axum::http::StatusCode::OK.into_response();
            cors::apply_cors(&mut response, &headers, state.origin_policy.as_ref());
            response
        }
        (TransportKind::WebSocket | TransportKind::FlashSocket, &axum::http::Method::GET) => {
            match upgrade {
                Some(upgrade) => transports::websocket::handle(upgrade, state, parsed).await,
                None => TransportError::MalformedRequest(
                    "websocket transport requires an upgrade request".to_owned(),
                )
                .into_response(),
            }
        }
        (TransportKind::XhrPolling, &axum::http::Method::GET) => {
            transports::xhr_polling::get(state, parsed, headers).await
        }
        (TransportKind::XhrPolling, &axum::http::Method::POST) => {
            let form = match extract_form(request).await {
                Ok(form) => form,
                Err(err) => return err.into_response(),
            };
            transports::xhr_polling::post(state, parsed, headers, form).await
        }
        (TransportKind::XhrMultipart, &axum::http::Method::GET) => {
            transports::xhr_multipart::get(state, parsed, headers).await
        }
        (TransportKind::XhrMultipart, &axum::http::Method::POST) => {
            let form = match extract_form(request).await {
                Ok(form) => form,
                Err(err) => return err.into_response(),
            };
            transports::xhr_polling::post(state, parsed, headers, form).await
        }
        (TransportKind::HtmlFile, &axum::http::Method::GET) => {
            transports::htmlfile::get(state, parsed, headers).await
        }
        (TransportKind::HtmlFile, &axum::http::Method::POST) => {
            let form = match extract_form(request).await {
                Ok(form) => form,
                Err(err) => return err.into_response(),
            };
            transports::xhr_polling::post(state, parsed, headers, form).await
        }
        (TransportKind::JsonpPolling, &axum::http::Method::GET) => {
            transports::jsonp_polling::get(state, parsed, headers).await
        }
        (TransportKind::JsonpPolling, &axum::http::Method::POST) => {
            let form = match extract_form(request).await {
                Ok(form) => form,
                Err(err) => return err.into_response(),
            };
            transports::jsonp_polling::post(state, parsed, headers, form).await
        }
        _ => TransportError::MalformedRequest(format!(
            "{method} not supported for {}",
            parsed.protocol
        ))
        .into_response(),
    }
}

async fn extract_form(
    request: Request,
) -> Result<axum::extract::Form<transports::xhr_polling::PostData>, TransportError> {
    use axum::extract::FromRequest;
    axum::extract::Form::from_request(request, &())
        .await
        .map_err(|err| TransportError::MalformedRequest(err.to_string()))
}
