use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;

/// Applies §4.5.6's CORS preflight rules to `response` in place: if the
/// request carried an `Origin` header that the policy accepts, echo it
/// back as `Access-Control-Allow-Origin`; if the request also carried a
/// `Cookie` header, additionally set `Access-Control-Allow-Credentials`.
/// A silent no-op when there's no `Origin` header or the policy rejects it.
pub fn apply_cors(
    response: &mut Response,
    request_headers: &HeaderMap,
    policy: &dyn crate::origin::OriginPolicy,
) {
    let Some(origin) = request_headers.get(axum::http::header::ORIGIN).and_then(|v| v.to_str().ok()) else {
        return;
    };
    if !policy.allow(origin) {
        return;
    }
    if let Ok(value) = HeaderValue::from_str(origin) {
        response
            .headers_mut()
            .insert(axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    if request_headers.contains_key(axum::http::header::COOKIE) {
        response.headers_mut().insert(
            axum::http::header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }
}
