use crate::error::TransportError;
use crate::kind::TransportKind;
use sio_session::SessionId;

/// The result of splitting the endpoint's trailing path segments, per §4.6:
/// `/<resource>/<extra>/<protocol>/<session_id?>/<protocol_init?>/<jsonp_index?>`.
/// The leading `<resource>` segment is matched by the axum route itself
/// (it's part of `GatewayConfig::resource`, fixed at router-build time);
/// everything after it arrives here as `rest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    pub extra: String,
    pub protocol: TransportKind,
    pub session_id: Option<SessionId>,
    /// Whatever trails the session id: a `protocol_init` token for
    /// streaming transports, or the JSONP callback index for
    /// jsonp-polling. Transport handlers interpret this themselves since
    /// its meaning is protocol-specific.
    pub trailing: Vec<String>,
}

/// Parses the path segments following the configured resource prefix.
/// Rejects protocols the Router has never heard of with
/// [`TransportError::ProtocolUnknown`]; callers are responsible for
/// separately checking [`crate::config::GatewayConfig::is_enabled`] and
/// raising [`TransportError::ProtocolDisabled`] (disabled vs. unknown are
/// deliberately distinct per §7).
pub fn parse_rest(rest: &str) -> Result<ParsedPath, TransportError> {
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return Err(TransportError::MalformedRequest(
            "expected at least <extra>/<protocol>".to_owned(),
        ));
    }

    let extra = segments[0].to_owned();
    let protocol: TransportKind = segments[1]
        .parse()
        .map_err(|_| TransportError::ProtocolUnknown)?;

    let session_id = match segments.get(2) {
        Some(raw) => Some(
            raw.parse::<SessionId>()
                .map_err(|_| TransportError::MalformedRequest(format!("invalid session id {raw:?}")))?,
        ),
        None => None,
    };

    let trailing = segments.get(3..).unwrap_or_default().iter().map(|s| s.to_string()).collect();

    Ok(ParsedPath {
        extra,
        protocol,
        session_id,
        trailing,
    })
}

/// Strips the `resource` prefix (e.g. `"socket.io"`) from a request path,
/// returning the remainder to hand to [`parse_rest`]. Tolerates a missing
/// or extra trailing slash, matching the original's looseness here (§9's
/// "Router robustness, not a new wire feature" supplement).
pub fn strip_resource<'a>(path: &'a str, resource: &str) -> Result<&'a str, TransportError> {
    let path = path.trim_start_matches('/');
    let resource = resource.trim_matches('/');
    path.strip_prefix(resource)
        .map(|rest| rest.trim_start_matches('/'))
        .ok_or_else(|| TransportError::MalformedRequest(format!("path does not start with /{resource}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_protocol_session_id_and_trailing_segments() {
        let parsed = parse_rest("1/websocket/0123456789abcdef0123456789abcdef").unwrap();
        assert_eq!(parsed.extra, "1");
        assert_eq!(parsed.protocol, TransportKind::WebSocket);
        assert_eq!(
            parsed.session_id.map(|id| id.as_str().to_owned()),
            Some("0123456789abcdef0123456789abcdef".to_owned())
        );
        assert!(parsed.trailing.is_empty());
    }

    #[test]
    fn parses_a_jsonp_polling_path_with_index_trailing_the_session_id() {
        let parsed = parse_rest("1/jsonp-polling/0123456789abcdef0123456789abcdef/7").unwrap();
        assert_eq!(parsed.protocol, TransportKind::JsonpPolling);
        assert_eq!(parsed.trailing, vec!["7".to_owned()]);
    }

    #[test]
    fn missing_session_id_is_fine_a_fresh_session_will_be_created() {
        let parsed = parse_rest("1/xhr-polling").unwrap();
        assert_eq!(parsed.session_id, None);
    }

    #[test]
    fn unknown_protocol_is_rejected() {
        assert!(matches!(
            parse_rest("1/carrier-pigeon"),
            Err(TransportError::ProtocolUnknown)
        ));
    }

    #[test]
    fn too_few_segments_is_malformed() {
        assert!(matches!(
            parse_rest("1"),
            Err(TransportError::MalformedRequest(_))
        ));
    }

    #[test]
    fn malformed_session_id_is_rejected_rather_than_silently_ignored() {
        assert!(matches!(
            parse_rest("1/websocket/not-a-session-id"),
            Err(TransportError::MalformedRequest(_))
        ));
    }

    #[test]
    fn strip_resource_tolerates_trailing_slash_variance() {
        assert_eq!(strip_resource("/socket.io/1/websocket", "socket.io").unwrap(), "1/websocket");
        assert_eq!(strip_resource("socket.io/1/websocket/", "socket.io").unwrap(), "1/websocket/");
        assert!(strip_resource("/other/1/websocket", "socket.io").is_err());
    }
}
