use std::fmt;
use std::str::FromStr;

/// The six transport variants the Router knows how to dispatch to. WS and
/// FlashSocket share a handler (their post-handshake protocol is
/// identical); they are kept as distinct variants because the Router's
/// `enabled_protocols` configuration governs them independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    WebSocket,
    FlashSocket,
    XhrPolling,
    XhrMultipart,
    HtmlFile,
    JsonpPolling,
}

impl TransportKind {
    pub const ALL: [TransportKind; 6] = [
        TransportKind::WebSocket,
        TransportKind::FlashSocket,
        TransportKind::XhrPolling,
        TransportKind::XhrMultipart,
        TransportKind::HtmlFile,
        TransportKind::JsonpPolling,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            TransportKind::WebSocket => "websocket",
            TransportKind::FlashSocket => "flashsocket",
            TransportKind::XhrPolling => "xhr-polling",
            TransportKind::XhrMultipart => "xhr-multipart",
            TransportKind::HtmlFile => "htmlfile",
            TransportKind::JsonpPolling => "jsonp-polling",
        }
    }

    /// Whether this transport streams over a single long-lived connection
    /// (and so owns its own heartbeat timer) versus answering one request
    /// at a time.
    pub const fn is_streaming(self) -> bool {
        matches!(
            self,
            TransportKind::WebSocket
                | TransportKind::FlashSocket
                | TransportKind::XhrMultipart
                | TransportKind::HtmlFile
        )
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a path component names a transport the Router doesn't
/// recognize at all (as opposed to one that's recognized but disabled).
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("unknown transport protocol")]
pub struct UnknownTransport;

impl FromStr for TransportKind {
    type Err = UnknownTransport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "websocket" => Ok(TransportKind::WebSocket),
            "flashsocket" => Ok(TransportKind::FlashSocket),
            "xhr-polling" => Ok(TransportKind::XhrPolling),
            "xhr-multipart" => Ok(TransportKind::XhrMultipart),
            "htmlfile" => Ok(TransportKind::HtmlFile),
            "jsonp-polling" => Ok(TransportKind::JsonpPolling),
            _ => Err(UnknownTransport),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_round_trips_through_its_wire_name() {
        for kind in TransportKind::ALL {
            assert_eq!(kind.as_str().parse::<TransportKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unrecognized_names_are_rejected() {
        assert!("carrier-pigeon".parse::<TransportKind>().is_err());
    }
}
