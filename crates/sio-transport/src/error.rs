use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sio_protocol::CodecError;
use sio_session::{DoubleBind, InvalidSessionId};

/// The error taxonomy from §7: every variant a transport or the Router can
/// raise while servicing one request, each carrying its own HTTP mapping.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("malformed wire frame: {0}")]
    Codec(#[from] CodecError),

    #[error("session not found or closed")]
    SessionNotFound,

    #[error("a transport is already attached to this session")]
    DoubleBind,

    #[error("transport protocol {0:?} is disabled")]
    ProtocolDisabled(crate::kind::TransportKind),

    #[error("unknown transport protocol")]
    ProtocolUnknown,

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("transport I/O error: {0}")]
    TransportIo(String),
}

impl From<DoubleBind> for TransportError {
    fn from(_: DoubleBind) -> Self {
        TransportError::DoubleBind
    }
}

impl From<InvalidSessionId> for TransportError {
    fn from(_: InvalidSessionId) -> Self {
        TransportError::SessionNotFound
    }
}

impl TransportError {
    pub fn status(&self) -> StatusCode {
        match self {
            TransportError::Codec(_) => StatusCode::BAD_REQUEST,
            TransportError::SessionNotFound => StatusCode::UNAUTHORIZED,
            TransportError::DoubleBind => StatusCode::UNAUTHORIZED,
            TransportError::ProtocolDisabled(_) | TransportError::ProtocolUnknown => {
                StatusCode::FORBIDDEN
            }
            TransportError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            TransportError::TransportIo(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for TransportError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(error = %self, %status, "transport request rejected");
        (status, self.to_string()).into_response()
    }
}
