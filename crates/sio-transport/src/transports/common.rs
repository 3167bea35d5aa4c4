use sio_session::VirtualConnectionHandle;
use std::sync::Arc;

/// The first control frame WebSocket/FlashSocket write before anything
/// else: a workaround for clients that drop the socket unless the server
/// writes first. The literal string is a sentinel with no further
/// semantic meaning (§6).
pub const NO_SESSION_SENTINEL: &str = "no_session";

/// Multipart transport's MIME boundary name (§6).
pub const MULTIPART_BOUNDARY: &str = "socketio";

/// Bytes of padding HtmlFile prepends after `<html><body>` to defeat IE's
/// response buffering (§4.5.4, §6).
pub const HTMLFILE_PADDING_BYTES: usize = 244;

/// Wraps a JSON string in the JSONP-polling response contract (§6):
/// `io.JSONP[<index>]._(<json>);`.
pub fn jsonp_wrap(index: &str, json: &str) -> String {
    format!("io.JSONP[{index}]._({json});")
}

/// Renders an already wire-encoded frame sequence as a JSON string literal
/// (used by both HtmlFile and JSONP-polling, which both deliver the raw
/// frame bytes wrapped as a single JS string argument rather than as a
/// bare text body).
pub fn wire_json_string(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    serde_json::to_string(&text).expect("a string always serializes to JSON")
}

/// RAII guard that detaches a virtual connection's sink when dropped,
/// whatever the reason: a clean detach the handler already performed
/// (detach is idempotent), a poll timeout, or — the case this guard
/// actually exists for — the handler's future being cancelled because the
/// client disconnected mid-request. Async cancellation in this runtime
/// model has no other hook; Drop is the only code that is guaranteed to
/// run on every exit path.
pub struct AttachGuard {
    conn: Arc<sio_session::VirtualConnection>,
}

impl AttachGuard {
    pub fn new(conn: VirtualConnectionHandle) -> Self {
        Self { conn }
    }
}

impl Drop for AttachGuard {
    fn drop(&mut self) {
        self.conn.detach();
    }
}
