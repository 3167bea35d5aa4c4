//! Shared test utilities for the gateway's end-to-end suite: a WebSocket
//! client and an HTTP long-polling client, both speaking the wire protocol
//! directly via [`sio_protocol`] rather than a real Socket.IO client
//! library.

pub mod http_client;
pub mod ws_client;

pub use http_client::HttpTestClient;
pub use ws_client::WsTestClient;
