//! Public facade for embedding the gateway as a library: re-exports the
//! pieces an application author needs (the connection trait, its handle,
//! the wire message type, and the router's configuration) without
//! depending on the workspace's internal crate boundaries directly.

pub use sio_protocol::{CodecError, DecodedFrame, Message};
pub use sio_session::{UserConnection, UserHookError, VirtualConnection, VirtualConnectionHandle};
pub use sio_transport::{
    AllowAny, AllowList, ConnectionFactory, GatewayConfig, GatewayMetrics, GatewayMetricsSnapshot,
    GatewayState, OriginPolicy, TransportError, TransportKind,
};
