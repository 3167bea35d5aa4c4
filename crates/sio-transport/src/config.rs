use crate::kind::TransportKind;
use std::collections::HashSet;
use std::time::Duration;

/// Settings the Router and every transport state machine read from.
/// Field names and defaults mirror the configuration keys in the external
/// interface table: `session_check_interval`, `session_expiry`,
/// `heartbeat_interval`, `enabled_protocols`, `xhr_polling_timeout`.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Path prefix the Router matches before parsing the transport/session
    /// segments, e.g. `"socket.io"` for the default `/socket.io/1/...` shape.
    pub resource: String,
    pub session_check_interval: Duration,
    pub session_expiry: Duration,
    pub heartbeat_interval: Duration,
    pub enabled_protocols: HashSet<TransportKind>,
    pub xhr_polling_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            resource: "socket.io".to_owned(),
            session_check_interval: Duration::from_secs(15),
            session_expiry: Duration::from_secs(30),
            heartbeat_interval: Duration::from_secs(12),
            enabled_protocols: TransportKind::ALL.into_iter().collect(),
            xhr_polling_timeout: Duration::from_secs(20),
        }
    }
}

impl GatewayConfig {
    pub fn is_enabled(&self, kind: TransportKind) -> bool {
        self.enabled_protocols.contains(&kind)
    }
}
