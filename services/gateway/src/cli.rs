use clap::Parser;
use std::time::Duration;

/// Command-line configuration for the gateway binary. Every flag falls
/// back to an environment variable of the same name (upper-cased, with
/// `GATEWAY_` prefixed) and, failing that, to §6's documented default.
#[derive(Parser, Debug, Clone)]
#[command(name = "gateway")]
#[command(version, about = "Socket.IO 0.6 transport-multiplexing gateway")]
pub struct Cli {
    /// Address to bind the HTTP/WebSocket listener on.
    #[arg(long, env = "GATEWAY_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: String,

    /// Path prefix transports are served under, e.g. `socket.io`.
    #[arg(long, env = "GATEWAY_RESOURCE", default_value = "socket.io")]
    pub resource: String,

    /// How often the background sweep checks for expired sessions, seconds.
    #[arg(long, env = "GATEWAY_SESSION_CHECK_INTERVAL_SECS", default_value_t = 15)]
    pub session_check_interval_secs: u64,

    /// How long an unattached session survives before expiry, seconds.
    #[arg(long, env = "GATEWAY_SESSION_EXPIRY_SECS", default_value_t = 30)]
    pub session_expiry_secs: u64,

    /// Heartbeat interval for streaming transports, seconds.
    #[arg(long, env = "GATEWAY_HEARTBEAT_INTERVAL_SECS", default_value_t = 12)]
    pub heartbeat_interval_secs: u64,

    /// Long-poll timeout for xhr-polling/jsonp-polling, seconds.
    #[arg(long, env = "GATEWAY_XHR_POLLING_TIMEOUT_SECS", default_value_t = 20)]
    pub xhr_polling_timeout_secs: u64,

    /// Log level passed to `tracing_subscriber::EnvFilter`.
    #[arg(long, env = "GATEWAY_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn session_check_interval(&self) -> Duration {
        Duration::from_secs(self.session_check_interval_secs)
    }

    pub fn session_expiry(&self) -> Duration {
        Duration::from_secs(self.session_expiry_secs)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn xhr_polling_timeout(&self) -> Duration {
        Duration::from_secs(self.xhr_polling_timeout_secs)
    }

    pub fn gateway_config(&self) -> sio_transport::GatewayConfig {
        sio_transport::GatewayConfig {
            resource: self.resource.clone(),
            session_check_interval: self.session_check_interval(),
            session_expiry: self.session_expiry(),
            heartbeat_interval: self.heartbeat_interval(),
            xhr_polling_timeout: self.xhr_polling_timeout(),
            ..Default::default()
        }
    }
}
