use crate::config::GatewayConfig;
use crate::error::TransportError;
use crate::metrics::GatewayMetrics;
use crate::origin::OriginPolicy;
use sio_session::{SessionHandle, SessionId, SessionStore, UserConnection, VirtualConnection};
use std::sync::Arc;

/// Builds a fresh [`UserConnection`] for each new virtual connection. The
/// Router calls this exactly once per session, analogous to how the
/// original dispatches to a per-connection user subclass instance.
pub type ConnectionFactory = Arc<dyn Fn() -> Box<dyn UserConnection> + Send + Sync>;

/// Everything the Router and every transport handler share, cloned into
/// every axum handler via `State<GatewayState>`. Cheap to clone: every
/// field is itself an `Arc` or `Arc`-backed.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<GatewayConfig>,
    pub store: SessionStore,
    pub metrics: Arc<GatewayMetrics>,
    pub origin_policy: Arc<dyn OriginPolicy>,
    factory: ConnectionFactory,
}

impl GatewayState {
    pub fn new(
        config: GatewayConfig,
        origin_policy: Arc<dyn OriginPolicy>,
        factory: ConnectionFactory,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store: SessionStore::new(),
            metrics: Arc::new(GatewayMetrics::default()),
            origin_policy,
            factory,
        }
    }

    /// Resolves the session named by `session_id`, or creates a fresh one
    /// when the request carries none — the shared Attaching-state behavior
    /// every transport's state machine starts from (§4.5).
    pub fn resolve_session(&self, session_id: Option<&SessionId>) -> Result<SessionHandle, TransportError> {
        match session_id {
            Some(id) => {
                let handle = self.store.get(id).ok_or(TransportError::SessionNotFound)?;
                match handle.connection() {
                    Some(conn) if !conn.is_closed() => Ok(handle),
                    _ => Err(TransportError::SessionNotFound),
                }
            }
            None => {
                let factory = self.factory.clone();
                let heartbeat_interval = self.config.heartbeat_interval;
                let handle = self.store.create(Some(self.config.session_expiry), move |session| {
                    VirtualConnection::new(session, heartbeat_interval, factory())
                });
                crate::metrics::GatewayMetrics::incr(&self.metrics.sessions_created);
                // Every fresh session announces its own id as the first
                // queued message, so the client's first read (whichever
                // transport it comes in on) learns the id to address
                // subsequent requests to (§8 "Fresh session assignment").
                if let Some(conn) = handle.connection() {
                    conn.send(sio_protocol::Message::Text(handle.id().as_str().to_owned()));
                }
                Ok(handle)
            }
        }
    }

    /// Runs one expiry sweep "now". Spawned periodically by the gateway
    /// binary's `PeriodicTimer` at `session_check_interval`, but exposed
    /// here so tests can drive it directly without a real timer.
    pub fn expire_now(&self) {
        let deleted = self.store.expire(sio_session::Deadline::now());
        self.metrics
            .sessions_expired
            .fetch_add(deleted as u64, std::sync::atomic::Ordering::Relaxed);
    }
}
