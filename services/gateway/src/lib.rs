pub mod cli;
pub mod echo;

pub use cli::Cli;
pub use echo::EchoConnection;

use sio_session::PeriodicTimer;
use sio_transport::{AllowAny, ConnectionFactory, GatewayConfig, GatewayState};
use std::sync::Arc;

/// Builds the full axum [`Router`](axum::Router) for the gateway, wired to
/// a fresh [`GatewayState`] backed by `factory`. Split out from `main` so
/// integration tests can build the same app in-process against an
/// ephemeral port, the way `services/server`'s tests build its router
/// directly rather than shelling out to the binary.
pub fn build_app(config: GatewayConfig, factory: ConnectionFactory) -> (axum::Router, GatewayState) {
    let state = GatewayState::new(config, Arc::new(AllowAny), factory);
    (sio_transport::build_router(state.clone()), state)
}

/// Spawns the background sweep that calls [`GatewayState::expire_now`] on
/// `session_check_interval`, matching the reference server's
/// `PeriodicCallback(_sessions.expire, ...)`.
pub fn spawn_expiry_sweep(state: GatewayState) -> PeriodicTimer {
    let interval = state.config.session_check_interval;
    PeriodicTimer::spawn(interval, move || {
        let state = state.clone();
        async move {
            state.expire_now();
            Ok(None)
        }
    })
}

/// The default connection factory the binary runs with: every new session
/// gets its own [`EchoConnection`].
pub fn echo_factory() -> ConnectionFactory {
    Arc::new(|| Box::new(EchoConnection))
}
