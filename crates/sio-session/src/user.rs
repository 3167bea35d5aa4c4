use crate::virtual_connection::VirtualConnectionHandle;
use sio_protocol::Message;

/// Raised from inside a user hook. Logged by the core and otherwise
/// swallowed — the session stays live unless the hook also called
/// [`VirtualConnectionHandle::close`].
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct UserHookError(pub String);

impl UserHookError {
    pub fn new(message: impl Into<String>) -> Self {
        UserHookError(message.into())
    }
}

/// The interface an application implements to receive lifecycle and
/// message callbacks for one virtual connection. A fresh instance is
/// built per session by the factory the Router is configured with.
///
/// Hooks run synchronously on the connection's single-writer task: a
/// long-running hook delays every other event for that session, matching
/// the single-threaded-per-session scheduling model.
pub trait UserConnection: Send + 'static {
    /// Called exactly once, after the first transport successfully attaches.
    fn on_open(&mut self, _conn: &VirtualConnectionHandle) -> Result<(), UserHookError> {
        Ok(())
    }

    /// Called once per inbound application message, in wire order.
    fn on_message(
        &mut self,
        conn: &VirtualConnectionHandle,
        message: Message,
    ) -> Result<(), UserHookError>;

    /// Called exactly once, after which no further hooks fire.
    fn on_close(&mut self, _conn: &VirtualConnectionHandle) -> Result<(), UserHookError> {
        Ok(())
    }
}
