use sio_protocol::Message;
use sio_session::{UserConnection, UserHookError, VirtualConnectionHandle};

/// The default demo application wired into the binary: echoes every
/// inbound message back to its sender, analogous to the reference
/// server's own `ping` example connection class.
#[derive(Debug, Default)]
pub struct EchoConnection;

impl UserConnection for EchoConnection {
    fn on_message(
        &mut self,
        conn: &VirtualConnectionHandle,
        message: Message,
    ) -> Result<(), UserHookError> {
        conn.send(message);
        Ok(())
    }
}
