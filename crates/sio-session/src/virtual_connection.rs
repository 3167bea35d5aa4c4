use crate::sink::Sink;
use crate::store::{SessionDelegate, SessionHandle};
use crate::timer::Deadline;
use crate::user::UserConnection;
use sio_protocol::{CodecError, DecodedFrame, Message};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Raised by [`VirtualConnection::attach`] when a second transport tries to
/// bind while one is already attached. The session is not disturbed; the
/// caller (the router) turns this into an HTTP 401 to the second transport.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("a transport is already attached to this session")]
pub struct DoubleBind;

/// Shared handle to a virtual connection. Cloning is cheap; every clone
/// refers to the same underlying session.
pub type VirtualConnectionHandle = Arc<VirtualConnection>;

struct Inner {
    send_queue: VecDeque<Message>,
    sink: Option<Box<dyn Sink>>,
    heartbeat_counter: u64,
    heartbeat_deadline: Option<Deadline>,
    opened: bool,
    closed: bool,
    // Taken out of its slot for the duration of a hook call so a hook can
    // freely call back into this connection (e.g. `send`, `close`)
    // without re-entering this mutex.
    user: Option<Box<dyn UserConnection>>,
}

/// The application-facing endpoint of one session: a transport-independent
/// queue of outbound messages, heartbeat bookkeeping, and the
/// [`UserConnection`] hooks wired to inbound messages and lifecycle events.
/// At most one transport [`Sink`] is attached at a time.
pub struct VirtualConnection {
    session: SessionHandle,
    heartbeat_interval: Duration,
    inner: Mutex<Inner>,
}

impl VirtualConnection {
    pub fn new(
        session: SessionHandle,
        heartbeat_interval: Duration,
        user: Box<dyn UserConnection>,
    ) -> Arc<Self> {
        Arc::new(Self {
            session,
            heartbeat_interval,
            inner: Mutex::new(Inner {
                send_queue: VecDeque::new(),
                sink: None,
                heartbeat_counter: 0,
                heartbeat_deadline: None,
                opened: false,
                closed: false,
                user: Some(user),
            }),
        })
    }

    pub fn id(&self) -> &crate::session_id::SessionId {
        self.session.id()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }

    pub fn is_attached(&self) -> bool {
        self.inner.lock().unwrap().sink.is_some()
    }

    /// Queues `message` and flushes it through the attached sink, if any.
    /// A no-op once the connection is closed.
    pub fn send(&self, message: impl Into<Message>) {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return;
        }
        inner.send_queue.push_back(message.into());
        self.flush_locked(&mut inner);
    }

    fn flush_locked(&self, inner: &mut Inner) {
        if inner.send_queue.is_empty() {
            return;
        }
        let Some(sink) = inner.sink.as_ref() else {
            return;
        };
        let batch: Vec<Message> = inner.send_queue.drain(..).collect();
        if sink.push(batch) {
            inner.sink = None;
        }
    }

    /// Binds `sink` as this session's transport. Rejects a second bind
    /// while one is already live, matching the one-transport-per-session
    /// invariant.
    pub fn attach(self: &Arc<Self>, sink: Box<dyn Sink>) -> Result<(), DoubleBind> {
        let should_open = {
            let mut inner = self.inner.lock().unwrap();
            if inner.sink.is_some() {
                return Err(DoubleBind);
            }
            inner.sink = Some(sink);
            self.flush_locked(&mut inner);
            let should_open = !inner.opened;
            inner.opened = true;
            should_open
        };
        self.session.promote();
        if should_open {
            self.run_hook(|user, handle| user.on_open(handle));
        }
        Ok(())
    }

    /// Detaches the current sink, if any. Leaves the session otherwise
    /// untouched; it keeps queuing sends until a new transport attaches or
    /// it expires.
    pub fn detach(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.sink = None;
        }
        self.session.promote();
    }

    /// Decodes `wire_bytes` and dispatches each resulting message to
    /// [`UserConnection::on_message`] in order. Heartbeat frames are
    /// liveness-only and never reach the hook.
    pub fn raw_message(self: &Arc<Self>, wire_bytes: &[u8]) -> Result<(), CodecError> {
        for frame in sio_protocol::decode(wire_bytes)? {
            match frame {
                DecodedFrame::Text(text) => self.dispatch(Message::Text(text)),
                DecodedFrame::Json(value) => self.dispatch(Message::Json(value)),
                DecodedFrame::Heartbeat(_) => {}
            }
        }
        Ok(())
    }

    fn dispatch(self: &Arc<Self>, message: Message) {
        self.run_hook(move |user, handle| user.on_message(handle, message));
    }

    /// Marks the session closed, detaches any sink, and calls
    /// [`UserConnection::on_close`] exactly once. Idempotent.
    pub fn close(self: &Arc<Self>) {
        let was_already_closed = {
            let mut inner = self.inner.lock().unwrap();
            let was_closed = inner.closed;
            inner.closed = true;
            inner.sink = None;
            was_closed
        };
        if !was_already_closed {
            self.run_hook(|user, handle| user.on_close(handle));
        }
    }

    /// (Re)starts the heartbeat timer at the configured interval. Called by
    /// a streaming transport (WebSocket, multipart, htmlfile) right after
    /// it attaches, so the first heartbeat is scheduled from attach time
    /// rather than from whatever the deadline happened to be left at by a
    /// previous transport.
    pub fn reset_heartbeat(&self) {
        self.delay_heartbeat();
    }

    /// Pushes the heartbeat deadline `heartbeat_interval` out from now.
    /// Transports call this whenever they observe other traffic, so a busy
    /// connection doesn't also pay for needless heartbeat frames.
    pub fn delay_heartbeat(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.heartbeat_deadline = Some(Deadline::now() + self.heartbeat_interval);
    }

    pub fn stop_heartbeat(&self) {
        self.inner.lock().unwrap().heartbeat_deadline = None;
    }

    /// Called by the owning transport's [`crate::timer::PeriodicTimer`] on
    /// each firing. Returns `Some(deadline)` to slide the next firing
    /// forward without sending anything (the deadline was pushed out by
    /// [`Self::delay_heartbeat`] since the timer last ran), or `None`
    /// after sending a heartbeat frame through the attached sink.
    pub fn heartbeat_tick(&self) -> Option<Deadline> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(deadline) = inner.heartbeat_deadline {
            if deadline > Deadline::now() {
                return Some(deadline);
            }
        }
        inner.heartbeat_counter += 1;
        let counter = inner.heartbeat_counter;
        inner.heartbeat_deadline = Some(Deadline::now() + self.heartbeat_interval);
        if let Some(sink) = inner.sink.as_ref() {
            sink.push(vec![Message::Heartbeat(counter)]);
        }
        None
    }

    /// Runs a user hook with the connection's mutex released, so the hook
    /// is free to call back into `send`/`close`/etc. on this same
    /// connection without deadlocking.
    fn run_hook(
        self: &Arc<Self>,
        f: impl FnOnce(&mut dyn UserConnection, &VirtualConnectionHandle) -> Result<(), crate::user::UserHookError>,
    ) {
        let mut user = match self.inner.lock().unwrap().user.take() {
            Some(user) => user,
            None => return,
        };
        let result = f(user.as_mut(), self);
        self.inner.lock().unwrap().user = Some(user);
        if let Err(err) = result {
            tracing::warn!(session = %self.id(), error = %err, "user hook failed");
        }
    }
}

impl SessionDelegate for VirtualConnection {
    fn on_delete(&self, forced: bool) -> Option<Deadline> {
        if forced {
            return None;
        }
        let inner = self.inner.lock().unwrap();
        if inner.closed {
            return None;
        }
        // A session with a live transport survives a sweep even if its
        // scheduled expiry has passed; the transport, not the clock, is
        // the authority on whether the peer is still there.
        inner.sink.is_some().then(|| Deadline::now() + self.heartbeat_interval)
    }
}
