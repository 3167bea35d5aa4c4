use crate::session_id::SessionId;
use crate::timer::Deadline;
use crate::virtual_connection::VirtualConnection;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Implemented by the connection object a session owns, so the store can
/// offer a sweep-time reprieve without depending on the concrete
/// connection type.
pub trait SessionDelegate: Send + Sync {
    /// Called when the store is about to drop this session. `forced` is
    /// true for an explicit [`SessionStore::remove`] (always proceeds
    /// regardless of the return value); false for an ordinary expiry
    /// sweep, where returning `Some(deadline)` asks the store to keep the
    /// session and reschedule it for `deadline` instead.
    fn on_delete(&self, forced: bool) -> Option<Deadline>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Promotion {
    None,
    At(Deadline),
}

struct SessionRecord {
    expiry: Option<Duration>,
    expiry_date: Deadline,
    promotion: Promotion,
    connection: Arc<VirtualConnection>,
}

#[derive(Clone, PartialEq, Eq)]
struct HeapEntry {
    expiry_date: Deadline,
    id: SessionId,
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.expiry_date
            .cmp(&other.expiry_date)
            .then_with(|| self.id.cmp(&other.id))
    }
}

struct StoreInner {
    sessions: HashMap<SessionId, SessionRecord>,
    // Entries are lazily invalidated: an id popped from the heap that is
    // no longer in `sessions`, or whose record no longer agrees with this
    // entry's `expiry_date`, is stale and simply discarded.
    heap: BinaryHeap<Reverse<HeapEntry>>,
}

/// The registry of live sessions, keyed by [`SessionId`]. Cheap to clone;
/// every clone shares the same underlying state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                sessions: HashMap::new(),
                heap: BinaryHeap::new(),
            })),
        }
    }

    /// Allocates a fresh, collision-free [`SessionId`], builds its
    /// connection via `factory`, and registers it with `expiry` as the
    /// sliding expiry window (`None` means the session never expires on
    /// its own — used for transports that own their own liveness check).
    pub fn create<F>(&self, expiry: Option<Duration>, factory: F) -> SessionHandle
    where
        F: FnOnce(SessionHandle) -> Arc<VirtualConnection>,
    {
        let mut inner = self.inner.lock().unwrap();
        let id = loop {
            let candidate = SessionId::generate();
            if !inner.sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        let handle = SessionHandle {
            id: id.clone(),
            store: self.clone(),
        };
        let connection = factory(handle.clone());

        let now = Instant::now();
        let expiry_date = expiry.map_or(now, |d| now + d);
        if expiry.is_some() {
            inner.heap.push(Reverse(HeapEntry {
                expiry_date,
                id: id.clone(),
            }));
        }
        inner.sessions.insert(
            id,
            SessionRecord {
                expiry,
                expiry_date,
                promotion: Promotion::None,
                connection,
            },
        );
        handle
    }

    /// Looks up a session by id. Returns a handle regardless of whether
    /// the session is attached, closed, or still pending expiry — callers
    /// that need a live connection should use [`SessionHandle::connection`].
    pub fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        let inner = self.inner.lock().unwrap();
        inner.sessions.contains_key(id).then(|| SessionHandle {
            id: id.clone(),
            store: self.clone(),
        })
    }

    /// Forcibly removes a session, bypassing any reprieve its delegate
    /// would otherwise request. Returns whether a session was present.
    pub fn remove(&self, id: &SessionId) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.sessions.remove(id) {
            Some(record) => {
                record.connection.on_delete(true);
                true
            }
            None => false,
        }
    }

    /// Runs one expiry sweep against `now`: pops every heap entry whose
    /// deadline has passed, consulting each session's delegate for a
    /// reprieve before actually dropping it. Returns the number of sessions
    /// actually deleted (as opposed to reprieved), for callers that want to
    /// report it (e.g. as a metric).
    pub fn expire(&self, now: Deadline) -> usize {
        let mut inner = self.inner.lock().unwrap();
        let mut deleted = 0usize;
        loop {
            let Some(Reverse(entry)) = inner.heap.peek().cloned() else {
                return deleted;
            };

            let record_expiry_date = inner.sessions.get(&entry.id).map(|r| r.expiry_date);
            match record_expiry_date {
                None => {
                    // Session already gone by some other path; drop the
                    // stale heap entry and keep sweeping.
                    inner.heap.pop();
                    continue;
                }
                Some(current) if current != entry.expiry_date => {
                    // This entry was superseded by a later promotion that
                    // pushed a newer entry onto the heap; discard it.
                    inner.heap.pop();
                    continue;
                }
                _ => {}
            }

            if entry.expiry_date > now {
                return deleted; // root of the heap not yet due; nothing else can be either
            }
            inner.heap.pop();

            let reprieve = inner
                .sessions
                .get(&entry.id)
                .and_then(|record| record.connection.on_delete(false))
                .filter(|deadline| *deadline > now);

            match reprieve {
                Some(deadline) => {
                    if let Some(record) = inner.sessions.get_mut(&entry.id) {
                        record.expiry_date = deadline;
                        record.promotion = Promotion::None;
                    }
                    inner.heap.push(Reverse(HeapEntry {
                        expiry_date: deadline,
                        id: entry.id,
                    }));
                }
                None => {
                    inner.sessions.remove(&entry.id);
                    deleted += 1;
                }
            }
        }
    }
}

/// A lightweight reference to one session: an id plus the store that owns
/// it. Cheap to clone and to pass around; looking up the live connection
/// is a separate, explicit step via [`Self::connection`].
#[derive(Clone)]
pub struct SessionHandle {
    id: SessionId,
    store: SessionStore,
}

impl SessionHandle {
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the live connection, or `None` if the session has since
    /// been removed.
    pub fn connection(&self) -> Option<Arc<VirtualConnection>> {
        let inner = self.store.inner.lock().unwrap();
        inner.sessions.get(&self.id).map(|r| r.connection.clone())
    }

    /// Extends this session's expiry window to start from now, sliding
    /// its deadline forward. A no-op if the session has no configured
    /// expiry, is already gone, or the slide wouldn't actually move the
    /// deadline later. The actual heap entry is only rewritten lazily, at
    /// the next sweep that observes this session.
    pub fn promote(&self) {
        let mut inner = self.store.inner.lock().unwrap();
        if let Some(record) = inner.sessions.get_mut(&self.id) {
            if let Some(expiry) = record.expiry {
                let candidate = Instant::now() + expiry;
                if candidate > record.expiry_date {
                    record.expiry_date = candidate;
                    record.promotion = Promotion::At(candidate);
                    inner.heap.push(Reverse(HeapEntry {
                        expiry_date: candidate,
                        id: self.id.clone(),
                    }));
                }
            }
        }
    }

    /// Forcibly removes this session. See [`SessionStore::remove`].
    pub fn remove(&self) -> bool {
        self.store.remove(&self.id)
    }
}
