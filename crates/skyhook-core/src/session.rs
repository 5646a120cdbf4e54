//! A session owns the references of exactly one bound entity. Switching
//! entities always goes through Unbound: every reference of the old entity is
//! released before the binder sees the new one.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use skyhook_sdk::{Entity, Facet, Uid};
use tracing::debug;

use crate::queue::DeliveryQueue;
use crate::reference::{Reference, Releasable, ReleaseProbe};
use crate::sync::lock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "uid", rename_all = "snake_case")]
pub enum SessionState {
    Unbound,
    Bound(Uid),
}

impl SessionState {
    pub fn uid(&self) -> Option<&Uid> {
        match self {
            Self::Unbound => None,
            Self::Bound(uid) => Some(uid),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbound => f.write_str("unbound"),
            Self::Bound(uid) => write!(f, "bound({uid})"),
        }
    }
}

// ── Reference set ───────────────────────────────────────────────────

/// References created for one binding, released together.
pub struct ReferenceSet {
    queue: DeliveryQueue,
    live: Vec<Box<dyn Releasable>>,
}

impl ReferenceSet {
    pub fn new(queue: DeliveryQueue) -> Self {
        Self {
            queue,
            live: Vec::new(),
        }
    }

    /// Queue that every reference of this set must deliver on.
    pub fn queue(&self) -> &DeliveryQueue {
        &self.queue
    }

    /// Take ownership of `reference` until the next [`release_all`](Self::release_all).
    pub fn track<T: Clone + Send + Sync + 'static>(&mut self, reference: Reference<T>) -> ReleaseProbe {
        let probe = reference.probe();
        self.live.push(Box::new(reference));
        probe
    }

    /// Number of tracked references that are not released.
    pub fn live(&self) -> usize {
        self.live.iter().filter(|r| !r.is_released()).count()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Release and forget every tracked reference. Returns how many there were.
    pub fn release_all(&mut self) -> usize {
        let count = self.live.len();
        for reference in self.live.drain(..) {
            reference.release();
        }
        count
    }
}

impl Drop for ReferenceSet {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl fmt::Debug for ReferenceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceSet")
            .field("tracked", &self.len())
            .field("live", &self.live())
            .finish()
    }
}

// ── Session ─────────────────────────────────────────────────────────

/// Screen-specific half of a session: which references to create for a
/// bound entity, and how to clear the screen when it goes away.
pub trait Binder<E>: Send {
    fn bind(&mut self, entity: &E, refs: &mut ReferenceSet);

    /// Put derived state back to its cleared projection.
    fn reset(&mut self);
}

/// Current entity of one kind plus the references bound to it.
pub struct Session<E: Entity> {
    name: &'static str,
    state: SessionState,
    entity: Option<E>,
    refs: ReferenceSet,
    binder: Box<dyn Binder<E>>,
}

impl<E: Entity> Session<E> {
    pub fn new(name: &'static str, queue: DeliveryQueue, binder: impl Binder<E> + 'static) -> Self {
        Self {
            name,
            state: SessionState::Unbound,
            entity: None,
            refs: ReferenceSet::new(queue),
            binder: Box::new(binder),
        }
    }

    /// Follow the upstream selection. The same entity is a no-op; anything
    /// else (another uid, a replaced object under the same uid, or none)
    /// tears the current binding down first.
    pub fn update(&mut self, entity: Option<E>) {
        let unchanged = match (&self.entity, &entity) {
            (Some(current), Some(next)) => current.same_entity(next),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }

        self.unbind();
        if let Some(entity) = entity {
            self.bind(entity);
        }
    }

    fn bind(&mut self, entity: E) {
        self.binder.bind(&entity, &mut self.refs);
        debug!(
            session = self.name,
            uid = %entity.uid(),
            references = self.refs.len(),
            "entity bound"
        );
        self.state = SessionState::Bound(entity.uid().clone());
        self.entity = Some(entity);
    }

    fn unbind(&mut self) {
        let SessionState::Bound(uid) = std::mem::replace(&mut self.state, SessionState::Unbound)
        else {
            return;
        };
        let released = self.refs.release_all();
        self.entity = None;
        self.binder.reset();
        debug!(session = self.name, %uid, released, "entity unbound");
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn entity(&self) -> Option<&E> {
        self.entity.as_ref()
    }

    pub fn live_references(&self) -> usize {
        self.refs.live()
    }

    /// Unbind without waiting for upstream.
    pub fn teardown(&mut self) {
        self.unbind();
    }
}

impl<E: Entity> fmt::Debug for Session<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("refs", &self.refs)
            .finish_non_exhaustive()
    }
}

// ── Session manager ─────────────────────────────────────────────────

/// Drives a [`Session`] from an upstream "current entity" facet.
pub struct SessionManager<E: Entity> {
    session: Arc<Mutex<Session<E>>>,
    upstream: Box<dyn Releasable>,
}

impl<E: Entity> SessionManager<E> {
    /// Subscribe `session` to `upstream`. `select` extracts the entity from
    /// each upstream value; an absent upstream value means no entity.
    ///
    /// The current selection is bound before this returns, so call it from
    /// a job on `queue`.
    pub fn attach<U, S>(queue: &DeliveryQueue, upstream: Facet<U>, select: S, session: Session<E>) -> Self
    where
        U: Clone + Send + Sync + 'static,
        S: Fn(&U) -> Option<E> + Send + 'static,
    {
        let session = Arc::new(Mutex::new(session));
        let target = Arc::clone(&session);
        let upstream = Reference::create(queue, upstream, move |value: Option<&U>| {
            let entity = value.and_then(|value| select(value));
            lock(&target).update(entity);
        });
        Self {
            session,
            upstream: Box::new(upstream),
        }
    }

    pub fn state(&self) -> SessionState {
        lock(&self.session).state().clone()
    }

    pub fn live_references(&self) -> usize {
        lock(&self.session).live_references()
    }

    pub fn with_entity<R>(&self, f: impl FnOnce(&E) -> R) -> Option<R> {
        lock(&self.session).entity().map(f)
    }

    /// Stop following upstream and release the current binding. Idempotent.
    pub fn detach(&self) {
        self.upstream.release();
        lock(&self.session).teardown();
    }
}

impl<E: Entity> Drop for SessionManager<E> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<E: Entity> fmt::Debug for SessionManager<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
