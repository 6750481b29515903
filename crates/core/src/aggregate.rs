//! Aggregate roots and their pending domain events.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::entity::Entity;

/// Append-only buffer of domain events recorded by an aggregate and not yet
/// dispatched.
///
/// The buffer can hand out a *shared* handle ([`EventBuffer::share`]) so an
/// event bus that marked the aggregate observes events recorded after the
/// mark. `Clone` on the other hand produces an independent copy: cloning an
/// aggregate never links the copies' event streams.
pub struct EventBuffer<E> {
    events: Arc<Mutex<Vec<E>>>,
}

impl<E> EventBuffer<E> {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn guard(&self) -> MutexGuard<'_, Vec<E>> {
        // The buffer holds plain data; a panic mid-push cannot leave it torn.
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an event.
    pub fn record(&self, event: E) {
        self.guard().push(event);
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    /// Remove and return every pending event, in recording order.
    pub fn drain(&self) -> Vec<E> {
        std::mem::take(&mut *self.guard())
    }

    pub fn clear(&self) {
        self.guard().clear();
    }

    /// Handle onto the same underlying storage.
    pub fn share(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }

    /// Whether `other` is a handle onto the same storage.
    pub fn is_shared_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.events, &other.events)
    }
}

impl<E: Clone> EventBuffer<E> {
    /// Copy of the pending events, in recording order.
    pub fn snapshot(&self) -> Vec<E> {
        self.guard().clone()
    }
}

impl<E> Default for EventBuffer<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> Clone for EventBuffer<E> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::new(Mutex::new(self.snapshot())),
        }
    }
}

impl<E: core::fmt::Debug> core::fmt::Debug for EventBuffer<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.guard().iter()).finish()
    }
}

/// Capability: the type records domain events into an [`EventBuffer`].
pub trait EmitsEvents {
    type Event;

    fn domain_events(&self) -> &EventBuffer<Self::Event>;
}

/// Aggregate root: an entity that is the consistency boundary of its cluster
/// and the sole source of its domain events.
///
/// Blanket-implemented for every `Entity + EmitsEvents`.
pub trait AggregateRoot: Entity + EmitsEvents {}

impl<T> AggregateRoot for T where T: Entity + EmitsEvents {}
