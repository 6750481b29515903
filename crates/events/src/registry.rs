//! In-process domain event registry.
//!
//! Holds the subscribers per event kind and the set of aggregates marked for
//! dispatch. One registry is built per process (or per test) and shared
//! through `Arc`; nothing here is static.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, warn};

use pocketbook_core::{EmitsEvents, Entity, EventBuffer};

use crate::DomainEvent;
use crate::bus::EventBus;

/// Subscriber callback. Failures are reported, never retried.
pub type EventHandler<E> = Arc<dyn Fn(&E) -> anyhow::Result<()> + Send + Sync>;

/// Outcome of a successful flush.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Events taken out of the aggregate's buffer.
    pub events: usize,
    /// Handler invocations performed.
    pub handler_calls: usize,
}

/// A handler that returned an error while an event was being delivered.
#[derive(Debug)]
pub struct HandlerFailure {
    pub event_type: &'static str,
    pub error: anyhow::Error,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// One or more handlers failed. Every other handler still ran and the
    /// aggregate's buffer has been cleared.
    #[error("{} event handler(s) failed while dispatching for aggregate {aggregate_id}", .failures.len())]
    HandlersFailed {
        aggregate_id: String,
        summary: DispatchSummary,
        failures: Vec<HandlerFailure>,
    },
}

struct MarkedAggregate<E: DomainEvent> {
    id: E::AggregateId,
    events: EventBuffer<E>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Subscriber map + marked-aggregate set for one closed event type `E`.
pub struct DomainEventRegistry<E: DomainEvent> {
    handlers: Mutex<HashMap<E::Kind, Vec<EventHandler<E>>>>,
    marked: Mutex<Vec<MarkedAggregate<E>>>,
}

impl<E: DomainEvent> DomainEventRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler for `kind`. Handlers of one kind run in registration order.
    pub fn register<F>(&self, kind: E::Kind, handler: F)
    where
        F: Fn(&E) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_handler(kind, Arc::new(handler));
    }

    pub fn register_handler(&self, kind: E::Kind, handler: EventHandler<E>) {
        lock(&self.handlers).entry(kind).or_default().push(handler);
    }

    pub fn mark_aggregate_for_dispatch<A>(&self, aggregate: &A)
    where
        A: Entity<Id = E::AggregateId> + EmitsEvents<Event = E>,
    {
        let mut marked = lock(&self.marked);
        if marked.iter().any(|m| &m.id == aggregate.id()) {
            return;
        }
        debug!(aggregate_id = %aggregate.id(), "aggregate marked for dispatch");
        marked.push(MarkedAggregate {
            id: aggregate.id().clone(),
            events: aggregate.domain_events().share(),
        });
    }

    pub fn is_marked(&self, id: &E::AggregateId) -> bool {
        lock(&self.marked).iter().any(|m| &m.id == id)
    }

    pub fn marked_count(&self) -> usize {
        lock(&self.marked).len()
    }

    pub fn handler_count(&self, kind: E::Kind) -> usize {
        lock(&self.handlers).get(&kind).map_or(0, Vec::len)
    }

    pub fn dispatch_events_for_aggregate(
        &self,
        id: &E::AggregateId,
    ) -> Result<DispatchSummary, DispatchError> {
        let entry = {
            let mut marked = lock(&self.marked);
            let pos = marked.iter().position(|m| &m.id == id);
            pos.map(|pos| marked.remove(pos))
        };

        let Some(entry) = entry else {
            debug!(aggregate_id = %id, "no marked aggregate; nothing to dispatch");
            return Ok(DispatchSummary::default());
        };

        let events = entry.events.drain();
        debug!(aggregate_id = %id, events = events.len(), "dispatching domain events");

        let mut summary = DispatchSummary {
            events: events.len(),
            handler_calls: 0,
        };
        let mut failures = Vec::new();
        for event in &events {
            summary.handler_calls += self.deliver(event, &mut failures);
        }

        Self::finish(id.to_string(), summary, failures)
    }

    pub fn publish(&self, event: &E) -> Result<DispatchSummary, DispatchError> {
        let mut failures = Vec::new();
        let handler_calls = self.deliver(event, &mut failures);
        let summary = DispatchSummary {
            events: 1,
            handler_calls,
        };
        Self::finish(event.aggregate_id().to_string(), summary, failures)
    }

    /// Drop every subscriber.
    pub fn clear_handlers(&self) {
        lock(&self.handlers).clear();
    }

    /// Forget every mark without touching the aggregates' buffers.
    pub fn clear_marked_aggregates(&self) {
        lock(&self.marked).clear();
    }

    fn deliver(&self, event: &E, failures: &mut Vec<HandlerFailure>) -> usize {
        // Snapshot so handlers may register further subscribers without deadlocking.
        let handlers: Vec<EventHandler<E>> = lock(&self.handlers)
            .get(&event.kind())
            .cloned()
            .unwrap_or_default();

        for handler in &handlers {
            if let Err(error) = handler(event) {
                warn!(
                    event_type = event.event_type(),
                    aggregate_id = %event.aggregate_id(),
                    error = %error,
                    "event handler failed"
                );
                failures.push(HandlerFailure {
                    event_type: event.event_type(),
                    error,
                });
            }
        }
        handlers.len()
    }

    fn finish(
        aggregate_id: String,
        summary: DispatchSummary,
        failures: Vec<HandlerFailure>,
    ) -> Result<DispatchSummary, DispatchError> {
        if failures.is_empty() {
            Ok(summary)
        } else {
            Err(DispatchError::HandlersFailed {
                aggregate_id,
                summary,
                failures,
            })
        }
    }
}

impl<E: DomainEvent> Default for DomainEventRegistry<E> {
    fn default() -> Self {
        Self {
            handlers: Mutex::new(HashMap::new()),
            marked: Mutex::new(Vec::new()),
        }
    }
}

impl<E: DomainEvent> core::fmt::Debug for DomainEventRegistry<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomainEventRegistry")
            .field("kinds", &lock(&self.handlers).len())
            .field("marked", &self.marked_count())
            .finish()
    }
}

impl<E: DomainEvent> EventBus<E> for DomainEventRegistry<E> {
    fn mark_aggregate_for_dispatch<A>(&self, aggregate: &A)
    where
        A: Entity<Id = E::AggregateId> + EmitsEvents<Event = E>,
    {
        DomainEventRegistry::mark_aggregate_for_dispatch(self, aggregate)
    }

    fn dispatch_events_for_aggregate(
        &self,
        id: &E::AggregateId,
    ) -> Result<DispatchSummary, DispatchError> {
        DomainEventRegistry::dispatch_events_for_aggregate(self, id)
    }

    fn publish(&self, event: &E) -> Result<DispatchSummary, DispatchError> {
        DomainEventRegistry::publish(self, event)
    }

    fn subscribe(&self, kind: E::Kind, handler: EventHandler<E>) {
        self.register_handler(kind, handler)
    }
}
