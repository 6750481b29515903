//! Event bus capability used by application services.
//!
//! Aggregates only *record* events. Once the unit of work that changed an
//! aggregate has been persisted, the caller marks the aggregate and asks the
//! bus to flush it:
//!
//! ```text
//! load aggregate → mutate (events recorded) → save → mark → dispatch → handlers
//! ```
//!
//! Handlers therefore only ever observe state changes that were durably saved.

use std::sync::Arc;

use pocketbook_core::{EmitsEvents, Entity};

use crate::DomainEvent;
use crate::registry::{DispatchError, DispatchSummary, EventHandler};

/// Publish/subscribe contract over a closed set of domain events `E`.
///
/// Delivery is synchronous and in-process: every handler has run by the time
/// `dispatch_events_for_aggregate` or `publish` returns.
pub trait EventBus<E: DomainEvent>: Send + Sync {
    /// Remember `aggregate` as having events ready to dispatch.
    ///
    /// Idempotent per aggregate id. Events recorded after the mark are still
    /// dispatched.
    fn mark_aggregate_for_dispatch<A>(&self, aggregate: &A)
    where
        A: Entity<Id = E::AggregateId> + EmitsEvents<Event = E>;

    /// Flush the pending events of a marked aggregate to its subscribers.
    ///
    /// An id that was never marked is a silent no-op.
    fn dispatch_events_for_aggregate(
        &self,
        id: &E::AggregateId,
    ) -> Result<DispatchSummary, DispatchError>;

    /// Deliver one event right away, bypassing the mark/flush protocol.
    fn publish(&self, event: &E) -> Result<DispatchSummary, DispatchError>;

    /// Subscribe `handler` to every event of `kind`.
    fn subscribe(&self, kind: E::Kind, handler: EventHandler<E>);
}

impl<E, B> EventBus<E> for Arc<B>
where
    E: DomainEvent,
    B: EventBus<E>,
{
    fn mark_aggregate_for_dispatch<A>(&self, aggregate: &A)
    where
        A: Entity<Id = E::AggregateId> + EmitsEvents<Event = E>,
    {
        (**self).mark_aggregate_for_dispatch(aggregate)
    }

    fn dispatch_events_for_aggregate(
        &self,
        id: &E::AggregateId,
    ) -> Result<DispatchSummary, DispatchError> {
        (**self).dispatch_events_for_aggregate(id)
    }

    fn publish(&self, event: &E) -> Result<DispatchSummary, DispatchError> {
        (**self).publish(event)
    }

    fn subscribe(&self, kind: E::Kind, handler: EventHandler<E>) {
        (**self).subscribe(kind, handler)
    }
}
