use chrono::{DateTime, Utc};

use pocketbook_core::EntityId;

/// A domain event: an immutable fact about a state transition of one aggregate.
///
/// Events of a bounded context are expected to form a closed sum type (an
/// enum); `Kind` is its field-less discriminant, used to route events to the
/// handlers subscribed for them.
pub trait DomainEvent: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Identifier of the aggregate the event concerns.
    type AggregateId: EntityId;

    /// Discriminant of the event variants.
    type Kind: Copy + Eq + core::hash::Hash + core::fmt::Debug + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;

    /// Stable event name/type identifier (e.g. "client.income_added").
    fn event_type(&self) -> &'static str;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;

    fn aggregate_id(&self) -> Self::AggregateId;
}
