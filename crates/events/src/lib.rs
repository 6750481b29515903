//! Domain event contracts and the in-process event registry.

pub mod bus;
pub mod event;
pub mod registry;

pub use bus::EventBus;
pub use event::DomainEvent;
pub use registry::{DispatchError, DispatchSummary, DomainEventRegistry, EventHandler, HandlerFailure};
