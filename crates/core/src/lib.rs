//! `pocketbook-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;
pub mod watched_list;

pub use aggregate::{AggregateRoot, EmitsEvents, EventBuffer};
pub use entity::Entity;
pub use error::{DomainError, DomainResult, ensure_not_blank, validate_all};
pub use id::{EntityId, IdSequence, IncrementalEntityId, UniqueEntityId};
pub use value_object::ValueObject;
pub use watched_list::WatchedList;
