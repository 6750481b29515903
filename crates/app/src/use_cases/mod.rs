//! Application use cases over the `Client` aggregate.
//!
//! Mutating use cases run the same pipeline:
//!
//! ```text
//! load client → mutate (events recorded) → save → mark → dispatch
//! ```
//!
//! Events therefore reach subscribers only after the client was saved. A
//! dispatch failure is reported as [`UseCaseError::Dispatch`]; the change
//! itself is already persisted at that point.

mod client;
mod expense;
mod goal;
mod income;

use pocketbook_core::Entity;
use pocketbook_events::EventBus;
use pocketbook_finance::{Client, ClientEvent, ClientId};

use crate::config::AppConfig;
use crate::error::{UseCaseError, UseCaseResult};
use crate::repositories::{ClientLookup, Repositories};

pub use client::RegisterClientRequest;
pub use expense::CreateExpenseRequest;
pub use goal::CreateGoalRequest;
pub use income::CreateIncomeRequest;

/// Entry point for every finance use case.
///
/// Generic over the event bus so tests can pass a bare registry and
/// applications an `Arc`-shared one.
#[derive(Debug)]
pub struct FinanceUseCases<B> {
    repos: Repositories,
    bus: B,
    default_page_size: u32,
}

impl<B> FinanceUseCases<B>
where
    B: EventBus<ClientEvent>,
{
    pub fn new(repos: Repositories, bus: B, config: &AppConfig) -> Self {
        Self {
            repos,
            bus,
            default_page_size: config.default_page_size,
        }
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    fn load_client(&self, client_id: &ClientId) -> UseCaseResult<Client> {
        self.repos
            .clients
            .find_unique(&ClientLookup::Id(*client_id))?
            .ok_or(UseCaseError::ClientNotFound)
    }

    /// Save `client`, then flush its pending events to subscribers.
    fn commit(&self, client: &Client) -> UseCaseResult<()> {
        self.repos.clients.save(client)?;

        self.bus.mark_aggregate_for_dispatch(client);
        let summary = self.bus.dispatch_events_for_aggregate(client.id())?;
        tracing::debug!(
            client_id = %client.id(),
            events = summary.events,
            handler_calls = summary.handler_calls,
            "client committed"
        );
        Ok(())
    }
}

/// Resolve a child lookup that missed the client's own records: a record
/// owned by someone else is `NotAllowed`, anything else is `not_found`.
fn missing_child<T>(
    stored: Option<T>,
    owner: impl Fn(&T) -> ClientId,
    client_id: ClientId,
    not_found: UseCaseError,
) -> UseCaseError {
    match stored {
        Some(record) if owner(&record) != client_id => UseCaseError::NotAllowed,
        _ => not_found,
    }
}

/// Ownership check for read-side lookups.
fn owned_by<T>(
    stored: Option<T>,
    owner: impl Fn(&T) -> ClientId,
    client_id: ClientId,
    not_found: UseCaseError,
) -> UseCaseResult<T> {
    match stored {
        Some(record) if owner(&record) == client_id => Ok(record),
        Some(_) => Err(UseCaseError::NotAllowed),
        None => Err(not_found),
    }
}
