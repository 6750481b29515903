//! Persistence contracts for the finance aggregates.
//!
//! Repositories are synchronous and hold no domain logic. Child records
//! (incomes, expenses, goals) are written by event subscribers once the
//! owning client has been saved.

mod in_memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use pocketbook_finance::{
    Category, Client, ClientId, Expense, ExpenseId, Goal, GoalId, Income, IncomeId,
};

use crate::error::RepositoryError;
use crate::search::{SearchParams, SearchResult};

pub use in_memory::{
    InMemoryClientRepository, InMemoryExpenseRepository, InMemoryGoalRepository,
    InMemoryIncomeRepository,
};

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// How to find a single client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientLookup {
    Id(ClientId),
    /// Case-insensitive.
    Email(String),
}

/// Filters shared by income and expense listings. Dates are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub client_id: Option<ClientId>,
    pub category: Option<Category>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl EntryFilter {
    pub fn for_client(client_id: ClientId) -> Self {
        Self {
            client_id: Some(client_id),
            ..Self::default()
        }
    }

    pub(crate) fn matches(
        &self,
        client_id: ClientId,
        category: Option<&Category>,
        date: DateTime<Utc>,
    ) -> bool {
        self.client_id.is_none_or(|c| c == client_id)
            && self.category.as_ref().is_none_or(|c| Some(c) == category)
            && self.from.is_none_or(|from| date >= from)
            && self.to.is_none_or(|to| date <= to)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalFilter {
    pub client_id: Option<ClientId>,
    /// `Some(true)` keeps only goals whose target was reached.
    pub reached: Option<bool>,
}

impl GoalFilter {
    pub fn for_client(client_id: ClientId) -> Self {
        Self {
            client_id: Some(client_id),
            ..Self::default()
        }
    }
}

pub trait ClientRepository: Send + Sync {
    fn find_unique(&self, lookup: &ClientLookup) -> RepositoryResult<Option<Client>>;

    /// Fails with [`RepositoryError::Conflict`] when the id or email is taken.
    fn create(&self, client: &Client) -> RepositoryResult<()>;

    fn save(&self, client: &Client) -> RepositoryResult<()>;

    fn remove(&self, id: &ClientId) -> RepositoryResult<()>;
}

pub trait IncomeRepository: Send + Sync {
    fn create(&self, income: &Income) -> RepositoryResult<()>;
    fn find_unique(&self, id: &IncomeId) -> RepositoryResult<Option<Income>>;
    fn save(&self, income: &Income) -> RepositoryResult<()>;
    /// Removing an unknown id is not an error.
    fn remove(&self, id: &IncomeId) -> RepositoryResult<()>;
    /// Sorted by date.
    fn list(&self, params: &SearchParams<EntryFilter>) -> RepositoryResult<SearchResult<Income>>;
}

pub trait ExpenseRepository: Send + Sync {
    fn create(&self, expense: &Expense) -> RepositoryResult<()>;
    fn find_unique(&self, id: &ExpenseId) -> RepositoryResult<Option<Expense>>;
    fn save(&self, expense: &Expense) -> RepositoryResult<()>;
    fn remove(&self, id: &ExpenseId) -> RepositoryResult<()>;
    fn list(&self, params: &SearchParams<EntryFilter>)
    -> RepositoryResult<SearchResult<Expense>>;
}

pub trait GoalRepository: Send + Sync {
    fn create(&self, goal: &Goal) -> RepositoryResult<()>;
    fn find_unique(&self, id: &GoalId) -> RepositoryResult<Option<Goal>>;
    fn save(&self, goal: &Goal) -> RepositoryResult<()>;
    fn remove(&self, id: &GoalId) -> RepositoryResult<()>;
    /// Sorted by start date.
    fn list(&self, params: &SearchParams<GoalFilter>) -> RepositoryResult<SearchResult<Goal>>;
}

/// The set of repositories a use case or subscriber may need.
#[derive(Clone)]
pub struct Repositories {
    pub clients: Arc<dyn ClientRepository>,
    pub incomes: Arc<dyn IncomeRepository>,
    pub expenses: Arc<dyn ExpenseRepository>,
    pub goals: Arc<dyn GoalRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            clients: Arc::new(InMemoryClientRepository::new()),
            incomes: Arc::new(InMemoryIncomeRepository::new()),
            expenses: Arc::new(InMemoryExpenseRepository::new()),
            goals: Arc::new(InMemoryGoalRepository::new()),
        }
    }
}

impl core::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
