use thiserror::Error;

use pocketbook_core::DomainError;
use pocketbook_events::DispatchError;

/// Failure of a repository backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("record already exists: {0}")]
    Conflict(String),

    #[error("record not found: {0}")]
    NotFound(String),

    /// A stored record no longer satisfies the domain rules.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<DomainError> for RepositoryError {
    fn from(value: DomainError) -> Self {
        RepositoryError::Corrupt(value.to_string())
    }
}

/// Why a use case did not complete.
#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("client not found")]
    ClientNotFound,

    #[error("a client with this email already exists")]
    ClientAlreadyExists,

    #[error("income not found")]
    IncomeNotFound,

    #[error("expense not found")]
    ExpenseNotFound,

    #[error("goal not found")]
    GoalNotFound,

    /// The record exists but belongs to another client.
    #[error("not allowed")]
    NotAllowed,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The change was saved but some event handlers failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl UseCaseError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            UseCaseError::ClientNotFound => "client_not_found",
            UseCaseError::ClientAlreadyExists => "client_already_exists",
            UseCaseError::IncomeNotFound => "income_not_found",
            UseCaseError::ExpenseNotFound => "expense_not_found",
            UseCaseError::GoalNotFound => "goal_not_found",
            UseCaseError::NotAllowed => "not_allowed",
            UseCaseError::Domain(DomainError::Validation(_)) => "validation_error",
            UseCaseError::Domain(DomainError::InvalidId(_)) => "invalid_id",
            UseCaseError::Repository(_) => "store_error",
            UseCaseError::Dispatch(_) => "dispatch_error",
        }
    }
}

pub type UseCaseResult<T> = Result<T, UseCaseError>;
