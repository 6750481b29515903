use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pocketbook_core::{DomainResult, Entity, impl_identity_eq};

use crate::ids::{ClientId, IncomeId};
use crate::{Category, Money};

/// Input for [`Income::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncome {
    pub client_id: ClientId,
    pub amount: Money,
    /// Defaults to now.
    pub date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub category: Option<Category>,
}

/// Persisted state of an income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeProps {
    pub client_id: ClientId,
    pub amount: Money,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Money received by a client.
#[derive(Debug, Clone)]
pub struct Income {
    id: IncomeId,
    client_id: ClientId,
    amount: Money,
    date: DateTime<Utc>,
    description: Option<String>,
    category: Option<Category>,
    updated_at: Option<DateTime<Utc>>,
}

impl_identity_eq!(Income);

pub(crate) fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

impl Income {
    pub fn create(input: NewIncome) -> DomainResult<Self> {
        Self::restore(
            IncomeId::new(),
            IncomeProps {
                client_id: input.client_id,
                amount: input.amount,
                date: input.date.unwrap_or_else(Utc::now),
                description: input.description,
                category: input.category,
                updated_at: None,
            },
        )
    }

    /// Rebuild an income from persisted state.
    pub fn restore(id: IncomeId, props: IncomeProps) -> DomainResult<Self> {
        Ok(Self {
            id,
            client_id: props.client_id,
            amount: props.amount,
            date: props.date,
            description: normalize_description(props.description),
            category: props.category,
            updated_at: props.updated_at,
        })
    }

    pub fn id_typed(&self) -> IncomeId {
        self.id
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn props(&self) -> IncomeProps {
        IncomeProps {
            client_id: self.client_id,
            amount: self.amount,
            date: self.date,
            description: self.description.clone(),
            category: self.category.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl Entity for Income {
    type Id = IncomeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
