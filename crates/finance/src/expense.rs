use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pocketbook_core::{DomainResult, Entity, impl_identity_eq};

use crate::ids::{ClientId, ExpenseId};
use crate::income::normalize_description;
use crate::{Category, Money};

/// Input for [`Expense::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub client_id: ClientId,
    pub amount: Money,
    pub date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub category: Option<Category>,
}

/// Persisted state of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseProps {
    pub client_id: ClientId,
    pub amount: Money,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Money spent by a client.
#[derive(Debug, Clone)]
pub struct Expense {
    id: ExpenseId,
    client_id: ClientId,
    amount: Money,
    date: DateTime<Utc>,
    description: Option<String>,
    category: Option<Category>,
    updated_at: Option<DateTime<Utc>>,
}

impl_identity_eq!(Expense);

impl Expense {
    pub fn create(input: NewExpense) -> DomainResult<Self> {
        Self::restore(
            ExpenseId::new(),
            ExpenseProps {
                client_id: input.client_id,
                amount: input.amount,
                date: input.date.unwrap_or_else(Utc::now),
                description: input.description,
                category: input.category,
                updated_at: None,
            },
        )
    }

    pub fn restore(id: ExpenseId, props: ExpenseProps) -> DomainResult<Self> {
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

    pub fn id_typed(&self) -> ExpenseId {
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

    pub fn props(&self) -> ExpenseProps {
        ExpenseProps {
            client_id: self.client_id,
            amount: self.amount,
            date: self.date,
            description: self.description.clone(),
            category: self.category.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl Entity for Expense {
    type Id = ExpenseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_expense(client_id: ClientId) -> NewExpense {
        NewExpense {
            client_id,
            amount: Money::from_cents(2_500),
            date: None,
            description: Some("  groceries ".to_string()),
            category: None,
        }
    }

    #[test]
    fn equality_is_by_identity() {
        let expense = Expense::create(new_expense(ClientId::new())).unwrap();
        let repriced = Expense::restore(
            expense.id_typed(),
            ExpenseProps {
                amount: Money::from_cents(1),
                ..expense.props()
            },
        )
        .unwrap();

        assert_eq!(expense, repriced);
        assert_eq!(repriced.amount(), Money::from_cents(1));
        assert_ne!(expense, Expense::create(new_expense(expense.client_id())).unwrap());
    }

    #[test]
    fn restore_round_trips_props() {
        let expense = Expense::create(new_expense(ClientId::new())).unwrap();
        let restored = Expense::restore(expense.id_typed(), expense.props()).unwrap();
        assert_eq!(restored.props(), expense.props());
    }
}
