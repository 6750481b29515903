//! Domain events raised by the [`crate::Client`] aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pocketbook_events::DomainEvent;

use crate::ids::{ClientId, ExpenseId, GoalId, IncomeId};
use crate::{ExpenseProps, GoalProps, IncomeProps, Money};

/// Everything that can happen to a client's finances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    IncomeAdded {
        client_id: ClientId,
        income_id: IncomeId,
        income: IncomeProps,
        occurred_at: DateTime<Utc>,
    },
    IncomeRemoved {
        client_id: ClientId,
        income_id: IncomeId,
        amount: Money,
        occurred_at: DateTime<Utc>,
    },
    ExpenseAdded {
        client_id: ClientId,
        expense_id: ExpenseId,
        expense: ExpenseProps,
        occurred_at: DateTime<Utc>,
    },
    ExpenseRemoved {
        client_id: ClientId,
        expense_id: ExpenseId,
        amount: Money,
        occurred_at: DateTime<Utc>,
    },
    GoalAdded {
        client_id: ClientId,
        goal_id: GoalId,
        goal: GoalProps,
        occurred_at: DateTime<Utc>,
    },
    GoalRemoved {
        client_id: ClientId,
        goal_id: GoalId,
        occurred_at: DateTime<Utc>,
    },
    /// `amount` was put towards the goal, bringing it to `saved`.
    GoalContributed {
        client_id: ClientId,
        goal_id: GoalId,
        amount: Money,
        saved: Money,
        target: Money,
        occurred_at: DateTime<Utc>,
    },
    GoalReached {
        client_id: ClientId,
        goal_id: GoalId,
        target: Money,
        occurred_at: DateTime<Utc>,
    },
    /// Balance after the change that preceded this event.
    BalanceUpdated {
        client_id: ClientId,
        balance: Money,
        occurred_at: DateTime<Utc>,
    },
}

/// Discriminant of [`ClientEvent`], used to subscribe handlers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientEventKind {
    IncomeAdded,
    IncomeRemoved,
    ExpenseAdded,
    ExpenseRemoved,
    GoalAdded,
    GoalRemoved,
    GoalContributed,
    GoalReached,
    BalanceUpdated,
}

impl ClientEventKind {
    pub const ALL: [ClientEventKind; 9] = [
        ClientEventKind::IncomeAdded,
        ClientEventKind::IncomeRemoved,
        ClientEventKind::ExpenseAdded,
        ClientEventKind::ExpenseRemoved,
        ClientEventKind::GoalAdded,
        ClientEventKind::GoalRemoved,
        ClientEventKind::GoalContributed,
        ClientEventKind::GoalReached,
        ClientEventKind::BalanceUpdated,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ClientEventKind::IncomeAdded => "client.income_added",
            ClientEventKind::IncomeRemoved => "client.income_removed",
            ClientEventKind::ExpenseAdded => "client.expense_added",
            ClientEventKind::ExpenseRemoved => "client.expense_removed",
            ClientEventKind::GoalAdded => "client.goal_added",
            ClientEventKind::GoalRemoved => "client.goal_removed",
            ClientEventKind::GoalContributed => "client.goal_contributed",
            ClientEventKind::GoalReached => "client.goal_reached",
            ClientEventKind::BalanceUpdated => "client.balance_updated",
        }
    }
}

impl core::fmt::Display for ClientEventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DomainEvent for ClientEvent {
    type AggregateId = ClientId;
    type Kind = ClientEventKind;

    fn kind(&self) -> ClientEventKind {
        match self {
            ClientEvent::IncomeAdded { .. } => ClientEventKind::IncomeAdded,
            ClientEvent::IncomeRemoved { .. } => ClientEventKind::IncomeRemoved,
            ClientEvent::ExpenseAdded { .. } => ClientEventKind::ExpenseAdded,
            ClientEvent::ExpenseRemoved { .. } => ClientEventKind::ExpenseRemoved,
            ClientEvent::GoalAdded { .. } => ClientEventKind::GoalAdded,
            ClientEvent::GoalRemoved { .. } => ClientEventKind::GoalRemoved,
            ClientEvent::GoalContributed { .. } => ClientEventKind::GoalContributed,
            ClientEvent::GoalReached { .. } => ClientEventKind::GoalReached,
            ClientEvent::BalanceUpdated { .. } => ClientEventKind::BalanceUpdated,
        }
    }

    fn event_type(&self) -> &'static str {
        self.kind().as_str()
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ClientEvent::IncomeAdded { occurred_at, .. }
            | ClientEvent::IncomeRemoved { occurred_at, .. }
            | ClientEvent::ExpenseAdded { occurred_at, .. }
            | ClientEvent::ExpenseRemoved { occurred_at, .. }
            | ClientEvent::GoalAdded { occurred_at, .. }
            | ClientEvent::GoalRemoved { occurred_at, .. }
            | ClientEvent::GoalContributed { occurred_at, .. }
            | ClientEvent::GoalReached { occurred_at, .. }
            | ClientEvent::BalanceUpdated { occurred_at, .. } => *occurred_at,
        }
    }

    fn aggregate_id(&self) -> ClientId {
        match self {
            ClientEvent::IncomeAdded { client_id, .. }
            | ClientEvent::IncomeRemoved { client_id, .. }
            | ClientEvent::ExpenseAdded { client_id, .. }
            | ClientEvent::ExpenseRemoved { client_id, .. }
            | ClientEvent::GoalAdded { client_id, .. }
            | ClientEvent::GoalRemoved { client_id, .. }
            | ClientEvent::GoalContributed { client_id, .. }
            | ClientEvent::GoalReached { client_id, .. }
            | ClientEvent::BalanceUpdated { client_id, .. } => *client_id,
        }
    }
}
