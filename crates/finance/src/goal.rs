use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pocketbook_core::{DomainError, DomainResult, Entity, impl_identity_eq, validate_all};

use crate::Money;
use crate::ids::{ClientId, GoalId};

/// Input for [`Goal::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGoal {
    pub client_id: ClientId,
    pub target: Money,
    /// Defaults to zero.
    pub saved: Option<Money>,
    /// Defaults to now.
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// Persisted state of a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalProps {
    pub client_id: ClientId,
    pub target: Money,
    pub saved: Money,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Savings goal: money put aside until `saved` reaches `target`.
///
/// `saved` never exceeds `target`. Reaching the target is not a lock; further
/// contributions are simply rejected because they would break that bound.
#[derive(Debug, Clone)]
pub struct Goal {
    id: GoalId,
    client_id: ClientId,
    target: Money,
    saved: Money,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl_identity_eq!(Goal);

impl Goal {
    pub fn create(input: NewGoal) -> DomainResult<Self> {
        Self::restore(
            GoalId::new(),
            GoalProps {
                client_id: input.client_id,
                target: input.target,
                saved: input.saved.unwrap_or(Money::ZERO),
                started_at: input.started_at.unwrap_or_else(Utc::now),
                ended_at: input.ended_at,
                updated_at: None,
            },
        )
    }

    pub fn restore(id: GoalId, props: GoalProps) -> DomainResult<Self> {
        validate_all([
            props
                .target
                .is_zero()
                .then_some("goal target must be greater than zero"),
            (props.saved > props.target).then_some("goal saved amount cannot exceed its target"),
            props
                .ended_at
                .is_some_and(|end| end < props.started_at)
                .then_some("goal cannot end before it starts"),
        ])?;

        Ok(Self {
            id,
            client_id: props.client_id,
            target: props.target,
            saved: props.saved,
            started_at: props.started_at,
            ended_at: props.ended_at,
            updated_at: props.updated_at,
        })
    }

    pub fn id_typed(&self) -> GoalId {
        self.id
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn target(&self) -> Money {
        self.target
    }

    pub fn saved(&self) -> Money {
        self.saved
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn is_reached(&self) -> bool {
        self.saved == self.target
    }

    /// What is still missing to reach the target.
    pub fn remaining(&self) -> Money {
        Money::from_cents(self.target.cents() - self.saved.cents())
    }

    /// Saved share of the target, rounded to the nearest whole percent and
    /// capped at 100.
    pub fn progress_percent(&self) -> u8 {
        let saved = u128::from(self.saved.cents());
        let target = u128::from(self.target.cents());
        let percent = (saved * 200 + target) / (target * 2);
        percent.min(100) as u8
    }

    /// Put `amount` towards the goal.
    ///
    /// Returns `true` when this contribution is the one that reached the
    /// target.
    pub fn contribute(&mut self, amount: Money) -> DomainResult<bool> {
        if amount.is_zero() {
            return Err(DomainError::validation(
                "contribution must be greater than zero",
            ));
        }
        let saved = self.saved.add(&amount)?;
        if saved > self.target {
            return Err(DomainError::validation(format!(
                "contribution of {amount} exceeds the remaining {} of the goal",
                self.remaining()
            )));
        }

        let was_reached = self.is_reached();
        self.saved = saved;
        self.updated_at = Some(Utc::now());
        Ok(!was_reached && self.is_reached())
    }

    pub fn props(&self) -> GoalProps {
        GoalProps {
            client_id: self.client_id,
            target: self.target,
            saved: self.saved,
            started_at: self.started_at,
            ended_at: self.ended_at,
            updated_at: self.updated_at,
        }
    }
}

impl Entity for Goal {
    type Id = GoalId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
