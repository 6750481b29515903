//! Event subscribers: keep the child repositories in step with the client
//! aggregate and emit user-facing notifications.

use std::sync::Arc;

use anyhow::{Context, anyhow};

use pocketbook_events::{DomainEvent, EventBus};
use pocketbook_finance::{ClientEvent, ClientEventKind, Expense, Goal, Income};

use crate::repositories::{ExpenseRepository, GoalRepository, IncomeRepository, Repositories};

const NOTIFICATIONS: &str = "pocketbook::notifications";

/// Subscribe every handler on `bus`. Persistence handlers run before the
/// notification handler of the same event kind.
pub fn register_subscribers<B>(bus: &B, repos: &Repositories)
where
    B: EventBus<ClientEvent>,
{
    let incomes = Arc::clone(&repos.incomes);
    for kind in [ClientEventKind::IncomeAdded, ClientEventKind::IncomeRemoved] {
        let incomes = Arc::clone(&incomes);
        bus.subscribe(
            kind,
            Arc::new(move |event: &ClientEvent| persist_income(incomes.as_ref(), event)),
        );
    }

    let expenses = Arc::clone(&repos.expenses);
    for kind in [ClientEventKind::ExpenseAdded, ClientEventKind::ExpenseRemoved] {
        let expenses = Arc::clone(&expenses);
        bus.subscribe(
            kind,
            Arc::new(move |event: &ClientEvent| persist_expense(expenses.as_ref(), event)),
        );
    }

    let goals = Arc::clone(&repos.goals);
    for kind in [
        ClientEventKind::GoalAdded,
        ClientEventKind::GoalRemoved,
        ClientEventKind::GoalContributed,
    ] {
        let goals = Arc::clone(&goals);
        bus.subscribe(
            kind,
            Arc::new(move |event: &ClientEvent| persist_goal(goals.as_ref(), event)),
        );
    }

    for kind in [
        ClientEventKind::IncomeAdded,
        ClientEventKind::ExpenseAdded,
        ClientEventKind::GoalContributed,
        ClientEventKind::GoalReached,
    ] {
        bus.subscribe(kind, Arc::new(notify));
    }
}

fn persist_income(repo: &dyn IncomeRepository, event: &ClientEvent) -> anyhow::Result<()> {
    match event {
        ClientEvent::IncomeAdded {
            income_id, income, ..
        } => {
            let income = Income::restore(*income_id, income.clone())?;
            repo.create(&income)
                .with_context(|| format!("persisting income {income_id}"))?;
        }
        ClientEvent::IncomeRemoved { income_id, .. } => repo.remove(income_id)?,
        _ => {}
    }
    Ok(())
}

fn persist_expense(repo: &dyn ExpenseRepository, event: &ClientEvent) -> anyhow::Result<()> {
    match event {
        ClientEvent::ExpenseAdded {
            expense_id,
            expense,
            ..
        } => {
            let expense = Expense::restore(*expense_id, expense.clone())?;
            repo.create(&expense)
                .with_context(|| format!("persisting expense {expense_id}"))?;
        }
        ClientEvent::ExpenseRemoved { expense_id, .. } => repo.remove(expense_id)?,
        _ => {}
    }
    Ok(())
}

fn persist_goal(repo: &dyn GoalRepository, event: &ClientEvent) -> anyhow::Result<()> {
    match event {
        ClientEvent::GoalAdded { goal_id, goal, .. } => {
            let goal = Goal::restore(*goal_id, goal.clone())?;
            repo.create(&goal)
                .with_context(|| format!("persisting goal {goal_id}"))?;
        }
        ClientEvent::GoalRemoved { goal_id, .. } => repo.remove(goal_id)?,
        ClientEvent::GoalContributed {
            goal_id,
            saved,
            occurred_at,
            ..
        } => {
            let stored = repo
                .find_unique(goal_id)?
                .ok_or_else(|| anyhow!("goal {goal_id} was never persisted"))?;
            let mut props = stored.props();
            props.saved = *saved;
            props.updated_at = Some(*occurred_at);
            repo.save(&Goal::restore(*goal_id, props)?)?;
        }
        _ => {}
    }
    Ok(())
}

fn notify(event: &ClientEvent) -> anyhow::Result<()> {
    let client_id = event.aggregate_id();
    match event {
        ClientEvent::IncomeAdded { income, .. } => tracing::info!(
            target: NOTIFICATIONS,
            client_id = %client_id,
            "client received {}",
            income.amount.formatted()
        ),
        ClientEvent::ExpenseAdded { expense, .. } => tracing::info!(
            target: NOTIFICATIONS,
            client_id = %client_id,
            "client spent {}",
            expense.amount.formatted()
        ),
        ClientEvent::GoalContributed {
            goal_id, amount, ..
        } => tracing::info!(
            target: NOTIFICATIONS,
            client_id = %client_id,
            goal_id = %goal_id,
            "client contributed {} to a goal",
            amount.formatted()
        ),
        ClientEvent::GoalReached {
            goal_id, target, ..
        } => {
            let payload = serde_json::to_string(event)?;
            tracing::info!(
                target: NOTIFICATIONS,
                client_id = %client_id,
                goal_id = %goal_id,
                payload = %payload,
                "goal of {} reached",
                target.formatted()
            );
        }
        _ => {}
    }
    Ok(())
}
