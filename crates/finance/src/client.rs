//! The `Client` aggregate: a user's incomes, expenses and savings goals.
//!
//! Every mutation validates first, then changes the relevant watched list,
//! touches `updated_at` and records events. Recorded events stay in the
//! aggregate until a bus that marked it dispatches them; the aggregate never
//! talks to the bus itself.

use chrono::{DateTime, Utc};

use pocketbook_core::{
    DomainError, DomainResult, EmitsEvents, Entity, EventBuffer, WatchedList, ensure_not_blank,
    impl_identity_eq, validate_all,
};

use crate::events::ClientEvent;
use crate::ids::{ClientId, ExpenseId, GoalId, IncomeId};
use crate::{Expense, Goal, Income, Money};

/// Input for [`Client::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
    /// Defaults to zero.
    pub monthly_income: Option<Money>,
}

/// Full persisted state of a client, children included.
#[derive(Debug, Clone)]
pub struct ClientSnapshot {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
    pub monthly_income: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub incomes: Vec<Income>,
    pub expenses: Vec<Expense>,
    pub goals: Vec<Goal>,
}

/// Profile fields to change. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Client {
    id: ClientId,
    name: String,
    email: String,
    password_hash: String,
    phone_number: Option<String>,
    avatar_url: Option<String>,
    monthly_income: Money,
    incomes: WatchedList<Income>,
    expenses: WatchedList<Expense>,
    goals: WatchedList<Goal>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    events: EventBuffer<ClientEvent>,
}

impl_identity_eq!(Client);

fn validate_email(email: &str) -> DomainResult<()> {
    ensure_not_blank(email, "email")?;
    if !email.contains('@') {
        return Err(DomainError::validation(format!("email {email:?} is not valid")));
    }
    Ok(())
}

fn to_money(cents: i128) -> Money {
    Money::from_cents(u64::try_from(cents.max(0)).unwrap_or(u64::MAX))
}

impl Client {
    /// Register a new client. No events are recorded.
    pub fn create(input: NewClient) -> DomainResult<Self> {
        Self::restore(
            ClientId::new(),
            ClientSnapshot {
                name: input.name,
                email: input.email,
                password_hash: input.password_hash,
                phone_number: input.phone_number,
                avatar_url: input.avatar_url,
                monthly_income: input.monthly_income.unwrap_or(Money::ZERO),
                created_at: Utc::now(),
                updated_at: None,
                incomes: Vec::new(),
                expenses: Vec::new(),
                goals: Vec::new(),
            },
        )
    }

    /// Rebuild a client from persisted state. Restored children form the
    /// watched lists' baseline; no events are recorded.
    pub fn restore(id: ClientId, snapshot: ClientSnapshot) -> DomainResult<Self> {
        validate_all([
            snapshot
                .name
                .trim()
                .is_empty()
                .then_some("name is missing or empty"),
            snapshot
                .email
                .trim()
                .is_empty()
                .then_some("email is missing or empty"),
            snapshot
                .password_hash
                .is_empty()
                .then_some("password hash is missing or empty"),
            (snapshot.incomes.iter().any(|i| i.client_id() != id)
                || snapshot.expenses.iter().any(|e| e.client_id() != id)
                || snapshot.goals.iter().any(|g| g.client_id() != id))
            .then_some("client owns a record that belongs to another client"),
        ])?;
        validate_email(&snapshot.email)?;

        let client = Self {
            id,
            name: snapshot.name.trim().to_string(),
            email: snapshot.email.trim().to_string(),
            password_hash: snapshot.password_hash,
            phone_number: snapshot.phone_number,
            avatar_url: snapshot.avatar_url,
            monthly_income: snapshot.monthly_income,
            incomes: WatchedList::by_identity(snapshot.incomes),
            expenses: WatchedList::by_identity(snapshot.expenses),
            goals: WatchedList::by_identity(snapshot.goals),
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            events: EventBuffer::new(),
        };

        if client.raw_balance() < 0 {
            return Err(DomainError::validation(
                "client expenses exceed monthly income plus incomes",
            ));
        }
        Ok(client)
    }

    pub fn snapshot(&self) -> ClientSnapshot {
        ClientSnapshot {
            name: self.name.clone(),
            email: self.email.clone(),
            password_hash: self.password_hash.clone(),
            phone_number: self.phone_number.clone(),
            avatar_url: self.avatar_url.clone(),
            monthly_income: self.monthly_income,
            created_at: self.created_at,
            updated_at: self.updated_at,
            incomes: self.incomes.items().to_vec(),
            expenses: self.expenses.items().to_vec(),
            goals: self.goals.items().to_vec(),
        }
    }

    pub fn id_typed(&self) -> ClientId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    pub fn monthly_income(&self) -> Money {
        self.monthly_income
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn incomes(&self) -> &WatchedList<Income> {
        &self.incomes
    }

    pub fn expenses(&self) -> &WatchedList<Expense> {
        &self.expenses
    }

    pub fn goals(&self) -> &WatchedList<Goal> {
        &self.goals
    }

    /// `monthly_income + Σ incomes − Σ expenses`.
    pub fn balance(&self) -> Money {
        to_money(self.raw_balance())
    }

    fn raw_balance(&self) -> i128 {
        let incomes: i128 = self
            .incomes
            .items()
            .iter()
            .map(|i| i128::from(i.amount().cents()))
            .sum();
        let expenses: i128 = self
            .expenses
            .items()
            .iter()
            .map(|e| i128::from(e.amount().cents()))
            .sum();
        i128::from(self.monthly_income.cents()) + incomes - expenses
    }

    fn touch(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        self.updated_at = Some(now);
        now
    }

    fn record_balance(&self, occurred_at: DateTime<Utc>) {
        self.events.record(ClientEvent::BalanceUpdated {
            client_id: self.id,
            balance: self.balance(),
            occurred_at,
        });
    }

    pub fn add_income(&mut self, income: Income) -> DomainResult<()> {
        if income.client_id() != self.id {
            return Err(DomainError::validation("income belongs to another client"));
        }
        if self.incomes.contains(&income) {
            return Err(DomainError::validation(format!(
                "income {} was already added",
                income.id()
            )));
        }

        let now = self.touch();
        self.events.record(ClientEvent::IncomeAdded {
            client_id: self.id,
            income_id: income.id_typed(),
            income: income.props(),
            occurred_at: now,
        });
        self.incomes.add(income);
        self.record_balance(now);
        Ok(())
    }

    /// Add an expense. Fails when it exceeds the balance available before it.
    pub fn add_expense(&mut self, expense: Expense) -> DomainResult<()> {
        if expense.client_id() != self.id {
            return Err(DomainError::validation("expense belongs to another client"));
        }
        if self.expenses.contains(&expense) {
            return Err(DomainError::validation(format!(
                "expense {} was already added",
                expense.id()
            )));
        }
        let available = self.balance();
        if expense.amount() > available {
            return Err(DomainError::validation(format!(
                "expense of {} exceeds available balance of {available}",
                expense.amount()
            )));
        }

        let now = self.touch();
        self.events.record(ClientEvent::ExpenseAdded {
            client_id: self.id,
            expense_id: expense.id_typed(),
            expense: expense.props(),
            occurred_at: now,
        });
        self.expenses.add(expense);
        self.record_balance(now);
        Ok(())
    }

    /// Add a goal. A goal that starts with savings also records a
    /// contribution, and one that starts complete records that it was reached.
    pub fn add_goal(&mut self, goal: Goal) -> DomainResult<()> {
        if goal.client_id() != self.id {
            return Err(DomainError::validation("goal belongs to another client"));
        }
        if self.goals.contains(&goal) {
            return Err(DomainError::validation(format!(
                "goal {} was already added",
                goal.id()
            )));
        }

        let now = self.touch();
        self.events.record(ClientEvent::GoalAdded {
            client_id: self.id,
            goal_id: goal.id_typed(),
            goal: goal.props(),
            occurred_at: now,
        });
        if !goal.saved().is_zero() {
            self.events.record(ClientEvent::GoalContributed {
                client_id: self.id,
                goal_id: goal.id_typed(),
                amount: goal.saved(),
                saved: goal.saved(),
                target: goal.target(),
                occurred_at: now,
            });
        }
        if goal.is_reached() {
            self.events.record(ClientEvent::GoalReached {
                client_id: self.id,
                goal_id: goal.id_typed(),
                target: goal.target(),
                occurred_at: now,
            });
        }
        self.goals.add(goal);
        Ok(())
    }

    /// Remove an income. Unknown ids are ignored; removing an income the
    /// client has already spent fails.
    pub fn remove_income(&mut self, income_id: &IncomeId) -> DomainResult<Option<Income>> {
        let Some(income) = self.incomes.find_by_id(income_id).cloned() else {
            return Ok(None);
        };
        if self.raw_balance() < i128::from(income.amount().cents()) {
            return Err(DomainError::validation(format!(
                "removing income {income_id} would leave a negative balance"
            )));
        }

        self.incomes.remove(&income);
        let now = self.touch();
        self.events.record(ClientEvent::IncomeRemoved {
            client_id: self.id,
            income_id: *income_id,
            amount: income.amount(),
            occurred_at: now,
        });
        self.record_balance(now);
        Ok(Some(income))
    }

    /// Remove an expense. Unknown ids are ignored. Dropping an expense only
    /// raises the balance, so this cannot fail.
    pub fn remove_expense(&mut self, expense_id: &ExpenseId) -> Option<Expense> {
        let expense = self.expenses.find_by_id(expense_id).cloned()?;

        self.expenses.remove(&expense);
        let now = self.touch();
        self.events.record(ClientEvent::ExpenseRemoved {
            client_id: self.id,
            expense_id: *expense_id,
            amount: expense.amount(),
            occurred_at: now,
        });
        self.record_balance(now);
        Some(expense)
    }

    /// Remove a goal. Goals do not count towards the balance, so only
    /// `GoalRemoved` is recorded.
    pub fn remove_goal(&mut self, goal_id: &GoalId) -> Option<Goal> {
        let goal = self.goals.find_by_id(goal_id).cloned()?;

        self.goals.remove(&goal);
        let now = self.touch();
        self.events.record(ClientEvent::GoalRemoved {
            client_id: self.id,
            goal_id: *goal_id,
            occurred_at: now,
        });
        Some(goal)
    }

    pub fn set_monthly_income(&mut self, amount: Money) -> DomainResult<()> {
        let balance = self.raw_balance() - i128::from(self.monthly_income.cents())
            + i128::from(amount.cents());
        if balance < 0 {
            return Err(DomainError::validation(format!(
                "monthly income of {amount} would leave a negative balance"
            )));
        }

        self.monthly_income = amount;
        let now = self.touch();
        self.record_balance(now);
        Ok(())
    }

    /// Put `amount` towards one of the client's goals and return the updated
    /// goal.
    pub fn contribute(&mut self, goal_id: &GoalId, amount: Money) -> DomainResult<Goal> {
        let mut goal = self
            .goals
            .find_by_id(goal_id)
            .cloned()
            .ok_or_else(|| DomainError::validation(format!("goal {goal_id} not found")))?;

        let reached = goal.contribute(amount)?;
        self.goals.replace(goal.clone());
        let now = self.touch();
        self.events.record(ClientEvent::GoalContributed {
            client_id: self.id,
            goal_id: *goal_id,
            amount,
            saved: goal.saved(),
            target: goal.target(),
            occurred_at: now,
        });
        if reached {
            self.events.record(ClientEvent::GoalReached {
                client_id: self.id,
                goal_id: *goal_id,
                target: goal.target(),
                occurred_at: now,
            });
        }
        Ok(goal)
    }

    /// Apply the profile fields that are set and differ from the current
    /// ones. Returns whether anything changed. Records no events.
    pub fn update_profile(&mut self, update: ProfileUpdate) -> DomainResult<bool> {
        fn changed(new: Option<String>, current: Option<&str>) -> Option<String> {
            new.map(|v| v.trim().to_string())
                .filter(|v| Some(v.as_str()) != current)
        }

        let name = changed(update.name, Some(self.name.as_str()));
        let email = changed(update.email, Some(self.email.as_str()));
        let password_hash = update
            .password_hash
            .filter(|h| h.as_str() != self.password_hash);
        let phone_number = changed(update.phone_number, self.phone_number.as_deref());
        let avatar_url = changed(update.avatar_url, self.avatar_url.as_deref());

        if let Some(name) = &name {
            ensure_not_blank(name, "name")?;
        }
        if let Some(email) = &email {
            validate_email(email)?;
        }
        if let Some(hash) = &password_hash {
            ensure_not_blank(hash, "password hash")?;
        }
        if let Some(phone) = &phone_number {
            ensure_not_blank(phone, "phone number")?;
        }
        if let Some(avatar) = &avatar_url {
            ensure_not_blank(avatar, "avatar url")?;
        }

        let any = name.is_some()
            || email.is_some()
            || password_hash.is_some()
            || phone_number.is_some()
            || avatar_url.is_some();
        if !any {
            return Ok(false);
        }

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(hash) = password_hash {
            self.password_hash = hash;
        }
        if phone_number.is_some() {
            self.phone_number = phone_number;
        }
        if avatar_url.is_some() {
            self.avatar_url = avatar_url;
        }
        self.touch();
        Ok(true)
    }
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl EmitsEvents for Client {
    type Event = ClientEvent;

    fn domain_events(&self) -> &EventBuffer<ClientEvent> {
        &self.events
    }
}
