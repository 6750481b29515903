//! In-memory repositories for tests/dev. Not optimized for performance.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use pocketbook_core::Entity;
use pocketbook_finance::{
    Client, ClientId, ClientSnapshot, Expense, ExpenseId, ExpenseProps, Goal, GoalId, GoalProps,
    Income, IncomeId, IncomeProps,
};

use super::{
    ClientLookup, ClientRepository, EntryFilter, ExpenseRepository, GoalFilter, GoalRepository,
    IncomeRepository, RepositoryResult,
};
use crate::error::RepositoryError;
use crate::search::{SearchParams, SearchResult, SortDirection, paginate};

/// Keyed records behind a lock.
#[derive(Debug)]
struct Table<K, V> {
    rows: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Copy + core::fmt::Display, V: Clone> Table<K, V> {
    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, HashMap<K, V>>> {
        self.rows
            .read()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, HashMap<K, V>>> {
        self.rows
            .write()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".to_string()))
    }

    fn get(&self, key: &K) -> RepositoryResult<Option<V>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn insert_new(&self, key: K, value: V) -> RepositoryResult<()> {
        let mut rows = self.write()?;
        if rows.contains_key(&key) {
            return Err(RepositoryError::Conflict(key.to_string()));
        }
        rows.insert(key, value);
        Ok(())
    }

    fn update(&self, key: K, value: V) -> RepositoryResult<()> {
        let mut rows = self.write()?;
        match rows.get_mut(&key) {
            Some(row) => {
                *row = value;
                Ok(())
            }
            None => Err(RepositoryError::NotFound(key.to_string())),
        }
    }

    fn delete(&self, key: &K) -> RepositoryResult<()> {
        self.write()?.remove(key);
        Ok(())
    }

    fn filtered(&self, keep: impl Fn(&V) -> bool) -> RepositoryResult<Vec<(K, V)>> {
        Ok(self
            .read()?
            .iter()
            .filter(|(_, v)| keep(v))
            .map(|(k, v)| (*k, v.clone()))
            .collect())
    }
}

fn sort_rows<K: Ord, V, S: Ord>(
    rows: &mut [(K, V)],
    dir: SortDirection,
    key: impl Fn(&V) -> S,
) {
    rows.sort_by(|(ka, a), (kb, b)| key(a).cmp(&key(b)).then_with(|| ka.cmp(kb)));
    if dir == SortDirection::Desc {
        rows.reverse();
    }
}

#[derive(Debug, Default)]
pub struct InMemoryClientRepository {
    table: Table<ClientId, ClientSnapshot>,
}

impl InMemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_taken(
        rows: &HashMap<ClientId, ClientSnapshot>,
        email: &str,
        except: &ClientId,
    ) -> bool {
        rows.iter()
            .any(|(id, c)| id != except && c.email.eq_ignore_ascii_case(email))
    }
}

impl ClientRepository for InMemoryClientRepository {
    fn find_unique(&self, lookup: &ClientLookup) -> RepositoryResult<Option<Client>> {
        let found = match lookup {
            ClientLookup::Id(id) => self.table.get(id)?.map(|s| (*id, s)),
            ClientLookup::Email(email) => {
                let email = email.trim();
                self.table
                    .read()?
                    .iter()
                    .find(|(_, c)| c.email.eq_ignore_ascii_case(email))
                    .map(|(id, s)| (*id, s.clone()))
            }
        };
        found
            .map(|(id, snapshot)| Client::restore(id, snapshot).map_err(RepositoryError::from))
            .transpose()
    }

    fn create(&self, client: &Client) -> RepositoryResult<()> {
        {
            let rows = self.table.read()?;
            if Self::email_taken(&rows, client.email(), client.id()) {
                return Err(RepositoryError::Conflict(format!(
                    "email {}",
                    client.email()
                )));
            }
        }
        self.table.insert_new(client.id_typed(), client.snapshot())
    }

    fn save(&self, client: &Client) -> RepositoryResult<()> {
        {
            let rows = self.table.read()?;
            if Self::email_taken(&rows, client.email(), client.id()) {
                return Err(RepositoryError::Conflict(format!(
                    "email {}",
                    client.email()
                )));
            }
        }
        self.table.update(client.id_typed(), client.snapshot())
    }

    fn remove(&self, id: &ClientId) -> RepositoryResult<()> {
        self.table.delete(id)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryIncomeRepository {
    table: Table<IncomeId, IncomeProps>,
}

impl InMemoryIncomeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IncomeRepository for InMemoryIncomeRepository {
    fn create(&self, income: &Income) -> RepositoryResult<()> {
        self.table.insert_new(income.id_typed(), income.props())
    }

    fn find_unique(&self, id: &IncomeId) -> RepositoryResult<Option<Income>> {
        self.table
            .get(id)?
            .map(|props| Income::restore(*id, props).map_err(RepositoryError::from))
            .transpose()
    }

    fn save(&self, income: &Income) -> RepositoryResult<()> {
        self.table.update(income.id_typed(), income.props())
    }

    fn remove(&self, id: &IncomeId) -> RepositoryResult<()> {
        self.table.delete(id)
    }

    fn list(&self, params: &SearchParams<EntryFilter>) -> RepositoryResult<SearchResult<Income>> {
        let filter = &params.filters;
        let mut rows = self
            .table
            .filtered(|p| filter.matches(p.client_id, p.category.as_ref(), p.date))?;
        sort_rows(&mut rows, params.sort_dir, |p| p.date);

        let incomes = rows
            .into_iter()
            .map(|(id, props)| Income::restore(id, props))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(paginate(incomes, params))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryExpenseRepository {
    table: Table<ExpenseId, ExpenseProps>,
}

impl InMemoryExpenseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExpenseRepository for InMemoryExpenseRepository {
    fn create(&self, expense: &Expense) -> RepositoryResult<()> {
        self.table.insert_new(expense.id_typed(), expense.props())
    }

    fn find_unique(&self, id: &ExpenseId) -> RepositoryResult<Option<Expense>> {
        self.table
            .get(id)?
            .map(|props| Expense::restore(*id, props).map_err(RepositoryError::from))
            .transpose()
    }

    fn save(&self, expense: &Expense) -> RepositoryResult<()> {
        self.table.update(expense.id_typed(), expense.props())
    }

    fn remove(&self, id: &ExpenseId) -> RepositoryResult<()> {
        self.table.delete(id)
    }

    fn list(
        &self,
        params: &SearchParams<EntryFilter>,
    ) -> RepositoryResult<SearchResult<Expense>> {
        let filter = &params.filters;
        let mut rows = self
            .table
            .filtered(|p| filter.matches(p.client_id, p.category.as_ref(), p.date))?;
        sort_rows(&mut rows, params.sort_dir, |p| p.date);

        let expenses = rows
            .into_iter()
            .map(|(id, props)| Expense::restore(id, props))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(paginate(expenses, params))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryGoalRepository {
    table: Table<GoalId, GoalProps>,
}

impl InMemoryGoalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GoalRepository for InMemoryGoalRepository {
    fn create(&self, goal: &Goal) -> RepositoryResult<()> {
        self.table.insert_new(goal.id_typed(), goal.props())
    }

    fn find_unique(&self, id: &GoalId) -> RepositoryResult<Option<Goal>> {
        self.table
            .get(id)?
            .map(|props| Goal::restore(*id, props).map_err(RepositoryError::from))
            .transpose()
    }

    fn save(&self, goal: &Goal) -> RepositoryResult<()> {
        self.table.update(goal.id_typed(), goal.props())
    }

    fn remove(&self, id: &GoalId) -> RepositoryResult<()> {
        self.table.delete(id)
    }

    fn list(&self, params: &SearchParams<GoalFilter>) -> RepositoryResult<SearchResult<Goal>> {
        let filter = &params.filters;
        let mut rows = self.table.filtered(|p| {
            filter.client_id.is_none_or(|c| c == p.client_id)
                && filter.reached.is_none_or(|r| r == (p.saved == p.target))
        })?;
        sort_rows(&mut rows, params.sort_dir, |p| p.started_at);

        let goals = rows
            .into_iter()
            .map(|(id, props)| Goal::restore(id, props))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(paginate(goals, params))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use pocketbook_core::EmitsEvents;
    use pocketbook_finance::{Category, Money, NewClient, NewGoal, NewIncome};

    use super::*;

    fn client(email: &str) -> Client {
        Client::create(NewClient {
            name: "Carla".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            phone_number: None,
            avatar_url: None,
            monthly_income: None,
        })
        .unwrap()
    }

    fn income(client_id: ClientId, day: u32, category: &str) -> Income {
        Income::create(NewIncome {
            client_id,
            amount: Money::from_cents(1_000),
            date: Some(Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()),
            description: None,
            category: Some(Category::new(category).unwrap()),
        })
        .unwrap()
    }

    #[test]
    fn clients_are_found_by_id_or_email() {
        let repo = InMemoryClientRepository::new();
        let c = client("carla@example.com");
        repo.create(&c).unwrap();

        let by_id = repo.find_unique(&ClientLookup::Id(c.id_typed())).unwrap();
        assert_eq!(by_id.as_ref(), Some(&c));

        let by_email = repo
            .find_unique(&ClientLookup::Email(" CARLA@example.com ".to_string()))
            .unwrap();
        assert_eq!(by_email, Some(c));

        let missing = repo.find_unique(&ClientLookup::Id(ClientId::new())).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn email_must_be_unique() {
        let repo = InMemoryClientRepository::new();
        repo.create(&client("dup@example.com")).unwrap();
        assert!(matches!(
            repo.create(&client("DUP@example.com")),
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[test]
    fn save_requires_an_existing_record() {
        let repo = InMemoryClientRepository::new();
        assert!(matches!(
            repo.save(&client("new@example.com")),
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[test]
    fn loaded_clients_have_no_pending_events() {
        let repo = InMemoryClientRepository::new();
        let mut c = client("ev@example.com");
        repo.create(&c).unwrap();
        c.set_monthly_income(Money::from_cents(100)).unwrap();
        repo.save(&c).unwrap();

        let loaded = repo
            .find_unique(&ClientLookup::Id(c.id_typed()))
            .unwrap()
            .unwrap();
        assert_eq!(loaded.monthly_income(), Money::from_cents(100));
        assert!(loaded.domain_events().is_empty());
    }

    #[test]
    fn incomes_are_filtered_sorted_and_paged() {
        let repo = InMemoryIncomeRepository::new();
        let owner = ClientId::new();
        for day in [3, 1, 2] {
            repo.create(&income(owner, day, "Salary")).unwrap();
        }
        repo.create(&income(owner, 4, "Gift")).unwrap();
        repo.create(&income(ClientId::new(), 5, "Salary")).unwrap();

        let params = SearchParams::new(EntryFilter {
            category: Some(Category::new("Salary").unwrap()),
            ..EntryFilter::for_client(owner)
        })
        .per_page(2)
        .sorted(SortDirection::Desc);
        let page = repo.list(&params).unwrap();

        let days: Vec<_> = page.data.iter().map(|i| i.date().format("%d").to_string()).collect();
        assert_eq!(days, vec!["03", "02"]);
        assert_eq!(page.meta.total, 3);
        assert_eq!(page.meta.total_pages, 2);
    }

    #[test]
    fn entry_dates_bound_inclusively() {
        let repo = InMemoryIncomeRepository::new();
        let owner = ClientId::new();
        for day in 1..=5 {
            repo.create(&income(owner, day, "Salary")).unwrap();
        }
        let start = Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap();

        let params = SearchParams::new(EntryFilter {
            from: Some(start),
            to: Some(start + Duration::days(2)),
            ..EntryFilter::for_client(owner)
        });
        assert_eq!(repo.list(&params).unwrap().meta.total, 3);
    }

    #[test]
    fn goals_filter_on_reached() {
        let repo = InMemoryGoalRepository::new();
        let owner = ClientId::new();
        for saved in [0, 500, 1_000] {
            let goal = Goal::create(NewGoal {
                client_id: owner,
                target: Money::from_cents(1_000),
                saved: Some(Money::from_cents(saved)),
                started_at: None,
                ended_at: None,
            })
            .unwrap();
            repo.create(&goal).unwrap();
        }

        let reached = repo
            .list(&SearchParams::new(GoalFilter {
                reached: Some(true),
                ..GoalFilter::for_client(owner)
            }))
            .unwrap();
        assert_eq!(reached.meta.total, 1);
        assert!(reached.data[0].is_reached());
    }

    #[test]
    fn removing_unknown_children_is_fine() {
        let repo = InMemoryIncomeRepository::new();
        repo.remove(&IncomeId::new()).unwrap();
    }
}
