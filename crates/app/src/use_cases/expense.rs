use chrono::{DateTime, Utc};

use pocketbook_events::EventBus;
use pocketbook_finance::{Category, ClientEvent, ClientId, Expense, ExpenseId, Money, NewExpense};

use super::{FinanceUseCases, missing_child, owned_by};
use crate::error::{UseCaseError, UseCaseResult};
use crate::repositories::EntryFilter;
use crate::search::{SearchParams, SearchResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateExpenseRequest {
    pub client_id: ClientId,
    pub amount: Money,
    pub date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl<B> FinanceUseCases<B>
where
    B: EventBus<ClientEvent>,
{
    pub fn create_expense(&self, request: CreateExpenseRequest) -> UseCaseResult<Expense> {
        let _span =
            tracing::info_span!("create_expense", client_id = %request.client_id).entered();
        let mut client = self.load_client(&request.client_id)?;

        let expense = Expense::create(NewExpense {
            client_id: client.id_typed(),
            amount: request.amount,
            date: request.date,
            description: request.description,
            category: request.category.map(Category::new).transpose()?,
        })?;

        client.add_expense(expense.clone())?;
        self.commit(&client)?;
        Ok(expense)
    }

    pub fn remove_expense(
        &self,
        client_id: &ClientId,
        expense_id: &ExpenseId,
    ) -> UseCaseResult<Expense> {
        let _span = tracing::info_span!("remove_expense", client_id = %client_id).entered();
        let mut client = self.load_client(client_id)?;

        let Some(expense) = client.remove_expense(expense_id) else {
            let stored = self.repos.expenses.find_unique(expense_id)?;
            return Err(missing_child(
                stored,
                Expense::client_id,
                *client_id,
                UseCaseError::ExpenseNotFound,
            ));
        };
        self.commit(&client)?;
        Ok(expense)
    }

    pub fn get_expense(&self, client_id: &ClientId, expense_id: &ExpenseId) -> UseCaseResult<Expense> {
        owned_by(
            self.repos.expenses.find_unique(expense_id)?,
            Expense::client_id,
            *client_id,
            UseCaseError::ExpenseNotFound,
        )
    }

    /// List the client's expenses. The client filter is always the caller.
    pub fn list_expenses(
        &self,
        client_id: &ClientId,
        params: SearchParams<EntryFilter>,
    ) -> UseCaseResult<SearchResult<Expense>> {
        self.load_client(client_id)?;

        let mut params = params.with_default_per_page(self.default_page_size);
        params.filters.client_id = Some(*client_id);
        Ok(self.repos.expenses.list(&params)?)
    }
}
