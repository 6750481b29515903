use chrono::{DateTime, Utc};

use pocketbook_events::EventBus;
use pocketbook_finance::{Category, ClientEvent, ClientId, Income, IncomeId, Money, NewIncome};

use super::{FinanceUseCases, missing_child, owned_by};
use crate::error::{UseCaseError, UseCaseResult};
use crate::repositories::EntryFilter;
use crate::search::{SearchParams, SearchResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIncomeRequest {
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
    pub fn create_income(&self, request: CreateIncomeRequest) -> UseCaseResult<Income> {
        let _span =
            tracing::info_span!("create_income", client_id = %request.client_id).entered();
        let mut client = self.load_client(&request.client_id)?;

        let income = Income::create(NewIncome {
            client_id: client.id_typed(),
            amount: request.amount,
            date: request.date,
            description: request.description,
            category: request.category.map(Category::new).transpose()?,
        })?;

        client.add_income(income.clone())?;
        self.commit(&client)?;
        Ok(income)
    }

    pub fn remove_income(
        &self,
        client_id: &ClientId,
        income_id: &IncomeId,
    ) -> UseCaseResult<Income> {
        let _span = tracing::info_span!("remove_income", client_id = %client_id).entered();
        let mut client = self.load_client(client_id)?;

        let Some(income) = client.remove_income(income_id)? else {
            let stored = self.repos.incomes.find_unique(income_id)?;
            return Err(missing_child(
                stored,
                Income::client_id,
                *client_id,
                UseCaseError::IncomeNotFound,
            ));
        };
        self.commit(&client)?;
        Ok(income)
    }

    pub fn get_income(&self, client_id: &ClientId, income_id: &IncomeId) -> UseCaseResult<Income> {
        owned_by(
            self.repos.incomes.find_unique(income_id)?,
            Income::client_id,
            *client_id,
            UseCaseError::IncomeNotFound,
        )
    }

    /// List the client's incomes. The client filter is always the caller.
    pub fn list_incomes(
        &self,
        client_id: &ClientId,
        params: SearchParams<EntryFilter>,
    ) -> UseCaseResult<SearchResult<Income>> {
        self.load_client(client_id)?;

        let mut params = params.with_default_per_page(self.default_page_size);
        params.filters.client_id = Some(*client_id);
        Ok(self.repos.incomes.list(&params)?)
    }
}
