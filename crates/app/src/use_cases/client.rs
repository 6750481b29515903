use pocketbook_core::Entity;
use pocketbook_events::EventBus;
use pocketbook_finance::{Client, ClientEvent, ClientId, Money, NewClient, ProfileUpdate};

use super::FinanceUseCases;
use crate::error::{RepositoryError, UseCaseError, UseCaseResult};
use crate::repositories::ClientLookup;

/// Input for [`FinanceUseCases::register_client`]. Password hashing happens
/// before this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterClientRequest {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
    pub monthly_income: Option<Money>,
}

impl<B> FinanceUseCases<B>
where
    B: EventBus<ClientEvent>,
{
    pub fn register_client(&self, request: RegisterClientRequest) -> UseCaseResult<Client> {
        let _span = tracing::info_span!("register_client").entered();

        let existing = self
            .repos
            .clients
            .find_unique(&ClientLookup::Email(request.email.clone()))?;
        if existing.is_some() {
            return Err(UseCaseError::ClientAlreadyExists);
        }

        let client = Client::create(NewClient {
            name: request.name,
            email: request.email,
            password_hash: request.password_hash,
            phone_number: request.phone_number,
            avatar_url: request.avatar_url,
            monthly_income: request.monthly_income,
        })?;

        match self.repos.clients.create(&client) {
            Ok(()) => {}
            Err(RepositoryError::Conflict(_)) => return Err(UseCaseError::ClientAlreadyExists),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(client_id = %client.id(), "client registered");
        Ok(client)
    }

    pub fn get_client(&self, client_id: &ClientId) -> UseCaseResult<Client> {
        self.load_client(client_id)
    }

    /// Change profile fields. Nothing is written when no field changes.
    pub fn update_client(
        &self,
        client_id: &ClientId,
        update: ProfileUpdate,
    ) -> UseCaseResult<Client> {
        let _span = tracing::info_span!("update_client", client_id = %client_id).entered();
        let mut client = self.load_client(client_id)?;

        if let Some(email) = &update.email {
            let holder = self
                .repos
                .clients
                .find_unique(&ClientLookup::Email(email.clone()))?;
            if holder.is_some_and(|other| other.id() != client.id()) {
                return Err(UseCaseError::ClientAlreadyExists);
            }
        }

        if client.update_profile(update)? {
            self.repos.clients.save(&client)?;
        }
        Ok(client)
    }

    pub fn set_monthly_income(
        &self,
        client_id: &ClientId,
        amount: Money,
    ) -> UseCaseResult<Client> {
        let _span = tracing::info_span!("set_monthly_income", client_id = %client_id).entered();
        let mut client = self.load_client(client_id)?;

        client.set_monthly_income(amount)?;
        self.commit(&client)?;
        Ok(client)
    }
}
