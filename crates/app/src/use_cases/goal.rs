use chrono::{DateTime, Utc};

use pocketbook_events::EventBus;
use pocketbook_finance::{ClientEvent, ClientId, Goal, GoalId, Money, NewGoal};

use super::{FinanceUseCases, missing_child, owned_by};
use crate::error::{UseCaseError, UseCaseResult};
use crate::repositories::GoalFilter;
use crate::search::{SearchParams, SearchResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGoalRequest {
    pub client_id: ClientId,
    pub target: Money,
    pub saved: Option<Money>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl<B> FinanceUseCases<B>
where
    B: EventBus<ClientEvent>,
{
    pub fn create_goal(&self, request: CreateGoalRequest) -> UseCaseResult<Goal> {
        let _span = tracing::info_span!("create_goal", client_id = %request.client_id).entered();
        let mut client = self.load_client(&request.client_id)?;

        let goal = Goal::create(NewGoal {
            client_id: client.id_typed(),
            target: request.target,
            saved: request.saved,
            started_at: request.started_at,
            ended_at: request.ended_at,
        })?;

        client.add_goal(goal.clone())?;
        self.commit(&client)?;
        Ok(goal)
    }

    /// Put `amount` towards a goal and return the goal as updated.
    pub fn contribute_to_goal(
        &self,
        client_id: &ClientId,
        goal_id: &GoalId,
        amount: Money,
    ) -> UseCaseResult<Goal> {
        let _span = tracing::info_span!(
            "contribute_to_goal",
            client_id = %client_id,
            goal_id = %goal_id
        )
        .entered();
        let mut client = self.load_client(client_id)?;

        if client.goals().find_by_id(goal_id).is_none() {
            let stored = self.repos.goals.find_unique(goal_id)?;
            return Err(missing_child(
                stored,
                Goal::client_id,
                *client_id,
                UseCaseError::GoalNotFound,
            ));
        }

        let goal = client.contribute(goal_id, amount)?;
        self.commit(&client)?;
        Ok(goal)
    }

    pub fn remove_goal(&self, client_id: &ClientId, goal_id: &GoalId) -> UseCaseResult<Goal> {
        let _span = tracing::info_span!("remove_goal", client_id = %client_id).entered();
        let mut client = self.load_client(client_id)?;

        let Some(goal) = client.remove_goal(goal_id) else {
            let stored = self.repos.goals.find_unique(goal_id)?;
            return Err(missing_child(
                stored,
                Goal::client_id,
                *client_id,
                UseCaseError::GoalNotFound,
            ));
        };
        self.commit(&client)?;
        Ok(goal)
    }

    pub fn get_goal(&self, client_id: &ClientId, goal_id: &GoalId) -> UseCaseResult<Goal> {
        owned_by(
            self.repos.goals.find_unique(goal_id)?,
            Goal::client_id,
            *client_id,
            UseCaseError::GoalNotFound,
        )
    }

    pub fn list_goals(
        &self,
        client_id: &ClientId,
        params: SearchParams<GoalFilter>,
    ) -> UseCaseResult<SearchResult<Goal>> {
        self.load_client(client_id)?;

        let mut params = params.with_default_per_page(self.default_page_size);
        params.filters.client_id = Some(*client_id);
        Ok(self.repos.goals.list(&params)?)
    }
}
