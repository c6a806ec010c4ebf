use std::sync::Arc;

use async_trait::async_trait;

use super::errors::ExpenseError;
use super::models::CreateExpenseCommand;
use super::models::Expense;
use super::models::ExpenseId;
use super::models::Pagination;
use super::models::TeamId;
use super::models::UpdateExpenseCommand;
use super::ports::ExpenseServicePort;
use super::ports::ExpenseStore;
use super::ports::TeamMembership;
use crate::domain::user::models::UserId;

/// Concrete implementation of ExpenseServicePort.
///
/// Gates every read and mutation on ownership before touching storage.
/// Generic over store and membership policy for testability.
pub struct ExpenseService<ES, TM>
where
    ES: ExpenseStore,
    TM: TeamMembership,
{
    expense_store: Arc<ES>,
    team_membership: Arc<TM>,
}

impl<ES, TM> ExpenseService<ES, TM>
where
    ES: ExpenseStore,
    TM: TeamMembership,
{
    pub fn new(expense_store: Arc<ES>, team_membership: Arc<TM>) -> Self {
        Self {
            expense_store,
            team_membership,
        }
    }

    /// Fetch an expense and require that `caller` owns it.
    async fn owned_expense(&self, caller: &UserId, id: &ExpenseId) -> Result<Expense, ExpenseError> {
        let expense = self
            .expense_store
            .find_by_id(id)
            .await?
            .ok_or(ExpenseError::NotFound(*id))?;

        if !expense.is_owned_by(caller) {
            tracing::warn!(expense_id = %id, caller = %caller, "Expense access denied");
            return Err(ExpenseError::AccessDenied);
        }

        Ok(expense)
    }

    async fn require_membership(&self, caller: &UserId, team_id: &TeamId) -> Result<(), ExpenseError> {
        if self.team_membership.is_member(team_id, caller).await? {
            Ok(())
        } else {
            Err(ExpenseError::NotTeamMember {
                user_id: *caller,
                team_id: *team_id,
            })
        }
    }
}

#[async_trait]
impl<ES, TM> ExpenseServicePort for ExpenseService<ES, TM>
where
    ES: ExpenseStore,
    TM: TeamMembership,
{
    async fn create_expense(
        &self,
        caller: &UserId,
        command: CreateExpenseCommand,
    ) -> Result<Expense, ExpenseError> {
        if let Some(team_id) = command.team_id {
            self.require_membership(caller, &team_id).await?;
        }

        let expense = self.expense_store.create(Expense::new(*caller, command)).await?;
        tracing::info!(expense_id = %expense.id, owner = %caller, "Expense created");

        Ok(expense)
    }

    async fn get_expense(&self, caller: &UserId, id: &ExpenseId) -> Result<Expense, ExpenseError> {
        self.owned_expense(caller, id).await
    }

    async fn list_expenses(
        &self,
        caller: &UserId,
        pagination: Pagination,
    ) -> Result<Vec<Expense>, ExpenseError> {
        self.expense_store.list_by_owner(caller, pagination).await
    }

    async fn update_expense(
        &self,
        caller: &UserId,
        id: &ExpenseId,
        command: UpdateExpenseCommand,
    ) -> Result<Expense, ExpenseError> {
        let mut expense = self.owned_expense(caller, id).await?;
        expense.apply(command);

        // A concurrent delete between fetch and write leaves nothing to update.
        self.expense_store
            .update(expense)
            .await?
            .ok_or(ExpenseError::NotFound(*id))
    }

    async fn delete_expense(&self, caller: &UserId, id: &ExpenseId) -> Result<(), ExpenseError> {
        self.owned_expense(caller, id).await?;

        if !self.expense_store.delete(id, caller).await? {
            return Err(ExpenseError::NotFound(*id));
        }

        tracing::info!(expense_id = %id, owner = %caller, "Expense deleted");
        Ok(())
    }

    async fn list_team_expenses(
        &self,
        caller: &UserId,
        team_id: &TeamId,
        pagination: Pagination,
    ) -> Result<Vec<Expense>, ExpenseError> {
        self.require_membership(caller, team_id).await?;
        self.expense_store.list_by_team(team_id, pagination).await
    }
}
