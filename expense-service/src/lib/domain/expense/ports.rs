use async_trait::async_trait;

use crate::domain::expense::errors::ExpenseError;
use crate::domain::expense::models::CreateExpenseCommand;
use crate::domain::expense::models::Expense;
use crate::domain::expense::models::ExpenseId;
use crate::domain::expense::models::Pagination;
use crate::domain::expense::models::TeamId;
use crate::domain::expense::models::UpdateExpenseCommand;
use crate::domain::user::models::UserId;

/// Port for owner-gated expense operations.
///
/// Every method takes the verified caller identity; callers never supply an
/// owner of their own.
#[async_trait]
pub trait ExpenseServicePort: Send + Sync + 'static {
    /// Create a pending expense owned by `caller`.
    ///
    /// # Errors
    /// * `NotTeamMember` - `team_id` given and caller is not a member
    /// * `DatabaseError` - Database operation failed
    async fn create_expense(
        &self,
        caller: &UserId,
        command: CreateExpenseCommand,
    ) -> Result<Expense, ExpenseError>;

    /// # Errors
    /// * `NotFound` - Expense does not exist
    /// * `AccessDenied` - Caller does not own the expense
    async fn get_expense(&self, caller: &UserId, id: &ExpenseId) -> Result<Expense, ExpenseError>;

    /// List the caller's own expenses, newest expense date first.
    async fn list_expenses(
        &self,
        caller: &UserId,
        pagination: Pagination,
    ) -> Result<Vec<Expense>, ExpenseError>;

    /// Apply a partial update to an expense the caller owns.
    ///
    /// # Errors
    /// * `NotFound` - Expense does not exist
    /// * `AccessDenied` - Caller does not own the expense
    async fn update_expense(
        &self,
        caller: &UserId,
        id: &ExpenseId,
        command: UpdateExpenseCommand,
    ) -> Result<Expense, ExpenseError>;

    /// # Errors
    /// * `NotFound` - Expense does not exist
    /// * `AccessDenied` - Caller does not own the expense
    async fn delete_expense(&self, caller: &UserId, id: &ExpenseId) -> Result<(), ExpenseError>;

    /// List a team's expenses.
    ///
    /// # Errors
    /// * `NotTeamMember` - Caller does not belong to the team
    async fn list_team_expenses(
        &self,
        caller: &UserId,
        team_id: &TeamId,
        pagination: Pagination,
    ) -> Result<Vec<Expense>, ExpenseError>;
}

/// Persistence operations for expenses.
///
/// `update` and `delete` are additionally scoped by owner at the storage
/// level.
#[async_trait]
pub trait ExpenseStore: Send + Sync + 'static {
    async fn create(&self, expense: Expense) -> Result<Expense, ExpenseError>;

    async fn find_by_id(&self, id: &ExpenseId) -> Result<Option<Expense>, ExpenseError>;

    async fn list_by_owner(
        &self,
        owner_id: &UserId,
        pagination: Pagination,
    ) -> Result<Vec<Expense>, ExpenseError>;

    async fn list_by_team(
        &self,
        team_id: &TeamId,
        pagination: Pagination,
    ) -> Result<Vec<Expense>, ExpenseError>;

    /// Persist all mutable fields of `expense`.
    ///
    /// # Returns
    /// `None` when no row matches both id and owner
    async fn update(&self, expense: Expense) -> Result<Option<Expense>, ExpenseError>;

    /// # Returns
    /// `false` when no row matches both id and owner
    async fn delete(&self, id: &ExpenseId, owner_id: &UserId) -> Result<bool, ExpenseError>;
}

/// Team membership policy.
#[async_trait]
pub trait TeamMembership: Send + Sync + 'static {
    async fn is_member(&self, team_id: &TeamId, user_id: &UserId) -> Result<bool, ExpenseError>;
}
