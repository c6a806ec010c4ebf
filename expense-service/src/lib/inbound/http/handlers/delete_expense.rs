use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::expense::errors::ExpenseError;
use crate::domain::expense::models::ExpenseId;
use crate::domain::expense::ports::ExpenseServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn delete_expense(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(expense_id): Path<String>,
) -> Result<ApiSuccess<()>, ApiError> {
    let expense_id = ExpenseId::from_string(&expense_id).map_err(ExpenseError::from)?;

    state
        .expense_service
        .delete_expense(&caller.user_id, &expense_id)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::empty(StatusCode::OK, "Expense deleted successfully"))
}
