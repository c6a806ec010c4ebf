use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::ExpenseResponseData;
use crate::domain::expense::errors::ExpenseError;
use crate::domain::expense::models::ExpenseId;
use crate::domain::expense::ports::ExpenseServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn get_expense(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(expense_id): Path<String>,
) -> Result<ApiSuccess<ExpenseResponseData>, ApiError> {
    let expense_id = ExpenseId::from_string(&expense_id).map_err(ExpenseError::from)?;

    state
        .expense_service
        .get_expense(&caller.user_id, &expense_id)
        .await
        .map_err(ApiError::from)
        .map(|ref expense| {
            ApiSuccess::new(StatusCode::OK, "Expense retrieved successfully", expense.into())
        })
}
