use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::ExpenseResponseData;
use super::PageParams;
use crate::domain::expense::ports::ExpenseServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn list_expenses(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Query(params): Query<PageParams>,
) -> Result<ApiSuccess<Vec<ExpenseResponseData>>, ApiError> {
    state
        .expense_service
        .list_expenses(&caller.user_id, params.into_pagination())
        .await
        .map_err(ApiError::from)
        .map(|expenses| {
            ApiSuccess::new(
                StatusCode::OK,
                "Expenses retrieved successfully",
                expenses.iter().map(ExpenseResponseData::from).collect(),
            )
        })
}
