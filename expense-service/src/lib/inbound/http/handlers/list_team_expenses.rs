use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::ExpenseResponseData;
use super::PageParams;
use crate::domain::expense::errors::ExpenseError;
use crate::domain::expense::models::TeamId;
use crate::domain::expense::ports::ExpenseServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn list_team_expenses(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(team_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<ApiSuccess<Vec<ExpenseResponseData>>, ApiError> {
    let team_id = TeamId::from_string(&team_id).map_err(ExpenseError::from)?;

    state
        .expense_service
        .list_team_expenses(&caller.user_id, &team_id, params.into_pagination())
        .await
        .map_err(ApiError::from)
        .map(|expenses| {
            ApiSuccess::new(
                StatusCode::OK,
                "Team expenses retrieved successfully",
                expenses.iter().map(ExpenseResponseData::from).collect(),
            )
        })
}
