use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::ExpenseResponseData;
use super::JsonBody;
use crate::domain::expense::errors::ExpenseError;
use crate::domain::expense::models::limits;
use crate::domain::expense::models::required_text;
use crate::domain::expense::models::Amount;
use crate::domain::expense::models::CreateExpenseCommand;
use crate::domain::expense::models::ExpenseDate;
use crate::domain::expense::models::TeamId;
use crate::domain::expense::ports::ExpenseServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn create_expense(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    JsonBody(body): JsonBody<CreateExpenseRequest>,
) -> Result<ApiSuccess<ExpenseResponseData>, ApiError> {
    state
        .expense_service
        .create_expense(&caller.user_id, body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref expense| {
            ApiSuccess::new(StatusCode::CREATED, "Expense created successfully", expense.into())
        })
}

/// HTTP request body for creating an expense.
///
/// Unknown fields, including any attempt to name an owner, are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateExpenseRequest {
    amount: f64,
    currency: String,
    description: String,
    category: String,
    expense_date: String,
    team_id: Option<String>,
    receipt_image_url: Option<String>,
}

impl CreateExpenseRequest {
    fn try_into_command(self) -> Result<CreateExpenseCommand, ExpenseError> {
        Ok(CreateExpenseCommand {
            amount: Amount::new(self.amount)?,
            currency: required_text("currency", self.currency, limits::CURRENCY)?.to_uppercase(),
            description: required_text("description", self.description, limits::DESCRIPTION)?,
            category: required_text("category", self.category, limits::CATEGORY)?,
            expense_date: ExpenseDate::parse(&self.expense_date)?,
            team_id: self.team_id.as_deref().map(TeamId::from_string).transpose()?,
            receipt_image_url: self
                .receipt_image_url
                .map(|url| required_text("receipt_image_url", url, limits::RECEIPT_URL))
                .transpose()?,
        })
    }
}
