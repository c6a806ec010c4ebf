use axum::extract::Path;
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
use crate::domain::expense::models::ExpenseDate;
use crate::domain::expense::models::ExpenseId;
use crate::domain::expense::models::ExpenseStatus;
use crate::domain::expense::models::UpdateExpenseCommand;
use crate::domain::expense::ports::ExpenseServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn update_expense(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(expense_id): Path<String>,
    JsonBody(body): JsonBody<UpdateExpenseRequest>,
) -> Result<ApiSuccess<ExpenseResponseData>, ApiError> {
    let expense_id = ExpenseId::from_string(&expense_id).map_err(ExpenseError::from)?;

    state
        .expense_service
        .update_expense(&caller.user_id, &expense_id, body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref expense| {
            ApiSuccess::new(StatusCode::OK, "Expense updated successfully", expense.into())
        })
}

/// HTTP request body for a partial update; absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdateExpenseRequest {
    amount: Option<f64>,
    currency: Option<String>,
    description: Option<String>,
    category: Option<String>,
    expense_date: Option<String>,
    receipt_image_url: Option<String>,
    status: Option<String>,
}

impl UpdateExpenseRequest {
    fn try_into_command(self) -> Result<UpdateExpenseCommand, ExpenseError> {
        Ok(UpdateExpenseCommand {
            amount: self.amount.map(Amount::new).transpose()?,
            currency: self
                .currency
                .map(|c| required_text("currency", c, limits::CURRENCY).map(|c| c.to_uppercase()))
                .transpose()?,
            description: self
                .description
                .map(|d| required_text("description", d, limits::DESCRIPTION))
                .transpose()?,
            category: self
                .category
                .map(|c| required_text("category", c, limits::CATEGORY))
                .transpose()?,
            expense_date: self
                .expense_date
                .as_deref()
                .map(ExpenseDate::parse)
                .transpose()?,
            receipt_image_url: self
                .receipt_image_url
                .map(|url| required_text("receipt_image_url", url, limits::RECEIPT_URL))
                .transpose()?,
            status: self
                .status
                .as_deref()
                .map(str::parse::<ExpenseStatus>)
                .transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_request_changes_nothing() {
        let command = UpdateExpenseRequest::default().try_into_command().unwrap();
        assert!(command.amount.is_none());
        assert!(command.expense_date.is_none());
        assert!(command.status.is_none());
    }

    #[test]
    fn test_changed_date_is_revalidated() {
        let result = UpdateExpenseRequest {
            expense_date: Some("2024-13-01".to_string()),
            ..Default::default()
        }
        .try_into_command();
        assert!(matches!(result, Err(ExpenseError::InvalidDate(_))));
    }

    #[test]
    fn test_status_and_amount_validated() {
        let result = UpdateExpenseRequest {
            status: Some("paid".to_string()),
            ..Default::default()
        }
        .try_into_command();
        assert!(matches!(result, Err(ExpenseError::InvalidStatus(_))));

        let result = UpdateExpenseRequest {
            amount: Some(0.0),
            ..Default::default()
        }
        .try_into_command();
        assert!(matches!(result, Err(ExpenseError::InvalidAmount(_))));

        let command = UpdateExpenseRequest {
            status: Some("approved".to_string()),
            ..Default::default()
        }
        .try_into_command()
        .unwrap();
        assert_eq!(command.status, Some(ExpenseStatus::Approved));
    }
}
