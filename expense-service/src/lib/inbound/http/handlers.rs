use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::expense::errors::ExpenseError;
use crate::domain::expense::models::Expense;
use crate::domain::expense::models::Pagination;
use crate::domain::user::models::AuthSession;
use crate::domain::user::models::User;
use crate::user::errors::UserError;

pub mod create_expense;
pub mod delete_expense;
pub mod get_expense;
pub mod get_profile;
pub mod health;
pub mod list_expenses;
pub mod list_team_expenses;
pub mod login;
pub mod register;
pub mod update_expense;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, message: &str, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(message, Some(data))))
    }

    /// Success envelope without a `data` field.
    pub fn empty(status: StatusCode, message: &str) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(message, None)))
    }

    pub fn status(&self) -> StatusCode {
        self.0
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    TooManyRequests(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::InternalServerError(detail) => {
                tracing::error!("Internal server error: {}", detail);
                "Internal server error".to_string()
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::TooManyRequests(msg) => msg,
        };

        (status, Json(ApiResponseBody::<()>::new_error(status, message))).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidEmail(_)
            | UserError::InvalidName(_)
            | UserError::InvalidPassword(_)
            | UserError::EmailAlreadyExists(_) => ApiError::BadRequest(err.to_string()),
            UserError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            UserError::NotFound(_) => ApiError::NotFound("User not found".to_string()),
            UserError::Credential(_)
            | UserError::Token(_)
            | UserError::DatabaseError(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

impl From<ExpenseError> for ApiError {
    fn from(err: ExpenseError) -> Self {
        match err {
            ExpenseError::InvalidId(_)
            | ExpenseError::InvalidAmount(_)
            | ExpenseError::InvalidDate(_)
            | ExpenseError::InvalidStatus(_)
            | ExpenseError::InvalidField(_) => ApiError::BadRequest(err.to_string()),
            ExpenseError::NotFound(_) => ApiError::NotFound("Expense not found".to_string()),
            ExpenseError::AccessDenied => ApiError::Forbidden(err.to_string()),
            ExpenseError::NotTeamMember { .. } => {
                ApiError::Forbidden("Not a member of this team".to_string())
            }
            ExpenseError::DatabaseError(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request data: {}", rejection.body_text()))
    }
}

/// `Json` extractor whose rejections use the response envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Uniform response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(message: &str, data: Option<T>) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data,
            error: None,
        }
    }
}

impl ApiResponseBody<()> {
    pub fn new_error(status_code: StatusCode, error: String) -> Self {
        Self {
            success: false,
            message: status_code
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
            data: None,
            error: Some(error),
        }
    }
}

/// Public view of an identity; the password hash is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponseData {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponseData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            first_name: user.first_name.as_str().to_string(),
            last_name: user.last_name.as_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResponseData {
    pub token: String,
    pub user: UserResponseData,
}

impl From<&AuthSession> for AuthResponseData {
    fn from(session: &AuthSession) -> Self {
        Self {
            token: session.token.clone(),
            user: (&session.user).into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseResponseData {
    pub id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub description: String,
    pub category: String,
    pub expense_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_image_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Expense> for ExpenseResponseData {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id.to_string(),
            user_id: expense.owner_id.to_string(),
            team_id: expense.team_id.map(|t| t.to_string()),
            amount: expense.amount.value(),
            currency: expense.currency.clone(),
            description: expense.description.clone(),
            category: expense.category.clone(),
            expense_date: expense.expense_date.to_string(),
            receipt_image_url: expense.receipt_image_url.clone(),
            status: expense.status.as_str().to_string(),
            created_at: expense.created_at,
            updated_at: expense.updated_at,
        }
    }
}

/// Lenient `page`/`limit` query parameters; unparsable values fall back to
/// the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    page: Option<String>,
    limit: Option<String>,
}

impl PageParams {
    pub fn into_pagination(self) -> Pagination {
        let parse = |v: Option<String>| v.and_then(|s| s.trim().parse::<i64>().ok());
        Pagination::new(parse(self.page), parse(self.limit))
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let body = ApiResponseBody::new("Done", Some(json!({ "id": 1 })));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "success": true, "message": "Done", "data": { "id": 1 } })
        );

        let empty = ApiResponseBody::<()>::new("Deleted", None);
        assert_eq!(
            serde_json::to_value(&empty).unwrap(),
            json!({ "success": true, "message": "Deleted" })
        );
    }

    #[test]
    fn test_error_envelope_shape() {
        let body = ApiResponseBody::<()>::new_error(StatusCode::NOT_FOUND, "Expense not found".into());
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "success": false, "message": "Not Found", "error": "Expense not found" })
        );
    }

    #[test]
    fn test_user_error_status_mapping() {
        let cases = [
            (UserError::EmailAlreadyExists("a@b.c".into()), StatusCode::BAD_REQUEST),
            (UserError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (UserError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (UserError::DatabaseError("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (UserError::Token("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_expense_error_status_mapping() {
        use crate::domain::expense::errors::AmountError;

        let cases = [
            (ExpenseError::InvalidAmount(AmountError::NotPositive(0.0)), StatusCode::BAD_REQUEST),
            (ExpenseError::AccessDenied, StatusCode::FORBIDDEN),
            (ExpenseError::DatabaseError("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[tokio::test]
    async fn test_internal_error_detail_is_not_leaked() {
        let response =
            ApiError::InternalServerError("relation \"users\" does not exist".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn test_page_params_are_lenient() {
        let params = PageParams {
            page: Some("abc".into()),
            limit: Some("0".into()),
        };
        let pagination = params.into_pagination();
        assert_eq!((pagination.page(), pagination.limit()), (1, 10));
    }
}
