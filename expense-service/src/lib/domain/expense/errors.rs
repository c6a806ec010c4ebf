use thiserror::Error;

use crate::domain::expense::models::ExpenseId;
use crate::domain::expense::models::TeamId;
use crate::domain::user::models::UserId;

/// Error type for ExpenseId and TeamId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error type for Amount validation failures
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AmountError {
    #[error("Amount must be greater than zero, got {0}")]
    NotPositive(f64),

    #[error("Amount must be a finite number")]
    NotFinite,
}

/// Error type for ExpenseDate parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExpenseDateError {
    #[error("Invalid expense date format, use YYYY-MM-DD: {0}")]
    InvalidFormat(String),
}

/// Error type for ExpenseStatus parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExpenseStatusError {
    #[error("Unknown status '{0}', expected one of pending, approved, rejected")]
    Unknown(String),
}

/// Error type for free-text field validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field} is required")]
    Empty { field: &'static str },

    #[error("{field} too long: maximum {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Top-level error type for all expense-related operations
#[derive(Debug, Clone, Error)]
pub enum ExpenseError {
    #[error("Invalid expense ID: {0}")]
    InvalidId(#[from] IdError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("{0}")]
    InvalidDate(#[from] ExpenseDateError),

    #[error("Invalid status: {0}")]
    InvalidStatus(#[from] ExpenseStatusError),

    #[error("Invalid field: {0}")]
    InvalidField(#[from] FieldError),

    #[error("Expense not found: {0}")]
    NotFound(ExpenseId),

    #[error("Access denied")]
    AccessDenied,

    #[error("User {user_id} is not a member of team {team_id}")]
    NotTeamMember { user_id: UserId, team_id: TeamId },

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),
}
