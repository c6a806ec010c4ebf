use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::expense::errors::AmountError;
use crate::domain::expense::errors::ExpenseDateError;
use crate::domain::expense::errors::ExpenseStatusError;
use crate::domain::expense::errors::FieldError;
use crate::domain::expense::errors::IdError;
use crate::domain::user::models::UserId;

/// Expense record owned by exactly one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: ExpenseId,
    pub owner_id: UserId,
    pub team_id: Option<TeamId>,
    pub amount: Amount,
    pub currency: String,
    pub description: String,
    pub category: String,
    pub expense_date: ExpenseDate,
    pub receipt_image_url: Option<String>,
    pub status: ExpenseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Build a new pending expense for `owner_id`.
    ///
    /// The owner always comes from the verified caller identity, never from
    /// the request body.
    pub fn new(owner_id: UserId, command: CreateExpenseCommand) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            owner_id,
            team_id: command.team_id,
            amount: command.amount,
            currency: command.currency,
            description: command.description,
            category: command.category,
            expense_date: command.expense_date,
            receipt_image_url: command.receipt_image_url,
            status: ExpenseStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.owner_id == *user_id
    }

    /// Merge a partial update; absent fields are left untouched.
    pub fn apply(&mut self, update: UpdateExpenseCommand) {
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(currency) = update.currency {
            self.currency = currency;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(expense_date) = update.expense_date {
            self.expense_date = expense_date;
        }
        if let Some(url) = update.receipt_image_url {
            self.receipt_image_url = Some(url);
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}

/// Expense unique identifier value object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpenseId(pub Uuid);

impl ExpenseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an expense ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, IdError> {
        Uuid::parse_str(s)
            .map(ExpenseId)
            .map_err(|e| IdError::InvalidFormat(e.to_string()))
    }
}

impl Default for ExpenseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Team unique identifier value object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TeamId(pub Uuid);

impl TeamId {
    /// Parse a team ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, IdError> {
        Uuid::parse_str(s)
            .map(TeamId)
            .map_err(|e| IdError::InvalidFormat(e.to_string()))
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Strictly positive monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(f64);

impl Amount {
    /// # Errors
    /// * `NotFinite` - NaN or infinite
    /// * `NotPositive` - Zero or negative
    pub fn new(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NotFinite);
        }
        if value <= 0.0 {
            return Err(AmountError::NotPositive(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Calendar date of an expense, no time component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpenseDate(NaiveDate);

impl ExpenseDate {
    const FORMAT: &'static str = "%Y-%m-%d";

    /// Parse a `YYYY-MM-DD` date.
    ///
    /// # Errors
    /// * `InvalidFormat` - Not a valid calendar date in that format
    pub fn parse(s: &str) -> Result<Self, ExpenseDateError> {
        NaiveDate::parse_from_str(s.trim(), Self::FORMAT)
            .map(ExpenseDate)
            .map_err(|_| ExpenseDateError::InvalidFormat(s.to_string()))
    }

    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for ExpenseDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for ExpenseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

/// Review state of an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpenseStatus {
    Pending,
    Approved,
    Rejected,
}

impl ExpenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseStatus::Pending => "pending",
            ExpenseStatus::Approved => "approved",
            ExpenseStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ExpenseStatus {
    type Err = ExpenseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ExpenseStatus::Pending),
            "approved" => Ok(ExpenseStatus::Approved),
            "rejected" => Ok(ExpenseStatus::Rejected),
            _ => Err(ExpenseStatusError::Unknown(s.to_string())),
        }
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page window for listings.
///
/// Out-of-range input is clamped rather than rejected: page below 1 becomes
/// 1, a missing or non-positive limit becomes the default, and limits above
/// the cap are cut down to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p.min(u32::MAX as i64) as u32,
            _ => 1,
        };
        let limit = match limit {
            Some(l) if l >= 1 => l.min(Self::MAX_LIMIT as i64) as u32,
            _ => Self::DEFAULT_LIMIT,
        };
        Self { page, limit }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Validate a required free-text field, returning it trimmed.
///
/// # Errors
/// * `Empty` - Blank after trimming
/// * `TooLong` - More than `max` characters
pub fn required_text(field: &'static str, value: String, max: usize) -> Result<String, FieldError> {
    let value = value.trim().to_string();
    let length = value.chars().count();
    if length == 0 {
        return Err(FieldError::Empty { field });
    }
    if length > max {
        return Err(FieldError::TooLong {
            field,
            max,
            actual: length,
        });
    }
    Ok(value)
}

/// Column widths shared by request parsing and the schema.
pub mod limits {
    pub const CURRENCY: usize = 10;
    pub const DESCRIPTION: usize = 500;
    pub const CATEGORY: usize = 100;
    pub const RECEIPT_URL: usize = 2048;
}

/// Command to create an expense, already validated.
#[derive(Debug, Clone)]
pub struct CreateExpenseCommand {
    pub amount: Amount,
    pub currency: String,
    pub description: String,
    pub category: String,
    pub expense_date: ExpenseDate,
    pub team_id: Option<TeamId>,
    pub receipt_image_url: Option<String>,
}

/// Partial update; `None` means "leave as is".
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseCommand {
    pub amount: Option<Amount>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub expense_date: Option<ExpenseDate>,
    pub receipt_image_url: Option<String>,
    pub status: Option<ExpenseStatus>,
}
