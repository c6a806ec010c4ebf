use async_trait::async_trait;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::expense::errors::ExpenseError;
use crate::domain::expense::models::Amount;
use crate::domain::expense::models::Expense;
use crate::domain::expense::models::ExpenseDate;
use crate::domain::expense::models::ExpenseId;
use crate::domain::expense::models::ExpenseStatus;
use crate::domain::expense::models::Pagination;
use crate::domain::expense::models::TeamId;
use crate::domain::expense::ports::ExpenseStore;
use crate::domain::user::models::UserId;

const EXPENSE_COLUMNS: &str = "id, user_id, team_id, amount, currency, description, category, \
     expense_date, receipt_image_url, status, created_at, updated_at";

pub struct PostgresExpenseStore {
    pool: PgPool,
}

impl PostgresExpenseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ExpenseRecord {
    id: Uuid,
    user_id: Uuid,
    team_id: Option<Uuid>,
    amount: f64,
    currency: String,
    description: String,
    category: String,
    expense_date: NaiveDate,
    receipt_image_url: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ExpenseRecord> for Expense {
    type Error = ExpenseError;

    fn try_from(r: ExpenseRecord) -> Result<Self, Self::Error> {
        Ok(Expense {
            id: ExpenseId(r.id),
            owner_id: UserId(r.user_id),
            team_id: r.team_id.map(TeamId),
            amount: Amount::new(r.amount)?,
            currency: r.currency,
            description: r.description,
            category: r.category,
            expense_date: ExpenseDate::from(r.expense_date),
            receipt_image_url: r.receipt_image_url,
            status: r.status.parse::<ExpenseStatus>()?,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

fn database_error(e: sqlx::Error) -> ExpenseError {
    ExpenseError::DatabaseError(e.to_string())
}

#[async_trait]
impl ExpenseStore for PostgresExpenseStore {
    async fn create(&self, expense: Expense) -> Result<Expense, ExpenseError> {
        let query = format!(
            r#"
            INSERT INTO expenses (id, user_id, team_id, amount, currency, description, category,
                                  expense_date, receipt_image_url, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {EXPENSE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, ExpenseRecord>(&query)
            .bind(expense.id.0)
            .bind(expense.owner_id.0)
            .bind(expense.team_id.map(|t| t.0))
            .bind(expense.amount.value())
            .bind(&expense.currency)
            .bind(&expense.description)
            .bind(&expense.category)
            .bind(expense.expense_date.as_naive_date())
            .bind(&expense.receipt_image_url)
            .bind(expense.status.as_str())
            .bind(expense.created_at)
            .bind(expense.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)?
            .try_into()
    }

    async fn find_by_id(&self, id: &ExpenseId) -> Result<Option<Expense>, ExpenseError> {
        let query = format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = $1");

        sqlx::query_as::<_, ExpenseRecord>(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .map(Expense::try_from)
            .transpose()
    }

    async fn list_by_owner(
        &self,
        owner_id: &UserId,
        pagination: Pagination,
    ) -> Result<Vec<Expense>, ExpenseError> {
        let query = format!(
            r#"
            SELECT {EXPENSE_COLUMNS}
            FROM expenses
            WHERE user_id = $1
            ORDER BY expense_date DESC, created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );

        sqlx::query_as::<_, ExpenseRecord>(&query)
            .bind(owner_id.0)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    async fn list_by_team(
        &self,
        team_id: &TeamId,
        pagination: Pagination,
    ) -> Result<Vec<Expense>, ExpenseError> {
        let query = format!(
            r#"
            SELECT {EXPENSE_COLUMNS}
            FROM expenses
            WHERE team_id = $1
            ORDER BY expense_date DESC, created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );

        sqlx::query_as::<_, ExpenseRecord>(&query)
            .bind(team_id.0)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    async fn update(&self, expense: Expense) -> Result<Option<Expense>, ExpenseError> {
        let query = format!(
            r#"
            UPDATE expenses
            SET amount = $1, currency = $2, description = $3, category = $4,
                expense_date = $5, receipt_image_url = $6, status = $7, updated_at = $8
            WHERE id = $9 AND user_id = $10
            RETURNING {EXPENSE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, ExpenseRecord>(&query)
            .bind(expense.amount.value())
            .bind(&expense.currency)
            .bind(&expense.description)
            .bind(&expense.category)
            .bind(expense.expense_date.as_naive_date())
            .bind(&expense.receipt_image_url)
            .bind(expense.status.as_str())
            .bind(expense.updated_at)
            .bind(expense.id.0)
            .bind(expense.owner_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .map(Expense::try_from)
            .transpose()
    }

    async fn delete(&self, id: &ExpenseId, owner_id: &UserId) -> Result<bool, ExpenseError> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1 AND user_id = $2")
            .bind(id.0)
            .bind(owner_id.0)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }
}
