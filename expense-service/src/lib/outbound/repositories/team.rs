use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::expense::errors::ExpenseError;
use crate::domain::expense::models::TeamId;
use crate::domain::expense::ports::TeamMembership;
use crate::domain::user::models::UserId;

/// Membership backed by the `team_members` join table.
///
/// Any member may read every expense of the team; roles are not consulted.
pub struct PostgresTeamMembership {
    pool: PgPool,
}

impl PostgresTeamMembership {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamMembership for PostgresTeamMembership {
    async fn is_member(&self, team_id: &TeamId, user_id: &UserId) -> Result<bool, ExpenseError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM team_members WHERE team_id = $1 AND user_id = $2)",
        )
        .bind(team_id.0)
        .bind(user_id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ExpenseError::DatabaseError(e.to_string()))
    }
}
