//! Queries spanning both account tables.

use sgp_core::types::DbId;
use sqlx::PgPool;

/// Cross-table account lookups.
pub struct AccountRepo;

impl AccountRepo {
    /// Whether any account other than `exclude_id` already uses `email`.
    ///
    /// Emails are unique across students and professors together.
    pub async fn email_taken(
        pool: &PgPool,
        email: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM students
                WHERE LOWER(email) = LOWER($1) AND ($2::UUID IS NULL OR id <> $2)
                UNION ALL
                SELECT 1 FROM professors
                WHERE LOWER(email) = LOWER($1) AND ($2::UUID IS NULL OR id <> $2)
             )",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }
}
