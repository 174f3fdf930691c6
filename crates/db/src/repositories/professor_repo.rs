//! Repository for the `professors` table.

use sgp_core::types::DbId;
use sqlx::PgPool;

use crate::models::professor::{CreateProfessor, Professor, UpdateProfessor};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, password_hash, is_active, created_at, updated_at";

/// Provides CRUD operations for professor accounts.
pub struct ProfessorRepo;

impl ProfessorRepo {
    /// Insert a new professor, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProfessor) -> Result<Professor, sqlx::Error> {
        let query = format!(
            "INSERT INTO professors (name, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Professor>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Find a professor by id, active or not.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Professor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM professors WHERE id = $1");
        sqlx::query_as::<_, Professor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a professor by email (case-insensitive).
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<Professor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM professors WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, Professor>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List active professors ordered by name.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Professor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM professors WHERE is_active
             ORDER BY name, id LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Professor>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM professors WHERE is_active")
            .fetch_one(pool)
            .await
    }

    /// Update a professor. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfessor,
    ) -> Result<Option<Professor>, sqlx::Error> {
        let query = format!(
            "UPDATE professors SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Professor>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .fetch_optional(pool)
            .await
    }

    /// Replace the password hash of the account holding `email`.
    pub async fn set_password_by_email(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE professors SET password_hash = $2 WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark the account inactive. Returns `true` if a row changed.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE professors SET is_active = FALSE WHERE id = $1 AND is_active",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
