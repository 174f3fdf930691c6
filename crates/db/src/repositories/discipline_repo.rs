//! Repository for the `disciplines` table.

use sgp_core::roles::Role;
use sgp_core::types::DbId;
use sqlx::PgPool;

use crate::models::discipline::{CreateDiscipline, Discipline, UpdateDiscipline};

const COLUMNS: &str =
    "id, professor_id, name, cutoff_score, group_capacity, is_active, created_at, updated_at";

/// Provides CRUD operations for disciplines.
pub struct DisciplineRepo;

impl DisciplineRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateDiscipline,
    ) -> Result<Discipline, sqlx::Error> {
        let query = format!(
            "INSERT INTO disciplines (professor_id, name, cutoff_score, group_capacity)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Discipline>(&query)
            .bind(input.professor_id)
            .bind(&input.name)
            .bind(input.cutoff_score)
            .bind(input.group_capacity)
            .fetch_one(pool)
            .await
    }

    /// Find a discipline by id, active or not.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Discipline>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM disciplines WHERE id = $1");
        sqlx::query_as::<_, Discipline>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active disciplines visible to `role`.
    ///
    /// Professors see their own; students see every active discipline.
    pub async fn list(
        pool: &PgPool,
        role: Role,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Discipline>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM disciplines
             WHERE is_active AND ($1::UUID IS NULL OR professor_id = $1)
             ORDER BY name, id LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Discipline>(&query)
            .bind(role.professor_id())
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, role: Role) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM disciplines
             WHERE is_active AND ($1::UUID IS NULL OR professor_id = $1)",
        )
        .bind(role.professor_id())
        .fetch_one(pool)
        .await
    }

    /// Apply `input` in one transaction with the discipline row locked.
    ///
    /// When `input` changes the group capacity, `check` receives the new
    /// capacity and the selection count of the discipline's fullest project.
    /// The project side takes a share lock on the discipline before it
    /// attaches a group, so the two cannot interleave. If `check` fails
    /// nothing is written.
    pub async fn update<E, F>(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDiscipline,
        check: F,
    ) -> Result<Option<Discipline>, E>
    where
        E: From<sqlx::Error>,
        F: FnOnce(i32, i64) -> Result<(), E>,
    {
        let mut tx = pool.begin().await?;

        let found = sqlx::query("SELECT 1 FROM disciplines WHERE id = $1 FOR NO KEY UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if found.is_none() {
            return Ok(None);
        }

        if let Some(capacity) = input.group_capacity {
            let largest_selection = sqlx::query_scalar::<_, i64>(
                "SELECT COALESCE(MAX(cnt), 0) FROM (
                    SELECT COUNT(*) AS cnt
                    FROM project_groups pg
                    JOIN projects p ON p.id = pg.project_id
                    WHERE p.discipline_id = $1
                    GROUP BY pg.project_id
                 ) s",
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
            check(capacity, largest_selection)?;
        }

        let query = format!(
            "UPDATE disciplines SET
                name = COALESCE($2, name),
                cutoff_score = COALESCE($3, cutoff_score),
                group_capacity = COALESCE($4, group_capacity),
                is_active = COALESCE($5, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let discipline = sqlx::query_as::<_, Discipline>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.cutoff_score)
            .bind(input.group_capacity)
            .bind(input.is_active)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(discipline))
    }

    /// Logical delete. Returns `true` if the row was active.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE disciplines SET is_active = FALSE WHERE id = $1 AND is_active")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
