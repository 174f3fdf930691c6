//! Repository for the `classes` and `class_enrollments` tables.

use sgp_core::roles::Role;
use sgp_core::types::DbId;
use sqlx::PgPool;

use crate::models::class::{Class, CreateClass, EnrolledStudent, UpdateClass};

const COLUMNS: &str =
    "id, discipline_id, professor_id, name, period, is_active, created_at, updated_at";

/// Visibility predicate for class listings. `$1` is the professor id, `$2`
/// the student id; exactly one of them is bound to a non-null value.
///
/// A student enrolled nowhere sees every active class so they can pick one.
const VISIBLE_TO: &str = "\
    is_active AND ( \
        ($1::UUID IS NOT NULL AND professor_id = $1) \
        OR ($2::UUID IS NOT NULL AND ( \
            NOT EXISTS (SELECT 1 FROM class_enrollments e WHERE e.student_id = $2) \
            OR EXISTS (SELECT 1 FROM class_enrollments e \
                       WHERE e.student_id = $2 AND e.class_id = classes.id))))";

/// Provides CRUD and enrollment operations for classes.
pub struct ClassRepo;

impl ClassRepo {
    pub async fn create(pool: &PgPool, input: &CreateClass) -> Result<Class, sqlx::Error> {
        let query = format!(
            "INSERT INTO classes (discipline_id, professor_id, name, period)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Class>(&query)
            .bind(input.discipline_id)
            .bind(input.professor_id)
            .bind(&input.name)
            .bind(&input.period)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Class>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM classes WHERE id = $1");
        sqlx::query_as::<_, Class>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the active classes visible to `role`.
    pub async fn list(
        pool: &PgPool,
        role: Role,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Class>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM classes WHERE {VISIBLE_TO}
             ORDER BY period DESC, name, id LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Class>(&query)
            .bind(role.professor_id())
            .bind(role.student_id())
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, role: Role) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM classes WHERE {VISIBLE_TO}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(role.professor_id())
            .bind(role.student_id())
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateClass,
    ) -> Result<Option<Class>, sqlx::Error> {
        let query = format!(
            "UPDATE classes SET
                discipline_id = COALESCE($2, discipline_id),
                name = COALESCE($3, name),
                period = COALESCE($4, period),
                is_active = COALESCE($5, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Class>(&query)
            .bind(id)
            .bind(input.discipline_id)
            .bind(&input.name)
            .bind(&input.period)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE classes SET is_active = FALSE WHERE id = $1 AND is_active")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Students enrolled in `class_id`, ordered by name.
    pub async fn enrolled_students(
        pool: &PgPool,
        class_id: DbId,
    ) -> Result<Vec<EnrolledStudent>, sqlx::Error> {
        sqlx::query_as::<_, EnrolledStudent>(
            "SELECT s.id, s.registration_number, s.name
             FROM class_enrollments e
             JOIN students s ON s.id = e.student_id
             WHERE e.class_id = $1
             ORDER BY s.name, s.id",
        )
        .bind(class_id)
        .fetch_all(pool)
        .await
    }

    /// Enroll every student in `student_ids`. Existing pairs are kept, so the
    /// call is idempotent. Returns the number of new enrollments.
    pub async fn enroll(
        pool: &PgPool,
        class_id: DbId,
        student_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = sqlx::query(
            "INSERT INTO class_enrollments (class_id, student_id)
             SELECT $1, student_id FROM UNNEST($2::UUID[]) AS t(student_id)
             ON CONFLICT ON CONSTRAINT uq_class_enrollments_class_student DO NOTHING",
        )
        .bind(class_id)
        .bind(student_ids)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    /// Remove the enrollments of `student_ids` from `class_id`.
    pub async fn unenroll(
        pool: &PgPool,
        class_id: DbId,
        student_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = sqlx::query(
            "DELETE FROM class_enrollments WHERE class_id = $1 AND student_id = ANY($2)",
        )
        .bind(class_id)
        .bind(student_ids)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    /// Discipline of every active class `student_id` is enrolled in.
    pub async fn enrolled_discipline_ids(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT DISTINCT c.discipline_id
             FROM class_enrollments e
             JOIN classes c ON c.id = e.class_id
             WHERE e.student_id = $1 AND c.is_active",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await
    }
}
