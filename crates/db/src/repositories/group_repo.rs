//! Repository for the `groups` and `group_members` tables.

use sgp_core::roles::Role;
use sgp_core::types::DbId;
use sqlx::PgPool;

use super::filter::{bind_values, bind_values_scalar, BindValue, Conditions};
use crate::models::group::{Group, GroupFilter, GroupStudent};

const COLUMNS: &str =
    "g.id, g.discipline_id, g.leader_id, g.is_active, g.is_available, g.created_at, g.updated_at";

/// Provides group formation, membership and lifecycle operations.
pub struct GroupRepo;

impl GroupRepo {
    /// Insert a new group led by `leader_id`. Groups start inactive and
    /// available.
    pub async fn create(
        pool: &PgPool,
        discipline_id: DbId,
        leader_id: DbId,
    ) -> Result<Group, sqlx::Error> {
        let query = format!(
            "INSERT INTO groups AS g (discipline_id, leader_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(discipline_id)
            .bind(leader_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Group>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM groups g WHERE g.id = $1");
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load several groups at once; unknown ids are skipped.
    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Group>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM groups g WHERE g.id = ANY($1)");
        sqlx::query_as::<_, Group>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Whether `student_id` already leads a group.
    pub async fn leads_any(pool: &PgPool, student_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM groups WHERE leader_id = $1)")
            .bind(student_id)
            .fetch_one(pool)
            .await
    }

    pub async fn is_member(
        pool: &PgPool,
        group_id: DbId,
        student_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM group_members WHERE group_id = $1 AND student_id = $2)",
        )
        .bind(group_id)
        .bind(student_id)
        .fetch_one(pool)
        .await
    }

    pub async fn add_member(
        pool: &PgPool,
        group_id: DbId,
        student_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO group_members (group_id, student_id) VALUES ($1, $2)")
            .bind(group_id)
            .bind(student_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Leader and members of every group in `group_ids`.
    ///
    /// Rows are ordered per group with the leader first, then members in
    /// joining order.
    pub async fn participants_of(
        pool: &PgPool,
        group_ids: &[DbId],
    ) -> Result<Vec<GroupStudent>, sqlx::Error> {
        sqlx::query_as::<_, GroupStudent>(
            "SELECT group_id, student_id, registration_number, name, is_leader FROM (
                SELECT g.id AS group_id, s.id AS student_id, s.registration_number, s.name,
                       TRUE AS is_leader, g.created_at AS joined_at
                FROM groups g JOIN students s ON s.id = g.leader_id
                WHERE g.id = ANY($1)
                UNION ALL
                SELECT m.group_id, s.id, s.registration_number, s.name,
                       FALSE, m.created_at
                FROM group_members m JOIN students s ON s.id = m.student_id
                WHERE m.group_id = ANY($1)
             ) p
             ORDER BY group_id, is_leader DESC, joined_at, student_id",
        )
        .bind(group_ids)
        .fetch_all(pool)
        .await
    }

    /// List groups visible to `role` that match `filter`.
    ///
    /// Students see groups they lead or belong to; professors see groups in
    /// their own disciplines.
    pub async fn list(
        pool: &PgPool,
        role: Role,
        filter: &GroupFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Group>, sqlx::Error> {
        let conditions = build_group_filter(role, filter);
        let idx = conditions.next_index();
        let query = format!(
            "SELECT {COLUMNS} FROM groups g {} \
             ORDER BY g.created_at DESC, g.id LIMIT ${idx} OFFSET ${}",
            conditions.where_clause(),
            idx + 1
        );
        bind_values(sqlx::query_as::<_, Group>(&query), conditions.values())
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, role: Role, filter: &GroupFilter) -> Result<i64, sqlx::Error> {
        let conditions = build_group_filter(role, filter);
        let query = format!("SELECT COUNT(*) FROM groups g {}", conditions.where_clause());
        bind_values_scalar(sqlx::query_scalar::<_, i64>(&query), conditions.values())
            .fetch_one(pool)
            .await
    }

    /// Change the availability flag.
    pub async fn set_available(
        pool: &PgPool,
        id: DbId,
        is_available: bool,
    ) -> Result<Option<Group>, sqlx::Error> {
        let query = format!(
            "UPDATE groups g SET is_available = $2 WHERE g.id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .bind(is_available)
            .fetch_optional(pool)
            .await
    }

    /// Mark the group eligible to select projects.
    pub async fn activate(pool: &PgPool, id: DbId) -> Result<Option<Group>, sqlx::Error> {
        let query = format!("UPDATE groups g SET is_active = TRUE WHERE g.id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Deactivate a group: drop its project selections, unlink its task
    /// copies and clear both flags, in one transaction.
    ///
    /// The projects selecting the group are locked first and `check` is told
    /// whether any of them is consolidated. If `check` fails nothing is
    /// written.
    pub async fn deactivate<E, F>(pool: &PgPool, id: DbId, check: F) -> Result<bool, E>
    where
        E: From<sqlx::Error>,
        F: FnOnce(bool) -> Result<(), E>,
    {
        let mut tx = pool.begin().await?;

        let consolidated = sqlx::query_scalar::<_, bool>(
            "SELECT p.is_consolidated
             FROM projects p
             JOIN project_groups pg ON pg.project_id = p.id
             WHERE pg.group_id = $1
             ORDER BY p.id
             FOR UPDATE OF p",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        check(consolidated.contains(&true))?;

        sqlx::query("DELETE FROM project_groups WHERE group_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE task_groups SET is_active = FALSE WHERE group_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            "UPDATE groups SET is_active = FALSE, is_available = FALSE WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Build the role scope plus the optional query filters.
fn build_group_filter(role: Role, filter: &GroupFilter) -> Conditions {
    let mut c = Conditions::new();

    match role {
        Role::Student(id) => c.push(
            "(g.leader_id = {} OR EXISTS (
                SELECT 1 FROM group_members m WHERE m.group_id = g.id AND m.student_id = {}))",
            BindValue::Uuid(id),
        ),
        Role::Professor(id) => c.push(
            "EXISTS (SELECT 1 FROM disciplines d WHERE d.id = g.discipline_id AND d.professor_id = {})",
            BindValue::Uuid(id),
        ),
        Role::Anonymous => c.push_raw("FALSE"),
    }

    c.push_opt("g.id = {}", filter.id, BindValue::Uuid);
    c.push_opt("g.discipline_id = {}", filter.discipline_id, BindValue::Uuid);
    c.push_opt("g.leader_id = {}", filter.leader_id, BindValue::Uuid);
    c.push_opt(
        "EXISTS (SELECT 1 FROM group_members m WHERE m.group_id = g.id AND m.student_id = {})",
        filter.member_id,
        BindValue::Uuid,
    );
    c.push_opt("g.is_active = {}", filter.is_active, BindValue::Bool);
    c.push_opt("g.is_available = {}", filter.is_available, BindValue::Bool);
    c
}
