//! Repository for the `projects` and `project_groups` tables.
//!
//! Selection changes (attach, detach, consolidation) go through
//! [`ProjectRepo::manage_groups`], which locks the project row, re-reads the
//! selection state and applies the resulting plan in one transaction.

use sgp_core::consolidation::{CandidateGroup, ManagePlan, ProjectSelection};
use sgp_core::roles::Role;
use sgp_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use super::filter::{bind_values, bind_values_scalar, BindValue, Conditions};
use crate::models::project::{
    CreateProject, Project, ProjectDetail, ProjectFilter, SelectedGroup, UpdateProject,
};

/// Column list for `projects` SELECT queries.
const COLUMNS: &str = "p.id, p.professor_id, p.discipline_id, p.name, p.description, p.kind, \
    p.area, p.is_available, p.is_active, p.is_consolidated, p.created_at, p.updated_at";

/// Extra columns joined in for [`ProjectDetail`].
const DETAIL_COLUMNS: &str = "pr.name AS professor_name, d.name AS discipline_name, \
    d.cutoff_score AS discipline_cutoff_score, d.group_capacity AS discipline_group_capacity";

const DETAIL_FROM: &str = "projects p \
    JOIN professors pr ON pr.id = p.professor_id \
    JOIN disciplines d ON d.id = p.discipline_id";

/// Provides CRUD and selection management for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects AS p
                (professor_id, discipline_id, name, description, kind, area, is_available)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(input.professor_id)
            .bind(input.discipline_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.kind)
            .bind(&input.area)
            .bind(input.is_available)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects p WHERE p.id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a project with its professor and discipline display fields.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProjectDetail>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS}, {DETAIL_COLUMNS} FROM {DETAIL_FROM} WHERE p.id = $1");
        sqlx::query_as::<_, ProjectDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List projects visible to `role` that match `filter`.
    ///
    /// Professors see the projects they own; students see every active
    /// project.
    pub async fn list(
        pool: &PgPool,
        role: Role,
        filter: &ProjectFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProjectDetail>, sqlx::Error> {
        let conditions = build_project_filter(role, filter);
        let idx = conditions.next_index();
        let query = format!(
            "SELECT {COLUMNS}, {DETAIL_COLUMNS} FROM {DETAIL_FROM} {} \
             ORDER BY p.created_at DESC, p.id LIMIT ${idx} OFFSET ${}",
            conditions.where_clause(),
            idx + 1
        );
        bind_values(sqlx::query_as::<_, ProjectDetail>(&query), conditions.values())
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(
        pool: &PgPool,
        role: Role,
        filter: &ProjectFilter,
    ) -> Result<i64, sqlx::Error> {
        let conditions = build_project_filter(role, filter);
        let query = format!("SELECT COUNT(*) FROM projects p {}", conditions.where_clause());
        bind_values_scalar(sqlx::query_scalar::<_, i64>(&query), conditions.values())
            .fetch_one(pool)
            .await
    }

    /// Update plain fields. Selection state is untouched.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects p SET
                discipline_id = COALESCE($2, discipline_id),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                kind = COALESCE($5, kind),
                area = COALESCE($6, area),
                is_available = COALESCE($7, is_available)
             WHERE p.id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(input.discipline_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.kind)
            .bind(&input.area)
            .bind(input.is_available)
            .fetch_optional(pool)
            .await
    }

    /// Groups selecting each project in `project_ids`, with member counts
    /// (leader included), in selection order.
    pub async fn selected_groups(
        pool: &PgPool,
        project_ids: &[DbId],
    ) -> Result<Vec<SelectedGroup>, sqlx::Error> {
        sqlx::query_as::<_, SelectedGroup>(
            "SELECT pg.project_id, pg.group_id,
                    1 + (SELECT COUNT(*) FROM group_members m WHERE m.group_id = pg.group_id)
                        AS member_count,
                    pg.created_at AS selected_at
             FROM project_groups pg
             WHERE pg.project_id = ANY($1)
             ORDER BY pg.project_id, pg.created_at, pg.group_id",
        )
        .bind(project_ids)
        .fetch_all(pool)
        .await
    }

    /// Ids of the groups currently selecting `project_id`.
    pub async fn selected_group_ids(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT group_id FROM project_groups WHERE project_id = $1 ORDER BY created_at, group_id",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Evaluate and apply a selection change in one transaction.
    ///
    /// The project row is locked and its current [`ProjectSelection`] is
    /// handed to `plan`, together with the group named by `group_id` read
    /// under a share lock (`None` when no id was given or the group does not
    /// exist). If `plan` fails nothing is written. Returns `Ok(None)` when
    /// the project does not exist.
    pub async fn manage_groups<E, F>(
        pool: &PgPool,
        id: DbId,
        group_id: Option<DbId>,
        plan: F,
    ) -> Result<Option<Project>, E>
    where
        E: From<sqlx::Error>,
        F: FnOnce(&ProjectSelection, Option<CandidateGroup>) -> Result<ManagePlan, E>,
    {
        let mut tx = pool.begin().await?;

        let Some(selection) = Self::lock_selection(&mut tx, id).await? else {
            return Ok(None);
        };

        let candidate = match group_id {
            Some(group_id) => sqlx::query_as::<_, (DbId, bool, DbId)>(
                "SELECT id, is_active, discipline_id FROM groups WHERE id = $1 FOR SHARE",
            )
            .bind(group_id)
            .fetch_optional(&mut *tx)
            .await?
            .map(|(id, is_active, discipline_id)| CandidateGroup {
                id,
                is_active,
                discipline_id,
            }),
            None => None,
        };

        let plan = plan(&selection, candidate)?;
        tracing::debug!(project_id = %id, ?plan, "Applying group management plan");

        if plan.reactivate {
            sqlx::query("UPDATE projects SET is_active = TRUE WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        if !plan.detach.is_empty() {
            sqlx::query("DELETE FROM project_groups WHERE project_id = $1 AND group_id = ANY($2)")
                .bind(id)
                .bind(&plan.detach)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(group_id) = plan.attach {
            sqlx::query("INSERT INTO project_groups (project_id, group_id) VALUES ($1, $2)")
                .bind(id)
                .bind(group_id)
                .execute(&mut *tx)
                .await?;
        }

        let query = format!(
            "UPDATE projects p SET
                is_consolidated = COALESCE($2, is_consolidated),
                is_available = COALESCE($3, is_available)
             WHERE p.id = $1
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(plan.consolidated)
            .bind(plan.available)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(project))
    }

    /// Deactivate a project: drop every selection, reset consolidation and
    /// unlink the group copies of its tasks, in one transaction.
    ///
    /// Idempotent. Returns `false` only when the project does not exist.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE projects SET is_active = FALSE, is_consolidated = FALSE WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        let removed = sqlx::query("DELETE FROM project_groups WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let unlinked = sqlx::query(
            "UPDATE task_groups SET is_active = FALSE
             WHERE task_id IN (SELECT id FROM tasks WHERE project_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            project_id = %id,
            removed_selections = removed.rows_affected(),
            unlinked_task_groups = unlinked.rows_affected(),
            "Project deactivated"
        );
        Ok(true)
    }

    /// Lock the project row, share-lock its discipline so the capacity stays
    /// put, and load the selection state.
    async fn lock_selection(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<ProjectSelection>, sqlx::Error> {
        let row = sqlx::query_as::<_, (bool, bool, DbId, i32)>(
            "SELECT p.is_active, p.is_consolidated, p.discipline_id, d.group_capacity
             FROM projects p
             JOIN disciplines d ON d.id = p.discipline_id
             WHERE p.id = $1
             FOR UPDATE OF p FOR SHARE OF d",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        let Some((is_active, is_consolidated, discipline_id, capacity)) = row else {
            return Ok(None);
        };

        let attached = sqlx::query_scalar::<_, DbId>(
            "SELECT group_id FROM project_groups WHERE project_id = $1 ORDER BY created_at, group_id",
        )
        .bind(id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(Some(ProjectSelection {
            is_active,
            is_consolidated,
            discipline_id,
            capacity,
            attached,
        }))
    }
}

/// Build the role scope plus the optional query filters.
fn build_project_filter(role: Role, filter: &ProjectFilter) -> Conditions {
    let mut c = Conditions::new();

    match role {
        Role::Professor(id) => c.push("p.professor_id = {}", BindValue::Uuid(id)),
        Role::Student(_) => c.push_raw("p.is_active"),
        Role::Anonymous => c.push_raw("FALSE"),
    }

    c.push_opt("p.id = {}", filter.id, BindValue::Uuid);
    c.push_opt("p.discipline_id = {}", filter.discipline_id, BindValue::Uuid);
    c.push_opt("p.professor_id = {}", filter.professor_id, BindValue::Uuid);
    c.push_opt("p.is_active = {}", filter.is_active, BindValue::Bool);
    c.push_opt("p.is_available = {}", filter.is_available, BindValue::Bool);
    c.push_opt("p.is_consolidated = {}", filter.is_consolidated, BindValue::Bool);
    c.push_opt("p.kind = {}", filter.kind.clone(), BindValue::Text);
    c.push_opt("p.area = {}", filter.area.clone(), BindValue::Text);
    c.push_opt("p.name = {}", filter.name.clone(), BindValue::Text);
    c
}
