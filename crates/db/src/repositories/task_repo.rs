//! Repository for the `tasks` and `task_groups` tables.

use sgp_core::roles::Role;
use sgp_core::task::{plan_fan_out, FanOut, STATUS_CANCELLED};
use sgp_core::types::DbId;
use sqlx::PgPool;

use super::filter::{bind_values, bind_values_scalar, BindValue, Conditions};
use crate::models::task::{CreateTask, Task, TaskDetail, TaskFilter, UpdateTask};

const COLUMNS: &str = "t.id, t.project_id, t.responsible_id, t.name, t.description, \
    t.deadline, t.status, t.is_active, t.created_at, t.updated_at";

/// Extra columns joined in for [`TaskDetail`]. A task copy has at most one
/// task-group link, so the lateral lookup returns zero or one row.
const DETAIL_COLUMNS: &str = "p.name AS project_name, p.professor_id, \
    pr.name AS professor_name, p.discipline_id, d.name AS discipline_name, \
    tg.group_id";

const DETAIL_FROM: &str = "tasks t \
    JOIN projects p ON p.id = t.project_id \
    JOIN professors pr ON pr.id = p.professor_id \
    JOIN disciplines d ON d.id = p.discipline_id \
    LEFT JOIN LATERAL ( \
        SELECT group_id FROM task_groups WHERE task_id = t.id ORDER BY created_at LIMIT 1 \
    ) tg ON TRUE";

/// Student visibility: an active task-group link to a group the student
/// leads or belongs to.
const STUDENT_SCOPE: &str = "EXISTS ( \
    SELECT 1 FROM task_groups x JOIN groups g ON g.id = x.group_id \
    WHERE x.task_id = t.id AND x.is_active AND (g.leader_id = {} OR EXISTS ( \
        SELECT 1 FROM group_members m WHERE m.group_id = g.id AND m.student_id = {})))";

/// Provides task fan-out, scoped listing and lifecycle operations.
pub struct TaskRepo;

impl TaskRepo {
    /// Create one copy of `input` per group currently selecting the
    /// project, or a single unlinked copy when none does, in one
    /// transaction.
    ///
    /// The project row is share-locked before the selection is read, so a
    /// concurrent selection change waits until the copies exist. Every copy
    /// starts `pendente` and is returned with the group it belongs to. Both
    /// inserts are single `UNNEST` statements.
    pub async fn create_fan_out(
        pool: &PgPool,
        input: &CreateTask,
    ) -> Result<Vec<(Task, Option<DbId>)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT 1 FROM projects WHERE id = $1 FOR SHARE")
            .bind(input.project_id)
            .execute(&mut *tx)
            .await?;
        let selected = sqlx::query_scalar::<_, DbId>(
            "SELECT group_id FROM project_groups WHERE project_id = $1 ORDER BY created_at, group_id",
        )
        .bind(input.project_id)
        .fetch_all(&mut *tx)
        .await?;
        let fan_out = plan_fan_out(&selected);

        // Ids are assigned here so each copy pairs with its group without
        // relying on RETURNING order.
        let task_ids: Vec<DbId> = (0..fan_out.row_count()).map(|_| DbId::new_v4()).collect();

        let query = format!(
            "INSERT INTO tasks AS t (id, project_id, responsible_id, name, description, deadline)
             SELECT id, $2, $3, $4, $5, $6 FROM UNNEST($1::uuid[]) AS ids(id)
             RETURNING {COLUMNS}"
        );
        let mut tasks = sqlx::query_as::<_, Task>(&query)
            .bind(&task_ids)
            .bind(input.project_id)
            .bind(input.responsible_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.deadline)
            .fetch_all(&mut *tx)
            .await?;
        tasks.sort_by_key(|t| task_ids.iter().position(|id| *id == t.id));

        let groups: Vec<Option<DbId>> = match &fan_out {
            FanOut::Single => vec![None],
            FanOut::PerGroup(groups) => {
                sqlx::query(
                    "INSERT INTO task_groups (task_id, group_id)
                     SELECT * FROM UNNEST($1::uuid[], $2::uuid[])",
                )
                .bind(&task_ids)
                .bind(groups)
                .execute(&mut *tx)
                .await?;
                groups.iter().copied().map(Some).collect()
            }
        };

        tx.commit().await?;

        tracing::info!(
            project_id = %input.project_id,
            copies = tasks.len(),
            "Task created"
        );
        Ok(tasks.into_iter().zip(groups).collect())
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks t WHERE t.id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a task visible to `role`, with its project display fields.
    pub async fn find_detail(
        pool: &PgPool,
        role: Role,
        id: DbId,
    ) -> Result<Option<TaskDetail>, sqlx::Error> {
        let mut conditions = scope(role);
        conditions.push("t.id = {}", BindValue::Uuid(id));
        let query = format!(
            "SELECT {COLUMNS}, {DETAIL_COLUMNS} FROM {DETAIL_FROM} {}",
            conditions.where_clause()
        );
        bind_values(sqlx::query_as::<_, TaskDetail>(&query), conditions.values())
            .fetch_optional(pool)
            .await
    }

    /// Whether `student_id` reaches `task_id` through one of their groups.
    pub async fn visible_to_student(
        pool: &PgPool,
        task_id: DbId,
        student_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM tasks t WHERE t.id = $2 AND {})",
            STUDENT_SCOPE.replace("{}", "$1")
        );
        sqlx::query_scalar::<_, bool>(&query)
            .bind(student_id)
            .bind(task_id)
            .fetch_one(pool)
            .await
    }

    /// List tasks visible to `role` that match `filter`, soonest deadline
    /// first.
    pub async fn list(
        pool: &PgPool,
        role: Role,
        filter: &TaskFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TaskDetail>, sqlx::Error> {
        let conditions = build_task_filter(role, filter);
        let idx = conditions.next_index();
        let query = format!(
            "SELECT {COLUMNS}, {DETAIL_COLUMNS} FROM {DETAIL_FROM} {} \
             ORDER BY t.deadline, t.id LIMIT ${idx} OFFSET ${}",
            conditions.where_clause(),
            idx + 1
        );
        bind_values(sqlx::query_as::<_, TaskDetail>(&query), conditions.values())
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, role: Role, filter: &TaskFilter) -> Result<i64, sqlx::Error> {
        let conditions = build_task_filter(role, filter);
        let query = format!(
            "SELECT COUNT(*) FROM tasks t JOIN projects p ON p.id = t.project_id {}",
            conditions.where_clause()
        );
        bind_values_scalar(sqlx::query_scalar::<_, i64>(&query), conditions.values())
            .fetch_one(pool)
            .await
    }

    /// Apply a task update in one transaction.
    ///
    /// When `move_to_project` is set, every active copy sharing the task's
    /// current `(project, name)` moves first; then `changes` is applied to
    /// the task itself. Returns `None` when the task does not exist.
    pub async fn apply_update(
        pool: &PgPool,
        id: DbId,
        move_to_project: Option<DbId>,
        changes: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if let Some(project_id) = move_to_project {
            let moved = sqlx::query(
                "UPDATE tasks SET project_id = $2
                 WHERE is_active AND (project_id, name) =
                     (SELECT project_id, name FROM tasks WHERE id = $1)",
            )
            .bind(id)
            .bind(project_id)
            .execute(&mut *tx)
            .await?;
            tracing::debug!(task_id = %id, %project_id, moved = moved.rows_affected(), "Task copies moved");
        }

        let query = format!(
            "UPDATE tasks t SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                deadline = COALESCE($5, deadline),
                is_active = COALESCE($6, is_active)
             WHERE t.id = $1
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.description)
            .bind(&changes.status)
            .bind(changes.deadline)
            .bind(changes.is_active)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(task)
    }

    /// Soft-delete: `is_active = false` and status `cancelada`. The row is
    /// kept.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE tasks SET is_active = FALSE, status = $2 WHERE id = $1")
            .bind(id)
            .bind(STATUS_CANCELLED)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Group ids linked to `task_id`, active links only.
    pub async fn linked_groups(pool: &PgPool, task_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT group_id FROM task_groups WHERE task_id = $1 AND is_active ORDER BY created_at",
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }
}

/// Row scope for `role`. Expects `t` (tasks) and `p` (projects) in scope.
fn scope(role: Role) -> Conditions {
    let mut c = Conditions::new();
    match role {
        Role::Professor(id) => c.push("p.professor_id = {}", BindValue::Uuid(id)),
        Role::Student(id) => c.push(STUDENT_SCOPE, BindValue::Uuid(id)),
        Role::Anonymous => c.push_raw("FALSE"),
    }
    c
}

fn build_task_filter(role: Role, filter: &TaskFilter) -> Conditions {
    let mut c = scope(role);
    c.push_opt("t.name ILIKE {}", filter.name.as_ref().map(|n| format!("%{n}%")), BindValue::Text);
    c.push_opt("t.status = {}", filter.status.clone(), BindValue::Text);
    c.push_opt("p.discipline_id = {}", filter.discipline_id, BindValue::Uuid);
    c.push_opt("t.project_id = {}", filter.project_id, BindValue::Uuid);
    c.push_opt("p.professor_id = {}", filter.professor_id, BindValue::Uuid);
    c.push_opt("t.deadline::date >= {}", filter.from_date, BindValue::Date);
    c.push_opt("t.deadline::date <= {}", filter.to_date, BindValue::Date);
    c.push_opt("t.is_active = {}", filter.is_active, BindValue::Bool);
    c
}
