//! Task model, fan-out link rows and list filters.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sgp_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    #[serde(rename = "codigo")]
    pub id: DbId,
    #[serde(rename = "projeto")]
    pub project_id: DbId,
    #[serde(rename = "responsavel")]
    pub responsible_id: Option<DbId>,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "prazo")]
    pub deadline: NaiveDateTime,
    #[serde(rename = "situacao")]
    pub status: String,
    #[serde(rename = "ativo")]
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub created_at: Timestamp,
    #[serde(skip_serializing)]
    pub updated_at: Timestamp,
}

/// A task joined with its project, owner, discipline and linked group.
#[derive(Debug, Clone, FromRow)]
pub struct TaskDetail {
    #[sqlx(flatten)]
    pub task: Task,
    pub project_name: String,
    pub professor_id: DbId,
    pub professor_name: String,
    pub discipline_id: DbId,
    pub discipline_name: String,
    /// Group this copy was fanned out to, if any.
    pub group_id: Option<DbId>,
}

/// Insert payload shared by every fanned-out copy.
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub project_id: DbId,
    pub responsible_id: Option<DbId>,
    pub name: String,
    pub description: String,
    pub deadline: NaiveDateTime,
}

/// Field update applied to a single task. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub deadline: Option<NaiveDateTime>,
    pub is_active: Option<bool>,
}

/// Parsed filters for `GET /tarefas/`.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub name: Option<String>,
    pub status: Option<String>,
    pub discipline_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub professor_id: Option<DbId>,
    /// Inclusive lower bound on the deadline date.
    pub from_date: Option<NaiveDate>,
    /// Inclusive upper bound on the deadline date.
    pub to_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}
