//! Project model, selection rows and list filters.

use serde::{Deserialize, Serialize};
use sgp_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    #[serde(rename = "codigo")]
    pub id: DbId,
    #[serde(rename = "professor")]
    pub professor_id: DbId,
    #[serde(rename = "disciplina")]
    pub discipline_id: DbId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    pub area: String,
    #[serde(rename = "disponivel")]
    pub is_available: bool,
    #[serde(rename = "ativo")]
    pub is_active: bool,
    #[serde(rename = "consolidado")]
    pub is_consolidated: bool,
    #[serde(skip_serializing)]
    pub created_at: Timestamp,
    #[serde(skip_serializing)]
    pub updated_at: Timestamp,
}

/// A project joined with the owning professor and discipline display fields.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectDetail {
    #[sqlx(flatten)]
    pub project: Project,
    pub professor_name: String,
    pub discipline_name: String,
    pub discipline_cutoff_score: f64,
    pub discipline_group_capacity: i32,
}

#[derive(Debug, Clone)]
pub struct CreateProject {
    pub professor_id: DbId,
    pub discipline_id: DbId,
    pub name: String,
    pub description: String,
    pub kind: String,
    pub area: String,
    pub is_available: bool,
}

/// Plain field update. Selection state is changed only through
/// `ProjectRepo::manage_groups` and `ProjectRepo::deactivate`.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub discipline_id: Option<DbId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub area: Option<String>,
    pub is_available: Option<bool>,
}

/// A group currently selecting a project.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SelectedGroup {
    #[serde(skip_serializing)]
    pub project_id: DbId,
    #[serde(rename = "codigo")]
    pub group_id: DbId,
    /// Leader plus members.
    #[serde(rename = "quantidade_membros")]
    pub member_count: i64,
    #[serde(skip_serializing)]
    pub selected_at: Timestamp,
}

/// Query filters for `GET /projetos/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    #[serde(rename = "codigo")]
    pub id: Option<DbId>,
    #[serde(rename = "disciplina")]
    pub discipline_id: Option<DbId>,
    #[serde(rename = "professor")]
    pub professor_id: Option<DbId>,
    #[serde(rename = "ativo")]
    pub is_active: Option<bool>,
    #[serde(rename = "disponivel")]
    pub is_available: Option<bool>,
    #[serde(rename = "consolidado")]
    pub is_consolidated: Option<bool>,
    #[serde(rename = "tipo")]
    pub kind: Option<String>,
    pub area: Option<String>,
    #[serde(rename = "nome")]
    pub name: Option<String>,
}
