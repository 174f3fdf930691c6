//! Group model, member rows and list filters.

use serde::{Deserialize, Serialize};
use sgp_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `groups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Group {
    #[serde(rename = "codigo")]
    pub id: DbId,
    #[serde(rename = "disciplina")]
    pub discipline_id: DbId,
    #[serde(rename = "lider")]
    pub leader_id: DbId,
    #[serde(rename = "ativo")]
    pub is_active: bool,
    #[serde(rename = "disponivel")]
    pub is_available: bool,
    #[serde(skip_serializing)]
    pub created_at: Timestamp,
    #[serde(skip_serializing)]
    pub updated_at: Timestamp,
}

/// A student attached to a group (leader or member) with display fields.
#[derive(Debug, Clone, FromRow)]
pub struct GroupStudent {
    pub group_id: DbId,
    pub student_id: DbId,
    pub registration_number: String,
    pub name: String,
    pub is_leader: bool,
}

/// Query filters for `GET /grupos/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupFilter {
    #[serde(rename = "codigo")]
    pub id: Option<DbId>,
    #[serde(rename = "disciplina")]
    pub discipline_id: Option<DbId>,
    /// Groups in which this student is a (non-leader) member.
    #[serde(rename = "aluno")]
    pub member_id: Option<DbId>,
    #[serde(rename = "lider")]
    pub leader_id: Option<DbId>,
    #[serde(rename = "ativo")]
    pub is_active: Option<bool>,
    #[serde(rename = "disponivel")]
    pub is_available: Option<bool>,
}
