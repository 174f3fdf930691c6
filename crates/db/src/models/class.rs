//! Class (turma) model, DTOs and the enrollment join rows.

use serde::{Deserialize, Serialize};
use sgp_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `classes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Class {
    #[serde(rename = "codigo")]
    pub id: DbId,
    #[serde(rename = "disciplina")]
    pub discipline_id: DbId,
    #[serde(rename = "professor")]
    pub professor_id: DbId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "periodo")]
    pub period: String,
    #[serde(rename = "ativo")]
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub created_at: Timestamp,
    #[serde(skip_serializing)]
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateClass {
    pub discipline_id: DbId,
    pub professor_id: DbId,
    pub name: String,
    pub period: String,
}

/// DTO for `PATCH /turmas/{id}/`. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClass {
    #[serde(rename = "disciplina")]
    pub discipline_id: Option<DbId>,
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "periodo")]
    pub period: Option<String>,
    #[serde(rename = "ativo")]
    pub is_active: Option<bool>,
}

/// A student enrolled in a class, as listed under the class.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrolledStudent {
    #[serde(rename = "codigo")]
    pub id: DbId,
    #[serde(rename = "matricula")]
    pub registration_number: String,
    #[serde(rename = "nome")]
    pub name: String,
}
