//! Discipline model and DTOs.

use serde::{Deserialize, Serialize};
use sgp_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `disciplines` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Discipline {
    #[serde(rename = "codigo")]
    pub id: DbId,
    #[serde(rename = "professor")]
    pub professor_id: DbId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "nota_corte")]
    pub cutoff_score: f64,
    /// Maximum number of groups a project under this discipline accepts.
    #[serde(rename = "quantidade_grupos")]
    pub group_capacity: i32,
    #[serde(rename = "ativo")]
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub created_at: Timestamp,
    #[serde(skip_serializing)]
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateDiscipline {
    pub professor_id: DbId,
    pub name: String,
    pub cutoff_score: f64,
    pub group_capacity: i32,
}

/// DTO for `PATCH /disciplinas/{id}/`. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDiscipline {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "nota_corte")]
    pub cutoff_score: Option<f64>,
    #[serde(rename = "quantidade_grupos")]
    pub group_capacity: Option<i32>,
    #[serde(rename = "ativo")]
    pub is_active: Option<bool>,
}
