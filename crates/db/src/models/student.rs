//! Student account model and DTOs.

use serde::Serialize;
use sgp_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `students` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Student {
    #[serde(rename = "codigo")]
    pub id: DbId,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(rename = "matricula")]
    pub registration_number: String,
    #[serde(rename = "ativo")]
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub created_at: Timestamp,
    #[serde(skip_serializing)]
    pub updated_at: Timestamp,
}

/// Insert payload. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct CreateStudent {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub registration_number: String,
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateStudent {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub registration_number: Option<String>,
}
