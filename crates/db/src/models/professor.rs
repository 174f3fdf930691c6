//! Professor account model and DTOs.

use serde::Serialize;
use sgp_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `professors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Professor {
    #[serde(rename = "codigo")]
    pub id: DbId,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(rename = "ativo")]
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub created_at: Timestamp,
    #[serde(skip_serializing)]
    pub updated_at: Timestamp,
}

/// Insert payload. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct CreateProfessor {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfessor {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}
