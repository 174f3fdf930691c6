//! Account kinds and the per-request role resolved from them.
//!
//! The role names double as the `role` claim inside access tokens and as the
//! `?usuario=` value accepted by the signup endpoint.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

pub const ROLE_STUDENT: &str = "aluno";
pub const ROLE_PROFESSOR: &str = "professor";

/// The two kinds of account that can authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    #[serde(rename = "aluno")]
    Student,
    Professor,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountKind::Student => ROLE_STUDENT,
            AccountKind::Professor => ROLE_PROFESSOR,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            ROLE_STUDENT => Some(AccountKind::Student),
            ROLE_PROFESSOR => Some(AccountKind::Professor),
            _ => None,
        }
    }
}

/// Capability the caller acts with for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student(DbId),
    Professor(DbId),
    Anonymous,
}

impl Role {
    pub fn student_id(self) -> Option<DbId> {
        match self {
            Role::Student(id) => Some(id),
            _ => None,
        }
    }

    pub fn professor_id(self) -> Option<DbId> {
        match self {
            Role::Professor(id) => Some(id),
            _ => None,
        }
    }
}
