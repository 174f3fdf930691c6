//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Decodes the JWT Bearer token.
//! - [`rbac::Actor`] -- Any active account, resolved to a [`Role`](sgp_core::roles::Role).
//! - [`rbac::RequireStudent`] -- An active student; carries the row.
//! - [`rbac::RequireProfessor`] -- An active professor; carries the row.

pub mod auth;
pub mod rbac;
