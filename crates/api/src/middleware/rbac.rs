//! Role resolution extractors.
//!
//! Each extractor decodes the token through [`AuthUser`], then loads the
//! account it names. A missing or inactive account is rejected with 401; a
//! valid account of the wrong kind with 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sgp_core::error::CoreError;
use sgp_core::roles::{AccountKind, Role};
use sgp_db::models::professor::Professor;
use sgp_db::models::student::Student;
use sgp_db::repositories::{ProfessorRepo, StudentRepo};

use super::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// The account behind a request.
#[derive(Debug, Clone)]
pub enum Account {
    Student(Student),
    Professor(Professor),
}

impl Account {
    pub fn role(&self) -> Role {
        match self {
            Account::Student(s) => Role::Student(s.id),
            Account::Professor(p) => Role::Professor(p.id),
        }
    }
}

fn inactive_account() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Conta inexistente ou inativa.".into(),
    ))
}

/// Load the active account named by the token.
async fn resolve_account(parts: &mut Parts, state: &AppState) -> AppResult<Account> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    let kind = AccountKind::parse(&user.role).ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
    })?;

    let account = match kind {
        AccountKind::Student => StudentRepo::find_by_id(&state.pool, user.account_id)
            .await?
            .filter(|s| s.is_active)
            .map(Account::Student),
        AccountKind::Professor => ProfessorRepo::find_by_id(&state.pool, user.account_id)
            .await?
            .filter(|p| p.is_active)
            .map(Account::Professor),
    };
    account.ok_or_else(inactive_account)
}

/// Any active account. Handlers build their scoped queries from the role.
///
/// ```ignore
/// async fn list(Actor(role): Actor) -> AppResult<Json<()>> {
///     // role is Student(id) or Professor(id), never Anonymous
///     Ok(Json(()))
/// }
/// ```
pub struct Actor(pub Role);

impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let account = resolve_account(parts, state).await?;
        Ok(Actor(account.role()))
    }
}

/// Requires an active student account. Rejects professors with 403.
pub struct RequireStudent(pub Student);

impl FromRequestParts<AppState> for RequireStudent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_account(parts, state).await? {
            Account::Student(student) => Ok(RequireStudent(student)),
            Account::Professor(_) => Err(AppError::forbidden("Acesso restrito a alunos.")),
        }
    }
}

/// Requires an active professor account. Rejects students with 403.
pub struct RequireProfessor(pub Professor);

impl FromRequestParts<AppState> for RequireProfessor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_account(parts, state).await? {
            Account::Professor(professor) => Ok(RequireProfessor(professor)),
            Account::Student(_) => Err(AppError::forbidden("Acesso restrito a professores.")),
        }
    }
}
