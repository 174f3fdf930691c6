//! Handlers for login, password recovery and public signup.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use sgp_core::account::{email_not_found, validate_password_strength};
use sgp_core::error::CoreError;
use sgp_core::roles::AccountKind;
use sgp_core::types::DbId;
use sgp_db::repositories::{ProfessorRepo, StudentRepo};

use super::account::{hash, verify, SignupRequest};
use super::{professors, students};
use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::query::AccountKindParams;
use crate::state::AppState;

const MSG_BAD_CREDENTIALS: &str = "Usuário ou senha inválidos.";
const MSG_ACCOUNT_INACTIVE: &str = "Conta desativada.";
const MSG_UNKNOWN_ACCOUNT_KIND: &str = "Informe o tipo de usuário: aluno ou professor.";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /login/`. `username` is the account email.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `PATCH /recuperar-acesso/senha/`.
#[derive(Debug, Deserialize)]
pub struct RecoverPasswordRequest {
    pub email: String,
    pub nova_senha: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub usuario: AccountInfo,
}

/// Public account info embedded in [`LoginResponse`].
#[derive(Debug, Serialize)]
pub struct AccountInfo {
    pub codigo: DbId,
    pub nome: String,
    pub email: String,
    pub tipo: AccountKind,
}

/// Credentials of whichever account holds the login email.
struct Credentials {
    id: DbId,
    name: String,
    email: String,
    password_hash: String,
    is_active: bool,
    kind: AccountKind,
}

async fn find_credentials(state: &AppState, email: &str) -> AppResult<Option<Credentials>> {
    if let Some(s) = StudentRepo::find_by_email(&state.pool, email).await? {
        return Ok(Some(Credentials {
            id: s.id,
            name: s.name,
            email: s.email,
            password_hash: s.password_hash,
            is_active: s.is_active,
            kind: AccountKind::Student,
        }));
    }
    Ok(ProfessorRepo::find_by_email(&state.pool, email)
        .await?
        .map(|p| Credentials {
            id: p.id,
            name: p.name,
            email: p.email,
            password_hash: p.password_hash,
            is_active: p.is_active,
            kind: AccountKind::Professor,
        }))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /login/
///
/// Students are looked up before professors; emails are unique across both.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let unauthorized = || AppError::Core(CoreError::Unauthorized(MSG_BAD_CREDENTIALS.into()));

    let account = find_credentials(&state, input.username.trim())
        .await?
        .ok_or_else(unauthorized)?;

    if !verify(&input.password, &account.password_hash)? {
        tracing::debug!(account_id = %account.id, "Login rejected: wrong password");
        return Err(unauthorized());
    }
    if !account.is_active {
        return Err(AppError::forbidden(MSG_ACCOUNT_INACTIVE));
    }

    let token = generate_access_token(account.id, account.kind.as_str(), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(account_id = %account.id, kind = account.kind.as_str(), "Login succeeded");
    Ok(Json(LoginResponse {
        token,
        usuario: AccountInfo {
            codigo: account.id,
            nome: account.name,
            email: account.email,
            tipo: account.kind,
        },
    }))
}

/// PATCH /recuperar-acesso/senha/
///
/// Replaces the password of the account holding `email`. Answers 200 with an
/// empty body.
pub async fn recover_password(
    State(state): State<AppState>,
    Json(input): Json<RecoverPasswordRequest>,
) -> AppResult<StatusCode> {
    validate_password_strength(&input.nova_senha, state.config.password_min_length)
        .map_err(|msg| CoreError::validation("nova_senha", msg))?;
    let password_hash = hash(&input.nova_senha)?;

    let email = input.email.trim();
    let updated = StudentRepo::set_password_by_email(&state.pool, email, &password_hash).await?
        || ProfessorRepo::set_password_by_email(&state.pool, email, &password_hash).await?;
    if !updated {
        return Err(email_not_found().into());
    }

    tracing::info!("Password reset through recovery");
    Ok(StatusCode::OK)
}

/// POST /cadastre-se/?usuario=aluno|professor
pub async fn signup(
    State(state): State<AppState>,
    Query(params): Query<AccountKindParams>,
    Json(input): Json<SignupRequest>,
) -> AppResult<Response> {
    let kind = params
        .usuario
        .as_deref()
        .and_then(AccountKind::parse)
        .ok_or_else(|| CoreError::validation("usuario", MSG_UNKNOWN_ACCOUNT_KIND))?;

    let response = match kind {
        AccountKind::Student => {
            let student = students::register(&state, input).await?;
            (StatusCode::CREATED, Json(student)).into_response()
        }
        AccountKind::Professor => {
            let professor = professors::register(&state, input).await?;
            (StatusCode::CREATED, Json(professor)).into_response()
        }
    };
    Ok(response)
}
