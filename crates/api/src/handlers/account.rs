//! Helpers shared by the student and professor account handlers.

use serde::Deserialize;
use sgp_core::account::{email_taken, resolve_password_change, PasswordChange};
use sgp_core::types::DbId;
use sgp_db::repositories::AccountRepo;
use sgp_events::WelcomeMail;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for `POST /alunos/`, `POST /professores/` and
/// `POST /cadastre-se/`. `matricula` is required for students only.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 300, message = "Informe um nome com até 300 caracteres."))]
    pub nome: String,
    #[validate(email(message = "Insira um endereço de email válido."))]
    pub email: String,
    pub senha: String,
    pub matricula: Option<String>,
}

/// Self-service account update. Password fields follow the
/// `senha` / `nova_senha` / `confirmacao_senha` handshake.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    #[validate(length(min = 1, max = 300, message = "Informe um nome com até 300 caracteres."))]
    pub nome: Option<String>,
    #[validate(email(message = "Insira um endereço de email válido."))]
    pub email: Option<String>,
    pub matricula: Option<String>,
    pub senha: Option<String>,
    pub nova_senha: Option<String>,
    pub confirmacao_senha: Option<String>,
}

pub(crate) fn hash(password: &str) -> AppResult<String> {
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))
}

pub(crate) fn verify(password: &str, stored_hash: &str) -> AppResult<bool> {
    verify_password(password, stored_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))
}

/// Reject `email` when another account (of either kind) already uses it.
pub(crate) async fn ensure_email_free(
    state: &AppState,
    email: &str,
    exclude_id: Option<DbId>,
) -> AppResult<()> {
    if AccountRepo::email_taken(&state.pool, email, exclude_id).await? {
        return Err(email_taken().into());
    }
    Ok(())
}

/// Resolve the password fields of an update into a new hash, if any.
pub(crate) fn new_password_hash(
    state: &AppState,
    input: &UpdateAccountRequest,
    stored_hash: &str,
) -> AppResult<Option<String>> {
    let change = PasswordChange {
        current: input.senha.as_deref(),
        new: input.nova_senha.as_deref(),
        confirmation: input.confirmacao_senha.as_deref(),
    };
    let current_matches = match change.current {
        Some(current) if !current.is_empty() => verify(current, stored_hash)?,
        _ => false,
    };
    resolve_password_change(change, current_matches, state.config.password_min_length)?
        .map(hash)
        .transpose()
}

/// Only the account owner may change or delete it.
pub(crate) fn ensure_self(own_id: DbId, target_id: DbId) -> AppResult<()> {
    if own_id != target_id {
        return Err(AppError::forbidden(
            "Você só pode alterar a sua própria conta.",
        ));
    }
    Ok(())
}

/// Queue the welcome email; never blocks the request.
pub(crate) fn send_welcome(state: &AppState, mail: WelcomeMail) {
    if !state.mail.enqueue(mail) {
        tracing::debug!("Welcome email not queued");
    }
}
