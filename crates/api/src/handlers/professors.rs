//! Handlers for the `/professores` resource.

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use sgp_core::account::validate_signup;
use sgp_core::pagination::resolve_page;
use sgp_core::roles::AccountKind;
use sgp_core::types::DbId;
use sgp_db::models::professor::{CreateProfessor, Professor, UpdateProfessor};
use sgp_db::repositories::ProfessorRepo;
use sgp_events::WelcomeMail;
use validator::Validate;

use super::account::{
    ensure_email_free, ensure_self, hash, new_password_hash, send_welcome, SignupRequest,
    UpdateAccountRequest,
};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{Actor, RequireProfessor};
use crate::query::PageParams;
use crate::response::Page;
use crate::state::AppState;

/// Create a professor account and queue its welcome email. `matricula` is
/// ignored.
pub(crate) async fn register(state: &AppState, input: SignupRequest) -> AppResult<Professor> {
    input.validate()?;
    validate_signup(&input.senha, None, state.config.password_min_length)?;
    ensure_email_free(state, &input.email, None).await?;

    let professor = ProfessorRepo::create(
        &state.pool,
        &CreateProfessor {
            name: input.nome,
            email: input.email,
            password_hash: hash(&input.senha)?,
        },
    )
    .await?;

    tracing::info!(professor_id = %professor.id, "Professor registered");
    send_welcome(
        state,
        WelcomeMail::new(&professor.email, &professor.name, AccountKind::Professor),
    );
    Ok(professor)
}

/// POST /professores/
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<Professor>)> {
    let professor = register(&state, input).await?;
    Ok((StatusCode::CREATED, Json(professor)))
}

/// GET /professores/
pub async fn list(
    State(state): State<AppState>,
    Actor(_): Actor,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageParams>,
) -> AppResult<Json<Page<Professor>>> {
    let total = ProfessorRepo::count(&state.pool).await?;
    let window = resolve_page(page.pagina.as_deref(), total, state.config.page_size)?;
    let professors = ProfessorRepo::list(&state.pool, window.limit(), window.offset()).await?;
    Ok(Json(Page::new(window, &uri, professors)))
}

/// GET /professores/{id}/
pub async fn get_by_id(
    State(state): State<AppState>,
    Actor(_): Actor,
    Path(id): Path<DbId>,
) -> AppResult<Json<Professor>> {
    let professor = ProfessorRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|p| p.is_active)
        .ok_or(AppError::not_found("Professor", id))?;
    Ok(Json(professor))
}

/// PATCH /professores/{id}/
pub async fn update(
    State(state): State<AppState>,
    RequireProfessor(current): RequireProfessor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAccountRequest>,
) -> AppResult<Json<Professor>> {
    ensure_self(current.id, id)?;
    input.validate()?;

    if let Some(email) = &input.email {
        ensure_email_free(&state, email, Some(id)).await?;
    }
    let password_hash = new_password_hash(&state, &input, &current.password_hash)?;

    let changes = UpdateProfessor {
        name: input.nome,
        email: input.email,
        password_hash,
    };
    let professor = ProfessorRepo::update(&state.pool, id, &changes)
        .await?
        .ok_or(AppError::not_found("Professor", id))?;
    Ok(Json(professor))
}

/// DELETE /professores/{id}/
pub async fn delete(
    State(state): State<AppState>,
    RequireProfessor(current): RequireProfessor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ensure_self(current.id, id)?;
    if ProfessorRepo::deactivate(&state.pool, id).await? {
        tracing::info!(professor_id = %id, "Professor account deactivated");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Professor", id))
    }
}
