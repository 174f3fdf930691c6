//! Handlers for the `/alunos` resource.

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use sgp_core::account::{registration_taken, validate_registration_number, validate_signup};
use sgp_core::error::CoreError;
use sgp_core::pagination::resolve_page;
use sgp_core::roles::AccountKind;
use sgp_core::types::DbId;
use sgp_db::models::student::{CreateStudent, Student, UpdateStudent};
use sgp_db::repositories::StudentRepo;
use sgp_events::WelcomeMail;
use validator::Validate;

use super::account::{
    ensure_email_free, ensure_self, hash, new_password_hash, send_welcome, SignupRequest,
    UpdateAccountRequest,
};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{Actor, RequireStudent};
use crate::query::PageParams;
use crate::response::Page;
use crate::state::AppState;

/// Create a student account and queue its welcome email.
pub(crate) async fn register(state: &AppState, input: SignupRequest) -> AppResult<Student> {
    input.validate()?;
    let registration_number = input.matricula.unwrap_or_default();
    validate_signup(
        &input.senha,
        Some(&registration_number),
        state.config.password_min_length,
    )?;

    ensure_email_free(state, &input.email, None).await?;
    if StudentRepo::registration_number_taken(&state.pool, &registration_number, None).await? {
        return Err(registration_taken().into());
    }

    let student = StudentRepo::create(
        &state.pool,
        &CreateStudent {
            name: input.nome,
            email: input.email,
            password_hash: hash(&input.senha)?,
            registration_number,
        },
    )
    .await?;

    tracing::info!(student_id = %student.id, "Student registered");
    send_welcome(
        state,
        WelcomeMail::new(&student.email, &student.name, AccountKind::Student),
    );
    Ok(student)
}

/// POST /alunos/
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<Student>)> {
    let student = register(&state, input).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// GET /alunos/
pub async fn list(
    State(state): State<AppState>,
    Actor(_): Actor,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageParams>,
) -> AppResult<Json<Page<Student>>> {
    let total = StudentRepo::count(&state.pool).await?;
    let window = resolve_page(page.pagina.as_deref(), total, state.config.page_size)?;
    let students = StudentRepo::list(&state.pool, window.limit(), window.offset()).await?;
    Ok(Json(Page::new(window, &uri, students)))
}

/// GET /alunos/{id}/
pub async fn get_by_id(
    State(state): State<AppState>,
    Actor(_): Actor,
    Path(id): Path<DbId>,
) -> AppResult<Json<Student>> {
    let student = StudentRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|s| s.is_active)
        .ok_or(AppError::not_found("Student", id))?;
    Ok(Json(student))
}

/// PATCH /alunos/{id}/
///
/// Self only. A password change needs the current password plus a matching
/// `nova_senha` / `confirmacao_senha` pair.
pub async fn update(
    State(state): State<AppState>,
    RequireStudent(current): RequireStudent,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAccountRequest>,
) -> AppResult<Json<Student>> {
    ensure_self(current.id, id)?;
    input.validate()?;

    if let Some(email) = &input.email {
        ensure_email_free(&state, email, Some(id)).await?;
    }
    if let Some(number) = &input.matricula {
        validate_registration_number(number)
            .map_err(|msg| CoreError::validation("matricula", msg))?;
        if StudentRepo::registration_number_taken(&state.pool, number, Some(id)).await? {
            return Err(registration_taken().into());
        }
    }
    let password_hash = new_password_hash(&state, &input, &current.password_hash)?;

    let changes = UpdateStudent {
        name: input.nome,
        email: input.email,
        password_hash,
        registration_number: input.matricula,
    };
    let student = StudentRepo::update(&state.pool, id, &changes)
        .await?
        .ok_or(AppError::not_found("Student", id))?;
    Ok(Json(student))
}

/// DELETE /alunos/{id}/
pub async fn delete(
    State(state): State<AppState>,
    RequireStudent(current): RequireStudent,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ensure_self(current.id, id)?;
    if StudentRepo::deactivate(&state.pool, id).await? {
        tracing::info!(student_id = %id, "Student account deactivated");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Student", id))
    }
}
