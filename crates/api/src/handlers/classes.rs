//! Handlers for the `/turmas` resource and its enrollment actions.

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sgp_core::classes::{
    ensure_discipline_owner, validate_enrollment_request, validate_period, CLASS_NAME_MAX_LEN,
};
use sgp_core::error::{CoreError, FieldErrors};
use sgp_core::pagination::resolve_page;
use sgp_core::roles::Role;
use sgp_core::types::DbId;
use sgp_db::models::class::{Class, CreateClass, EnrolledStudent, UpdateClass};
use sgp_db::repositories::{ClassRepo, DisciplineRepo, StudentRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{Actor, RequireProfessor};
use crate::query::PageParams;
use crate::response::Page;
use crate::state::AppState;

pub(crate) const MSG_DISCIPLINE_INVALID: &str = "Disciplina inválida ou inativa.";
const MSG_NAME: &str = "Informe um nome com até 30 caracteres.";

/// Request body for `POST /turmas/`.
#[derive(Debug, Deserialize)]
pub struct CreateClassRequest {
    pub disciplina: DbId,
    pub nome: String,
    pub periodo: String,
}

/// Request body for `participar` and `remover-alunos`.
#[derive(Debug, Deserialize)]
pub struct EnrollmentRequest {
    #[serde(default)]
    pub alunos: Vec<DbId>,
}

/// A class with its enrolled students.
#[derive(Debug, Serialize)]
pub struct ClassResponse {
    #[serde(flatten)]
    pub class: Class,
    pub alunos: Vec<EnrolledStudent>,
}

async fn with_students(state: &AppState, class: Class) -> AppResult<ClassResponse> {
    let alunos = ClassRepo::enrolled_students(&state.pool, class.id).await?;
    Ok(ClassResponse { class, alunos })
}

fn check_fields(name: Option<&str>, period: Option<&str>) -> Result<(), CoreError> {
    let mut errors = FieldErrors::new();
    if let Some(name) = name {
        if name.trim().is_empty() || name.chars().count() > CLASS_NAME_MAX_LEN {
            errors.add("nome", MSG_NAME);
        }
    }
    if let Some(Err(msg)) = period.map(validate_period) {
        errors.add("periodo", msg);
    }
    errors.into_result()
}

/// The discipline must be active and belong to `professor_id`.
pub(crate) async fn check_discipline(
    state: &AppState,
    discipline_id: DbId,
    professor_id: DbId,
) -> AppResult<()> {
    let discipline = DisciplineRepo::find_by_id(&state.pool, discipline_id)
        .await?
        .filter(|d| d.is_active)
        .ok_or_else(|| CoreError::validation("disciplina", MSG_DISCIPLINE_INVALID))?;
    ensure_discipline_owner(discipline.professor_id, professor_id)?;
    Ok(())
}

async fn owned(state: &AppState, professor_id: DbId, id: DbId) -> AppResult<Class> {
    ClassRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|c| c.professor_id == professor_id)
        .ok_or(AppError::not_found("Class", id))
}

/// POST /turmas/
pub async fn create(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Json(input): Json<CreateClassRequest>,
) -> AppResult<(StatusCode, Json<ClassResponse>)> {
    check_fields(Some(&input.nome), Some(&input.periodo))?;
    check_discipline(&state, input.disciplina, professor.id).await?;

    let class = ClassRepo::create(
        &state.pool,
        &CreateClass {
            discipline_id: input.disciplina,
            professor_id: professor.id,
            name: input.nome.trim().to_string(),
            period: input.periodo,
        },
    )
    .await?;

    tracing::info!(class_id = %class.id, discipline_id = %class.discipline_id, "Class created");
    Ok((StatusCode::CREATED, Json(with_students(&state, class).await?)))
}

/// GET /turmas/
///
/// Students enrolled nowhere see every active class.
pub async fn list(
    State(state): State<AppState>,
    Actor(role): Actor,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageParams>,
) -> AppResult<Json<Page<Class>>> {
    let total = ClassRepo::count(&state.pool, role).await?;
    let window = resolve_page(page.pagina.as_deref(), total, state.config.page_size)?;
    let classes = ClassRepo::list(&state.pool, role, window.limit(), window.offset()).await?;
    Ok(Json(Page::new(window, &uri, classes)))
}

/// GET /turmas/{id}/
pub async fn get_by_id(
    State(state): State<AppState>,
    Actor(role): Actor,
    Path(id): Path<DbId>,
) -> AppResult<Json<ClassResponse>> {
    let class = ClassRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|c| match role {
            Role::Professor(professor_id) => c.professor_id == professor_id,
            _ => c.is_active,
        })
        .ok_or(AppError::not_found("Class", id))?;
    Ok(Json(with_students(&state, class).await?))
}

/// PATCH /turmas/{id}/
pub async fn update(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateClass>,
) -> AppResult<Json<ClassResponse>> {
    owned(&state, professor.id, id).await?;
    check_fields(input.name.as_deref(), input.period.as_deref())?;
    if let Some(discipline_id) = input.discipline_id {
        check_discipline(&state, discipline_id, professor.id).await?;
    }

    let class = ClassRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Class", id))?;
    Ok(Json(with_students(&state, class).await?))
}

/// DELETE /turmas/{id}/
pub async fn delete(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned(&state, professor.id, id).await?;
    if ClassRepo::deactivate(&state.pool, id).await? {
        tracing::info!(class_id = %id, "Class deactivated");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /turmas/{id}/participar/
///
/// A student may only enroll themselves; a professor may enroll anyone into
/// their own class. Enrolling an already enrolled student is a no-op.
pub async fn enroll(
    State(state): State<AppState>,
    Actor(role): Actor,
    Path(id): Path<DbId>,
    Json(input): Json<EnrollmentRequest>,
) -> AppResult<Json<ClassResponse>> {
    validate_enrollment_request(role, &input.alunos)?;

    let class = ClassRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|c| c.is_active)
        .filter(|c| role.professor_id().map_or(true, |p| c.professor_id == p))
        .ok_or(AppError::not_found("Class", id))?;

    let found = StudentRepo::find_many(&state.pool, &input.alunos).await?;
    if let Some(missing) = input
        .alunos
        .iter()
        .find(|id| !found.iter().any(|s| s.id == **id && s.is_active))
    {
        return Err(CoreError::validation(
            "alunos",
            format!("Pk inválido \"{missing}\" - objeto não existe."),
        )
        .into());
    }

    let added = ClassRepo::enroll(&state.pool, id, &input.alunos).await?;
    tracing::info!(class_id = %id, added, "Students enrolled");
    Ok(Json(with_students(&state, class).await?))
}

/// PATCH /turmas/{id}/remover-alunos/
pub async fn unenroll(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Path(id): Path<DbId>,
    Json(input): Json<EnrollmentRequest>,
) -> AppResult<Json<ClassResponse>> {
    validate_enrollment_request(Role::Professor(professor.id), &input.alunos)?;
    let class = owned(&state, professor.id, id).await?;

    let removed = ClassRepo::unenroll(&state.pool, id, &input.alunos).await?;
    tracing::info!(class_id = %id, removed, "Students removed from class");
    Ok(Json(with_students(&state, class).await?))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn long_name_and_bad_period_are_both_reported() {
        let name = "x".repeat(CLASS_NAME_MAX_LEN + 1);
        let err = check_fields(Some(&name), Some("2026-1")).unwrap_err();
        assert_matches!(err, CoreError::Validation(ref fields) => {
            assert!(fields.get("nome").is_some());
            assert!(fields.get("periodo").is_some());
        });
    }

    #[test]
    fn valid_fields_pass() {
        assert!(check_fields(Some("Turma A"), Some("2026.1")).is_ok());
    }
}
