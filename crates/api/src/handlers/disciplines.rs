//! Handlers for the `/disciplinas` resource.

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sgp_core::classes::{check_capacity_change, validate_group_capacity};
use sgp_core::error::{CoreError, FieldErrors};
use sgp_core::pagination::resolve_page;
use sgp_core::roles::Role;
use sgp_core::types::DbId;
use sgp_db::models::discipline::{CreateDiscipline, Discipline, UpdateDiscipline};
use sgp_db::repositories::DisciplineRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{Actor, RequireProfessor};
use crate::query::PageParams;
use crate::response::Page;
use crate::state::AppState;

const NAME_MAX_LEN: usize = 100;
const MSG_NAME: &str = "Informe um nome com até 100 caracteres.";
const MSG_CUTOFF_SCORE: &str = "A nota de corte não pode ser negativa.";

/// Request body for `POST /disciplinas/`.
#[derive(Debug, Deserialize)]
pub struct CreateDisciplineRequest {
    pub nome: String,
    #[serde(default)]
    pub nota_corte: f64,
    #[serde(default = "default_group_capacity")]
    pub quantidade_grupos: i32,
}

fn default_group_capacity() -> i32 {
    1
}

fn check_fields(
    name: Option<&str>,
    cutoff_score: Option<f64>,
    capacity: Option<i32>,
) -> Result<(), CoreError> {
    let mut errors = FieldErrors::new();
    if let Some(name) = name {
        if name.trim().is_empty() || name.chars().count() > NAME_MAX_LEN {
            errors.add("nome", MSG_NAME);
        }
    }
    if cutoff_score.is_some_and(|score| score < 0.0) {
        errors.add("nota_corte", MSG_CUTOFF_SCORE);
    }
    if let Some(Err(msg)) = capacity.map(validate_group_capacity) {
        errors.add("quantidade_grupos", msg);
    }
    errors.into_result()
}

/// Load a discipline the professor owns; anything else is a 404.
async fn owned(state: &AppState, professor_id: DbId, id: DbId) -> AppResult<Discipline> {
    DisciplineRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|d| d.professor_id == professor_id)
        .ok_or(AppError::not_found("Discipline", id))
}

/// POST /disciplinas/
pub async fn create(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Json(input): Json<CreateDisciplineRequest>,
) -> AppResult<(StatusCode, Json<Discipline>)> {
    check_fields(
        Some(&input.nome),
        Some(input.nota_corte),
        Some(input.quantidade_grupos),
    )?;

    let discipline = DisciplineRepo::create(
        &state.pool,
        &CreateDiscipline {
            professor_id: professor.id,
            name: input.nome.trim().to_string(),
            cutoff_score: input.nota_corte,
            group_capacity: input.quantidade_grupos,
        },
    )
    .await?;

    tracing::info!(discipline_id = %discipline.id, professor_id = %professor.id, "Discipline created");
    Ok((StatusCode::CREATED, Json(discipline)))
}

/// GET /disciplinas/
pub async fn list(
    State(state): State<AppState>,
    Actor(role): Actor,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageParams>,
) -> AppResult<Json<Page<Discipline>>> {
    let total = DisciplineRepo::count(&state.pool, role).await?;
    let window = resolve_page(page.pagina.as_deref(), total, state.config.page_size)?;
    let disciplines =
        DisciplineRepo::list(&state.pool, role, window.limit(), window.offset()).await?;
    Ok(Json(Page::new(window, &uri, disciplines)))
}

/// GET /disciplinas/{id}/
pub async fn get_by_id(
    State(state): State<AppState>,
    Actor(role): Actor,
    Path(id): Path<DbId>,
) -> AppResult<Json<Discipline>> {
    let discipline = DisciplineRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|d| match role {
            Role::Professor(professor_id) => d.professor_id == professor_id,
            _ => d.is_active,
        })
        .ok_or(AppError::not_found("Discipline", id))?;
    Ok(Json(discipline))
}

/// PATCH /disciplinas/{id}/
///
/// Rejects a `quantidade_grupos` below the selection count of any of the
/// discipline's projects.
pub async fn update(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDiscipline>,
) -> AppResult<Json<Discipline>> {
    owned(&state, professor.id, id).await?;
    check_fields(
        input.name.as_deref(),
        input.cutoff_score,
        input.group_capacity,
    )?;

    let discipline = DisciplineRepo::update(&state.pool, id, &input, |capacity, largest| {
        Ok::<_, AppError>(check_capacity_change(capacity, largest)?)
    })
    .await?
    .ok_or(AppError::not_found("Discipline", id))?;
    Ok(Json(discipline))
}

/// DELETE /disciplinas/{id}/
pub async fn delete(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned(&state, professor.id, id).await?;
    if DisciplineRepo::deactivate(&state.pool, id).await? {
        tracing::info!(discipline_id = %id, "Discipline deactivated");
    }
    Ok(StatusCode::NO_CONTENT)
}
