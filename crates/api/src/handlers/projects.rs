//! Handlers for the `/projetos` resource, including group selection
//! management.

use std::collections::HashMap;

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sgp_core::consolidation::{plan_manage_groups, ManageGroups};
use sgp_core::error::{CoreError, FieldErrors};
use sgp_core::pagination::resolve_page;
use sgp_core::types::DbId;
use sgp_db::models::project::{
    CreateProject, Project, ProjectDetail, ProjectFilter, SelectedGroup, UpdateProject,
};
use sgp_db::repositories::ProjectRepo;

use super::classes::check_discipline;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{Actor, RequireProfessor};
use crate::query::PageParams;
use crate::response::Page;
use crate::state::AppState;

const NAME_MAX_LEN: usize = 50;
const KIND_MAX_LEN: usize = 20;
const AREA_MAX_LEN: usize = 20;
const MSG_DISCIPLINE_LOCKED: &str =
    "Não é possível alterar a disciplina de um projeto com grupos vinculados.";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /projetos/`.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub disciplina: DbId,
    pub nome: String,
    #[serde(default)]
    pub descricao: String,
    pub tipo: String,
    pub area: String,
    #[serde(default = "default_available")]
    pub disponivel: bool,
}

fn default_available() -> bool {
    true
}

/// Request body for `PATCH /projetos/{id}/`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    pub disciplina: Option<DbId>,
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub tipo: Option<String>,
    pub area: Option<String>,
    pub disponivel: Option<bool>,
}

/// Request body for `PATCH /projetos/{id}/gerenciar-grupos/`.
#[derive(Debug, Default, Deserialize)]
pub struct ManageGroupsRequest {
    pub ativo: Option<bool>,
    pub grupo: Option<DbId>,
    #[serde(default)]
    pub grupos_removidos: Vec<DbId>,
    pub consolidado: Option<bool>,
    pub disponivel: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ProfessorSummary {
    pub codigo: DbId,
    pub nome: String,
}

#[derive(Debug, Serialize)]
pub struct DisciplineSummary {
    pub codigo: DbId,
    pub nome: String,
    pub nota_corte: f64,
    pub quantidade_grupos: i32,
}

/// A project with its owner, discipline and selecting groups.
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub codigo: DbId,
    pub nome: String,
    pub descricao: String,
    pub tipo: String,
    pub area: String,
    pub disponivel: bool,
    pub ativo: bool,
    pub consolidado: bool,
    pub professor: ProfessorSummary,
    pub disciplina: DisciplineSummary,
    pub grupos: Vec<SelectedGroup>,
}

/// Selection state returned by the manage endpoint.
#[derive(Debug, Serialize)]
pub struct ManagedProject {
    pub codigo: DbId,
    pub nome: String,
    pub tipo: String,
    pub area: String,
    pub consolidado: bool,
    pub ativo: bool,
    pub disponivel: bool,
}

#[derive(Debug, Serialize)]
pub struct ManageGroupsResponse {
    pub projeto: ManagedProject,
    pub grupos: Vec<SelectedGroup>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn check_text(errors: &mut FieldErrors, field: &str, value: Option<&str>, max_len: usize) {
    if let Some(value) = value {
        if value.trim().is_empty() || value.chars().count() > max_len {
            errors.add(field, format!("Informe um valor com até {max_len} caracteres."));
        }
    }
}

fn check_fields(
    name: Option<&str>,
    kind: Option<&str>,
    area: Option<&str>,
) -> Result<(), CoreError> {
    let mut errors = FieldErrors::new();
    check_text(&mut errors, "nome", name, NAME_MAX_LEN);
    check_text(&mut errors, "tipo", kind, KIND_MAX_LEN);
    check_text(&mut errors, "area", area, AREA_MAX_LEN);
    errors.into_result()
}

async fn with_groups(
    state: &AppState,
    details: Vec<ProjectDetail>,
) -> AppResult<Vec<ProjectResponse>> {
    let ids: Vec<DbId> = details.iter().map(|d| d.project.id).collect();
    let mut by_project: HashMap<DbId, Vec<SelectedGroup>> = HashMap::new();
    for group in ProjectRepo::selected_groups(&state.pool, &ids).await? {
        by_project.entry(group.project_id).or_default().push(group);
    }

    Ok(details
        .into_iter()
        .map(|d| {
            let p = d.project;
            ProjectResponse {
                grupos: by_project.remove(&p.id).unwrap_or_default(),
                codigo: p.id,
                nome: p.name,
                descricao: p.description,
                tipo: p.kind,
                area: p.area,
                disponivel: p.is_available,
                ativo: p.is_active,
                consolidado: p.is_consolidated,
                professor: ProfessorSummary {
                    codigo: p.professor_id,
                    nome: d.professor_name,
                },
                disciplina: DisciplineSummary {
                    codigo: p.discipline_id,
                    nome: d.discipline_name,
                    nota_corte: d.discipline_cutoff_score,
                    quantidade_grupos: d.discipline_group_capacity,
                },
            }
        })
        .collect())
}

async fn detail_response(state: &AppState, id: DbId) -> AppResult<ProjectResponse> {
    let detail = ProjectRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Project", id))?;
    with_groups(state, vec![detail])
        .await?
        .pop()
        .ok_or(AppError::not_found("Project", id))
}

async fn owned(state: &AppState, professor_id: DbId, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|p| p.professor_id == professor_id)
        .ok_or(AppError::not_found("Project", id))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /projetos/
pub async fn create(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<ProjectResponse>)> {
    check_fields(Some(&input.nome), Some(&input.tipo), Some(&input.area))?;
    check_discipline(&state, input.disciplina, professor.id).await?;

    let project = ProjectRepo::create(
        &state.pool,
        &CreateProject {
            professor_id: professor.id,
            discipline_id: input.disciplina,
            name: input.nome.trim().to_string(),
            description: input.descricao,
            kind: input.tipo.trim().to_string(),
            area: input.area.trim().to_string(),
            is_available: input.disponivel,
        },
    )
    .await?;

    tracing::info!(project_id = %project.id, professor_id = %professor.id, "Project created");
    Ok((StatusCode::CREATED, Json(detail_response(&state, project.id).await?)))
}

/// GET /projetos/
///
/// Professors see their own projects; students see every active one.
pub async fn list(
    State(state): State<AppState>,
    Actor(role): Actor,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageParams>,
    Query(filter): Query<ProjectFilter>,
) -> AppResult<Json<Page<ProjectResponse>>> {
    let total = ProjectRepo::count(&state.pool, role, &filter).await?;
    let window = resolve_page(page.pagina.as_deref(), total, state.config.page_size)?;
    let details =
        ProjectRepo::list(&state.pool, role, &filter, window.limit(), window.offset()).await?;
    let results = with_groups(&state, details).await?;
    Ok(Json(Page::new(window, &uri, results)))
}

/// GET /projetos/{id}/
pub async fn get_by_id(
    State(state): State<AppState>,
    Actor(role): Actor,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProjectResponse>> {
    let filter = ProjectFilter {
        id: Some(id),
        ..ProjectFilter::default()
    };
    let details = ProjectRepo::list(&state.pool, role, &filter, 1, 0).await?;
    with_groups(&state, details)
        .await?
        .pop()
        .map(Json)
        .ok_or(AppError::not_found("Project", id))
}

/// PATCH /projetos/{id}/
///
/// Plain fields only. Selection state goes through `gerenciar-grupos`.
pub async fn update(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProjectRequest>,
) -> AppResult<Json<ProjectResponse>> {
    let project = owned(&state, professor.id, id).await?;
    check_fields(
        input.nome.as_deref(),
        input.tipo.as_deref(),
        input.area.as_deref(),
    )?;

    if let Some(discipline_id) = input.disciplina.filter(|d| *d != project.discipline_id) {
        check_discipline(&state, discipline_id, professor.id).await?;
        if !ProjectRepo::selected_group_ids(&state.pool, id).await?.is_empty() {
            return Err(CoreError::validation("disciplina", MSG_DISCIPLINE_LOCKED).into());
        }
    }

    let changes = UpdateProject {
        discipline_id: input.disciplina,
        name: input.nome.map(|n| n.trim().to_string()),
        description: input.descricao,
        kind: input.tipo.map(|k| k.trim().to_string()),
        area: input.area.map(|a| a.trim().to_string()),
        is_available: input.disponivel,
    };
    ProjectRepo::update(&state.pool, id, &changes)
        .await?
        .ok_or(AppError::not_found("Project", id))?;
    Ok(Json(detail_response(&state, id).await?))
}

/// DELETE /projetos/{id}/
///
/// Deactivates the project, drops its group selections and unlinks its task
/// copies. Repeating the call is harmless.
pub async fn delete(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned(&state, professor.id, id).await?;
    ProjectRepo::deactivate(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /projetos/{id}/gerenciar-grupos/
///
/// Every requested change is applied in one transaction or none is.
pub async fn manage_groups(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Path(id): Path<DbId>,
    Json(input): Json<ManageGroupsRequest>,
) -> AppResult<Json<ManageGroupsResponse>> {
    owned(&state, professor.id, id).await?;

    let project = ProjectRepo::manage_groups(&state.pool, id, input.grupo, |selection, group| {
        let attach = match (input.grupo, group) {
            (Some(group_id), None) => {
                return Err(AppError::from(CoreError::validation(
                    "grupo",
                    format!("Pk inválido \"{group_id}\" - objeto não existe."),
                )));
            }
            (_, group) => group,
        };
        let request = ManageGroups {
            active: input.ativo,
            attach,
            detach: input.grupos_removidos,
            consolidated: input.consolidado,
            available: input.disponivel,
        };
        Ok(plan_manage_groups(selection, &request)?)
    })
    .await?
    .ok_or(AppError::not_found("Project", id))?;

    let grupos = ProjectRepo::selected_groups(&state.pool, &[id]).await?;
    tracing::info!(
        project_id = %id,
        consolidated = project.is_consolidated,
        groups = grupos.len(),
        "Project groups managed"
    );
    Ok(Json(ManageGroupsResponse {
        projeto: ManagedProject {
            codigo: project.id,
            nome: project.name,
            tipo: project.kind,
            area: project.area,
            consolidado: project.is_consolidated,
            ativo: project.is_active,
            disponivel: project.is_available,
        },
        grupos,
    }))
}
