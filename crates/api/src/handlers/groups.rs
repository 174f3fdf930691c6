//! Handlers for the `/grupos` resource.
//!
//! Students form groups inside the disciplines they are enrolled in; the
//! professor owning the discipline activates them.

use std::collections::HashMap;

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sgp_core::error::CoreError;
use sgp_core::group::{
    check_deactivate, check_join, check_leader_eligibility, participants, JoinCheck, Participant,
};
use sgp_core::pagination::resolve_page;
use sgp_core::types::DbId;
use sgp_db::models::group::{Group, GroupFilter, GroupStudent};
use sgp_db::models::student::Student;
use sgp_db::repositories::{ClassRepo, DisciplineRepo, GroupRepo};

use super::classes::MSG_DISCIPLINE_INVALID;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{Actor, RequireProfessor, RequireStudent};
use crate::query::PageParams;
use crate::response::Page;
use crate::state::AppState;

const MSG_LEADER_ONLY: &str = "Apenas o líder pode alterar o grupo.";
const MSG_NOT_DISCIPLINE_OWNER: &str = "O grupo não pertence a uma disciplina sua.";

/// Request body for `POST /grupos/`.
#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub disciplina: DbId,
}

/// Request body for `PATCH /grupos/{id}/`.
#[derive(Debug, Deserialize)]
pub struct UpdateGroupRequest {
    pub disponivel: Option<bool>,
}

/// A group with its derived participant list, leader first.
#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub codigo: DbId,
    pub disciplina: DbId,
    pub ativo: bool,
    pub disponivel: bool,
    pub participantes: Vec<Participant>,
}

/// Attach participants to each group with one query.
async fn with_participants(
    state: &AppState,
    groups: Vec<Group>,
) -> AppResult<Vec<GroupResponse>> {
    let ids: Vec<DbId> = groups.iter().map(|g| g.id).collect();
    let mut by_group: HashMap<DbId, Vec<GroupStudent>> = HashMap::new();
    for row in GroupRepo::participants_of(&state.pool, &ids).await? {
        by_group.entry(row.group_id).or_default().push(row);
    }

    let mut out = Vec::with_capacity(groups.len());
    for group in groups {
        let rows = by_group.remove(&group.id).unwrap_or_default();
        let (leaders, members): (Vec<_>, Vec<_>) = rows.into_iter().partition(|r| r.is_leader);
        let leader = leaders.into_iter().next().ok_or_else(|| {
            AppError::InternalError(format!("Group {} has no leader row", group.id))
        })?;
        out.push(GroupResponse {
            codigo: group.id,
            disciplina: group.discipline_id,
            ativo: group.is_active,
            disponivel: group.is_available,
            participantes: participants(
                (leader.student_id, leader.registration_number, leader.name),
                members
                    .into_iter()
                    .map(|m| (m.student_id, m.registration_number, m.name)),
            ),
        });
    }
    Ok(out)
}

async fn one_response(state: &AppState, group: Group) -> AppResult<GroupResponse> {
    let id = group.id;
    with_participants(state, vec![group])
        .await?
        .pop()
        .ok_or(AppError::not_found("Group", id))
}

/// Load a group led by `student`.
async fn led_by(state: &AppState, student: &Student, id: DbId) -> AppResult<Group> {
    let group = GroupRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Group", id))?;
    if group.leader_id != student.id {
        return Err(AppError::forbidden(MSG_LEADER_ONLY));
    }
    Ok(group)
}

/// POST /grupos/
///
/// The caller becomes the leader. They must be enrolled in a class of the
/// discipline and may lead a single group.
pub async fn create(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Json(input): Json<CreateGroupRequest>,
) -> AppResult<(StatusCode, Json<GroupResponse>)> {
    DisciplineRepo::find_by_id(&state.pool, input.disciplina)
        .await?
        .filter(|d| d.is_active)
        .ok_or_else(|| CoreError::validation("disciplina", MSG_DISCIPLINE_INVALID))?;

    let enrolled = ClassRepo::enrolled_discipline_ids(&state.pool, student.id).await?;
    let already_leads = GroupRepo::leads_any(&state.pool, student.id).await?;
    check_leader_eligibility(&enrolled, input.disciplina, already_leads)?;

    let group = GroupRepo::create(&state.pool, input.disciplina, student.id).await?;
    tracing::info!(group_id = %group.id, leader_id = %student.id, "Group created");
    Ok((StatusCode::CREATED, Json(one_response(&state, group).await?)))
}

/// GET /grupos/
pub async fn list(
    State(state): State<AppState>,
    Actor(role): Actor,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageParams>,
    Query(filter): Query<GroupFilter>,
) -> AppResult<Json<Page<GroupResponse>>> {
    let total = GroupRepo::count(&state.pool, role, &filter).await?;
    let window = resolve_page(page.pagina.as_deref(), total, state.config.page_size)?;
    let groups =
        GroupRepo::list(&state.pool, role, &filter, window.limit(), window.offset()).await?;
    let results = with_participants(&state, groups).await?;
    Ok(Json(Page::new(window, &uri, results)))
}

/// GET /grupos/{id}/
pub async fn get_by_id(
    State(state): State<AppState>,
    Actor(role): Actor,
    Path(id): Path<DbId>,
) -> AppResult<Json<GroupResponse>> {
    let filter = GroupFilter {
        id: Some(id),
        ..GroupFilter::default()
    };
    let group = GroupRepo::list(&state.pool, role, &filter, 1, 0)
        .await?
        .pop()
        .ok_or(AppError::not_found("Group", id))?;
    Ok(Json(one_response(&state, group).await?))
}

/// PATCH /grupos/{id}/
pub async fn update(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateGroupRequest>,
) -> AppResult<Json<GroupResponse>> {
    let mut group = led_by(&state, &student, id).await?;
    if let Some(available) = input.disponivel {
        group = GroupRepo::set_available(&state.pool, id, available)
            .await?
            .ok_or(AppError::not_found("Group", id))?;
    }
    Ok(Json(one_response(&state, group).await?))
}

/// DELETE /grupos/{id}/
///
/// Blocked while the group is attached to a consolidated project.
pub async fn delete(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    led_by(&state, &student, id).await?;
    GroupRepo::deactivate(&state.pool, id, |consolidated| {
        Ok::<_, AppError>(check_deactivate(consolidated)?)
    })
    .await?;
    tracing::info!(group_id = %id, "Group deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /grupos/{id}/participar/
pub async fn join(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Path(id): Path<DbId>,
) -> AppResult<Json<GroupResponse>> {
    let group = GroupRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Group", id))?;

    let enrolled = ClassRepo::enrolled_discipline_ids(&state.pool, student.id).await?;
    let already_member = GroupRepo::is_member(&state.pool, id, student.id).await?;
    check_join(JoinCheck {
        student_id: student.id,
        leader_id: group.leader_id,
        group_discipline_id: group.discipline_id,
        group_available: group.is_available,
        enrolled_disciplines: &enrolled,
        already_member,
    })?;

    GroupRepo::add_member(&state.pool, id, student.id).await?;
    tracing::info!(group_id = %id, student_id = %student.id, "Student joined group");
    Ok(Json(one_response(&state, group).await?))
}

/// PATCH /grupos/{id}/ativar/
pub async fn activate(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Path(id): Path<DbId>,
) -> AppResult<Json<GroupResponse>> {
    let group = GroupRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Group", id))?;
    let owns_discipline = DisciplineRepo::find_by_id(&state.pool, group.discipline_id)
        .await?
        .is_some_and(|d| d.professor_id == professor.id);
    if !owns_discipline {
        return Err(AppError::forbidden(MSG_NOT_DISCIPLINE_OWNER));
    }

    let group = GroupRepo::activate(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Group", id))?;
    tracing::info!(group_id = %id, professor_id = %professor.id, "Group activated");
    Ok(Json(one_response(&state, group).await?))
}

