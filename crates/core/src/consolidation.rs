//! Project/group selection and consolidation rules.
//!
//! A project is selected by groups through project-group rows. The number of
//! selections is capped by the discipline's group capacity, and a project is
//! *consolidated* once exactly one group has been finally accepted. While
//! consolidated, no group may be attached or removed.
//!
//! [`plan_manage_groups`] evaluates one management request against the
//! current project state and returns the changes to apply, so the repository
//! layer can execute them inside a single transaction.

use crate::error::CoreError;
use crate::types::DbId;

/// Exact number of selections a project needs to be consolidated.
pub const CONSOLIDATION_GROUPS: usize = 1;

pub const MSG_PROJECT_INACTIVE: &str = "Um projeto deve estar ativo para ser gerenciado.";
pub const MSG_DEACTIVATE_VIA_DELETE: &str = "Para desativar um projeto utilize a remoção.";
pub const MSG_GROUP_INACTIVE: &str = "O grupo precisa estar ativo para ser vinculado a um projeto.";
pub const MSG_GROUP_ALREADY_LINKED: &str = "O grupo já está no projeto.";
pub const MSG_CAPACITY_REACHED: &str = "Não é possível adicionar mais grupos ao projeto";
pub const MSG_GROUP_WRONG_DISCIPLINE: &str = "O grupo não pertence à disciplina do projeto.";
pub const MSG_CONSOLIDATED_ATTACH: &str = "Torne o projeto não consolidado para vincular grupos.";
pub const MSG_CONSOLIDATED_DETACH: &str = "Torne o projeto não consolidado para remover grupos.";
pub const MSG_CONSOLIDATE_WITHOUT_GROUP: &str =
    "Não é possível consolidar projetos sem um grupo associado.";
pub const MSG_CONSOLIDATE_TOO_MANY: &str =
    "Não é possível consolidar projetos com mais de um grupo associado.";

/// Current selection state of a project.
#[derive(Debug, Clone)]
pub struct ProjectSelection {
    pub is_active: bool,
    pub is_consolidated: bool,
    pub discipline_id: DbId,
    /// Discipline's `quantidade_grupos`.
    pub capacity: i32,
    /// Groups currently attached, in selection order.
    pub attached: Vec<DbId>,
}

/// What the caller knows about a group it wants to attach.
#[derive(Debug, Clone, Copy)]
pub struct CandidateGroup {
    pub id: DbId,
    pub is_active: bool,
    pub discipline_id: DbId,
}

/// Check whether `group` may be attached to the project.
///
/// The capacity check runs before the consolidation check, so a full
/// consolidated project reports that it has no room left.
pub fn check_attach(project: &ProjectSelection, group: &CandidateGroup) -> Result<(), CoreError> {
    if !group.is_active {
        return Err(CoreError::validation("grupo", MSG_GROUP_INACTIVE));
    }
    if project.attached.contains(&group.id) {
        return Err(CoreError::validation("grupo", MSG_GROUP_ALREADY_LINKED));
    }
    let capacity = usize::try_from(project.capacity).unwrap_or(0);
    if project.attached.len() >= capacity {
        return Err(CoreError::validation("grupo", MSG_CAPACITY_REACHED));
    }
    if group.discipline_id != project.discipline_id {
        return Err(CoreError::validation("grupo", MSG_GROUP_WRONG_DISCIPLINE));
    }
    if project.is_consolidated {
        return Err(CoreError::validation("grupo", MSG_CONSOLIDATED_ATTACH));
    }
    Ok(())
}

/// Check whether the project may be consolidated with `selected` groups.
pub fn check_consolidate(is_active: bool, selected: usize) -> Result<(), CoreError> {
    if !is_active {
        return Err(CoreError::validation("ativo", MSG_PROJECT_INACTIVE));
    }
    if selected < CONSOLIDATION_GROUPS {
        return Err(CoreError::validation(
            "consolidado",
            MSG_CONSOLIDATE_WITHOUT_GROUP,
        ));
    }
    if selected > CONSOLIDATION_GROUPS {
        return Err(CoreError::validation("consolidado", MSG_CONSOLIDATE_TOO_MANY));
    }
    Ok(())
}

/// Groups may only be removed from a project that is not consolidated.
pub fn check_detach(is_consolidated: bool) -> Result<(), CoreError> {
    if is_consolidated {
        return Err(CoreError::validation(
            "grupos_removidos",
            MSG_CONSOLIDATED_DETACH,
        ));
    }
    Ok(())
}

/// A management request (`PATCH /projetos/{id}/gerenciar-grupos/`).
#[derive(Debug, Clone, Default)]
pub struct ManageGroups {
    /// `ativo`: only `true` (reactivation) is accepted here.
    pub active: Option<bool>,
    /// `grupo`: group to attach.
    pub attach: Option<CandidateGroup>,
    /// `grupos_removidos`: groups to detach.
    pub detach: Vec<DbId>,
    /// `consolidado`: `true` consolidates, `false` reverts consolidation.
    pub consolidated: Option<bool>,
    /// `disponivel`.
    pub available: Option<bool>,
}

/// Changes to apply, in order: reactivate, detach, attach, flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagePlan {
    pub reactivate: bool,
    pub detach: Vec<DbId>,
    pub attach: Option<DbId>,
    pub consolidated: Option<bool>,
    pub available: Option<bool>,
    /// Selection count once every step has been applied.
    pub resulting_count: usize,
}

/// Evaluate a management request against the current selection state.
///
/// Steps are evaluated in the order unconsolidate → detach → attach →
/// consolidate, each against the state left by the previous step.
pub fn plan_manage_groups(
    project: &ProjectSelection,
    request: &ManageGroups,
) -> Result<ManagePlan, CoreError> {
    let mut plan = ManagePlan::default();

    match request.active {
        Some(false) => return Err(CoreError::validation("ativo", MSG_DEACTIVATE_VIA_DELETE)),
        Some(true) if !project.is_active => plan.reactivate = true,
        _ => {}
    }
    if !project.is_active && !plan.reactivate {
        return Err(CoreError::validation("ativo", MSG_PROJECT_INACTIVE));
    }

    let mut state = project.clone();
    state.is_active = true;

    if request.consolidated == Some(false) && state.is_consolidated {
        state.is_consolidated = false;
        plan.consolidated = Some(false);
    }

    if !request.detach.is_empty() {
        check_detach(state.is_consolidated)?;
        let removed: Vec<DbId> = request
            .detach
            .iter()
            .copied()
            .filter(|id| state.attached.contains(id))
            .collect();
        state.attached.retain(|id| !removed.contains(id));
        plan.detach = removed;
    }

    if let Some(group) = &request.attach {
        check_attach(&state, group)?;
        state.attached.push(group.id);
        plan.attach = Some(group.id);
    }

    if request.consolidated == Some(true) {
        check_consolidate(state.is_active, state.attached.len())?;
        if !state.is_consolidated {
            state.is_consolidated = true;
            plan.consolidated = Some(true);
        }
    }

    plan.available = request.available;
    plan.resulting_count = state.attached.len();
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn project(capacity: i32) -> ProjectSelection {
        ProjectSelection {
            is_active: true,
            is_consolidated: false,
            discipline_id: DbId::new_v4(),
            capacity,
            attached: Vec::new(),
        }
    }

    fn group_for(project: &ProjectSelection) -> CandidateGroup {
        CandidateGroup {
            id: DbId::new_v4(),
            is_active: true,
            discipline_id: project.discipline_id,
        }
    }

    fn first_message(err: CoreError) -> String {
        match err {
            CoreError::Validation(e) => e.first_message().unwrap_or_default().to_string(),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn inactive_group_cannot_be_attached() {
        let p = project(2);
        let mut g = group_for(&p);
        g.is_active = false;
        assert_eq!(first_message(check_attach(&p, &g).unwrap_err()), MSG_GROUP_INACTIVE);
    }

    #[test]
    fn duplicate_attach_is_rejected() {
        let mut p = project(2);
        let g = group_for(&p);
        p.attached.push(g.id);
        assert_eq!(
            first_message(check_attach(&p, &g).unwrap_err()),
            MSG_GROUP_ALREADY_LINKED
        );
    }

    #[test]
    fn attach_beyond_capacity_is_rejected() {
        let mut p = project(1);
        p.attached.push(DbId::new_v4());
        let g = group_for(&p);
        assert_eq!(
            first_message(check_attach(&p, &g).unwrap_err()),
            MSG_CAPACITY_REACHED
        );
    }

    #[test]
    fn attach_to_consolidated_project_always_fails() {
        let mut p = project(5);
        p.is_consolidated = true;
        let g = group_for(&p);
        assert_eq!(
            first_message(check_attach(&p, &g).unwrap_err()),
            MSG_CONSOLIDATED_ATTACH
        );
    }

    #[test]
    fn attach_from_other_discipline_is_rejected() {
        let p = project(2);
        let g = CandidateGroup {
            id: DbId::new_v4(),
            is_active: true,
            discipline_id: DbId::new_v4(),
        };
        assert_eq!(
            first_message(check_attach(&p, &g).unwrap_err()),
            MSG_GROUP_WRONG_DISCIPLINE
        );
    }

    #[test]
    fn consolidate_requires_exactly_one_group() {
        assert_eq!(
            first_message(check_consolidate(true, 0).unwrap_err()),
            MSG_CONSOLIDATE_WITHOUT_GROUP
        );
        assert_eq!(
            first_message(check_consolidate(true, 2).unwrap_err()),
            MSG_CONSOLIDATE_TOO_MANY
        );
        assert!(check_consolidate(true, 1).is_ok());
    }

    #[test]
    fn consolidate_requires_active_project() {
        assert_eq!(
            first_message(check_consolidate(false, 1).unwrap_err()),
            MSG_PROJECT_INACTIVE
        );
    }

    #[test]
    fn attach_then_consolidate_in_one_request() {
        let p = project(1);
        let g = group_for(&p);
        let plan = plan_manage_groups(
            &p,
            &ManageGroups {
                attach: Some(g),
                consolidated: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(plan.attach, Some(g.id));
        assert_eq!(plan.consolidated, Some(true));
        assert_eq!(plan.resulting_count, 1);
    }

    #[test]
    fn attach_does_not_consolidate_by_itself() {
        let p = project(3);
        let g = group_for(&p);
        let plan = plan_manage_groups(
            &p,
            &ManageGroups {
                attach: Some(g),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(plan.consolidated, None);
    }

    #[test]
    fn capacity_one_rejects_second_group() {
        let mut p = project(1);
        let first = group_for(&p);
        p.attached.push(first.id);
        let second = group_for(&p);
        let err = plan_manage_groups(
            &p,
            &ManageGroups {
                attach: Some(second),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(first_message(err), MSG_CAPACITY_REACHED);
    }

    #[test]
    fn inactive_project_cannot_be_managed() {
        let mut p = project(1);
        p.is_active = false;
        let err = plan_manage_groups(&p, &ManageGroups::default()).unwrap_err();
        assert_eq!(first_message(err), MSG_PROJECT_INACTIVE);
    }

    #[test]
    fn inactive_project_can_be_reactivated() {
        let mut p = project(1);
        p.is_active = false;
        let plan = plan_manage_groups(
            &p,
            &ManageGroups {
                active: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(plan.reactivate);
    }

    #[test]
    fn deactivation_is_not_a_management_step() {
        let err = plan_manage_groups(
            &project(1),
            &ManageGroups {
                active: Some(false),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(first_message(err), MSG_DEACTIVATE_VIA_DELETE);
    }

    #[test]
    fn detach_blocked_while_consolidated() {
        let mut p = project(1);
        let g = DbId::new_v4();
        p.attached.push(g);
        p.is_consolidated = true;
        let err = plan_manage_groups(
            &p,
            &ManageGroups {
                detach: vec![g],
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(first_message(err), MSG_CONSOLIDATED_DETACH);
    }

    #[test]
    fn unconsolidate_then_detach() {
        let mut p = project(1);
        let g = DbId::new_v4();
        p.attached.push(g);
        p.is_consolidated = true;
        let plan = plan_manage_groups(
            &p,
            &ManageGroups {
                detach: vec![g, DbId::new_v4()],
                consolidated: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(plan.consolidated, Some(false));
        assert_eq!(plan.detach, vec![g]);
        assert_eq!(plan.resulting_count, 0);
    }

    #[test]
    fn detach_frees_capacity_for_attach() {
        let mut p = project(1);
        let old = DbId::new_v4();
        p.attached.push(old);
        let new = group_for(&p);
        let plan = plan_manage_groups(
            &p,
            &ManageGroups {
                detach: vec![old],
                attach: Some(new),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(plan.attach, Some(new.id));
        assert_eq!(plan.resulting_count, 1);
    }

    #[test]
    fn consolidating_twice_is_idempotent() {
        let mut p = project(1);
        p.attached.push(DbId::new_v4());
        p.is_consolidated = true;
        let plan = plan_manage_groups(
            &p,
            &ManageGroups {
                consolidated: Some(true),
                available: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(plan.consolidated, None);
        assert_eq!(plan.available, Some(false));
    }

    #[test]
    fn consolidate_with_two_groups_fails() {
        let mut p = project(3);
        p.attached.push(DbId::new_v4());
        p.attached.push(DbId::new_v4());
        let result = plan_manage_groups(
            &p,
            &ManageGroups {
                consolidated: Some(true),
                ..Default::default()
            },
        );
        assert_matches!(result, Err(CoreError::Validation(_)));
    }
}
