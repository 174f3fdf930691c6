//! Group formation, membership and eligibility rules.
//!
//! A group is scoped to one discipline, has exactly one leader and any number
//! of additional members. Every rule here is pure: callers load the relevant
//! rows and pass the facts in.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

pub const MSG_NOT_IN_ANY_CLASS: &str = "Você não pode criar um grupo sem estar em uma turma.";
pub const MSG_WRONG_DISCIPLINE: &str =
    "A disciplina da turma que você está é diferente da informada.";
pub const MSG_ALREADY_LEADS: &str = "O aluno já lidera um grupo.";
pub const MSG_ALREADY_MEMBER: &str = "O aluno já participa do grupo.";
pub const MSG_GROUP_UNAVAILABLE: &str = "O grupo não está disponível para novos participantes.";
pub const MSG_IN_CONSOLIDATED_PROJECT: &str =
    "O grupo está vinculado a um projeto consolidado e não pode ser desativado.";

/// Check that `leader` may lead a new group under `discipline_id`.
///
/// `enrolled_disciplines` holds the discipline of every class the student is
/// enrolled in (duplicates allowed).
pub fn check_leader_eligibility(
    enrolled_disciplines: &[DbId],
    discipline_id: DbId,
    already_leads_group: bool,
) -> Result<(), CoreError> {
    if enrolled_disciplines.is_empty() {
        return Err(CoreError::validation("aluno", MSG_NOT_IN_ANY_CLASS));
    }
    if !enrolled_disciplines.contains(&discipline_id) {
        return Err(CoreError::validation("disciplina", MSG_WRONG_DISCIPLINE));
    }
    if already_leads_group {
        return Err(CoreError::validation("aluno", MSG_ALREADY_LEADS));
    }
    Ok(())
}

/// Facts needed to decide whether a student may join an existing group.
#[derive(Debug, Clone, Copy)]
pub struct JoinCheck<'a> {
    pub student_id: DbId,
    pub leader_id: DbId,
    pub group_discipline_id: DbId,
    pub group_available: bool,
    pub enrolled_disciplines: &'a [DbId],
    pub already_member: bool,
}

/// Check that a student may join a group as an additional member.
pub fn check_join(check: JoinCheck<'_>) -> Result<(), CoreError> {
    if check.student_id == check.leader_id || check.already_member {
        return Err(CoreError::validation("aluno", MSG_ALREADY_MEMBER));
    }
    if !check.group_available {
        return Err(CoreError::rule(MSG_GROUP_UNAVAILABLE));
    }
    if check.enrolled_disciplines.is_empty() {
        return Err(CoreError::validation("aluno", MSG_NOT_IN_ANY_CLASS));
    }
    if !check.enrolled_disciplines.contains(&check.group_discipline_id) {
        return Err(CoreError::validation("disciplina", MSG_WRONG_DISCIPLINE));
    }
    Ok(())
}

/// A group attached to a consolidated project cannot be deactivated.
pub fn check_deactivate(in_consolidated_project: bool) -> Result<(), CoreError> {
    if in_consolidated_project {
        return Err(CoreError::rule(MSG_IN_CONSOLIDATED_PROJECT));
    }
    Ok(())
}

/// One entry of a group's participant list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    #[serde(rename = "codigo")]
    pub student_id: DbId,
    #[serde(rename = "matricula")]
    pub registration_number: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "lider")]
    pub is_leader: bool,
}

/// Build the participant list: the leader first, then members in the given
/// order. A member entry equal to the leader is skipped.
pub fn participants(
    leader: (DbId, String, String),
    members: impl IntoIterator<Item = (DbId, String, String)>,
) -> Vec<Participant> {
    let (leader_id, leader_number, leader_name) = leader;
    let mut out = vec![Participant {
        student_id: leader_id,
        registration_number: leader_number,
        name: leader_name,
        is_leader: true,
    }];
    out.extend(
        members
            .into_iter()
            .filter(|(id, _, _)| *id != leader_id)
            .map(|(id, number, name)| Participant {
                student_id: id,
                registration_number: number,
                name,
                is_leader: false,
            }),
    );
    out
}
