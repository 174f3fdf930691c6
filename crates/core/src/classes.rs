//! Class (turma) and discipline rules.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// Exact length of a class period code such as `2024.1`.
pub const PERIOD_LEN: usize = 6;

/// Maximum length of a class name.
pub const CLASS_NAME_MAX_LEN: usize = 30;

/// Smallest accepted group capacity for a discipline.
pub const MIN_GROUP_CAPACITY: i32 = 1;

pub const MSG_PERIOD_LENGTH: &str = "O período deve ter 6 caracteres.";
pub const MSG_PERIOD_FORMAT: &str = "Formato do período deve ser dddd.d, ex: 1111.1";
pub const MSG_STUDENTS_REQUIRED: &str =
    "Este campo é obrigatório. Deve ser informado pelo menos 1 aluno.";
pub const MSG_DISCIPLINE_NOT_OWNED: &str = "A disciplina informada não pertence ao professor.";
pub const MSG_GROUP_CAPACITY: &str = "A quantidade de grupos deve ser pelo menos 1.";
pub const MSG_CAPACITY_BELOW_SELECTION: &str =
    "A quantidade de grupos não pode ser menor que a de grupos já vinculados a um projeto da disciplina.";

static PERIOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}\.\d$").expect("valid regex"));

/// Validate a class period code (`dddd.d`).
pub fn validate_period(period: &str) -> Result<(), String> {
    if period.chars().count() != PERIOD_LEN {
        return Err(MSG_PERIOD_LENGTH.to_string());
    }
    if !PERIOD_RE.is_match(period) {
        return Err(MSG_PERIOD_FORMAT.to_string());
    }
    Ok(())
}

/// Validate a discipline's group capacity.
pub fn validate_group_capacity(capacity: i32) -> Result<(), String> {
    if capacity < MIN_GROUP_CAPACITY {
        return Err(MSG_GROUP_CAPACITY.to_string());
    }
    Ok(())
}

/// A discipline's capacity may not drop below the number of groups already
/// selecting its fullest project.
pub fn check_capacity_change(capacity: i32, largest_selection: i64) -> Result<(), CoreError> {
    if i64::from(capacity) < largest_selection {
        return Err(CoreError::validation(
            "quantidade_grupos",
            MSG_CAPACITY_BELOW_SELECTION,
        ));
    }
    Ok(())
}

/// Check the student list of an enroll/unenroll request.
///
/// The list must be non-empty. A student acting on their own behalf may only
/// enroll themselves.
pub fn validate_enrollment_request(role: Role, students: &[DbId]) -> Result<(), CoreError> {
    if students.is_empty() {
        return Err(CoreError::validation("alunos", MSG_STUDENTS_REQUIRED));
    }
    if let Role::Student(own_id) = role {
        if students.iter().any(|id| *id != own_id) {
            return Err(CoreError::Forbidden(
                "Alunos só podem inserir a si mesmos em uma turma.".into(),
            ));
        }
    }
    Ok(())
}

/// A professor may only attach classes and projects to their own disciplines.
pub fn ensure_discipline_owner(
    discipline_professor_id: DbId,
    professor_id: DbId,
) -> Result<(), CoreError> {
    if discipline_professor_id != professor_id {
        return Err(CoreError::validation("disciplina", MSG_DISCIPLINE_NOT_OWNED));
    }
    Ok(())
}
