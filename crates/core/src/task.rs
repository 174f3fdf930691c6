//! Task status values, deadline parsing and fan-out planning.
//!
//! A task posted against a project that has been selected by N groups is
//! materialised as N independent task rows, one per selecting group, each
//! linked to its group through a task-group row. Without selections a single
//! unlinked row is created.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

pub const STATUS_PENDING: &str = "pendente";
pub const STATUS_DONE: &str = "concluida";
pub const STATUS_LATE: &str = "atrasada";
pub const STATUS_CANCELLED: &str = "cancelada";

/// Status values a caller may set. `cancelada` is reserved for deletion.
pub const EDITABLE_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_DONE, STATUS_LATE];

/// Input date format (`dd/mm/yyyy`).
pub const DATE_FORMAT: &str = "%d/%m/%Y";
/// Input time format (`HH:MM:SS`).
pub const TIME_FORMAT: &str = "%H:%M:%S";
/// Output format for the combined deadline.
pub const DEADLINE_DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Maximum length of a task name.
pub const TASK_NAME_MAX_LEN: usize = 40;

pub const MSG_INVALID_STATUS: &str = "A situação só pode ser pendente, concluída ou atrasada.";
pub const MSG_INVALID_DATETIME: &str =
    "Formato de data e hora inválido: DATA - dd/mm/aaaa  HORA - hh:mm:ss";
pub const MSG_PROJECT_NOT_OWNED: &str =
    "O projeto não está associado a sua conta. Não é possível criar uma tarefa";
pub const MSG_PROJECT_INVALID: &str = "Projeto inválido ou inativo.";

/// Validate a caller-supplied status.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if EDITABLE_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::validation("situacao", MSG_INVALID_STATUS))
    }
}

/// Parse a `dd/mm/yyyy` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| CoreError::rule(MSG_INVALID_DATETIME))
}

/// Parse a `HH:MM:SS` time.
pub fn parse_time(value: &str) -> Result<NaiveTime, CoreError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| CoreError::rule(MSG_INVALID_DATETIME))
}

/// Combine the separate date and time inputs into a deadline.
pub fn parse_deadline(date: &str, time: &str) -> Result<NaiveDateTime, CoreError> {
    Ok(NaiveDateTime::new(parse_date(date)?, parse_time(time)?))
}

/// Format a deadline the way clients submit it.
pub fn format_deadline(deadline: NaiveDateTime) -> String {
    deadline.format(DEADLINE_DISPLAY_FORMAT).to_string()
}

/// A professor may only post tasks on projects they own.
pub fn ensure_task_project_owner(role: Role, project_professor_id: DbId) -> Result<(), CoreError> {
    match role {
        Role::Professor(id) if id != project_professor_id => {
            Err(CoreError::validation("projeto", MSG_PROJECT_NOT_OWNED))
        }
        _ => Ok(()),
    }
}

/// How many task rows a creation produces and which groups they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FanOut {
    /// No group has selected the project: one unlinked row.
    Single,
    /// One row per selecting group, linked through task-group rows.
    PerGroup(Vec<DbId>),
}

impl FanOut {
    /// Number of task rows this plan creates.
    pub fn row_count(&self) -> usize {
        match self {
            FanOut::Single => 1,
            FanOut::PerGroup(groups) => groups.len(),
        }
    }
}

/// Plan the fan-out for a project currently selected by `selected_groups`.
pub fn plan_fan_out(selected_groups: &[DbId]) -> FanOut {
    if selected_groups.is_empty() {
        FanOut::Single
    } else {
        FanOut::PerGroup(selected_groups.to_vec())
    }
}

/// Field changes requested on a task update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub deadline: Option<NaiveDateTime>,
    pub is_active: Option<bool>,
}

/// Resolved update: an optional project move plus the field changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdatePlan {
    /// New project for every active copy sharing `(project, name)`.
    pub move_to_project: Option<DbId>,
    pub changes: TaskChanges,
}

/// Resolve a task update. A `new_project` equal to the current one is not a
/// move.
pub fn plan_task_update(
    current_project: DbId,
    new_project: Option<DbId>,
    changes: TaskChanges,
) -> Result<TaskUpdatePlan, CoreError> {
    if let Some(status) = changes.status.as_deref() {
        validate_status(status)?;
    }
    let move_to_project = new_project.filter(|p| *p != current_project);
    Ok(TaskUpdatePlan {
        move_to_project,
        changes,
    })
}
