//! Dynamic WHERE-clause building shared by the filtered list queries.

use chrono::NaiveDate;
use sgp_core::types::DbId;

/// Typed bind value for dynamically-built queries.
#[derive(Debug, Clone)]
pub(crate) enum BindValue {
    Uuid(DbId),
    Bool(bool),
    Text(String),
    Date(NaiveDate),
}

/// Accumulates `AND`-joined conditions and their bind values.
///
/// Conditions use `{}` as the placeholder for the next bind index, e.g.
/// `push("g.discipline_id = {}", BindValue::Uuid(id))`.
#[derive(Debug, Default)]
pub(crate) struct Conditions {
    clauses: Vec<String>,
    values: Vec<BindValue>,
}

impl Conditions {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a condition with one bind value.
    pub(crate) fn push(&mut self, template: &str, value: BindValue) {
        self.values.push(value);
        let placeholder = format!("${}", self.values.len());
        self.clauses.push(template.replace("{}", &placeholder));
    }

    /// Add a condition with one optional bind value; `None` adds nothing.
    pub(crate) fn push_opt<T>(&mut self, template: &str, value: Option<T>, wrap: fn(T) -> BindValue) {
        if let Some(v) = value {
            self.push(template, wrap(v));
        }
    }

    /// Add a condition without bind values.
    pub(crate) fn push_raw(&mut self, clause: impl Into<String>) {
        self.clauses.push(clause.into());
    }

    /// `WHERE ...` or an empty string.
    pub(crate) fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// Index the next appended bind (e.g. `LIMIT`) should use.
    pub(crate) fn next_index(&self) -> usize {
        self.values.len() + 1
    }

    pub(crate) fn values(&self) -> &[BindValue] {
        &self.values
    }
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
pub(crate) fn bind_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in values {
        match val {
            BindValue::Uuid(v) => q = q.bind(*v),
            BindValue::Bool(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Date(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
pub(crate) fn bind_values_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments>,
    values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments> {
    for val in values {
        match val {
            BindValue::Uuid(v) => q = q.bind(*v),
            BindValue::Bool(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Date(v) => q = q.bind(*v),
        }
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_follow_bind_order() {
        let mut c = Conditions::new();
        c.push_raw("t.is_active");
        c.push("t.a = {}", BindValue::Bool(true));
        c.push_opt("t.b = {}", None::<bool>, BindValue::Bool);
        c.push("t.c ILIKE {}", BindValue::Text("%x%".into()));
        assert_eq!(c.where_clause(), "WHERE t.is_active AND t.a = $1 AND t.c ILIKE $2");
        assert_eq!(c.next_index(), 3);
        assert_eq!(c.values().len(), 2);
    }

    #[test]
    fn no_conditions_means_no_where() {
        assert_eq!(Conditions::new().where_clause(), "");
    }
}
