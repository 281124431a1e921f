//! Translation of a `Predicate` tree into a SQLite `WHERE` fragment.

use sqlx::{QueryBuilder, Sqlite};

use super::filter::Predicate;

/// Append `predicate` to `builder` as a parenthesized boolean expression.
/// Every value is bound, never inlined.
pub fn push_predicate(builder: &mut QueryBuilder<'_, Sqlite>, predicate: &Predicate) {
    match predicate {
        Predicate::True => {
            builder.push("1 = 1");
        }
        Predicate::Equals {
            field,
            value,
            ignore_case,
        } => {
            if *ignore_case {
                builder.push(format!("LOWER(COALESCE({}, '')) = LOWER(", field.column()));
                builder.push_bind(value.clone());
                builder.push(")");
            } else {
                builder.push(format!("COALESCE({}, '') = ", field.column()));
                builder.push_bind(value.clone());
            }
        }
        Predicate::Contains { field, needle } => {
            builder.push(format!("COALESCE({}, '') LIKE ", field.column()));
            builder.push_bind(format!("%{}%", escape_like(needle)));
            builder.push(" ESCAPE '\\'");
        }
        Predicate::Range { field, min, max } => {
            builder.push(format!("({} IS NOT NULL", field.column()));
            if let Some(min) = min {
                builder.push(format!(" AND {} >= ", field.column()));
                builder.push_bind(*min);
            }
            if let Some(max) = max {
                builder.push(format!(" AND {} <= ", field.column()));
                builder.push_bind(*max);
            }
            builder.push(")");
        }
        Predicate::And(parts) => push_joined(builder, parts, " AND ", "1 = 1"),
        Predicate::Or(parts) => push_joined(builder, parts, " OR ", "1 = 0"),
        Predicate::Not(inner) => {
            builder.push("NOT (");
            push_predicate(builder, inner);
            builder.push(")");
        }
    }
}

fn push_joined(
    builder: &mut QueryBuilder<'_, Sqlite>,
    parts: &[Predicate],
    separator: &str,
    empty: &str,
) {
    if parts.is_empty() {
        builder.push(empty);
        return;
    }
    builder.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            builder.push(separator);
        }
        builder.push("(");
        push_predicate(builder, part);
        builder.push(")");
    }
    builder.push(")");
}

/// Escape `LIKE` wildcards with a backslash.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
#[path = "tests/sql_tests.rs"]
mod tests;
