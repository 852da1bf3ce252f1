//! Shared SQL building blocks for the repositories.

use sqlx::{Postgres, QueryBuilder};
use travlr_core::AppError;
use travlr_core::pagination::{CursorPredicate, SortDirection, Window};

/// Append the cursor predicate, ordering and `LIMIT` for `window`.
///
/// `qb` must already end inside a `WHERE` clause (`... WHERE TRUE` works).
pub(crate) fn push_window(qb: &mut QueryBuilder<'_, Postgres>, window: &Window) {
    let column = window.sort.field.column();

    match window.predicate {
        Some(CursorPredicate::After(cursor)) => {
            qb.push(format_args!(" AND {column} > "))
                .push_bind(cursor.value());
        }
        Some(CursorPredicate::Before(cursor)) => {
            qb.push(format_args!(" AND {column} < "))
                .push_bind(cursor.value());
        }
        None => {}
    }

    let direction = match window.sort.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    qb.push(format_args!(" ORDER BY {column} {direction} LIMIT "))
        .push_bind(window.fetch_limit as i64);
}

/// Append a full-text condition against the table's generated `search` column.
pub(crate) fn push_search(qb: &mut QueryBuilder<'_, Postgres>, search: Option<&str>) {
    if let Some(query) = search.map(str::trim).filter(|q| !q.is_empty()) {
        qb.push(" AND search @@ plainto_tsquery('english', ")
            .push_bind(query.to_string())
            .push(")");
    }
}

/// Map a sqlx error onto the application error space.
///
/// Unique violations become `Conflict` naming the offending field, foreign
/// key violations become `BadRequest`; everything else is a database error.
pub(crate) fn db_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some("23505") => {
                return AppError::Conflict {
                    field: conflict_field(db.table(), db.constraint()),
                };
            }
            Some("23503") => {
                return AppError::BadRequest("Referenced record does not exist".into());
            }
            Some("23514") => {
                return AppError::BadRequest(format!(
                    "Value violates constraint {}",
                    db.constraint().unwrap_or("check")
                ));
            }
            _ => {}
        }
    }
    AppError::DatabaseError(err.to_string())
}

/// Field name from a `<table>_<field>_key` unique constraint.
fn conflict_field(table: Option<&str>, constraint: Option<&str>) -> String {
    let Some(constraint) = constraint else {
        return "value".into();
    };
    let stripped = match table {
        Some(table) => constraint
            .strip_prefix(table)
            .and_then(|rest| rest.strip_prefix('_')),
        None => None,
    };
    stripped
        .and_then(|rest| rest.strip_suffix("_key"))
        .unwrap_or(constraint)
        .to_string()
}
