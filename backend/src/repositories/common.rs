//! Shared repository utilities.

use chrono::NaiveDate;
use sqlx::{Postgres, QueryBuilder};

/// Appends WHERE or AND to the query builder depending on whether a clause has already been added.
pub fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, has_clause: &mut bool) {
    if *has_clause {
        builder.push(" AND ");
    } else {
        builder.push(" WHERE ");
        *has_clause = true;
    }
}

/// Adds inclusive bounds on `column` for whichever ends are present.
pub fn push_date_range(
    builder: &mut QueryBuilder<'_, Postgres>,
    has_clause: &mut bool,
    column: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) {
    if let Some(from) = from {
        push_clause(builder, has_clause);
        builder.push(column).push(" >= ").push_bind(from);
    }
    if let Some(to) = to {
        push_clause(builder, has_clause);
        builder.push(column).push(" <= ").push_bind(to);
    }
}
