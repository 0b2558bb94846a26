//! Counting open change requests and describing what a request would change.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::change_request::{AttendanceSnapshot, ChangeSet};
use crate::models::rest::RestInterval;

/// Anything that carries a completion marker.
pub trait Completion {
    fn is_completed(&self) -> bool;
}

impl<T: Completion + ?Sized> Completion for &T {
    fn is_completed(&self) -> bool {
        (**self).is_completed()
    }
}

/// Number of present entries that are not completed.
pub fn unapproved_count<T: Completion>(requests: &[Option<T>]) -> usize {
    requests
        .iter()
        .flatten()
        .filter(|request| !request.is_completed())
        .count()
}

/// The first present entry, in list order, that is not completed.
pub fn first_unapproved<T: Completion>(requests: &[Option<T>]) -> Option<&T> {
    requests
        .iter()
        .flatten()
        .find(|request| !request.is_completed())
}

/// One row of a before/after comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldChange {
    pub field: String,
    pub before: String,
    pub after: String,
}

fn timestamp_text(value: Option<DateTime<Utc>>) -> String {
    value.map(|v| v.to_rfc3339()).unwrap_or_default()
}

fn date_text(value: Option<NaiveDate>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn rests_text(rests: &[RestInterval]) -> String {
    rests
        .iter()
        .filter(|rest| !rest.is_empty())
        .map(|rest| {
            format!(
                "{}-{}",
                timestamp_text(rest.start_time),
                timestamp_text(rest.end_time)
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Lists the fields `proposed` would change on `before`.
///
/// A proposed value equal to the current one is not a change.
pub fn diff_change_set(before: &AttendanceSnapshot, proposed: &ChangeSet) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    let mut push = |field: &str, old: String, new: String| {
        if old != new {
            changes.push(FieldChange {
                field: field.to_string(),
                before: old,
                after: new,
            });
        }
    };

    if let Some(start) = proposed.start_time {
        push(
            "start_time",
            timestamp_text(before.start_time),
            timestamp_text(Some(start)),
        );
    }
    if let Some(end) = proposed.end_time {
        push(
            "end_time",
            timestamp_text(before.end_time),
            timestamp_text(Some(end)),
        );
    }
    if let Some(rests) = &proposed.rests {
        push("rests", rests_text(&before.rests), rests_text(rests));
    }

    let flags = [
        ("go_directly", proposed.go_directly, before.flags.go_directly),
        (
            "return_directly",
            proposed.return_directly,
            before.flags.return_directly,
        ),
        ("absent", proposed.absent, before.flags.absent),
        ("paid_holiday", proposed.paid_holiday, before.flags.paid_holiday),
        (
            "special_holiday",
            proposed.special_holiday,
            before.flags.special_holiday,
        ),
        (
            "deemed_holiday",
            proposed.deemed_holiday,
            before.flags.deemed_holiday,
        ),
    ];
    for (field, next, current) in flags {
        if let Some(next) = next {
            push(field, current.to_string(), next.to_string());
        }
    }

    if let Some(remarks) = &proposed.remarks {
        push(
            "remarks",
            before.remarks.clone().unwrap_or_default(),
            remarks.clone(),
        );
    }
    if let Some(date) = proposed.substitute_holiday_date {
        push(
            "substitute_holiday_date",
            date_text(before.substitute_holiday_date),
            date_text(Some(date)),
        );
    }

    changes
}
