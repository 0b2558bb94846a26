//! Change requests: staff-proposed edits to an attendance record awaiting approval.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::attendance::{AttendanceDay, AttendanceFlags};
use crate::models::rest::RestInterval;
use crate::services::change_request::{Completion, FieldChange};
use crate::types::{AttendanceId, ChangeRequestId, StaffId};
use crate::validation::rules::validate_comment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChangeRequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl ChangeRequestStatus {
    pub fn db_value(&self) -> &'static str {
        match self {
            ChangeRequestStatus::Pending => "pending",
            ChangeRequestStatus::Approved => "approved",
            ChangeRequestStatus::Rejected => "rejected",
            ChangeRequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "pending" => Some(ChangeRequestStatus::Pending),
            "approved" => Some(ChangeRequestStatus::Approved),
            "rejected" => Some(ChangeRequestStatus::Rejected),
            "cancelled" => Some(ChangeRequestStatus::Cancelled),
            _ => None,
        }
    }
}

/// Proposed replacements for the fields of an attendance record.
///
/// Only fields that are `Some` are part of the proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChangeSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rests: Option<Vec<RestInterval>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub go_directly: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_directly: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_holiday: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_holiday: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deemed_holiday: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitute_holiday_date: Option<NaiveDate>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self == &ChangeSet::default()
    }

    /// Returns the snapshot that results from applying this change set to `before`.
    pub fn apply_to(&self, before: &AttendanceSnapshot) -> AttendanceSnapshot {
        let flags = AttendanceFlags {
            go_directly: self.go_directly.unwrap_or(before.flags.go_directly),
            return_directly: self.return_directly.unwrap_or(before.flags.return_directly),
            absent: self.absent.unwrap_or(before.flags.absent),
            paid_holiday: self.paid_holiday.unwrap_or(before.flags.paid_holiday),
            special_holiday: self.special_holiday.unwrap_or(before.flags.special_holiday),
            deemed_holiday: self.deemed_holiday.unwrap_or(before.flags.deemed_holiday),
        };
        AttendanceSnapshot {
            start_time: self.start_time.or(before.start_time),
            end_time: self.end_time.or(before.end_time),
            rests: self.rests.clone().unwrap_or_else(|| before.rests.clone()),
            flags,
            remarks: self.remarks.clone().or_else(|| before.remarks.clone()),
            substitute_holiday_date: self
                .substitute_holiday_date
                .or(before.substitute_holiday_date),
        }
    }
}

/// The editable state of an attendance record at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceSnapshot {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub rests: Vec<RestInterval>,
    pub flags: AttendanceFlags,
    pub remarks: Option<String>,
    pub substitute_holiday_date: Option<NaiveDate>,
}

impl From<&AttendanceDay> for AttendanceSnapshot {
    fn from(day: &AttendanceDay) -> Self {
        AttendanceSnapshot {
            start_time: day.attendance.start_time,
            end_time: day.attendance.end_time,
            rests: day
                .rest_intervals()
                .into_iter()
                .filter(|rest| !rest.is_empty())
                .collect(),
            flags: day.attendance.flags(),
            remarks: day.attendance.remarks.clone(),
            substitute_holiday_date: day.attendance.substitute_holiday_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChangeRequest {
    pub id: ChangeRequestId,
    pub attendance_id: AttendanceId,
    pub staff_id: StaffId,
    pub work_date: NaiveDate,
    pub proposed_json: Value,
    pub comment: String,
    pub completed: bool,
    pub status: ChangeRequestStatus,
    pub decision_comment: Option<String>,
    pub decided_by: Option<StaffId>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChangeRequest {
    pub fn proposed(&self) -> Result<ChangeSet, serde_json::Error> {
        serde_json::from_value(self.proposed_json.clone())
    }

    pub fn is_pending(&self) -> bool {
        self.status == ChangeRequestStatus::Pending
    }

    pub fn to_response(&self) -> Result<ChangeRequestResponse, serde_json::Error> {
        Ok(ChangeRequestResponse {
            id: self.id,
            attendance_id: self.attendance_id,
            staff_id: self.staff_id,
            work_date: self.work_date,
            proposed: self.proposed()?,
            comment: self.comment.clone(),
            completed: self.completed,
            status: self.status,
            decision_comment: self.decision_comment.clone(),
            decided_by: self.decided_by,
            decided_at: self.decided_at,
            created_at: self.created_at,
        })
    }
}

impl Completion for ChangeRequest {
    fn is_completed(&self) -> bool {
        self.completed
    }
}

impl Completion for ChangeRequestResponse {
    fn is_completed(&self) -> bool {
        self.completed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateChangeRequest {
    pub work_date: NaiveDate,
    pub proposed: ChangeSet,
    #[validate(custom(function = "validate_comment"))]
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DecisionPayload {
    #[validate(length(max = 500, code = "comment_length"))]
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChangeRequestResponse {
    pub id: ChangeRequestId,
    pub attendance_id: AttendanceId,
    pub staff_id: StaffId,
    pub work_date: NaiveDate,
    pub proposed: ChangeSet,
    pub comment: String,
    pub completed: bool,
    pub status: ChangeRequestStatus,
    pub decision_comment: Option<String>,
    pub decided_by: Option<StaffId>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChangeRequestListResponse {
    pub unapproved_count: usize,
    pub first_unapproved_id: Option<ChangeRequestId>,
    pub items: Vec<ChangeRequestResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChangeRequestDetailResponse {
    pub request: ChangeRequestResponse,
    pub before: AttendanceSnapshot,
    pub after: AttendanceSnapshot,
    pub changes: Vec<FieldChange>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ChangeRequestListQuery {
    pub status: Option<String>,
    pub staff_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_change_set_is_detected() {
        assert!(ChangeSet::default().is_empty());
        let set = ChangeSet {
            absent: Some(false),
            ..ChangeSet::default()
        };
        assert!(!set.is_empty());
    }

    #[test]
    fn change_set_deserializes_sparse_json() {
        let set: ChangeSet = serde_json::from_value(serde_json::json!({
            "end_time": "2024-05-01T09:30:00Z",
            "paid_holiday": true
        }))
        .unwrap();
        assert_eq!(
            set.end_time,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap())
        );
        assert_eq!(set.paid_holiday, Some(true));
        assert!(set.start_time.is_none());
        assert!(set.rests.is_none());
    }

    #[test]
    fn apply_to_keeps_untouched_fields() {
        let before = AttendanceSnapshot {
            start_time: Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
            end_time: None,
            rests: vec![],
            flags: AttendanceFlags {
                go_directly: true,
                ..AttendanceFlags::default()
            },
            remarks: Some("train delay".into()),
            substitute_holiday_date: None,
        };
        let set = ChangeSet {
            end_time: Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()),
            ..ChangeSet::default()
        };
        let after = set.apply_to(&before);
        assert_eq!(after.start_time, before.start_time);
        assert_eq!(after.end_time, set.end_time);
        assert!(after.flags.go_directly);
        assert_eq!(after.remarks.as_deref(), Some("train delay"));
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(
            ChangeRequestStatus::parse("Pending"),
            Some(ChangeRequestStatus::Pending)
        );
        assert_eq!(ChangeRequestStatus::parse("done"), None);
    }
}
