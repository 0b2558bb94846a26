use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::rest::{Rest, RestInterval, RestResponse};
use crate::services::attendance_status::AttendanceStatus;
use crate::types::{AttendanceId, StaffId};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attendance {
    pub id: AttendanceId,
    pub staff_id: StaffId,
    pub work_date: NaiveDate,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub go_directly_flag: bool,
    pub return_directly_flag: bool,
    pub absent_flag: bool,
    pub paid_holiday_flag: bool,
    pub special_holiday_flag: bool,
    pub deemed_holiday_flag: bool,
    pub remarks: Option<String>,
    pub substitute_holiday_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Attendance {
    pub fn new(staff_id: StaffId, work_date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            id: AttendanceId::new(),
            staff_id,
            work_date,
            start_time: None,
            end_time: None,
            go_directly_flag: false,
            return_directly_flag: false,
            absent_flag: false,
            paid_holiday_flag: false,
            special_holiday_flag: false,
            deemed_holiday_flag: false,
            remarks: None,
            substitute_holiday_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_clocked_in(&self) -> bool {
        self.start_time.is_some() && self.end_time.is_none()
    }

    pub fn is_clocked_out(&self) -> bool {
        self.end_time.is_some()
    }

    pub fn flags(&self) -> AttendanceFlags {
        AttendanceFlags {
            go_directly: self.go_directly_flag,
            return_directly: self.return_directly_flag,
            absent: self.absent_flag,
            paid_holiday: self.paid_holiday_flag,
            special_holiday: self.special_holiday_flag,
            deemed_holiday: self.deemed_holiday_flag,
        }
    }

    pub fn set_flags(&mut self, flags: AttendanceFlags) {
        self.go_directly_flag = flags.go_directly;
        self.return_directly_flag = flags.return_directly;
        self.absent_flag = flags.absent;
        self.paid_holiday_flag = flags.paid_holiday;
        self.special_holiday_flag = flags.special_holiday;
        self.deemed_holiday_flag = flags.deemed_holiday;
    }
}

/// Boolean markers an attendance day can carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceFlags {
    #[serde(default)]
    pub go_directly: bool,
    #[serde(default)]
    pub return_directly: bool,
    #[serde(default)]
    pub absent: bool,
    #[serde(default)]
    pub paid_holiday: bool,
    #[serde(default)]
    pub special_holiday: bool,
    #[serde(default)]
    pub deemed_holiday: bool,
}

/// An attendance record together with the rests it owns.
#[derive(Debug, Clone)]
pub struct AttendanceDay {
    pub attendance: Attendance,
    pub rests: Vec<Rest>,
}

impl AttendanceDay {
    pub fn new(attendance: Attendance, mut rests: Vec<Rest>) -> Self {
        rests.sort_by_key(|rest| rest.position);
        Self { attendance, rests }
    }

    pub fn rest_intervals(&self) -> Vec<RestInterval> {
        self.rests.iter().map(Rest::interval).collect()
    }

    pub fn open_rest(&self) -> Option<&Rest> {
        self.rests.iter().find(|rest| rest.interval().is_open())
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ClockInRequest {
    pub work_date: Option<NaiveDate>,
    #[serde(default)]
    pub go_directly: bool,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ClockOutRequest {
    pub work_date: Option<NaiveDate>,
    #[serde(default)]
    pub return_directly: bool,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct RestRequest {
    pub work_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttendanceResponse {
    pub id: AttendanceId,
    pub staff_id: StaffId,
    pub work_date: NaiveDate,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub flags: AttendanceFlags,
    pub remarks: Option<String>,
    pub substitute_holiday_date: Option<NaiveDate>,
    pub rests: Vec<RestResponse>,
}

impl From<AttendanceDay> for AttendanceResponse {
    fn from(day: AttendanceDay) -> Self {
        let flags = day.attendance.flags();
        let attendance = day.attendance;
        AttendanceResponse {
            id: attendance.id,
            staff_id: attendance.staff_id,
            work_date: attendance.work_date,
            start_time: attendance.start_time,
            end_time: attendance.end_time,
            flags,
            remarks: attendance.remarks,
            substitute_holiday_date: attendance.substitute_holiday_date,
            rests: day.rests.into_iter().map(RestResponse::from).collect(),
        }
    }
}

/// One calendar date of an attendance listing with its derived values.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttendanceDayView {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub attendance: Option<AttendanceResponse>,
    pub holiday_name: Option<String>,
    pub company_holiday_name: Option<String>,
    pub rest_minutes: i64,
    pub work_minutes: Option<i64>,
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttendanceSummary {
    pub year: i32,
    pub month: u32,
    pub work_days: i64,
    pub total_work_minutes: i64,
    pub total_rest_minutes: i64,
    pub overtime_minutes: i64,
    /// Overtime rendered as `H:MM`.
    pub overtime_text: String,
    /// Past business days with no punch.
    pub error_days: i64,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Admin payload that creates or replaces the record of one staff member on one date.
///
/// `rests` is the complete list; stored rests not listed are removed.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpsertAttendance {
    pub staff_id: StaffId,
    pub work_date: NaiveDate,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub flags: AttendanceFlags,
    #[validate(length(max = 500, code = "remarks_length"))]
    pub remarks: Option<String>,
    pub substitute_holiday_date: Option<NaiveDate>,
    #[serde(default)]
    pub rests: Vec<RestInterval>,
}

impl UpsertAttendance {
    /// The record this payload describes, keeping identity and creation time of `existing`.
    pub fn to_attendance(&self, existing: Option<&Attendance>, now: DateTime<Utc>) -> Attendance {
        let mut attendance = match existing {
            Some(existing) => existing.clone(),
            None => Attendance::new(self.staff_id, self.work_date, now),
        };
        attendance.start_time = self.start_time;
        attendance.end_time = self.end_time;
        attendance.set_flags(self.flags);
        attendance.remarks = self
            .remarks
            .as_deref()
            .map(str::trim)
            .filter(|remarks| !remarks.is_empty())
            .map(str::to_string);
        attendance.substitute_holiday_date = self.substitute_holiday_date;
        attendance.updated_at = now;
        attendance
    }
}

/// An admin listing row: the owning staff member and the derived day view.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminAttendanceRow {
    pub staff_id: StaffId,
    pub username: String,
    pub full_name: String,
    pub day: AttendanceDayView,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AdminAttendanceQuery {
    pub staff_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}
