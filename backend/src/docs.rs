#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    handlers::{
        admin::ExportQuery,
        attendance::{AttendanceExportQuery, ExportResponse, StatusQuery, SummaryQuery},
        holidays::{HolidayCheckQuery, HolidayCheckResponse},
    },
    models::{
        attendance::{
            AdminAttendanceQuery, AdminAttendanceRow, AttendanceDayView, AttendanceFlags,
            AttendanceQuery, AttendanceResponse, AttendanceSummary, ClockInRequest,
            ClockOutRequest, RestRequest, UpsertAttendance,
        },
        change_request::{
            AttendanceSnapshot, ChangeRequestDetailResponse, ChangeRequestListQuery,
            ChangeRequestListResponse, ChangeRequestResponse, ChangeRequestStatus, ChangeSet,
            CreateChangeRequest, DecisionPayload,
        },
        holiday::{CreateHolidayPayload, HolidayResponse, HolidayYearQuery, YearCalendarResponse},
        rest::{RestInterval, RestResponse},
        staff::{
            CreateStaff, LoginRequest, LoginResponse, StaffResponse, StaffRole, UpdateStaff,
            WorkType,
        },
    },
    services::{attendance_status::AttendanceStatus, change_request::FieldChange},
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        login_doc,
        me_doc,
        clock_in_doc,
        clock_out_doc,
        rest_start_doc,
        rest_end_doc,
        attendance_status_doc,
        my_attendance_doc,
        my_attendance_summary_doc,
        export_attendance_doc,
        create_change_request_doc,
        my_change_requests_doc,
        cancel_change_request_doc,
        year_calendar_doc,
        holiday_check_doc,
        admin_list_staff_doc,
        admin_create_staff_doc,
        admin_update_staff_doc,
        admin_list_attendance_doc,
        admin_upsert_attendance_doc,
        admin_list_change_requests_doc,
        admin_change_request_detail_doc,
        admin_approve_change_request_doc,
        admin_reject_change_request_doc,
        admin_list_holiday_calendars_doc,
        admin_create_holiday_calendar_doc,
        admin_update_holiday_calendar_doc,
        admin_delete_holiday_calendar_doc,
        admin_list_company_holiday_calendars_doc,
        admin_create_company_holiday_calendar_doc,
        admin_update_company_holiday_calendar_doc,
        admin_delete_company_holiday_calendar_doc,
        admin_export_doc
    ),
    components(
        schemas(
            // staff
            LoginRequest,
            LoginResponse,
            StaffResponse,
            StaffRole,
            WorkType,
            CreateStaff,
            UpdateStaff,
            // attendance
            ClockInRequest,
            ClockOutRequest,
            RestRequest,
            AttendanceFlags,
            AttendanceResponse,
            AttendanceDayView,
            AttendanceStatus,
            AttendanceSummary,
            AttendanceQuery,
            StatusQuery,
            SummaryQuery,
            AttendanceExportQuery,
            ExportResponse,
            RestInterval,
            RestResponse,
            // change requests
            ChangeSet,
            AttendanceSnapshot,
            CreateChangeRequest,
            DecisionPayload,
            ChangeRequestStatus,
            ChangeRequestResponse,
            ChangeRequestListResponse,
            ChangeRequestDetailResponse,
            ChangeRequestListQuery,
            FieldChange,
            // calendars
            CreateHolidayPayload,
            HolidayResponse,
            HolidayYearQuery,
            YearCalendarResponse,
            HolidayCheckQuery,
            HolidayCheckResponse,
            // admin-specific payloads
            UpsertAttendance,
            AdminAttendanceRow,
            AdminAttendanceQuery,
            ExportQuery
        )
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Auth", description = "Login and current staff profile"),
        (name = "Attendance", description = "Punches, rests, listings and summaries"),
        (name = "ChangeRequests", description = "Staff change requests"),
        (name = "Calendars", description = "Holiday and company holiday calendars"),
        (name = "Admin", description = "Administrator API")
    ),
    security(("BearerAuth" = []))
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_string());

        components.add_security_scheme("BearerAuth", SecurityScheme::Http(bearer));
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Wrong username or password"),
        (status = 403, description = "Account disabled")
    ),
    tag = "Auth",
    security(())
)]
fn login_doc() {}

#[utoipa::path(
    get,
    path = "/api/me",
    responses((status = 200, description = "Current staff member", body = StaffResponse)),
    tag = "Auth"
)]
fn me_doc() {}

#[utoipa::path(
    post,
    path = "/api/attendance/clock-in",
    request_body = ClockInRequest,
    responses(
        (status = 200, body = AttendanceResponse),
        (status = 400, description = "Already clocked in"),
        (status = 403, description = "Guests cannot record attendance")
    ),
    tag = "Attendance"
)]
fn clock_in_doc() {}

#[utoipa::path(
    post,
    path = "/api/attendance/clock-out",
    request_body = ClockOutRequest,
    responses(
        (status = 200, body = AttendanceResponse),
        (status = 400, description = "Not clocked in, already clocked out, or a rest is open")
    ),
    tag = "Attendance"
)]
fn clock_out_doc() {}

#[utoipa::path(
    post,
    path = "/api/attendance/rest-start",
    request_body = RestRequest,
    responses(
        (status = 200, body = RestResponse),
        (status = 400, description = "Not working or a rest is already open")
    ),
    tag = "Attendance"
)]
fn rest_start_doc() {}

#[utoipa::path(
    post,
    path = "/api/attendance/rest-end",
    request_body = RestRequest,
    responses(
        (status = 200, body = RestResponse),
        (status = 400, description = "No rest in progress")
    ),
    tag = "Attendance"
)]
fn rest_end_doc() {}

#[utoipa::path(
    get,
    path = "/api/attendance/status",
    params(StatusQuery),
    responses((status = 200, body = AttendanceDayView)),
    tag = "Attendance"
)]
fn attendance_status_doc() {}

#[utoipa::path(
    get,
    path = "/api/attendance/me",
    params(AttendanceQuery),
    responses((status = 200, body = [AttendanceDayView])),
    tag = "Attendance"
)]
fn my_attendance_doc() {}

#[utoipa::path(
    get,
    path = "/api/attendance/me/summary",
    params(SummaryQuery),
    responses((status = 200, body = AttendanceSummary)),
    tag = "Attendance"
)]
fn my_attendance_summary_doc() {}

#[utoipa::path(
    get,
    path = "/api/attendance/export",
    params(AttendanceExportQuery),
    responses((status = 200, body = ExportResponse)),
    tag = "Attendance"
)]
fn export_attendance_doc() {}

#[utoipa::path(
    post,
    path = "/api/change-requests",
    request_body = CreateChangeRequest,
    responses(
        (status = 201, body = ChangeRequestResponse),
        (status = 400, description = "Empty, no-op or invalid change set"),
        (status = 404, description = "No attendance record for the date"),
        (status = 409, description = "A pending request already exists")
    ),
    tag = "ChangeRequests"
)]
fn create_change_request_doc() {}

#[utoipa::path(
    get,
    path = "/api/change-requests/me",
    responses((status = 200, body = ChangeRequestListResponse)),
    tag = "ChangeRequests"
)]
fn my_change_requests_doc() {}

#[utoipa::path(
    delete,
    path = "/api/change-requests/{id}",
    params(("id" = String, Path, description = "Change request ID")),
    responses(
        (status = 200, body = ChangeRequestResponse),
        (status = 409, description = "No longer pending")
    ),
    tag = "ChangeRequests"
)]
fn cancel_change_request_doc() {}

#[utoipa::path(
    get,
    path = "/api/holidays",
    params(HolidayYearQuery),
    responses((status = 200, body = YearCalendarResponse)),
    tag = "Calendars"
)]
fn year_calendar_doc() {}

#[utoipa::path(
    get,
    path = "/api/holidays/check",
    params(HolidayCheckQuery),
    responses((status = 200, body = HolidayCheckResponse)),
    tag = "Calendars"
)]
fn holiday_check_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/staff",
    responses((status = 200, body = [StaffResponse])),
    tag = "Admin"
)]
fn admin_list_staff_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/staff",
    request_body = CreateStaff,
    responses(
        (status = 201, body = StaffResponse),
        (status = 409, description = "Username already exists")
    ),
    tag = "Admin"
)]
fn admin_create_staff_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/staff/{id}",
    params(("id" = String, Path, description = "Staff ID")),
    request_body = UpdateStaff,
    responses((status = 200, body = StaffResponse)),
    tag = "Admin"
)]
fn admin_update_staff_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/attendance",
    params(AdminAttendanceQuery),
    responses((status = 200, body = [AdminAttendanceRow])),
    tag = "Admin"
)]
fn admin_list_attendance_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/attendance",
    request_body = UpsertAttendance,
    responses((status = 200, body = AttendanceResponse)),
    tag = "Admin"
)]
fn admin_upsert_attendance_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/change-requests",
    params(ChangeRequestListQuery),
    responses((status = 200, body = ChangeRequestListResponse)),
    tag = "Admin"
)]
fn admin_list_change_requests_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/change-requests/{id}",
    params(("id" = String, Path, description = "Change request ID")),
    responses((status = 200, body = ChangeRequestDetailResponse)),
    tag = "Admin"
)]
fn admin_change_request_detail_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/change-requests/{id}/approve",
    params(("id" = String, Path, description = "Change request ID")),
    request_body = DecisionPayload,
    responses(
        (status = 200, body = ChangeRequestResponse),
        (status = 409, description = "No longer pending")
    ),
    tag = "Admin"
)]
fn admin_approve_change_request_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/change-requests/{id}/reject",
    params(("id" = String, Path, description = "Change request ID")),
    request_body = DecisionPayload,
    responses(
        (status = 200, body = ChangeRequestResponse),
        (status = 409, description = "No longer pending")
    ),
    tag = "Admin"
)]
fn admin_reject_change_request_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/holiday-calendars",
    params(HolidayYearQuery),
    responses((status = 200, body = [HolidayResponse])),
    tag = "Admin"
)]
fn admin_list_holiday_calendars_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/holiday-calendars",
    request_body = CreateHolidayPayload,
    responses((status = 201, body = HolidayResponse)),
    tag = "Admin"
)]
fn admin_create_holiday_calendar_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/holiday-calendars/{id}",
    params(("id" = String, Path, description = "Holiday ID")),
    request_body = CreateHolidayPayload,
    responses((status = 200, body = HolidayResponse)),
    tag = "Admin"
)]
fn admin_update_holiday_calendar_doc() {}

#[utoipa::path(
    delete,
    path = "/api/admin/holiday-calendars/{id}",
    params(("id" = String, Path, description = "Holiday ID")),
    responses((status = 204)),
    tag = "Admin"
)]
fn admin_delete_holiday_calendar_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/company-holiday-calendars",
    params(HolidayYearQuery),
    responses((status = 200, body = [HolidayResponse])),
    tag = "Admin"
)]
fn admin_list_company_holiday_calendars_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/company-holiday-calendars",
    request_body = CreateHolidayPayload,
    responses((status = 201, body = HolidayResponse)),
    tag = "Admin"
)]
fn admin_create_company_holiday_calendar_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/company-holiday-calendars/{id}",
    params(("id" = String, Path, description = "Company holiday ID")),
    request_body = CreateHolidayPayload,
    responses((status = 200, body = HolidayResponse)),
    tag = "Admin"
)]
fn admin_update_company_holiday_calendar_doc() {}

#[utoipa::path(
    delete,
    path = "/api/admin/company-holiday-calendars/{id}",
    params(("id" = String, Path, description = "Company holiday ID")),
    responses((status = 204)),
    tag = "Admin"
)]
fn admin_delete_company_holiday_calendar_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/export",
    params(ExportQuery),
    responses((status = 200, body = ExportResponse)),
    tag = "Admin"
)]
fn admin_export_doc() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/auth/login",
            "/api/attendance/clock-in",
            "/api/change-requests/{id}",
            "/api/holidays",
            "/api/admin/change-requests/{id}/approve",
            "/api/admin/company-holiday-calendars/{id}",
        ] {
            assert!(
                paths.iter().any(|path| path.as_str() == expected),
                "missing {expected}"
            );
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerAuth"));
    }
}
