use axum::{
    extract::{Extension, Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppError,
    handlers::attendance_utils::{
        csv_row, day_view, ensure_after, ensure_can_record, ensure_clock_in_exists,
        ensure_no_open_rest, ensure_not_clocked_in, ensure_not_clocked_out, ensure_working,
        fetch_day_views, load_day, resolve_range, summarize, CSV_HEADER,
    },
    models::{
        attendance::{
            Attendance, AttendanceDay, AttendanceDayView, AttendanceQuery, AttendanceResponse,
            AttendanceSummary, ClockInRequest, ClockOutRequest, RestRequest,
        },
        rest::{Rest, RestResponse},
        staff::Staff,
    },
    repositories::{AttendanceRepository, AttendanceRepositoryTrait, RestRepository},
    services::ServiceError,
    state::AppState,
    utils::{csv::render_csv, time},
};

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct StatusQuery {
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct SummaryQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceExportQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExportResponse {
    pub csv_data: String,
    pub filename: String,
}

fn resolve_work_date(requested: Option<NaiveDate>, today: NaiveDate) -> Result<NaiveDate, AppError> {
    match requested {
        Some(date) if date > today => Err(AppError::BadRequest(
            "work_date must not be in the future".into(),
        )),
        Some(date) => Ok(date),
        None => Ok(today),
    }
}

async fn require_day(
    state: &AppState,
    staff: &Staff,
    work_date: NaiveDate,
) -> Result<AttendanceDay, AppError> {
    load_day(&AttendanceRepository::new(), &state.pool, staff, work_date)
        .await?
        .ok_or_else(|| AppError::NotFound("No attendance record for this date".into()))
}

async fn respond_with_day(
    state: &AppState,
    attendance: Attendance,
) -> Result<Json<AttendanceResponse>, AppError> {
    let rests = RestRepository::new()
        .find_by_attendance(&state.pool, attendance.id)
        .await?;
    Ok(Json(AttendanceResponse::from(AttendanceDay::new(
        attendance, rests,
    ))))
}

fn now(state: &AppState) -> DateTime<Utc> {
    time::now_utc(state.time_zone())
}

pub async fn clock_in(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
    Json(payload): Json<ClockInRequest>,
) -> Result<Json<AttendanceResponse>, AppError> {
    ensure_can_record(&staff)?;
    let repo = AttendanceRepository::new();
    let work_date = resolve_work_date(payload.work_date, state.today())?;
    let now = now(&state);

    let attendance = match repo
        .find_by_staff_and_date(&state.pool, staff.id, work_date)
        .await?
    {
        Some(mut attendance) => {
            ensure_not_clocked_in(&attendance)?;
            attendance.start_time = Some(now);
            attendance.go_directly_flag |= payload.go_directly;
            attendance.updated_at = now;
            repo.update(&state.pool, &attendance).await?
        }
        None => {
            let mut attendance = Attendance::new(staff.id, work_date, now);
            attendance.start_time = Some(now);
            attendance.go_directly_flag = payload.go_directly;
            repo.create(&state.pool, &attendance).await?
        }
    };
    tracing::info!(staff_id = %staff.id, %work_date, "clocked in");

    respond_with_day(&state, attendance).await
}

pub async fn clock_out(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
    Json(payload): Json<ClockOutRequest>,
) -> Result<Json<AttendanceResponse>, AppError> {
    ensure_can_record(&staff)?;
    let work_date = resolve_work_date(payload.work_date, state.today())?;
    let day = require_day(&state, &staff, work_date).await?;
    ensure_clock_in_exists(&day.attendance)?;
    ensure_not_clocked_out(&day.attendance)?;
    ensure_no_open_rest(&day)?;

    let now = now(&state);
    ensure_after(day.attendance.start_time, now)?;
    let mut attendance = day.attendance;
    attendance.end_time = Some(now);
    attendance.return_directly_flag |= payload.return_directly;
    attendance.updated_at = now;
    let attendance = AttendanceRepository::new()
        .update(&state.pool, &attendance)
        .await?;
    tracing::info!(staff_id = %staff.id, %work_date, "clocked out");

    respond_with_day(&state, attendance).await
}

pub async fn rest_start(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
    Json(payload): Json<RestRequest>,
) -> Result<Json<RestResponse>, AppError> {
    ensure_can_record(&staff)?;
    let work_date = resolve_work_date(payload.work_date, state.today())?;
    let day = require_day(&state, &staff, work_date).await?;
    ensure_working(&day.attendance)?;
    ensure_no_open_rest(&day)?;

    let now = now(&state);
    ensure_after(day.attendance.start_time, now)?;
    let rests = RestRepository::new();
    let position = rests.next_position(&state.pool, day.attendance.id).await?;
    let rest = rests
        .create(&state.pool, &Rest::start(day.attendance.id, position, now))
        .await?;
    tracing::info!(staff_id = %staff.id, %work_date, rest_id = %rest.id, "rest started");

    Ok(Json(RestResponse::from(rest)))
}

pub async fn rest_end(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
    Json(payload): Json<RestRequest>,
) -> Result<Json<RestResponse>, AppError> {
    ensure_can_record(&staff)?;
    let work_date = resolve_work_date(payload.work_date, state.today())?;
    let day = require_day(&state, &staff, work_date).await?;
    let mut rest = day
        .open_rest()
        .cloned()
        .ok_or_else(|| ServiceError::InvalidState("No rest in progress".into()))?;

    let now = now(&state);
    ensure_after(rest.start_time, now)?;
    rest.end_time = Some(now);
    rest.updated_at = now;
    let rest = RestRepository::new().update(&state.pool, &rest).await?;
    tracing::info!(staff_id = %staff.id, %work_date, rest_id = %rest.id, "rest ended");

    Ok(Json(RestResponse::from(rest)))
}

pub async fn get_status(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<AttendanceDayView>, AppError> {
    let today = state.today();
    let date = query.date.unwrap_or(today);
    let day = load_day(&AttendanceRepository::new(), &state.pool, &staff, date).await?;
    let set = state.calendars.load_range(date, date).await?;
    Ok(Json(day_view(day.as_ref(), &staff, &set, date, today)))
}

pub async fn get_my_attendance(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
    Query(query): Query<AttendanceQuery>,
) -> Result<Json<Vec<AttendanceDayView>>, AppError> {
    let today = state.today();
    let range = resolve_range(&query, today)?;
    let (views, _) = fetch_day_views(
        &AttendanceRepository::new(),
        &state.calendars,
        &state.pool,
        &staff,
        range,
        today,
    )
    .await?;
    Ok(Json(views))
}

pub async fn get_my_summary(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<AttendanceSummary>, AppError> {
    let today = state.today();
    let (default_year, default_month) = time::year_month(today);
    let year = query.year.unwrap_or(default_year);
    let month = query.month.unwrap_or(default_month);
    let range = time::month_bounds(year, month)
        .ok_or_else(|| AppError::BadRequest("Invalid year or month".into()))?;

    let (views, days) = fetch_day_views(
        &AttendanceRepository::new(),
        &state.calendars,
        &state.pool,
        &staff,
        range,
        today,
    )
    .await?;
    Ok(Json(summarize(
        (year, month),
        &views,
        &days,
        state.config.work_end_time,
        state.config.time_zone,
    )))
}

pub async fn export_my_attendance(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
    Query(query): Query<AttendanceExportQuery>,
) -> Result<Json<ExportResponse>, AppError> {
    let today = state.today();
    let (from, to) = resolve_range(
        &AttendanceQuery {
            from: query.from,
            to: query.to,
            ..AttendanceQuery::default()
        },
        today,
    )?;
    let (views, _) = fetch_day_views(
        &AttendanceRepository::new(),
        &state.calendars,
        &state.pool,
        &staff,
        (from, to),
        today,
    )
    .await?;

    let tz = state.time_zone();
    let csv_data = render_csv(
        &CSV_HEADER,
        views.iter().map(|view| csv_row(&staff, view, tz)),
    )?;
    Ok(Json(ExportResponse {
        csv_data,
        filename: format!("attendance_{}_{}_{}.csv", staff.username, from, to),
    }))
}
