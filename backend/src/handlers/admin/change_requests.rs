use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::change_requests::{list_response, to_responses},
    models::{
        attendance::AttendanceDay,
        change_request::{
            AttendanceSnapshot, ChangeRequest, ChangeRequestDetailResponse,
            ChangeRequestListQuery, ChangeRequestListResponse, ChangeRequestResponse,
            ChangeRequestStatus, DecisionPayload,
        },
        staff::Staff,
    },
    repositories::{
        change_request::Decision,
        transaction::{begin_transaction, commit_transaction},
        AttendanceRepository, AttendanceRepositoryTrait, ChangeRequestRepository, RestRepository,
    },
    services::change_request::diff_change_set,
    state::AppState,
    types::ChangeRequestId,
    validation::rules::validate_attendance_times,
};

use super::common::parse_optional_staff_id;

fn parse_request_id(raw: &str) -> Result<ChangeRequestId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid change request ID".into()))
}

fn parse_status_filter(raw: Option<&str>) -> Result<Option<ChangeRequestStatus>, AppError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) if value.eq_ignore_ascii_case("all") => Ok(None),
        Some(value) => ChangeRequestStatus::parse(value).map(Some).ok_or_else(|| {
            AppError::BadRequest(
                "`status` must be one of pending, approved, rejected, cancelled, all".into(),
            )
        }),
        None => Ok(None),
    }
}

async fn load_target_day(
    state: &AppState,
    request: &ChangeRequest,
) -> Result<AttendanceDay, AppError> {
    let attendance = AttendanceRepository::new()
        .find_by_id(&state.pool, request.attendance_id)
        .await?;
    let rests = RestRepository::new()
        .find_by_attendance(&state.pool, attendance.id)
        .await?;
    Ok(AttendanceDay::new(attendance, rests))
}

pub async fn list_change_requests(
    State(state): State<AppState>,
    Query(query): Query<ChangeRequestListQuery>,
) -> Result<Json<ChangeRequestListResponse>, AppError> {
    let status = parse_status_filter(query.status.as_deref())?;
    let staff_id = parse_optional_staff_id(query.staff_id.as_deref())?;
    let requests = ChangeRequestRepository::new()
        .list(&state.pool, status, staff_id)
        .await?;
    Ok(Json(list_response(to_responses(&requests)?)))
}

pub async fn get_change_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ChangeRequestDetailResponse>, AppError> {
    let id = parse_request_id(&id)?;
    let request = ChangeRequestRepository::new()
        .find_by_id(&state.pool, id)
        .await?;
    let day = load_target_day(&state, &request).await?;
    let proposed = request.proposed()?;
    let before = AttendanceSnapshot::from(&day);
    let after = proposed.apply_to(&before);
    let changes = diff_change_set(&before, &proposed);

    Ok(Json(ChangeRequestDetailResponse {
        request: request.to_response()?,
        before,
        after,
        changes,
    }))
}

pub async fn approve_change_request(
    State(state): State<AppState>,
    Extension(admin): Extension<Staff>,
    Path(id): Path<String>,
    Json(payload): Json<DecisionPayload>,
) -> Result<Json<ChangeRequestResponse>, AppError> {
    payload.validate()?;
    let id = parse_request_id(&id)?;
    let repo = ChangeRequestRepository::new();

    let mut tx = begin_transaction(&state.pool).await?;
    let request = repo.find_for_update(&mut tx, id).await?;
    if !request.is_pending() {
        return Err(AppError::Conflict(
            "Change request is no longer pending".into(),
        ));
    }
    // Lock the record so a concurrent punch is applied before or after, never overwritten.
    let attendance = AttendanceRepository::new()
        .find_for_update(&mut tx, request.attendance_id)
        .await?;
    let rests = RestRepository::new()
        .find_by_attendance_in(&mut tx, attendance.id)
        .await?;
    let day = AttendanceDay::new(attendance, rests);
    let proposed = request.proposed()?;
    let after = proposed.apply_to(&AttendanceSnapshot::from(&day));
    validate_attendance_times(after.start_time, after.end_time, &after.rests)?;

    let now = Utc::now();
    let mut attendance = day.attendance;
    attendance.start_time = after.start_time;
    attendance.end_time = after.end_time;
    attendance.set_flags(after.flags);
    attendance.remarks = after.remarks;
    attendance.substitute_holiday_date = after.substitute_holiday_date;
    attendance.updated_at = now;
    AttendanceRepository::new()
        .update_in(&mut tx, &attendance)
        .await?;
    if let Some(rests) = proposed.rests.as_deref() {
        RestRepository::new()
            .replace_for_attendance(&mut tx, attendance.id, rests)
            .await?;
    }

    let decision = Decision {
        status: ChangeRequestStatus::Approved,
        comment: payload.comment,
        decided_by: Some(admin.id),
        decided_at: now,
    };
    let approved = repo
        .decide(&mut tx, id, &decision)
        .await?
        .ok_or_else(|| AppError::Conflict("Change request is no longer pending".into()))?;
    commit_transaction(tx).await?;
    tracing::info!(
        admin_id = %admin.id,
        change_request_id = %id,
        attendance_id = %attendance.id,
        "change request approved"
    );

    Ok(Json(approved.to_response()?))
}

pub async fn reject_change_request(
    State(state): State<AppState>,
    Extension(admin): Extension<Staff>,
    Path(id): Path<String>,
    Json(payload): Json<DecisionPayload>,
) -> Result<Json<ChangeRequestResponse>, AppError> {
    payload.validate()?;
    let id = parse_request_id(&id)?;
    let decision = Decision {
        status: ChangeRequestStatus::Rejected,
        comment: payload.comment,
        decided_by: Some(admin.id),
        decided_at: Utc::now(),
    };
    let mut conn = state.pool.acquire().await?;
    let rejected = ChangeRequestRepository::new()
        .decide(&mut conn, id, &decision)
        .await?;
    let rejected = match rejected {
        Some(rejected) => rejected,
        None => {
            // Distinguish a missing request from one that was already decided.
            ChangeRequestRepository::new()
                .find_by_id(&state.pool, id)
                .await?;
            return Err(AppError::Conflict(
                "Change request is no longer pending".into(),
            ));
        }
    };
    tracing::info!(admin_id = %admin.id, change_request_id = %id, "change request rejected");

    Ok(Json(rejected.to_response()?))
}
