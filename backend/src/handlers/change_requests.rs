use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    error::AppError,
    handlers::attendance_utils::{ensure_can_record, load_day},
    models::{
        change_request::{
            AttendanceSnapshot, ChangeRequest, ChangeRequestListResponse, ChangeRequestResponse,
            ChangeRequestStatus, ChangeSet, CreateChangeRequest,
        },
        staff::Staff,
    },
    repositories::{change_request::Decision, AttendanceRepository, ChangeRequestRepository},
    services::change_request::{diff_change_set, first_unapproved, unapproved_count},
    state::AppState,
    types::ChangeRequestId,
    validation::{messages, rules::validate_attendance_times},
};

fn empty_change_set() -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add(
        "proposed",
        ValidationError::new(messages::EMPTY_CHANGE_SET)
            .with_message(messages::describe(messages::EMPTY_CHANGE_SET).into()),
    );
    AppError::from(errors)
}

/// Rejects change sets that are empty, change nothing, or leave the record inconsistent.
pub fn check_change_set(before: &AttendanceSnapshot, proposed: &ChangeSet) -> Result<(), AppError> {
    if proposed.is_empty() || diff_change_set(before, proposed).is_empty() {
        return Err(empty_change_set());
    }
    let after = proposed.apply_to(before);
    validate_attendance_times(after.start_time, after.end_time, &after.rests)?;
    Ok(())
}

/// Wraps responses into the slot list the counter functions work on.
pub fn list_response(items: Vec<ChangeRequestResponse>) -> ChangeRequestListResponse {
    let slots: Vec<Option<&ChangeRequestResponse>> = items.iter().map(Some).collect();
    let unapproved = unapproved_count(&slots);
    let first_unapproved_id = first_unapproved(&slots).map(|request| request.id);
    ChangeRequestListResponse {
        unapproved_count: unapproved,
        first_unapproved_id,
        items,
    }
}

pub fn to_responses(requests: &[ChangeRequest]) -> Result<Vec<ChangeRequestResponse>, AppError> {
    requests
        .iter()
        .map(|request| request.to_response().map_err(AppError::from))
        .collect()
}

pub async fn create_change_request(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
    Json(payload): Json<CreateChangeRequest>,
) -> Result<(StatusCode, Json<ChangeRequestResponse>), AppError> {
    ensure_can_record(&staff)?;
    payload.validate()?;

    let day = load_day(
        &AttendanceRepository::new(),
        &state.pool,
        &staff,
        payload.work_date,
    )
    .await?
    .ok_or_else(|| AppError::NotFound("No attendance record for this date".into()))?;
    check_change_set(&AttendanceSnapshot::from(&day), &payload.proposed)?;

    let repo = ChangeRequestRepository::new();
    if repo
        .find_pending_for_attendance(&state.pool, day.attendance.id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "A pending change request already exists for this date".into(),
        ));
    }

    let now = Utc::now();
    let request = ChangeRequest {
        id: ChangeRequestId::new(),
        attendance_id: day.attendance.id,
        staff_id: staff.id,
        work_date: payload.work_date,
        proposed_json: serde_json::to_value(&payload.proposed)?,
        comment: payload.comment.trim().to_string(),
        completed: false,
        status: ChangeRequestStatus::Pending,
        decision_comment: None,
        decided_by: None,
        decided_at: None,
        created_at: now,
        updated_at: now,
    };
    let saved = repo.create(&state.pool, &request).await?;
    tracing::info!(
        staff_id = %staff.id,
        change_request_id = %saved.id,
        work_date = %saved.work_date,
        "change request submitted"
    );

    Ok((StatusCode::CREATED, Json(saved.to_response()?)))
}

pub async fn get_my_change_requests(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
) -> Result<Json<ChangeRequestListResponse>, AppError> {
    let requests = ChangeRequestRepository::new()
        .list(&state.pool, None, Some(staff.id))
        .await?;
    Ok(Json(list_response(to_responses(&requests)?)))
}

pub async fn cancel_change_request(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
    Path(id): Path<String>,
) -> Result<Json<ChangeRequestResponse>, AppError> {
    let id: ChangeRequestId = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid change request ID".into()))?;
    let repo = ChangeRequestRepository::new();
    let request = repo.find_by_id(&state.pool, id).await?;
    if request.staff_id != staff.id {
        return Err(AppError::Forbidden(
            "Cannot cancel another staff member's request".into(),
        ));
    }

    let decision = Decision {
        status: ChangeRequestStatus::Cancelled,
        comment: None,
        decided_by: Some(staff.id),
        decided_at: Utc::now(),
    };
    let mut conn = state.pool.acquire().await?;
    let cancelled = repo
        .decide(&mut conn, id, &decision)
        .await?
        .ok_or_else(|| AppError::Conflict("Change request is no longer pending".into()))?;
    tracing::info!(staff_id = %staff.id, change_request_id = %id, "change request cancelled");

    Ok(Json(cancelled.to_response()?))
}
