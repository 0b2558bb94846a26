use std::collections::HashMap;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::attendance_utils::{day_view, fetch_day_views},
    models::{
        attendance::{
            AdminAttendanceQuery, AdminAttendanceRow, AttendanceDay, AttendanceDayView,
            AttendanceResponse, UpsertAttendance,
        },
        staff::Staff,
    },
    repositories::{
        attendance::assemble_days,
        transaction::{begin_transaction, commit_transaction},
        AttendanceRepository, AttendanceRepositoryTrait, Repository, RestRepository,
        StaffRepository,
    },
    services::calendar_service::CalendarSet,
    state::AppState,
    types::{AttendanceId, StaffId},
    validation::rules::validate_attendance_times,
};

use super::common::{parse_optional_staff_id, resolve_date_window};

/// One row per stored day whose owner is known, in the order of `days`.
pub fn admin_rows(
    days: &[AttendanceDay],
    staff: &HashMap<StaffId, Staff>,
    set: &CalendarSet,
    today: chrono::NaiveDate,
) -> Vec<AdminAttendanceRow> {
    days.iter()
        .filter_map(|day| {
            let owner = staff.get(&day.attendance.staff_id)?;
            Some(AdminAttendanceRow {
                staff_id: owner.id,
                username: owner.username.clone(),
                full_name: owner.full_name.clone(),
                day: day_view(Some(day), owner, set, day.attendance.work_date, today),
            })
        })
        .collect()
}

/// One row per calendar date for a single staff member, newest date first.
pub fn calendar_rows(owner: &Staff, views: Vec<AttendanceDayView>) -> Vec<AdminAttendanceRow> {
    views
        .into_iter()
        .rev()
        .map(|day| AdminAttendanceRow {
            staff_id: owner.id,
            username: owner.username.clone(),
            full_name: owner.full_name.clone(),
            day,
        })
        .collect()
}

pub async fn list_attendance(
    State(state): State<AppState>,
    Query(query): Query<AdminAttendanceQuery>,
) -> Result<Json<Vec<AdminAttendanceRow>>, AppError> {
    let staff_id = parse_optional_staff_id(query.staff_id.as_deref())?;
    let today = state.today();
    let (from, to) = resolve_date_window(query.from.as_deref(), query.to.as_deref(), today)?;

    if let Some(staff_id) = staff_id {
        let owner = StaffRepository::new()
            .find_by_id(&state.pool, staff_id)
            .await?;
        let (views, _) = fetch_day_views(
            &AttendanceRepository::new(),
            &state.calendars,
            &state.pool,
            &owner,
            (from, to),
            today,
        )
        .await?;
        return Ok(Json(calendar_rows(&owner, views)));
    }

    let records = AttendanceRepository::new()
        .list_filtered(&state.pool, staff_id, Some(from), Some(to))
        .await?;
    let ids: Vec<AttendanceId> = records.iter().map(|record| record.id).collect();
    let rests = RestRepository::new()
        .find_by_attendances(&state.pool, &ids)
        .await?;
    let days = assemble_days(records, rests);

    let staff: HashMap<StaffId, Staff> = StaffRepository::new()
        .find_all(&state.pool)
        .await?
        .into_iter()
        .map(|staff| (staff.id, staff))
        .collect();
    let set = state.calendars.load_range(from, to).await?;

    Ok(Json(admin_rows(&days, &staff, &set, today)))
}

pub async fn upsert_attendance(
    State(state): State<AppState>,
    Extension(admin): Extension<Staff>,
    Json(payload): Json<UpsertAttendance>,
) -> Result<Json<AttendanceResponse>, AppError> {
    payload.validate()?;
    validate_attendance_times(payload.start_time, payload.end_time, &payload.rests)?;
    StaffRepository::new()
        .find_by_id(&state.pool, payload.staff_id)
        .await?;

    let repo = AttendanceRepository::new();
    let existing = repo
        .find_by_staff_and_date(&state.pool, payload.staff_id, payload.work_date)
        .await?;
    let attendance = payload.to_attendance(existing.as_ref(), Utc::now());

    let mut tx = begin_transaction(&state.pool).await?;
    let saved = repo.upsert_in(&mut tx, &attendance).await?;
    let rests = RestRepository::new()
        .replace_for_attendance(&mut tx, saved.id, &payload.rests)
        .await?;
    commit_transaction(tx).await?;
    tracing::info!(
        admin_id = %admin.id,
        staff_id = %saved.staff_id,
        work_date = %saved.work_date,
        rests = rests.len(),
        "attendance upserted"
    );

    Ok(Json(AttendanceResponse::from(AttendanceDay::new(
        saved, rests,
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::attendance_utils::build_day_views;
    use crate::models::attendance::Attendance;
    use crate::models::staff::{StaffRole, WorkType};
    use crate::services::attendance_status::AttendanceStatus;
    use chrono::NaiveDate;

    #[test]
    fn rows_carry_owner_and_derived_status() {
        let owner = Staff::new(
            "jiro".into(),
            "hash".into(),
            "Jiro".into(),
            StaffRole::Staff,
            WorkType::Shift,
        );
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let mut attendance = Attendance::new(owner.id, date, Utc::now());
        attendance.start_time = Some(Utc::now());
        let orphan = Attendance::new(StaffId::new(), date, Utc::now());
        let days = vec![
            AttendanceDay::new(attendance, vec![]),
            AttendanceDay::new(orphan, vec![]),
        ];
        let staff = HashMap::from([(owner.id, owner.clone())]);

        let rows = admin_rows(&days, &staff, &CalendarSet::default(), date);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "jiro");
        assert_eq!(rows[0].day.status, AttendanceStatus::Working);
    }

    #[test]
    fn calendar_rows_include_missing_days_newest_first() {
        let owner = Staff::new(
            "hana".into(),
            "hash".into(),
            "Hana".into(),
            StaffRole::Staff,
            WorkType::Weekday,
        );
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
        let mut attendance = Attendance::new(owner.id, tuesday, Utc::now());
        attendance.start_time = Some(Utc::now());
        let days = vec![AttendanceDay::new(attendance, vec![])];
        let views = build_day_views(
            &days,
            &owner,
            &CalendarSet::default(),
            (monday, tuesday),
            tuesday,
        );

        let rows = calendar_rows(&owner, views);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].day.date, tuesday);
        assert_eq!(rows[0].day.status, AttendanceStatus::Working);
        assert_eq!(rows[1].day.date, monday);
        assert_eq!(rows[1].day.status, AttendanceStatus::Error);
        assert!(rows.iter().all(|row| row.username == "hana"));
    }
}
