//! Guards and view assembly shared by the staff and admin attendance handlers.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::attendance::{
    Attendance, AttendanceDay, AttendanceDayView, AttendanceQuery, AttendanceResponse,
    AttendanceSummary,
};
use crate::models::staff::Staff;
use crate::repositories::AttendanceRepositoryTrait;
use crate::services::attendance_status::{classify, AttendanceStatus};
use crate::services::calendar::CalendarEntry;
use crate::services::calendar_service::{CalendarService, CalendarSet};
use crate::services::day_summary::describe_day;
use crate::services::overtime::{format_minutes_to_hhmm, total_overtime_minutes, WorkEnd};
use crate::services::work_time::{total_rest_minutes, total_work_minutes};
use crate::services::ServiceError;
use crate::utils::time;

/// Longest window a single listing or export may cover.
pub const MAX_RANGE_DAYS: i64 = 366;

pub fn ensure_can_record(staff: &Staff) -> Result<(), AppError> {
    if staff.can_record_attendance() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Guests cannot record attendance".into(),
        ))
    }
}

pub fn ensure_not_clocked_in(attendance: &Attendance) -> Result<(), ServiceError> {
    if attendance.start_time.is_some() {
        return Err(ServiceError::InvalidState("Already clocked in".into()));
    }
    Ok(())
}

pub fn ensure_clock_in_exists(attendance: &Attendance) -> Result<(), ServiceError> {
    if attendance.start_time.is_none() {
        return Err(ServiceError::InvalidState("Not clocked in".into()));
    }
    Ok(())
}

pub fn ensure_not_clocked_out(attendance: &Attendance) -> Result<(), ServiceError> {
    if attendance.is_clocked_out() {
        return Err(ServiceError::InvalidState("Already clocked out".into()));
    }
    Ok(())
}

/// A rest may only start while the staff member is working.
pub fn ensure_working(attendance: &Attendance) -> Result<(), ServiceError> {
    ensure_clock_in_exists(attendance)?;
    ensure_not_clocked_out(attendance)
}

pub fn ensure_no_open_rest(day: &AttendanceDay) -> Result<(), ServiceError> {
    if day.open_rest().is_some() {
        return Err(ServiceError::InvalidState("A rest is already in progress".into()));
    }
    Ok(())
}

pub fn ensure_after(
    earlier: Option<DateTime<Utc>>,
    later: DateTime<Utc>,
) -> Result<(), ServiceError> {
    match earlier {
        Some(earlier) if later <= earlier => Err(ServiceError::InvalidTimestamp(
            "Timestamp must be after the previous punch".into(),
        )),
        _ => Ok(()),
    }
}

/// Resolves `from`/`to` or `year`/`month` to an inclusive window.
///
/// Without either pair the month containing `today` is used.
pub fn resolve_range(
    query: &AttendanceQuery,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), AppError> {
    let (from, to) = match (query.from, query.to) {
        (Some(from), Some(to)) => (from, to),
        (None, None) => {
            let (default_year, default_month) = time::year_month(today);
            let year = query.year.unwrap_or(default_year);
            let month = query.month.unwrap_or(default_month);
            time::month_bounds(year, month)
                .ok_or_else(|| AppError::BadRequest("Invalid year or month".into()))?
        }
        _ => {
            return Err(AppError::BadRequest(
                "`from` and `to` must be given together".into(),
            ))
        }
    };
    ensure_range(from, to)?;
    Ok((from, to))
}

pub fn ensure_range(from: NaiveDate, to: NaiveDate) -> Result<(), AppError> {
    if from > to {
        return Err(AppError::BadRequest(
            "`from` must be before or equal to `to`".into(),
        ));
    }
    if (to - from).num_days() >= MAX_RANGE_DAYS {
        return Err(AppError::BadRequest(format!(
            "Date range must not exceed {} days",
            MAX_RANGE_DAYS
        )));
    }
    Ok(())
}

/// Loads the record of `date` with its rests.
pub async fn load_day<R: AttendanceRepositoryTrait + ?Sized>(
    repo: &R,
    pool: &PgPool,
    staff: &Staff,
    date: NaiveDate,
) -> Result<Option<AttendanceDay>, AppError> {
    let mut days = repo.find_days_in_range(pool, staff.id, date, date).await?;
    Ok(days.pop())
}

/// One view per date of `from..=to` for `staff`, plus the stored days behind them.
pub async fn fetch_day_views<R: AttendanceRepositoryTrait + ?Sized>(
    repo: &R,
    calendars: &CalendarService,
    pool: &PgPool,
    staff: &Staff,
    (from, to): (NaiveDate, NaiveDate),
    today: NaiveDate,
) -> Result<(Vec<AttendanceDayView>, Vec<AttendanceDay>), AppError> {
    let days = repo.find_days_in_range(pool, staff.id, from, to).await?;
    let set = calendars.load_range(from, to).await?;
    let views = build_day_views(&days, staff, &set, (from, to), today);
    Ok((views, days))
}

pub fn build_day_views(
    days: &[AttendanceDay],
    staff: &Staff,
    set: &CalendarSet,
    (from, to): (NaiveDate, NaiveDate),
    today: NaiveDate,
) -> Vec<AttendanceDayView> {
    let by_date: HashMap<NaiveDate, &AttendanceDay> = days
        .iter()
        .map(|day| (day.attendance.work_date, day))
        .collect();
    time::dates_between(from, to)
        .map(|date| day_view(by_date.get(&date).copied(), staff, set, date, today))
        .collect()
}

pub fn day_view(
    day: Option<&AttendanceDay>,
    staff: &Staff,
    set: &CalendarSet,
    date: NaiveDate,
    today: NaiveDate,
) -> AttendanceDayView {
    let calendars = set.calendars();
    let status = classify(day, Some(staff), &calendars, date, today);
    let rests = day.map(AttendanceDay::rest_intervals).unwrap_or_default();
    AttendanceDayView {
        date,
        status,
        attendance: day.cloned().map(AttendanceResponse::from),
        holiday_name: calendars.holiday_on(date).map(|h| h.name().to_string()),
        company_holiday_name: calendars
            .company_holiday_on(date)
            .map(|c| c.name().to_string()),
        rest_minutes: total_rest_minutes(&rests),
        work_minutes: day.and_then(|day| total_work_minutes(&day.attendance, &rests)),
        summary: describe_day(date, day.map(|day| &day.attendance), &calendars),
    }
}

/// Monthly totals over already built views.
pub fn summarize(
    (year, month): (i32, u32),
    views: &[AttendanceDayView],
    days: &[AttendanceDay],
    scheduled_end: chrono::NaiveTime,
    tz: Tz,
) -> AttendanceSummary {
    let ends: Vec<WorkEnd> = days.iter().map(|day| WorkEnd::from(&day.attendance)).collect();
    let overtime_minutes = total_overtime_minutes(&ends, scheduled_end, tz);
    AttendanceSummary {
        year,
        month,
        work_days: views
            .iter()
            .filter(|view| view.status == AttendanceStatus::LeftWork)
            .count() as i64,
        total_work_minutes: views.iter().filter_map(|view| view.work_minutes).sum(),
        total_rest_minutes: views.iter().map(|view| view.rest_minutes).sum(),
        overtime_minutes,
        overtime_text: format_minutes_to_hhmm(overtime_minutes),
        error_days: views
            .iter()
            .filter(|view| view.status == AttendanceStatus::Error)
            .count() as i64,
    }
}

pub const CSV_HEADER: [&str; 10] = [
    "Username",
    "Full Name",
    "Date",
    "Status",
    "Start",
    "End",
    "Rest Minutes",
    "Work Minutes",
    "Summary",
    "Remarks",
];

fn local_clock(value: Option<DateTime<Utc>>, tz: &Tz) -> String {
    value
        .map(|at| at.with_timezone(tz).format("%H:%M").to_string())
        .unwrap_or_default()
}

/// A CSV row for one day view, clock times rendered in `tz`.
pub fn csv_row(staff: &Staff, view: &AttendanceDayView, tz: &Tz) -> Vec<String> {
    let attendance = view.attendance.as_ref();
    vec![
        staff.username.clone(),
        staff.full_name.clone(),
        view.date.format("%Y-%m-%d").to_string(),
        view.status.as_str().to_string(),
        local_clock(attendance.and_then(|a| a.start_time), tz),
        local_clock(attendance.and_then(|a| a.end_time), tz),
        view.rest_minutes.to_string(),
        view.work_minutes.map(|m| m.to_string()).unwrap_or_default(),
        view.summary.clone(),
        attendance
            .and_then(|a| a.remarks.clone())
            .unwrap_or_default(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::holiday::HolidayCalendar;
    use crate::models::rest::Rest;
    use crate::models::staff::{StaffRole, WorkType};
    use crate::repositories::attendance::MockAttendanceRepositoryTrait;
    use crate::services::calendar_service::CalendarServiceStub;
    use chrono::{NaiveTime, TimeZone};
    use sqlx::postgres::PgPoolOptions;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn staff(role: StaffRole) -> Staff {
        Staff::new(
            "taro".into(),
            "hash".into(),
            "Taro Yamada".into(),
            role,
            WorkType::Weekday,
        )
    }

    fn finished_day(staff: &Staff, work_date: NaiveDate, start_h: u32, end_h: u32) -> AttendanceDay {
        let mut attendance = Attendance::new(staff.id, work_date, Utc::now());
        let day = |h| work_date.and_hms_opt(h, 0, 0).unwrap().and_utc();
        attendance.start_time = Some(day(start_h));
        attendance.end_time = Some(day(end_h));
        let mut rest = Rest::start(attendance.id, 0, day(start_h + 3));
        rest.end_time = Some(day(start_h + 4));
        AttendanceDay::new(attendance, vec![rest])
    }

    #[test]
    fn guests_cannot_record() {
        assert!(ensure_can_record(&staff(StaffRole::Staff)).is_ok());
        assert!(matches!(
            ensure_can_record(&staff(StaffRole::Guest)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn punch_guards_follow_record_state() {
        let owner = staff(StaffRole::Staff);
        let mut attendance = Attendance::new(owner.id, date(2024, 6, 3), Utc::now());
        assert!(ensure_not_clocked_in(&attendance).is_ok());
        assert!(ensure_working(&attendance).is_err());

        attendance.start_time = Some(Utc::now());
        assert!(ensure_not_clocked_in(&attendance).is_err());
        assert!(ensure_working(&attendance).is_ok());

        attendance.end_time = Some(Utc::now());
        assert_eq!(
            ensure_not_clocked_out(&attendance),
            Err(ServiceError::InvalidState("Already clocked out".into()))
        );
    }

    #[test]
    fn open_rest_blocks_a_second_rest() {
        let owner = staff(StaffRole::Staff);
        let attendance = Attendance::new(owner.id, date(2024, 6, 3), Utc::now());
        let open = Rest::start(attendance.id, 0, Utc::now());
        let day = AttendanceDay::new(attendance, vec![open]);
        assert!(ensure_no_open_rest(&day).is_err());
    }

    #[test]
    fn later_punch_must_follow_earlier_one() {
        let start = Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap();
        assert!(ensure_after(Some(start), start).is_err());
        assert!(ensure_after(Some(start), start + chrono::Duration::minutes(1)).is_ok());
        assert!(ensure_after(None, start).is_ok());
    }

    #[test]
    fn resolve_range_defaults_to_current_month() {
        let range = resolve_range(&AttendanceQuery::default(), date(2024, 2, 14)).unwrap();
        assert_eq!(range, (date(2024, 2, 1), date(2024, 2, 29)));

        let query = AttendanceQuery {
            year: Some(2023),
            month: Some(12),
            ..AttendanceQuery::default()
        };
        let range = resolve_range(&query, date(2024, 2, 14)).unwrap();
        assert_eq!(range, (date(2023, 12, 1), date(2023, 12, 31)));
    }

    #[test]
    fn resolve_range_rejects_half_and_inverted_ranges() {
        let half = AttendanceQuery {
            from: Some(date(2024, 1, 1)),
            ..AttendanceQuery::default()
        };
        assert!(resolve_range(&half, date(2024, 2, 14)).is_err());

        let inverted = AttendanceQuery {
            from: Some(date(2024, 2, 1)),
            to: Some(date(2024, 1, 1)),
            ..AttendanceQuery::default()
        };
        assert!(resolve_range(&inverted, date(2024, 2, 14)).is_err());

        let bad_month = AttendanceQuery {
            month: Some(13),
            ..AttendanceQuery::default()
        };
        assert!(resolve_range(&bad_month, date(2024, 2, 14)).is_err());
    }

    #[tokio::test]
    async fn day_views_cover_every_date_and_flag_missing_punches() {
        let owner = staff(StaffRole::Staff);
        // Monday 2024-06-03 worked, Tuesday missing, Wednesday a holiday.
        let worked = finished_day(&owner, date(2024, 6, 3), 0, 10);
        let mut repo = MockAttendanceRepositoryTrait::new();
        let stored = vec![worked.clone()];
        repo.expect_find_days_in_range()
            .returning(move |_, _, _, _| Ok(stored.clone()));
        let stub = CalendarServiceStub::new(
            vec![HolidayCalendar::new(date(2024, 6, 5), "Foundation Day".into())],
            vec![],
        );
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://kintai@localhost/unused")
            .unwrap();

        let (views, days) = fetch_day_views(
            &repo,
            &stub.service(),
            &pool,
            &owner,
            (date(2024, 6, 3), date(2024, 6, 5)),
            date(2024, 6, 10),
        )
        .await
        .unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(views.len(), 3);
        assert_eq!(views[0].status, AttendanceStatus::LeftWork);
        assert_eq!(views[0].rest_minutes, 60);
        assert_eq!(views[0].work_minutes, Some(540));
        assert_eq!(views[1].status, AttendanceStatus::Error);
        assert_eq!(views[2].status, AttendanceStatus::None);
        assert_eq!(views[2].holiday_name.as_deref(), Some("Foundation Day"));
        assert_eq!(views[2].summary, "Holiday: Foundation Day");
    }

    #[test]
    fn summary_counts_work_days_and_overtime() {
        let owner = staff(StaffRole::Staff);
        // 00:00 to 10:00 UTC is 09:00 to 19:00 in Tokyo: one hour past 18:00.
        let days = vec![
            finished_day(&owner, date(2024, 6, 3), 0, 10),
            finished_day(&owner, date(2024, 6, 4), 0, 9),
        ];
        let set = CalendarSet::default();
        let views = build_day_views(
            &days,
            &owner,
            &set,
            (date(2024, 6, 3), date(2024, 6, 5)),
            date(2024, 6, 10),
        );
        let summary = summarize(
            (2024, 6),
            &views,
            &days,
            NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            chrono_tz::Asia::Tokyo,
        );
        assert_eq!(summary.work_days, 2);
        assert_eq!(summary.total_work_minutes, 540 + 480);
        assert_eq!(summary.total_rest_minutes, 120);
        assert_eq!(summary.overtime_minutes, 60);
        assert_eq!(summary.overtime_text, "1:00");
        assert_eq!(summary.error_days, 1);
    }

    #[test]
    fn csv_row_renders_local_clock_times() {
        let owner = staff(StaffRole::Staff);
        let day = finished_day(&owner, date(2024, 6, 3), 0, 10);
        let views = build_day_views(
            std::slice::from_ref(&day),
            &owner,
            &CalendarSet::default(),
            (date(2024, 6, 3), date(2024, 6, 3)),
            date(2024, 6, 10),
        );
        let row = csv_row(&owner, &views[0], &chrono_tz::Asia::Tokyo);
        assert_eq!(row.len(), CSV_HEADER.len());
        assert_eq!(row[2], "2024-06-03");
        assert_eq!(row[3], "left_work");
        assert_eq!(row[4], "09:00");
        assert_eq!(row[5], "19:00");
        assert_eq!(row[7], "540");
    }
}
