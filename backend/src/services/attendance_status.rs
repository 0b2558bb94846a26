//! Classification of a staff member's day into an attendance status.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::attendance::AttendanceDay;
use crate::models::rest::RestInterval;
use crate::models::staff::Staff;
use crate::services::calendar::{is_weekend, CalendarEntry, Calendars};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Nothing to report: a day off, a future day, or no staff context.
    None,
    /// A past business day without any punch.
    Error,
    BeforeWork,
    Working,
    Resting,
    LeftWork,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::None => "none",
            AttendanceStatus::Error => "error",
            AttendanceStatus::BeforeWork => "before_work",
            AttendanceStatus::Working => "working",
            AttendanceStatus::Resting => "resting",
            AttendanceStatus::LeftWork => "left_work",
            AttendanceStatus::Late => "late",
        }
    }
}

/// Derives the status of `date` for `staff`.
///
/// `today` is the current date in the service time zone. Calendar membership
/// is checked before a missing record is reported as [`AttendanceStatus::Error`].
pub fn classify<H: CalendarEntry, C: CalendarEntry>(
    day: Option<&AttendanceDay>,
    staff: Option<&Staff>,
    calendars: &Calendars<'_, H, C>,
    date: NaiveDate,
    today: NaiveDate,
) -> AttendanceStatus {
    let Some(staff) = staff else {
        return AttendanceStatus::None;
    };

    match day {
        None => classify_missing(staff, calendars, date, today),
        Some(day) => classify_recorded(day),
    }
}

fn classify_missing<H: CalendarEntry, C: CalendarEntry>(
    staff: &Staff,
    calendars: &Calendars<'_, H, C>,
    date: NaiveDate,
    today: NaiveDate,
) -> AttendanceStatus {
    if date >= today {
        return AttendanceStatus::None;
    }
    if staff
        .usage_start_date
        .is_some_and(|usage_start| date < usage_start)
    {
        return AttendanceStatus::None;
    }
    if is_day_off(staff, calendars, date) {
        return AttendanceStatus::None;
    }
    AttendanceStatus::Error
}

fn classify_recorded(day: &AttendanceDay) -> AttendanceStatus {
    let attendance = &day.attendance;
    match (attendance.start_time, attendance.end_time) {
        (Some(_), Some(_)) => AttendanceStatus::LeftWork,
        _ if last_rest(&day.rest_intervals()).is_some_and(|rest| rest.is_open()) => {
            AttendanceStatus::Resting
        }
        (Some(_), None) => AttendanceStatus::Working,
        _ => AttendanceStatus::BeforeWork,
    }
}

/// Whether `date` is a day off for `staff`.
///
/// Shift workers have no fixed weekend; only calendar entries count for them.
pub fn is_day_off<H: CalendarEntry, C: CalendarEntry>(
    staff: &Staff,
    calendars: &Calendars<'_, H, C>,
    date: NaiveDate,
) -> bool {
    if calendars.is_listed(date) {
        return true;
    }
    !staff.is_shift_worker() && is_weekend(date)
}

/// The most recently added rest, ignoring empty placeholders.
pub fn last_rest(rests: &[RestInterval]) -> Option<&RestInterval> {
    rests.iter().filter(|rest| !rest.is_empty()).last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::Attendance;
    use crate::models::rest::Rest;
    use crate::models::staff::{StaffRole, WorkType};
    use crate::services::calendar::tests::Entry;
    use crate::types::RestId;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, h, m, 0).unwrap()
    }

    fn staff(work_type: WorkType) -> Staff {
        Staff::new(
            "taro".into(),
            "hash".into(),
            "Taro".into(),
            StaffRole::Staff,
            work_type,
        )
    }

    fn day(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        rests: &[RestInterval],
    ) -> AttendanceDay {
        let mut attendance = Attendance::new(staff(WorkType::Weekday).id, date(2024, 6, 3), at(0, 0));
        attendance.start_time = start;
        attendance.end_time = end;
        let rests = rests
            .iter()
            .enumerate()
            .map(|(idx, interval)| Rest {
                id: RestId::new(),
                attendance_id: attendance.id,
                start_time: interval.start_time,
                end_time: interval.end_time,
                position: idx as i32,
                created_at: at(0, 0),
                updated_at: at(0, 0),
            })
            .collect();
        AttendanceDay::new(attendance, rests)
    }

    fn no_calendars() -> (Vec<Entry>, Vec<Entry>) {
        (Vec::new(), Vec::new())
    }

    // 2024-06-05 is a Wednesday; today is set after it.
    const TODAY: (i32, u32, u32) = (2024, 6, 10);

    fn today() -> NaiveDate {
        date(TODAY.0, TODAY.1, TODAY.2)
    }

    #[test]
    fn no_staff_context_is_none() {
        let (h, c) = no_calendars();
        let calendars = Calendars::new(&h, &c);
        let status = classify(None, None, &calendars, date(2024, 6, 5), today());
        assert_eq!(status, AttendanceStatus::None);

        let recorded = day(Some(at(0, 0)), Some(at(9, 0)), &[]);
        let status = classify(Some(&recorded), None, &calendars, date(2024, 6, 5), today());
        assert_eq!(status, AttendanceStatus::None);
    }

    #[test]
    fn missing_punch_on_past_business_day_is_error() {
        let (h, c) = no_calendars();
        let calendars = Calendars::new(&h, &c);
        let staff = staff(WorkType::Weekday);
        let status = classify(None, Some(&staff), &calendars, date(2024, 6, 5), today());
        assert_eq!(status, AttendanceStatus::Error);
    }

    #[test]
    fn today_and_future_dates_are_never_errors() {
        let (h, c) = no_calendars();
        let calendars = Calendars::new(&h, &c);
        let staff = staff(WorkType::Weekday);
        for offset in 0..21 {
            let target = today() + Duration::days(offset);
            let status = classify(None, Some(&staff), &calendars, target, today());
            assert_eq!(status, AttendanceStatus::None, "date {target}");
        }
    }

    #[test]
    fn dates_before_usage_start_are_never_errors() {
        let holidays = vec![Entry::new(2024, 5, 6, "Substitute holiday")];
        let company: Vec<Entry> = Vec::new();
        let calendars = Calendars::new(&holidays, &company);
        let mut staff = staff(WorkType::Shift);
        staff.usage_start_date = Some(date(2024, 6, 1));

        let mut cursor = date(2024, 5, 1);
        while cursor < date(2024, 6, 1) {
            let status = classify(None, Some(&staff), &calendars, cursor, today());
            assert_eq!(status, AttendanceStatus::None, "date {cursor}");
            cursor = cursor.succ_opt().unwrap();
        }

        // usage start itself is a regular day again (2024-06-03 is a Monday)
        let status = classify(None, Some(&staff), &calendars, date(2024, 6, 3), today());
        assert_eq!(status, AttendanceStatus::Error);
    }

    #[test]
    fn weekends_are_days_off_for_weekday_staff() {
        let (h, c) = no_calendars();
        let calendars = Calendars::new(&h, &c);
        let staff = staff(WorkType::Weekday);
        // 2024-06-01 Saturday, 2024-06-02 Sunday
        for target in [date(2024, 6, 1), date(2024, 6, 2)] {
            let status = classify(None, Some(&staff), &calendars, target, today());
            assert_eq!(status, AttendanceStatus::None);
        }
    }

    #[test]
    fn shift_staff_have_no_weekend_exemption() {
        let (h, c) = no_calendars();
        let calendars = Calendars::new(&h, &c);
        let staff = staff(WorkType::Shift);
        let status = classify(None, Some(&staff), &calendars, date(2024, 6, 1), today());
        assert_eq!(status, AttendanceStatus::Error);
    }

    #[test]
    fn calendar_days_take_precedence_over_missing_punch() {
        let holidays = vec![Entry::new(2024, 6, 4, "Founders' Day")];
        let company = vec![Entry::new(2024, 6, 6, "Inventory")];
        let calendars = Calendars::new(&holidays, &company);

        for work_type in [WorkType::Weekday, WorkType::Shift] {
            let staff = staff(work_type);
            for target in [date(2024, 6, 4), date(2024, 6, 6)] {
                let status = classify(None, Some(&staff), &calendars, target, today());
                assert_eq!(status, AttendanceStatus::None);
            }
        }
    }

    #[test]
    fn started_and_ended_is_left_work() {
        let (h, c) = no_calendars();
        let calendars = Calendars::new(&h, &c);
        let staff = staff(WorkType::Weekday);
        let open_rest = RestInterval::new(Some(at(3, 0)), None);
        for rests in [vec![], vec![open_rest]] {
            let recorded = day(Some(at(0, 0)), Some(at(9, 0)), &rests);
            let status = classify(
                Some(&recorded),
                Some(&staff),
                &calendars,
                date(2024, 6, 3),
                today(),
            );
            assert_eq!(status, AttendanceStatus::LeftWork);
        }
    }

    #[test]
    fn open_last_rest_is_resting() {
        let (h, c) = no_calendars();
        let calendars = Calendars::new(&h, &c);
        let staff = staff(WorkType::Weekday);
        let rests = [
            RestInterval::new(Some(at(1, 0)), Some(at(1, 15))),
            RestInterval::new(Some(at(3, 0)), None),
            RestInterval::default(),
        ];
        let recorded = day(Some(at(0, 0)), None, &rests);
        let status = classify(
            Some(&recorded),
            Some(&staff),
            &calendars,
            date(2024, 6, 3),
            today(),
        );
        assert_eq!(status, AttendanceStatus::Resting);
    }

    #[test]
    fn closed_rests_mean_working() {
        let (h, c) = no_calendars();
        let calendars = Calendars::new(&h, &c);
        let staff = staff(WorkType::Weekday);
        let rests = [RestInterval::new(Some(at(3, 0)), Some(at(4, 0)))];
        let recorded = day(Some(at(0, 0)), None, &rests);
        let status = classify(
            Some(&recorded),
            Some(&staff),
            &calendars,
            date(2024, 6, 3),
            today(),
        );
        assert_eq!(status, AttendanceStatus::Working);
    }

    #[test]
    fn empty_record_is_before_work() {
        let (h, c) = no_calendars();
        let calendars = Calendars::new(&h, &c);
        let staff = staff(WorkType::Weekday);
        let recorded = day(None, None, &[]);
        let status = classify(
            Some(&recorded),
            Some(&staff),
            &calendars,
            date(2024, 6, 3),
            today(),
        );
        assert_eq!(status, AttendanceStatus::BeforeWork);
    }

    #[test]
    fn last_rest_skips_empty_placeholders() {
        let closed = RestInterval::new(Some(at(1, 0)), Some(at(1, 30)));
        let rests = [closed, RestInterval::default(), RestInterval::default()];
        assert_eq!(last_rest(&rests), Some(&closed));
        assert_eq!(last_rest(&[RestInterval::default()]), None);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_value(AttendanceStatus::LeftWork).unwrap();
        assert_eq!(json, serde_json::json!("left_work"));
        assert_eq!(AttendanceStatus::BeforeWork.as_str(), "before_work");
    }
}
