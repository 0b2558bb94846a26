//! Overtime accumulation against the scheduled end of the working day.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::attendance::Attendance;

/// The inputs one record contributes to the overtime total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkEnd {
    pub work_date: Option<NaiveDate>,
    pub end_time: Option<DateTime<Utc>>,
}

impl From<&Attendance> for WorkEnd {
    fn from(attendance: &Attendance) -> Self {
        Self {
            work_date: Some(attendance.work_date),
            end_time: attendance.end_time,
        }
    }
}

/// The scheduled end of `date` in `tz`, as an instant.
///
/// A local time skipped by a DST gap falls back to the same wall time read as UTC.
pub fn scheduled_end_on(date: NaiveDate, scheduled_end: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let local = date.and_time(scheduled_end);
    match tz.from_local_datetime(&local) {
        LocalResult::Single(value) => value.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => Utc.from_utc_datetime(&local),
    }
}

/// Minutes worked past `scheduled_end` by one record.
pub fn overtime_minutes(record: &WorkEnd, scheduled_end: NaiveTime, tz: Tz) -> i64 {
    let Some(end) = record.end_time else {
        return 0;
    };
    let date = record
        .work_date
        .unwrap_or_else(|| end.with_timezone(&tz).date_naive());
    let boundary = scheduled_end_on(date, scheduled_end, tz);
    (end - boundary).num_minutes().max(0)
}

/// Total overtime minutes across `records`.
pub fn total_overtime_minutes<'a, I>(records: I, scheduled_end: NaiveTime, tz: Tz) -> i64
where
    I: IntoIterator<Item = &'a WorkEnd>,
{
    records
        .into_iter()
        .map(|record| overtime_minutes(record, scheduled_end, tz))
        .sum()
}

/// Renders minutes as `H:MM`. Zero and negative values render as `0:00`.
pub fn format_minutes_to_hhmm(minutes: i64) -> String {
    let minutes = minutes.max(0);
    format!("{}:{:02}", minutes / 60, minutes % 60)
}
