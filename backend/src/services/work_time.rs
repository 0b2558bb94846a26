//! Rest and work duration arithmetic.

use chrono::{DateTime, Utc};

use crate::models::attendance::Attendance;
use crate::models::rest::RestInterval;

fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_minutes().max(0)
}

/// Minutes spent in closed rests. Open rests and empty placeholders count as zero.
pub fn total_rest_minutes(rests: &[RestInterval]) -> i64 {
    rests
        .iter()
        .filter_map(|rest| match (rest.start_time, rest.end_time) {
            (Some(start), Some(end)) => Some(minutes_between(start, end)),
            _ => None,
        })
        .sum()
}

/// Worked minutes net of rests, or `None` until both punches exist.
pub fn total_work_minutes(attendance: &Attendance, rests: &[RestInterval]) -> Option<i64> {
    let start = attendance.start_time?;
    let end = attendance.end_time?;
    Some((minutes_between(start, end) - total_rest_minutes(rests)).max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StaffId;
    use chrono::{NaiveDate, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, h, m, 0).unwrap()
    }

    fn attendance(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Attendance {
        let mut record = Attendance::new(
            StaffId::new(),
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            at(0, 0),
        );
        record.start_time = start;
        record.end_time = end;
        record
    }

    #[test]
    fn rest_minutes_skip_open_and_empty_rests() {
        let rests = [
            RestInterval::new(Some(at(3, 0)), Some(at(3, 45))),
            RestInterval::default(),
            RestInterval::new(Some(at(6, 0)), Some(at(6, 15))),
            RestInterval::new(Some(at(7, 0)), None),
        ];
        assert_eq!(total_rest_minutes(&rests), 60);
        assert_eq!(total_rest_minutes(&[]), 0);
    }

    #[test]
    fn inverted_rest_contributes_nothing() {
        let rests = [RestInterval::new(Some(at(4, 0)), Some(at(3, 0)))];
        assert_eq!(total_rest_minutes(&rests), 0);
    }

    #[test]
    fn work_minutes_subtract_rests() {
        let record = attendance(Some(at(0, 0)), Some(at(9, 0)));
        let rests = [RestInterval::new(Some(at(3, 0)), Some(at(4, 0)))];
        assert_eq!(total_work_minutes(&record, &rests), Some(480));
    }

    #[test]
    fn work_minutes_need_both_punches() {
        assert_eq!(total_work_minutes(&attendance(Some(at(0, 0)), None), &[]), None);
        assert_eq!(total_work_minutes(&attendance(None, None), &[]), None);
    }

    #[test]
    fn work_minutes_never_negative() {
        let record = attendance(Some(at(0, 0)), Some(at(1, 0)));
        let rests = [RestInterval::new(Some(at(0, 0)), Some(at(3, 0)))];
        assert_eq!(total_work_minutes(&record, &rests), Some(0));
    }
}
