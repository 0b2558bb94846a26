//! Human-readable one-line summary of an attendance day.

use chrono::NaiveDate;

use crate::models::attendance::Attendance;
use crate::services::calendar::{CalendarEntry, Calendars};

const SEPARATOR: &str = " / ";

/// Joins the labels that apply to `date`: calendar names, flags, then remarks.
///
/// Returns an empty string when nothing applies.
pub fn describe_day<H: CalendarEntry, C: CalendarEntry>(
    date: NaiveDate,
    attendance: Option<&Attendance>,
    calendars: &Calendars<'_, H, C>,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(holiday) = calendars.holiday_on(date) {
        parts.push(format!("Holiday: {}", holiday.name()));
    }
    if let Some(closed) = calendars.company_holiday_on(date) {
        parts.push(format!("Company holiday: {}", closed.name()));
    }

    if let Some(attendance) = attendance {
        let flags = attendance.flags();
        let labels = [
            (flags.absent, "Absent"),
            (flags.paid_holiday, "Paid holiday"),
            (flags.special_holiday, "Special holiday"),
            (flags.deemed_holiday, "Deemed holiday"),
            (flags.go_directly, "Go directly"),
            (flags.return_directly, "Return directly"),
        ];
        parts.extend(
            labels
                .into_iter()
                .filter(|(set, _)| *set)
                .map(|(_, label)| label.to_string()),
        );

        if let Some(substitute) = attendance.substitute_holiday_date {
            parts.push(format!("Substitute for {substitute}"));
        }
        if let Some(remarks) = attendance
            .remarks
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
        {
            parts.push(remarks.to_string());
        }
    }

    parts.join(SEPARATOR)
}
