//! Holiday and company-holiday lookups.
//!
//! Calendar lists are small (tens to low hundreds of entries), so lookups are
//! plain linear scans.

use chrono::{Datelike, NaiveDate, Weekday};

/// A dated, named entry of a holiday calendar.
pub trait CalendarEntry {
    fn date(&self) -> NaiveDate;
    fn name(&self) -> &str;
}

/// Normalizes a date or timestamp string to its calendar date.
///
/// Any time or zone suffix after the leading `YYYY-MM-DD` is ignored, so
/// `"2024-01-15T09:30:00+09:00"` and `"2024-01-15"` both yield 2024-01-15.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split(|c: char| c == 'T' || c == 't' || c == ' ')
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Returns the first entry dated on `target`.
pub fn find_entry<'a, E: CalendarEntry>(entries: &'a [E], target: &str) -> Option<&'a E> {
    let date = normalize_date(target)?;
    find_entry_on(entries, date)
}

pub fn find_entry_on<E: CalendarEntry>(entries: &[E], date: NaiveDate) -> Option<&E> {
    entries.iter().find(|entry| entry.date() == date)
}

/// Whether any entry is dated on `target`.
pub fn contains<E: CalendarEntry>(entries: &[E], target: &str) -> bool {
    find_entry(entries, target).is_some()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The two calendars consulted when classifying a day.
pub struct Calendars<'a, H, C> {
    pub holidays: &'a [H],
    pub company_holidays: &'a [C],
}

impl<'a, H: CalendarEntry, C: CalendarEntry> Calendars<'a, H, C> {
    pub fn new(holidays: &'a [H], company_holidays: &'a [C]) -> Self {
        Self {
            holidays,
            company_holidays,
        }
    }

    pub fn holiday_on(&self, date: NaiveDate) -> Option<&'a H> {
        find_entry_on(self.holidays, date)
    }

    pub fn company_holiday_on(&self, date: NaiveDate) -> Option<&'a C> {
        find_entry_on(self.company_holidays, date)
    }

    /// Whether either calendar lists the date.
    pub fn is_listed(&self, date: NaiveDate) -> bool {
        self.holiday_on(date).is_some() || self.company_holiday_on(date).is_some()
    }
}
