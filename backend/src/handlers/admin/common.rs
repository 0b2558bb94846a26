use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::{
    error::AppError, handlers::attendance_utils::ensure_range, types::StaffId, utils::time,
};

pub fn parse_date_value(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw {
        Some(value) => parse_date_value(value)
            .ok_or_else(|| {
                AppError::BadRequest(
                    "`from`/`to` must be a valid date (YYYY-MM-DD or RFC3339)".into(),
                )
            })
            .map(Some),
        None => Ok(None),
    }
}

pub fn parse_optional_staff_id(raw: Option<&str>) -> Result<Option<StaffId>, AppError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest("`staff_id` must be a UUID".into())),
        None => Ok(None),
    }
}

/// Parses both bounds; when only one is given the other stays open.
pub fn parse_date_filter(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), AppError> {
    let from = parse_optional_date(from)?;
    let to = parse_optional_date(to)?;
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(AppError::BadRequest(
                "`from` must be on or before `to`".into(),
            ));
        }
    }
    Ok((from, to))
}

/// Both bounds, or the month containing `today` when neither is given.
pub fn resolve_date_window(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), AppError> {
    let (from, to) = match parse_date_filter(from, to)? {
        (Some(from), Some(to)) => (from, to),
        (None, None) => {
            let (year, month) = time::year_month(today);
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
