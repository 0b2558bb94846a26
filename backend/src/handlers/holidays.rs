use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppError,
    models::holiday::{HolidayResponse, HolidayYearQuery, YearCalendarResponse},
    services::calendar::{contains, find_entry, normalize_date, CalendarEntry},
    state::AppState,
    utils::time,
};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct HolidayCheckQuery {
    /// A date or RFC 3339 timestamp; only the calendar date is used.
    pub date: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HolidayCheckResponse {
    pub date: NaiveDate,
    pub is_holiday: bool,
    pub is_company_holiday: bool,
    pub holiday_name: Option<String>,
    pub company_holiday_name: Option<String>,
}

pub async fn get_year_calendar(
    State(state): State<AppState>,
    Query(query): Query<HolidayYearQuery>,
) -> Result<Json<YearCalendarResponse>, AppError> {
    let (current_year, _) = time::year_month(state.today());
    let year = query.year.unwrap_or(current_year);
    if !(1900..=2999).contains(&year) {
        return Err(AppError::BadRequest("Invalid year".into()));
    }
    let set = state.calendars.load_year(year).await?;
    Ok(Json(YearCalendarResponse {
        year,
        holidays: set.holidays.into_iter().map(HolidayResponse::from).collect(),
        company_holidays: set
            .company_holidays
            .into_iter()
            .map(HolidayResponse::from)
            .collect(),
    }))
}

pub async fn check_holiday(
    State(state): State<AppState>,
    Query(query): Query<HolidayCheckQuery>,
) -> Result<Json<HolidayCheckResponse>, AppError> {
    let date = normalize_date(&query.date)
        .ok_or_else(|| AppError::BadRequest("`date` must start with YYYY-MM-DD".into()))?;
    let set = state.calendars.load_range(date, date).await?;
    let target = query.date.as_str();
    Ok(Json(HolidayCheckResponse {
        date,
        is_holiday: contains(&set.holidays, target),
        is_company_holiday: contains(&set.company_holidays, target),
        holiday_name: find_entry(&set.holidays, target).map(|h| h.name().to_string()),
        company_holiday_name: find_entry(&set.company_holidays, target)
            .map(|c| c.name().to_string()),
    }))
}
