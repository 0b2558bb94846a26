//! Maintenance of the public holiday and company holiday calendars.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        holiday::{
            CompanyHolidayCalendar, CreateHolidayPayload, HolidayCalendar, HolidayResponse,
            HolidayYearQuery,
        },
        staff::Staff,
    },
    repositories::{CompanyHolidayCalendarRepository, HolidayCalendarRepository, Repository},
    services::calendar_service::year_bounds,
    state::AppState,
    types::{CompanyHolidayCalendarId, HolidayCalendarId},
};

fn validated(payload: CreateHolidayPayload) -> Result<CreateHolidayPayload, AppError> {
    payload.validate()?;
    Ok(CreateHolidayPayload {
        name: payload.name.trim().to_string(),
        ..payload
    })
}

fn parse_id<T: std::str::FromStr>(raw: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid calendar entry ID".into()))
}

pub async fn list_holiday_calendars(
    State(state): State<AppState>,
    Query(query): Query<HolidayYearQuery>,
) -> Result<Json<Vec<HolidayResponse>>, AppError> {
    let repo = HolidayCalendarRepository::new();
    let entries = match query.year {
        Some(year) => {
            let (from, to) = year_bounds(year)
                .map_err(|_| AppError::BadRequest("Invalid year".into()))?;
            repo.list_between(&state.pool, from, to).await?
        }
        None => repo.find_all(&state.pool).await?,
    };
    Ok(Json(entries.into_iter().map(HolidayResponse::from).collect()))
}

pub async fn create_holiday_calendar(
    State(state): State<AppState>,
    Extension(admin): Extension<Staff>,
    Json(payload): Json<CreateHolidayPayload>,
) -> Result<(StatusCode, Json<HolidayResponse>), AppError> {
    let payload = validated(payload)?;
    let entry = HolidayCalendar::new(payload.holiday_date, payload.name);
    let created = HolidayCalendarRepository::new()
        .create(&state.pool, &entry)
        .await?;
    tracing::info!(admin_id = %admin.id, date = %created.holiday_date, "holiday added");
    Ok((StatusCode::CREATED, Json(HolidayResponse::from(created))))
}

pub async fn update_holiday_calendar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CreateHolidayPayload>,
) -> Result<Json<HolidayResponse>, AppError> {
    let id: HolidayCalendarId = parse_id(&id)?;
    let payload = validated(payload)?;
    let repo = HolidayCalendarRepository::new();
    let mut entry = repo.find_by_id(&state.pool, id).await?;
    entry.holiday_date = payload.holiday_date;
    entry.name = payload.name;
    entry.updated_at = Utc::now();
    let updated = repo.update(&state.pool, &entry).await?;
    Ok(Json(HolidayResponse::from(updated)))
}

pub async fn delete_holiday_calendar(
    State(state): State<AppState>,
    Extension(admin): Extension<Staff>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id: HolidayCalendarId = parse_id(&id)?;
    HolidayCalendarRepository::new()
        .delete(&state.pool, id)
        .await?;
    tracing::info!(admin_id = %admin.id, holiday_id = %id, "holiday removed");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_company_holiday_calendars(
    State(state): State<AppState>,
    Query(query): Query<HolidayYearQuery>,
) -> Result<Json<Vec<HolidayResponse>>, AppError> {
    let repo = CompanyHolidayCalendarRepository::new();
    let entries = match query.year {
        Some(year) => {
            let (from, to) = year_bounds(year)
                .map_err(|_| AppError::BadRequest("Invalid year".into()))?;
            repo.list_between(&state.pool, from, to).await?
        }
        None => repo.find_all(&state.pool).await?,
    };
    Ok(Json(entries.into_iter().map(HolidayResponse::from).collect()))
}

pub async fn create_company_holiday_calendar(
    State(state): State<AppState>,
    Extension(admin): Extension<Staff>,
    Json(payload): Json<CreateHolidayPayload>,
) -> Result<(StatusCode, Json<HolidayResponse>), AppError> {
    let payload = validated(payload)?;
    let entry = CompanyHolidayCalendar::new(payload.holiday_date, payload.name);
    let created = CompanyHolidayCalendarRepository::new()
        .create(&state.pool, &entry)
        .await?;
    tracing::info!(admin_id = %admin.id, date = %created.holiday_date, "company holiday added");
    Ok((StatusCode::CREATED, Json(HolidayResponse::from(created))))
}

pub async fn update_company_holiday_calendar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CreateHolidayPayload>,
) -> Result<Json<HolidayResponse>, AppError> {
    let id: CompanyHolidayCalendarId = parse_id(&id)?;
    let payload = validated(payload)?;
    let repo = CompanyHolidayCalendarRepository::new();
    let mut entry = repo.find_by_id(&state.pool, id).await?;
    entry.holiday_date = payload.holiday_date;
    entry.name = payload.name;
    entry.updated_at = Utc::now();
    let updated = repo.update(&state.pool, &entry).await?;
    Ok(Json(HolidayResponse::from(updated)))
}

pub async fn delete_company_holiday_calendar(
    State(state): State<AppState>,
    Extension(admin): Extension<Staff>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id: CompanyHolidayCalendarId = parse_id(&id)?;
    CompanyHolidayCalendarRepository::new()
        .delete(&state.pool, id)
        .await?;
    tracing::info!(admin_id = %admin.id, company_holiday_id = %id, "company holiday removed");
    Ok(StatusCode::NO_CONTENT)
}
