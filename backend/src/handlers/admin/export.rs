use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppError,
    handlers::{
        attendance::ExportResponse,
        attendance_utils::{build_day_views, csv_row, CSV_HEADER},
    },
    models::staff::Staff,
    repositories::{AttendanceRepository, AttendanceRepositoryTrait, Repository, StaffRepository},
    state::AppState,
    utils::csv::render_csv,
};

use super::common::{parse_optional_staff_id, resolve_date_window};

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct ExportQuery {
    pub staff_id: Option<String>,
    pub from: Option<String>, // YYYY-MM-DD
    pub to: Option<String>,   // YYYY-MM-DD
}

/// Exports one row per staff member and calendar date, staff ordered by username.
pub async fn export_data(
    State(state): State<AppState>,
    Extension(admin): Extension<Staff>,
    Query(q): Query<ExportQuery>,
) -> Result<Json<ExportResponse>, AppError> {
    let staff_id = parse_optional_staff_id(q.staff_id.as_deref())?;
    let today = state.today();
    let (from, to) = resolve_date_window(q.from.as_deref(), q.to.as_deref(), today)?;

    let staff_repo = StaffRepository::new();
    let targets: Vec<Staff> = match staff_id {
        Some(id) => vec![staff_repo.find_by_id(&state.pool, id).await?],
        None => staff_repo.find_all(&state.pool).await?,
    };
    let set = state.calendars.load_range(from, to).await?;
    let repo = AttendanceRepository::new();
    let tz = state.time_zone();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for staff in &targets {
        let days = repo
            .find_days_in_range(&state.pool, staff.id, from, to)
            .await?;
        rows.extend(
            build_day_views(&days, staff, &set, (from, to), today)
                .iter()
                .map(|view| csv_row(staff, view, tz)),
        );
    }
    let csv_data = render_csv(&CSV_HEADER, rows)?;
    tracing::info!(
        admin_id = %admin.id,
        staff_count = targets.len(),
        %from,
        %to,
        "attendance exported"
    );

    Ok(Json(ExportResponse {
        csv_data,
        filename: format!("attendance_export_{}_{}.csv", from, to),
    }))
}
