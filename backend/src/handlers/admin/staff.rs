use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppError,
    models::staff::{CreateStaff, Staff, StaffResponse, UpdateStaff},
    repositories::{Repository, StaffRepository},
    state::AppState,
    types::StaffId,
    utils::password::hash_password,
};

pub async fn list_staff(
    State(state): State<AppState>,
) -> Result<Json<Vec<StaffResponse>>, AppError> {
    let staff = StaffRepository::new().find_all(&state.pool).await?;
    Ok(Json(staff.into_iter().map(StaffResponse::from).collect()))
}

pub async fn create_staff(
    State(state): State<AppState>,
    Extension(admin): Extension<Staff>,
    Json(payload): Json<CreateStaff>,
) -> Result<(StatusCode, Json<StaffResponse>), AppError> {
    payload.validate()?;
    let repo = StaffRepository::new();
    if repo
        .find_by_username(&state.pool, &payload.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Username already exists".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let mut staff = Staff::new(
        payload.username,
        password_hash,
        payload.full_name.trim().to_string(),
        payload.role,
        payload.work_type,
    );
    staff.email = payload.email;
    staff.usage_start_date = payload.usage_start_date;

    let created = repo.create(&state.pool, &staff).await?;
    tracing::info!(
        admin_id = %admin.id,
        staff_id = %created.id,
        role = created.role.as_str(),
        "staff account created"
    );
    Ok((StatusCode::CREATED, Json(StaffResponse::from(created))))
}

/// Applies the present fields of `payload` onto `staff`.
fn apply_update(staff: &mut Staff, payload: UpdateStaff) {
    if let Some(full_name) = payload.full_name {
        staff.full_name = full_name.trim().to_string();
    }
    if payload.email.is_some() {
        staff.email = payload.email;
    }
    if let Some(role) = payload.role {
        staff.role = role;
    }
    if let Some(work_type) = payload.work_type {
        staff.work_type = work_type;
    }
    if payload.usage_start_date.is_some() {
        staff.usage_start_date = payload.usage_start_date;
    }
    if let Some(enabled) = payload.enabled {
        staff.enabled = enabled;
    }
}

pub async fn update_staff(
    State(state): State<AppState>,
    Extension(admin): Extension<Staff>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStaff>,
) -> Result<Json<StaffResponse>, AppError> {
    payload.validate()?;
    let id: StaffId = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid staff ID".into()))?;
    if id == admin.id && payload.enabled == Some(false) {
        return Err(AppError::BadRequest(
            "Administrators cannot disable their own account".into(),
        ));
    }

    let repo = StaffRepository::new();
    let mut staff = repo.find_by_id(&state.pool, id).await?;
    apply_update(&mut staff, payload);
    staff.updated_at = Utc::now();
    let updated = repo.update(&state.pool, &staff).await?;
    tracing::info!(admin_id = %admin.id, staff_id = %updated.id, "staff account updated");

    Ok(Json(StaffResponse::from(updated)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::staff::{StaffRole, WorkType};
    use chrono::NaiveDate;

    #[test]
    fn apply_update_only_touches_present_fields() {
        let mut staff = Staff::new(
            "hanako".into(),
            "hash".into(),
            "Hanako".into(),
            StaffRole::Staff,
            WorkType::Weekday,
        );
        let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        apply_update(
            &mut staff,
            UpdateStaff {
                full_name: Some("  Hanako Sato ".into()),
                work_type: Some(WorkType::Shift),
                usage_start_date: Some(start),
                ..UpdateStaff::default()
            },
        );
        assert_eq!(staff.full_name, "Hanako Sato");
        assert_eq!(staff.work_type, WorkType::Shift);
        assert_eq!(staff.usage_start_date, Some(start));
        assert_eq!(staff.role, StaffRole::Staff);
        assert!(staff.enabled);
    }
}
