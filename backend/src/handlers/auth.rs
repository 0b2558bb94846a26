use axum::{
    extract::{Extension, State},
    Json,
};

use crate::{
    error::AppError,
    models::staff::{LoginRequest, LoginResponse, Staff, StaffResponse},
    repositories::StaffRepository,
    state::AppState,
    utils::{jwt::create_access_token, password::verify_password},
};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let staff = StaffRepository::new()
        .find_by_username(&state.pool, payload.username.trim())
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    if !verify_password(&payload.password, &staff.password_hash)? {
        tracing::info!(username = %staff.username, "login rejected: wrong password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }
    if !staff.enabled {
        tracing::info!(staff_id = %staff.id, "login rejected: account disabled");
        return Err(AppError::Forbidden("Account is disabled".into()));
    }

    let access_token = create_access_token(
        &staff,
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;
    tracing::info!(staff_id = %staff.id, "staff logged in");

    Ok(Json(LoginResponse {
        access_token,
        staff: StaffResponse::from(staff),
    }))
}

pub async fn me(Extension(staff): Extension<Staff>) -> Json<StaffResponse> {
    Json(StaffResponse::from(staff))
}
