use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    models::staff::Staff,
    repositories::StaffRepository,
    state::AppState,
    types::StaffId,
    utils::jwt::verify_access_token,
};

/// Requires a valid bearer token and stores the [`Staff`] in request extensions.
pub async fn auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let staff = authenticate_request(request.headers(), &state).await?;
    request.extensions_mut().insert(staff);
    Ok(next.run(request).await)
}

/// Like [`auth`], and additionally requires an administrator role.
pub async fn auth_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let staff = authenticate_request(request.headers(), &state).await?;
    if !staff.is_admin() {
        tracing::warn!(staff_id = %staff.id, role = staff.role.as_str(), "admin route denied");
        return Err(AppError::Forbidden("Administrator role required".into()));
    }
    request.extensions_mut().insert(staff);
    Ok(next.run(request).await)
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim_start();
    (!token.is_empty()).then_some(token)
}

async fn authenticate_request(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<Staff, AppError> {
    let unauthorized = || AppError::Unauthorized("Authentication required".into());

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer_token)
        .ok_or_else(unauthorized)?;

    let claims =
        verify_access_token(token, &state.config.jwt_secret).map_err(|_| unauthorized())?;
    let staff_id: StaffId = claims.sub.parse().map_err(|_| unauthorized())?;

    let staff = StaffRepository::new()
        .find_optional(&state.pool, staff_id)
        .await?
        .filter(|staff| staff.enabled)
        .ok_or_else(unauthorized)?;

    Ok(staff)
}
