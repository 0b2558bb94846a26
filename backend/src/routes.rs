use axum::{
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Config, docs::ApiDoc, handlers, middleware as app_middleware, state::AppState,
};

fn cors_layer(config: &Config) -> CorsLayer {
    let origin = if config.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allow_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(24 * 60 * 60))
}

/// Builds the full application router with its middleware stack.
pub fn build_router(state: AppState) -> Router {
    // Public routes (no auth)
    let public_routes =
        Router::new().route("/api/auth/login", post(handlers::auth::login));

    // Staff routes (auth required)
    let user_routes = Router::new()
        .route("/api/me", get(handlers::auth::me))
        .route(
            "/api/attendance/clock-in",
            post(handlers::attendance::clock_in),
        )
        .route(
            "/api/attendance/clock-out",
            post(handlers::attendance::clock_out),
        )
        .route(
            "/api/attendance/rest-start",
            post(handlers::attendance::rest_start),
        )
        .route(
            "/api/attendance/rest-end",
            post(handlers::attendance::rest_end),
        )
        .route(
            "/api/attendance/status",
            get(handlers::attendance::get_status),
        )
        .route(
            "/api/attendance/me",
            get(handlers::attendance::get_my_attendance),
        )
        .route(
            "/api/attendance/me/summary",
            get(handlers::attendance::get_my_summary),
        )
        .route(
            "/api/attendance/export",
            get(handlers::attendance::export_my_attendance),
        )
        .route(
            "/api/change-requests",
            post(handlers::change_requests::create_change_request),
        )
        .route(
            "/api/change-requests/me",
            get(handlers::change_requests::get_my_change_requests),
        )
        .route(
            "/api/change-requests/{id}",
            delete(handlers::change_requests::cancel_change_request),
        )
        .route("/api/holidays", get(handlers::holidays::get_year_calendar))
        .route(
            "/api/holidays/check",
            get(handlers::holidays::check_holiday),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            app_middleware::auth,
        ));

    // Admin routes (auth + admin role)
    let admin_routes = Router::new()
        .route(
            "/api/admin/staff",
            get(handlers::admin::list_staff).post(handlers::admin::create_staff),
        )
        .route("/api/admin/staff/{id}", put(handlers::admin::update_staff))
        .route(
            "/api/admin/attendance",
            get(handlers::admin::list_attendance).put(handlers::admin::upsert_attendance),
        )
        .route(
            "/api/admin/change-requests",
            get(handlers::admin::list_change_requests),
        )
        .route(
            "/api/admin/change-requests/{id}",
            get(handlers::admin::get_change_request),
        )
        .route(
            "/api/admin/change-requests/{id}/approve",
            put(handlers::admin::approve_change_request),
        )
        .route(
            "/api/admin/change-requests/{id}/reject",
            put(handlers::admin::reject_change_request),
        )
        .route(
            "/api/admin/holiday-calendars",
            get(handlers::admin::list_holiday_calendars)
                .post(handlers::admin::create_holiday_calendar),
        )
        .route(
            "/api/admin/holiday-calendars/{id}",
            put(handlers::admin::update_holiday_calendar)
                .delete(handlers::admin::delete_holiday_calendar),
        )
        .route(
            "/api/admin/company-holiday-calendars",
            get(handlers::admin::list_company_holiday_calendars)
                .post(handlers::admin::create_company_holiday_calendar),
        )
        .route(
            "/api/admin/company-holiday-calendars/{id}",
            put(handlers::admin::update_company_holiday_calendar)
                .delete(handlers::admin::delete_company_holiday_calendar),
        )
        .route("/api/admin/export", get(handlers::admin::export_data))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            app_middleware::auth_admin,
        ));

    let docs = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi());

    // Compose app with shared layers and shared state
    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .merge(docs)
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(app_middleware::request_id))
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(app_middleware::log_error_responses))
                .layer(cors_layer(&state.config)),
        )
        .with_state(state)
}

