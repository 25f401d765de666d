mod audit;
mod auth;
mod dashboard;
mod health;
mod state;

pub use state::AdminState;

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{application::error::ErrorReport, infra::assets};

use super::middleware::{log_responses, set_request_context};

pub fn build_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/", get(auth::admin_root))
        .route("/login", get(auth::admin_login).post(auth::admin_login_submit))
        .route(
            "/signup",
            get(auth::admin_signup).post(auth::admin_signup_submit),
        )
        .route(
            "/forgot-password",
            get(auth::admin_forgot_password).post(auth::admin_forgot_password_submit),
        )
        .route("/logout", post(auth::admin_logout))
        .route("/dashboard", get(dashboard::admin_dashboard))
        .route("/audit-trail", get(audit::admin_audit))
        .route("/audit-trail/export", get(audit::admin_audit_export))
        .route("/_health", get(health::admin_health))
        .route("/static/{*path}", get(assets::serve_admin))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn not_found() -> Response {
    let mut response = (StatusCode::NOT_FOUND, "Not found").into_response();
    ErrorReport::from_message("infra::http::admin::not_found", "No route matched")
        .attach(&mut response);
    response
}
