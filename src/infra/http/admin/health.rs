use axum::{extract::State, response::Response};

use super::super::upstream_health_response;
use super::AdminState;

pub(super) async fn admin_health(State(state): State<AdminState>) -> Response {
    upstream_health_response(state.health.ping().await)
}
