//! Liveness endpoint, reachable without a session

use super::types::HealthResponse;
use crate::AppState;
use axum::{extract::State, response::Json};

/// Report liveness plus the portal instance behind it
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    summary = "Health check",
    description = "Liveness of the portal. Excluded from the session gate, so it never touches the identity provider.",
    responses(
        (status = 200, description = "Portal is serving", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let directory = &state.portal.portal;

    Json(HealthResponse {
        status: "healthy".to_string(),
        portal: directory.title.clone(),
        links: directory.systems.len() + directory.dashboards.len(),
        cookie_namespace: state.identity.cookie_namespace().to_string(),
        dev_mode: state.config.dev_mode,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}
