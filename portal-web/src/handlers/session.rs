//! Session status endpoint

use super::types::SessionResponse;
use crate::{cookies::request_cookies, AppState};
use axum::{extract::State, http::HeaderMap, response::Json, Extension};
use portal_core::{AuthUser, CookieStore};
use tracing::warn;

/// Current session
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "Session",
    summary = "Current session",
    description = "Describe the session that passed the gate. Unauthenticated callers are redirected to login.",
    responses(
        (status = 200, description = "Session details", body = SessionResponse),
        (status = 307, description = "No valid session; redirect to the login surface")
    )
)]
pub async fn session_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
) -> Json<SessionResponse> {
    let store = CookieStore::new(request_cookies(&headers));
    let expires_at = match state.identity.get_session(&store).await {
        Ok(session) => session.and_then(|s| s.expires_at),
        Err(e) => {
            warn!(user_id = %user.id, "Session unreadable after gate: {}", e);
            None
        }
    };

    Json(SessionResponse {
        authenticated: true,
        user_id: Some(user.id),
        email: user.email,
        expires_at,
    })
}
