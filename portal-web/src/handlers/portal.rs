//! Portal directory page

use super::types::PortalQuery;
use crate::{cookies::request_cookies, templates::PortalTemplate, AppState, WebResult};
use askama::Template;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Html,
    Extension,
};
use portal_core::{display_name_or_fallback, AuthUser, CookieStore, PortalView, UserProfile};
use tracing::{debug, warn};

/// Render the link directory for the signed-in user
pub async fn portal_page(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PortalQuery>,
    headers: HeaderMap,
) -> WebResult<Html<String>> {
    let profile = load_profile(&state, &user, &headers).await;
    let view = PortalView::from_query(query.view.as_deref());
    let directory = &state.portal.portal;

    let page = PortalTemplate::new(
        directory.title.clone(),
        display_name_or_fallback(profile.as_ref()),
        profile.as_ref().is_some_and(UserProfile::is_admin),
        view,
        directory.systems.clone(),
        directory.dashboards.clone(),
    )
    .render()?;

    Ok(Html(page))
}

/// Profile lookup never fails the page: any problem means the generic name.
async fn load_profile(
    state: &AppState,
    user: &AuthUser,
    headers: &HeaderMap,
) -> Option<UserProfile> {
    // The gate already forwarded any refreshed cookies, so this reads without a refresh.
    let store = CookieStore::new(request_cookies(headers));
    let session = match state.identity.get_session(&store).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            warn!(user_id = %user.id, "No session available for profile lookup");
            return None;
        }
        Err(e) => {
            warn!(user_id = %user.id, "Session unreadable for profile lookup: {}", e);
            return None;
        }
    };

    match state
        .profiles
        .fetch_profile(&session.access_token, &user.id)
        .await
    {
        Ok(Some(profile)) => Some(profile),
        Ok(None) => {
            debug!(user_id = %user.id, "No profile record");
            None
        }
        Err(e) => {
            warn!(user_id = %user.id, "Profile fetch failed: {}", e);
            None
        }
    }
}
