//! Sign-out

use crate::{
    cookies::{apply_deletions, apply_provider_cookies, purge_namespace, request_cookies},
    middleware::request_host,
    AppState,
};
use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    response::{IntoResponse, Redirect, Response},
};
use portal_core::{hostname_of, CookieStore};
use tracing::{info, warn};

/// End the session and send the user to the login surface.
///
/// Provider errors are logged only; the cookies are deleted either way.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap, uri: Uri) -> Response {
    let host = request_host(&headers, &uri);
    let store = CookieStore::new(request_cookies(&headers));

    if let Err(e) = state.identity.sign_out(&store).await {
        warn!("Provider sign-out failed: {}", e);
    }

    let target = state.portal.login.base_for_host(hostname_of(&host));
    info!("Signed out, redirecting to {}", target);

    // POST -> GET, so 303 rather than the gate's 307
    let mut response = Redirect::to(target).into_response();
    apply_provider_cookies(response.headers_mut(), &store.take_pending());
    apply_deletions(
        response.headers_mut(),
        &purge_namespace(
            store.incoming(),
            state.identity.cookie_namespace(),
            &state.cookie_scope(&host),
        ),
    );
    response
}
