//! Manual cookie recovery page
//!
//! Reachable without a session so a user stuck on a corrupted cookie can get
//! out of the redirect loop.

use crate::{
    cookies::{apply_deletions, clear_all, request_cookies},
    middleware::request_host,
    templates::ClearCookiesTemplate,
    AppState, WebResult,
};
use askama::Template;
use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    response::{Html, IntoResponse, Response},
};
use portal_core::hostname_of;
use tracing::info;

fn render(
    state: &AppState,
    headers: &HeaderMap,
    uri: &Uri,
    cleared: bool,
) -> WebResult<(String, Vec<(String, String)>)> {
    let host = request_host(headers, uri);
    let cookies = request_cookies(headers);
    let listed = cookies
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();
    let login_url = state.portal.login.login_page_url(hostname_of(&host));

    let page = ClearCookiesTemplate::new(listed, login_url, cleared).render()?;
    Ok((page, cookies))
}

/// List the cookies the browser sent
pub async fn clear_cookies_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> WebResult<Html<String>> {
    let (page, _) = render(&state, &headers, &uri, false)?;
    Ok(Html(page))
}

/// Delete every cookie under all three domain variants
pub async fn clear_cookies(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> WebResult<Response> {
    let (page, cookies) = render(&state, &headers, &uri, true)?;
    let scope = state.cookie_scope(&request_host(&headers, &uri));
    let directives = clear_all(&cookies, &scope);

    info!(
        cookies = cookies.len(),
        parent = scope.parent(),
        "Clearing cookies on request"
    );

    let mut response = Html(page).into_response();
    apply_deletions(response.headers_mut(), &directives);
    Ok(response)
}
