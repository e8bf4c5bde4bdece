//! Session gate
//!
//! Runs in front of every route. Excluded paths pass untouched; everything else
//! costs exactly one `get_user` call to the identity provider, whose outcome
//! decides between passing the request on and redirecting to the login surface.

use crate::{
    cookies::{
        apply_deletions, apply_provider_cookies, purge_namespace, request_cookies,
        rewrite_request_cookies,
    },
    AppState,
};
use axum::{
    extract::{Request, State},
    http::{header::HOST, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use portal_core::{hostname_of, AuthError, AuthUser, CookieStore, SessionFailure};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static EXCLUDED_PATHS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^/(?:static/|favicon\.ico$|clear-cookies(?:/|$)|api/health$|.*\.(?:svg|png|jpg|jpeg|gif|webp)$)",
    )
    .expect("exclusion pattern is valid")
});

/// Paths that bypass session validation entirely
pub fn is_excluded_path(path: &str) -> bool {
    EXCLUDED_PATHS.is_match(path)
}

/// `Host` header value, falling back to the request URI authority
pub fn request_host(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .unwrap_or_else(|| "localhost".to_string())
}

/// Absolute URL the caller asked for, as seen in front of any proxy
pub fn original_url(headers: &HeaderMap, uri: &Uri) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("http");
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");

    format!("{}://{}{}", scheme, request_host(headers, uri), path)
}

/// What the gate does with a request
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Pass(AuthUser),
    Redirect(SessionFailure),
}

impl GateDecision {
    pub fn from_outcome(outcome: Result<Option<AuthUser>, AuthError>) -> Self {
        match outcome {
            Ok(Some(user)) => GateDecision::Pass(user),
            Ok(None) => GateDecision::Redirect(SessionFailure::SessionAbsent),
            Err(e) => GateDecision::Redirect(SessionFailure::from(&e)),
        }
    }
}

/// Session gate middleware
pub async fn session_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if is_excluded_path(&path) {
        return next.run(request).await;
    }

    let store = CookieStore::new(request_cookies(request.headers()));
    let outcome = state.identity.get_user(&store).await;
    if let Err(e) = &outcome {
        warn!(path = %path, "Session validation failed: {}", e);
    }

    match GateDecision::from_outcome(outcome) {
        GateDecision::Pass(user) => {
            debug!(user_id = %user.id, path = %path, "Session valid");

            let forwarded = store.get_all();
            let refreshed = store.take_pending();
            if !refreshed.is_empty() {
                rewrite_request_cookies(request.headers_mut(), &forwarded);
            }
            request.extensions_mut().insert(user);

            let mut response = next.run(request).await;
            apply_provider_cookies(response.headers_mut(), &refreshed);
            response
        }
        GateDecision::Redirect(failure) => {
            let host = request_host(request.headers(), request.uri());
            let target = state.portal.login.redirect_url(
                hostname_of(&host),
                &original_url(request.headers(), request.uri()),
            );
            info!(path = %path, ?failure, "Redirecting to login");

            let mut response = Redirect::temporary(&target).into_response();
            if failure.purges_cookies() {
                let directives = purge_namespace(
                    store.incoming(),
                    state.identity.cookie_namespace(),
                    &state.cookie_scope(&host),
                );
                apply_deletions(response.headers_mut(), &directives);
            }
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn user() -> AuthUser {
        AuthUser {
            id: "user-1".to_string(),
            email: None,
            role: None,
            user_metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_excluded_paths() {
        for path in [
            "/static/portal.css",
            "/favicon.ico",
            "/clear-cookies",
            "/api/health",
            "/logo.svg",
            "/images/banner.webp",
            "/a/b/photo.jpeg",
        ] {
            assert!(is_excluded_path(path), "{path} should be excluded");
        }

        for path in [
            "/",
            "/api/session",
            "/logout",
            "/staticfile",
            "/photo.png.html",
            "/api/healthz",
        ] {
            assert!(!is_excluded_path(path), "{path} should be gated");
        }
    }

    #[test]
    fn test_original_url() {
        let uri: Uri = "/?view=systems".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("portal.mngdp.com"));
        assert_eq!(
            original_url(&headers, &uri),
            "http://portal.mngdp.com/?view=systems"
        );

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        assert_eq!(
            original_url(&headers, &uri),
            "https://portal.mngdp.com/?view=systems"
        );
    }

    #[test]
    fn test_decision_from_outcome() {
        assert_eq!(
            GateDecision::from_outcome(Ok(Some(user()))),
            GateDecision::Pass(user())
        );
        assert_eq!(
            GateDecision::from_outcome(Ok(None)),
            GateDecision::Redirect(SessionFailure::SessionAbsent)
        );
        assert_eq!(
            GateDecision::from_outcome(Err(AuthError::MalformedSession("bad".into()))),
            GateDecision::Redirect(SessionFailure::SessionParseError)
        );
        assert_eq!(
            GateDecision::from_outcome(Err(AuthError::Unavailable("down".into()))),
            GateDecision::Redirect(SessionFailure::ProviderUnavailable)
        );
    }
}
