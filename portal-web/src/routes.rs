//! Route definitions for the portal web server

use crate::{handlers, openapi, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

/// HTML pages
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::portal_page))
        .route("/logout", post(handlers::logout))
        .route(
            "/clear-cookies",
            get(handlers::clear_cookies_page).post(handlers::clear_cookies),
        )
}

/// JSON API, nested under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/session", get(handlers::session_status))
        .route("/openapi.json", get(openapi::openapi_json))
}

/// Stylesheets, images and the favicon
pub fn static_routes(static_dir: &str) -> Router<AppState> {
    Router::new()
        .nest_service("/static", ServeDir::new(static_dir))
        .route_service(
            "/favicon.ico",
            ServeFile::new(format!("{}/favicon.ico", static_dir)),
        )
}
