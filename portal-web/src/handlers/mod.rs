//! HTTP request handlers for the portal web server
//!
//! This module contains all the HTTP request handlers organized by functionality.

pub mod auth;
pub mod health;
pub mod portal;
pub mod recovery;
pub mod session;
pub mod types;

pub use auth::*;
pub use health::*;
pub use portal::*;
pub use recovery::*;
pub use session::*;
pub use types::*;

use crate::{templates::ErrorTemplate, WebResult};
use askama::Template;
use axum::{http::StatusCode, response::Html};

/// Fallback for unknown paths (reached only past the session gate)
pub async fn not_found() -> WebResult<(StatusCode, Html<String>)> {
    let page = ErrorTemplate::new(404, "الصفحة غير موجودة".to_string()).render()?;
    Ok((StatusCode::NOT_FOUND, Html(page)))
}
