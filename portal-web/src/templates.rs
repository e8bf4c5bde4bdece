//! Template system for server-side rendering
//!
//! This module provides templates for server-side rendering using Askama.

use askama::Template;
use portal_core::{LinkEntry, PortalView};

/// Portal directory page
#[derive(Template)]
#[template(path = "portal.html")]
pub struct PortalTemplate {
    pub title: String,
    pub display_name: String,
    pub is_admin: bool,
    pub view: &'static str,
    pub systems: Vec<LinkEntry>,
    pub dashboards: Vec<LinkEntry>,
}

/// Manual cookie recovery page
#[derive(Template)]
#[template(path = "clear_cookies.html")]
pub struct ClearCookiesTemplate {
    pub title: String,
    /// `name=value` pairs as the browser sent them
    pub cookies: Vec<String>,
    pub login_url: String,
    /// Set on the confirmation page rendered after clearing
    pub cleared: bool,
}

/// Error page template
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub error_code: u16,
    pub error_message: String,
}

impl PortalTemplate {
    pub fn new(
        title: String,
        display_name: String,
        is_admin: bool,
        view: PortalView,
        systems: Vec<LinkEntry>,
        dashboards: Vec<LinkEntry>,
    ) -> Self {
        Self {
            title,
            display_name,
            is_admin,
            view: view.as_str(),
            systems,
            dashboards,
        }
    }
}

impl ClearCookiesTemplate {
    pub fn new(cookies: Vec<String>, login_url: String, cleared: bool) -> Self {
        Self {
            title: "Clear Cookies".to_string(),
            cookies,
            login_url,
            cleared,
        }
    }
}

impl ErrorTemplate {
    pub fn new(error_code: u16, error_message: String) -> Self {
        Self {
            title: format!("Error {}", error_code),
            error_code,
            error_message,
        }
    }
}
