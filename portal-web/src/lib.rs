//! Portal Web Server
//!
//! Serves the link directory behind a Supabase session gate, plus the manual
//! cookie recovery page.

pub mod cookies;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;

// Re-export main types
pub use server::PortalServer;
pub use state::AppState;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use portal_core::{LoggingConfig, PortalConfig, PortalError};
use tower_http::trace::TraceLayer;
use tracing::error;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let static_dir = state
        .config
        .static_dir
        .clone()
        .unwrap_or_else(|| "portal-web/static".to_string());

    Router::new()
        .merge(routes::page_routes())
        .nest("/api", routes::api_routes())
        .merge(routes::static_routes(&static_dir))
        .fallback(handlers::not_found)
        // Every route above is gated unless the path is excluded
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session_gate,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable development mode
    pub dev_mode: bool,
    /// Static files directory
    pub static_dir: Option<String>,
    /// Path to a portal TOML configuration file
    pub config_path: Option<String>,
    /// Overrides `[auth] supabase_url`
    pub supabase_url: Option<String>,
    /// Overrides `[auth] supabase_anon_key`
    pub supabase_anon_key: Option<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
            static_dir: None,
            config_path: None,
            supabase_url: None,
            supabase_anon_key: None,
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("PORTAL_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORTAL_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            dev_mode: std::env::var("PORTAL_DEV_MODE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            static_dir: std::env::var("PORTAL_STATIC_DIR").ok(),
            config_path: std::env::var("PORTAL_CONFIG").ok(),
            supabase_url: std::env::var("SUPABASE_URL").ok(),
            supabase_anon_key: std::env::var("SUPABASE_ANON_KEY").ok(),
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Read the portal configuration file (or defaults), apply the Supabase
    /// overrides and validate the result.
    pub fn load_portal_config(&self) -> WebResult<PortalConfig> {
        let mut config = match &self.config_path {
            Some(path) => PortalConfig::from_file(path)?,
            None => PortalConfig::default(),
        };

        if let Some(url) = &self.supabase_url {
            config.auth.supabase_url = url.clone();
        }
        if let Some(key) = &self.supabase_anon_key {
            config.auth.supabase_anon_key = key.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error(transparent)]
    Portal(#[from] PortalError),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

/// Initialize logging for the web server
pub fn init_logging(config: &LoggingConfig) -> WebResult<()> {
    portal_core::init_logging(config)?;
    Ok(())
}
