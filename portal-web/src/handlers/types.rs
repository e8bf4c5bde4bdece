//! Request and response types for the JSON endpoints

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    /// Directory title of this portal instance
    pub portal: String,
    /// Systems plus dashboards listed in the directory
    #[schema(example = 8)]
    pub links: usize,
    /// Prefix of the cookies the session gate owns
    #[schema(example = "sb-")]
    pub cookie_namespace: String,
    pub dev_mode: bool,
    #[schema(example = "0.1.0")]
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Current session as seen by the portal
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[schema(example = "9f1c2a4e-1b7d-4c1e-9d4a-3f0e6b2c8a11")]
    pub user_id: Option<String>,
    #[schema(example = "user@mngdp.com")]
    pub email: Option<String>,
    /// Access token expiry, unix seconds
    #[schema(example = 1767225600)]
    pub expires_at: Option<i64>,
}

/// Query string of the portal page
#[derive(Debug, Default, Deserialize)]
pub struct PortalQuery {
    pub view: Option<String>,
}
