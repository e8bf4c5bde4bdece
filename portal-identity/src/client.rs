//! HTTP client configuration shared by the Supabase endpoints

use portal_core::{AuthConfig, CookieOptions, ErrorContext, PortalError, PortalResult, SameSite};
use reqwest::StatusCode;
use serde::Deserialize;

/// Session cookies live for 400 days, the browser maximum.
pub const SESSION_COOKIE_MAX_AGE: i64 = 400 * 24 * 60 * 60;

/// Configuration for the Supabase client
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL without trailing slash
    pub base_url: String,
    /// Public anon key, sent as `apikey`
    pub anon_key: String,
    /// Cookie name prefix owned by Supabase
    pub cookie_namespace: String,
    /// Options applied to every session cookie the client writes
    pub cookie_options: CookieOptions,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            anon_key: String::new(),
            cookie_namespace: portal_core::DEFAULT_COOKIE_NAMESPACE.to_string(),
            cookie_options: session_cookie_options(
                Some(portal_core::DEFAULT_COOKIE_DOMAIN),
                false,
            ),
            timeout_seconds: 10,
            user_agent: concat!("mngdp-portal/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl SupabaseConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            ..Default::default()
        }
    }

    /// Build from the `[auth]` section of the portal configuration
    pub fn from_auth_config(auth: &AuthConfig) -> Self {
        Self {
            cookie_namespace: auth.cookie_namespace.clone(),
            cookie_options: session_cookie_options(
                auth.cookie_domain.as_deref(),
                auth.secure_cookies,
            ),
            timeout_seconds: auth.request_timeout_secs,
            ..Self::new(auth.supabase_url.clone(), auth.supabase_anon_key.clone())
        }
    }

    /// Project reference: first label of the project hostname
    pub fn project_ref(&self) -> String {
        url::Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.split('.').next().unwrap_or(h).to_string()))
            .unwrap_or_default()
    }

    /// Name of the cookie holding the serialized session
    pub fn storage_key(&self) -> String {
        format!("{}{}-auth-token", self.cookie_namespace, self.project_ref())
    }
}

/// Options for cookies written by the client: shared across subdomains, readable by
/// the browser, `SameSite=Lax`.
pub fn session_cookie_options(domain: Option<&str>, secure: bool) -> CookieOptions {
    CookieOptions {
        domain: domain.map(|d| format!(".{}", d.trim_start_matches('.'))),
        path: Some("/".to_string()),
        max_age: Some(SESSION_COOKIE_MAX_AGE),
        expires: None,
        same_site: Some(SameSite::Lax),
        secure,
        http_only: false,
    }
}

/// Create the HTTP client with common configuration
pub(crate) fn create_http_client(config: &SupabaseConfig) -> PortalResult<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();

    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_str(&config.user_agent).map_err(|e| {
            PortalError::Config {
                message: format!("Invalid user agent: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            }
        })?,
    );

    headers.insert(
        "apikey",
        reqwest::header::HeaderValue::from_str(&config.anon_key).map_err(|e| {
            PortalError::Config {
                message: format!("Invalid anon key: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client")
                    .with_operation("create_client")
                    .with_suggestion("Check SUPABASE_ANON_KEY"),
            }
        })?,
    );

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| PortalError::Network {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })?;

    Ok(client)
}

/// Error body shapes returned by GoTrue and PostgREST
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

/// Read a failed response into `(status, message)`
pub(crate) async fn read_error(response: reqwest::Response) -> (StatusCode, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
    let message = parsed
        .msg
        .or(parsed.error_description)
        .or(parsed.message)
        .or(parsed.error)
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                body
            }
        });

    (status, message)
}
