//! Login surface selection and redirect URL construction

use serde::{Deserialize, Serialize};

/// Substring of the request hostname that selects the development login surface
pub const LOCAL_HOST_MARKER: &str = "localhost";

pub const DEFAULT_LOCAL_LOGIN_BASE: &str = "http://login.localhost.mngdp.com:3000/";
pub const DEFAULT_PRODUCTION_LOGIN_BASE: &str = "https://login.mngdp.com/";

/// The two login origins the portal can send users to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginTargets {
    #[serde(default = "default_local_base")]
    pub local_base: String,
    #[serde(default = "default_production_base")]
    pub production_base: String,
}

fn default_local_base() -> String {
    DEFAULT_LOCAL_LOGIN_BASE.to_string()
}

fn default_production_base() -> String {
    DEFAULT_PRODUCTION_LOGIN_BASE.to_string()
}

impl Default for LoginTargets {
    fn default() -> Self {
        Self {
            local_base: default_local_base(),
            production_base: default_production_base(),
        }
    }
}

impl LoginTargets {
    /// Pick the login base for a request hostname. Only the hostname is consulted.
    pub fn base_for_host(&self, hostname: &str) -> &str {
        if hostname.contains(LOCAL_HOST_MARKER) {
            &self.local_base
        } else {
            &self.production_base
        }
    }

    /// `{base}?redirect={urlencoded original URL}`
    pub fn redirect_url(&self, hostname: &str, original_url: &str) -> String {
        format!(
            "{}?redirect={}",
            self.base_for_host(hostname),
            urlencoding::encode(original_url)
        )
    }

    /// Explicit login page on the selected surface, used by the recovery view.
    pub fn login_page_url(&self, hostname: &str) -> String {
        let base = self.base_for_host(hostname);
        format!("{}/login", base.trim_end_matches('/'))
    }
}

/// Strip an optional `:port` suffix from a `Host` header value.
pub fn hostname_of(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        // IPv6 literal
        return rest.split(']').next().unwrap_or(rest);
    }
    host.rsplit_once(':')
        .filter(|(_, port)| port.chars().all(|c| c.is_ascii_digit()))
        .map(|(name, _)| name)
        .unwrap_or(host)
}
