//! Portal configuration

use crate::error::{ErrorContext, PortalError, PortalResult};
use crate::logging::LoggingConfig;
use crate::login::LoginTargets;
use crate::types::LinkEntry;
use crate::validation_error;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Cookie name prefix owned by Supabase Auth
pub const DEFAULT_COOKIE_NAMESPACE: &str = "sb-";

/// Parent domain that session cookies are scoped to in the shared deployment
pub const DEFAULT_COOKIE_DOMAIN: &str = "localhost.mngdp.com";

/// Complete portal configuration, loaded from `portal.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub login: LoginTargets,
    #[serde(default)]
    pub portal: DirectoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Identity provider connection and cookie scoping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Supabase project URL, e.g. `https://abcd.supabase.co`
    pub supabase_url: String,
    /// Public anon key sent as the `apikey` header
    pub supabase_anon_key: String,
    pub cookie_namespace: String,
    /// Parent domain for session cookies; derived from the request host when unset
    pub cookie_domain: Option<String>,
    pub secure_cookies: bool,
    pub request_timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            cookie_namespace: DEFAULT_COOKIE_NAMESPACE.to_string(),
            cookie_domain: Some(DEFAULT_COOKIE_DOMAIN.to_string()),
            secure_cookies: false,
            request_timeout_secs: 10,
        }
    }
}

/// Static content of the link directory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub title: String,
    pub systems: Vec<LinkEntry>,
    pub dashboards: Vec<LinkEntry>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        let entry = |name: &str, href: &str| LinkEntry {
            name: name.to_string(),
            description: "الوصف".to_string(),
            href: href.to_string(),
        };

        Self {
            title: "البوابة الموحدة".to_string(),
            systems: vec![
                entry("نظام إدارة المشاريع", "#"),
                entry("نظام التذاكر", "https://tickets.mngdp.com/"),
                entry("نظام إنجاز", "#"),
                entry("نظام إدارة المجالس", "#"),
            ],
            dashboards: vec![
                entry("لوحة المعلومات الخضراء", "#"),
                entry("لوحة معلومات الخطة التفصيلية", "#"),
                entry("لوحة خطة التحول", "#"),
                entry("لوحة إضافية", "#"),
            ],
        }
    }
}

impl PortalConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> PortalResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PortalError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: PortalConfig = toml::from_str(&content).map_err(|e| PortalError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> PortalResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| PortalError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| PortalError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> PortalResult<()> {
        if self.auth.supabase_url.trim().is_empty() {
            return Err(validation_error!(
                "Supabase URL must be set",
                "auth.supabase_url",
                "config"
            ));
        }

        if !self.auth.supabase_url.starts_with("http://")
            && !self.auth.supabase_url.starts_with("https://")
        {
            return Err(validation_error!(
                format!("Supabase URL must be absolute: {}", self.auth.supabase_url),
                "auth.supabase_url",
                "config"
            ));
        }

        if self.auth.supabase_anon_key.trim().is_empty() {
            return Err(validation_error!(
                "Supabase anon key must be set",
                "auth.supabase_anon_key",
                "config"
            ));
        }

        if self.auth.cookie_namespace.is_empty() {
            return Err(validation_error!(
                "Cookie namespace must not be empty",
                "auth.cookie_namespace",
                "config"
            ));
        }

        for (field, base) in [
            ("login.local_base", &self.login.local_base),
            ("login.production_base", &self.login.production_base),
        ] {
            if !base.starts_with("http://") && !base.starts_with("https://") {
                return Err(validation_error!(
                    format!("Login base must be an absolute URL: {}", base),
                    field,
                    "config"
                ));
            }
        }

        Ok(())
    }
}
