//! Core data type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Role string that grants the administrator badge.
pub const ADMIN_ROLE: &str = "Admin";

/// Greeting used when no profile name can be resolved ("the user").
pub const FALLBACK_DISPLAY_NAME: &str = "المستخدم";

/// Session issued by the identity provider, as stored in the session cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) at which the access token expires
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Whether the access token expires within `margin_secs` of `now`.
    /// Sessions without an expiry are treated as current.
    pub fn expires_within(&self, now: DateTime<Utc>, margin_secs: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - margin_secs <= now.timestamp(),
            None => false,
        }
    }
}

/// User record returned by the identity provider for a valid session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

/// Read-only profile row fetched from the profile store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl UserProfile {
    /// `name`, then `full_name`; empty strings do not count.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.full_name.as_deref().filter(|n| !n.trim().is_empty()))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

/// Greeting name for an optional profile
pub fn display_name_or_fallback(profile: Option<&UserProfile>) -> String {
    profile
        .and_then(UserProfile::display_name)
        .unwrap_or(FALLBACK_DISPLAY_NAME)
        .to_string()
}

/// SameSite attribute of a cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

/// Scoping attributes of a cookie the provider wants set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieOptions {
    pub domain: Option<String>,
    pub path: Option<String>,
    pub max_age: Option<i64>,
    pub expires: Option<DateTime<Utc>>,
    pub same_site: Option<SameSite>,
    pub secure: bool,
    pub http_only: bool,
}

/// A cookie directive emitted by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub options: CookieOptions,
}

impl SetCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, options: CookieOptions) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            options,
        }
    }

    /// Directive that removes `name` under the given options' scope.
    pub fn removal(name: impl Into<String>, options: CookieOptions) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            options: CookieOptions {
                max_age: Some(0),
                ..options
            },
        }
    }

    pub fn is_removal(&self) -> bool {
        self.value.is_empty() && self.options.max_age == Some(0)
    }
}

/// Per-request cookie adapter handed to the identity provider.
///
/// Reads come from the incoming request; writes are queued and applied by the
/// caller to both the forwarded request and the outgoing response.
#[derive(Debug, Default)]
pub struct CookieStore {
    incoming: Vec<(String, String)>,
    pending: Mutex<Vec<SetCookie>>,
}

impl CookieStore {
    pub fn new(incoming: Vec<(String, String)>) -> Self {
        Self {
            incoming,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Current cookie values, with queued writes applied over the incoming ones.
    pub fn get_all(&self) -> Vec<(String, String)> {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let mut current: Vec<(String, String)> = self.incoming.clone();
        for cookie in pending.iter() {
            current.retain(|(name, _)| name != &cookie.name);
            if !cookie.is_removal() {
                current.push((cookie.name.clone(), cookie.value.clone()));
            }
        }
        current
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.get_all()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn set_all(&self, cookies: Vec<SetCookie>) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.extend(cookies);
    }

    /// Drain the queued writes
    pub fn take_pending(&self) -> Vec<SetCookie> {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *pending)
    }

    pub fn incoming(&self) -> &[(String, String)] {
        &self.incoming
    }
}

/// One entry of the link directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub name: String,
    pub description: String,
    #[serde(default = "default_href")]
    pub href: String,
}

fn default_href() -> String {
    "#".to_string()
}

/// Which section of the directory the portal page shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortalView {
    #[default]
    Main,
    Systems,
    Dashboards,
}

impl PortalView {
    /// Unknown or missing values fall back to the main view.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("systems") => PortalView::Systems,
            Some("dashboards") => PortalView::Dashboards,
            _ => PortalView::Main,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PortalView::Main => "main",
            PortalView::Systems => "systems",
            PortalView::Dashboards => "dashboards",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn profile(name: Option<&str>, full_name: Option<&str>, role: Option<&str>) -> UserProfile {
        UserProfile {
            id: "u-1".to_string(),
            name: name.map(str::to_string),
            full_name: full_name.map(str::to_string),
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn test_display_name_precedence() {
        assert_eq!(
            profile(Some("Sara"), Some("Sara Ali"), None).display_name(),
            Some("Sara")
        );
        assert_eq!(
            profile(None, Some("Sara Ali"), None).display_name(),
            Some("Sara Ali")
        );
        assert_eq!(profile(Some(" "), None, None).display_name(), None);
        assert_eq!(display_name_or_fallback(None), FALLBACK_DISPLAY_NAME);
    }

    #[test]
    fn test_role_check_is_exact() {
        assert!(profile(None, None, Some("Admin")).is_admin());
        assert!(!profile(None, None, Some("admin")).is_admin());
        assert!(profile(None, None, Some("User")).has_role("User"));
        assert!(!profile(None, None, None).has_role("User"));
    }

    #[test]
    fn test_session_expiry_margin() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut session = Session {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: Some(1_700_000_005),
            expires_in: None,
            token_type: "bearer".to_string(),
            user: None,
        };
        assert!(session.expires_within(now, 10));
        session.expires_at = Some(1_700_000_100);
        assert!(!session.expires_within(now, 10));
        session.expires_at = None;
        assert!(!session.expires_within(now, 10));
    }

    #[test]
    fn test_cookie_store_applies_pending_writes() {
        let store = CookieStore::new(vec![
            ("sb-ref-auth-token".to_string(), "old".to_string()),
            ("theme".to_string(), "dark".to_string()),
        ]);
        store.set_all(vec![
            SetCookie::new("sb-ref-auth-token", "new", CookieOptions::default()),
            SetCookie::removal("theme", CookieOptions::default()),
        ]);

        assert_eq!(store.get("sb-ref-auth-token").as_deref(), Some("new"));
        assert_eq!(store.get("theme"), None);
        assert_eq!(store.incoming().len(), 2);
        assert_eq!(store.take_pending().len(), 2);
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_portal_view_from_query() {
        assert_eq!(PortalView::from_query(Some("systems")), PortalView::Systems);
        assert_eq!(
            PortalView::from_query(Some("dashboards")),
            PortalView::Dashboards
        );
        assert_eq!(PortalView::from_query(Some("other")), PortalView::Main);
        assert_eq!(PortalView::from_query(None), PortalView::Main);
    }
}
