//! Unified error handling system
//!
//! Provides structured error types with context and recovery suggestions, plus the
//! error taxonomy used at the identity provider boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type PortalResult<T> = Result<T, PortalError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the portal
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Logging setup error: {message}")]
    Logging {
        message: String,
        context: ErrorContext,
    },
}

impl PortalError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            PortalError::Config { context, .. }
            | PortalError::Validation { context, .. }
            | PortalError::Network { context, .. }
            | PortalError::Logging { context, .. } => Some(context),
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            PortalError::Network { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Network error"
                );
            }
            PortalError::Config { .. } | PortalError::Validation { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Configuration or validation error"
                );
            }
            _ => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Failure reported by the identity provider while resolving the current user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The session cookie could not be reassembled or decoded.
    #[error("malformed session cookie: {0}")]
    MalformedSession(String),

    /// The provider answered but refused the session (invalid or revoked token).
    #[error("session rejected by identity provider ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The provider could not be reached or answered with a server error.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// What went wrong at the session gate, as far as the redirect policy cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionFailure {
    /// Cookie contents could not be parsed.
    SessionParseError,
    /// No session present, or it expired without error.
    SessionAbsent,
    /// The validation call itself failed.
    ProviderUnavailable,
}

impl SessionFailure {
    /// Parse errors and provider failures are indistinguishable from corruption,
    /// so both purge the provider's cookies.
    pub fn purges_cookies(self) -> bool {
        !matches!(self, SessionFailure::SessionAbsent)
    }
}

impl From<&AuthError> for SessionFailure {
    fn from(error: &AuthError) -> Self {
        match error {
            AuthError::MalformedSession(_) => SessionFailure::SessionParseError,
            AuthError::Rejected { .. } | AuthError::Unavailable(_) => {
                SessionFailure::ProviderUnavailable
            }
        }
    }
}

/// Profile lookup failure. Never fatal for the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile store request failed: {0}")]
    Request(String),

    #[error("profile store returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("profile record could not be decoded: {0}")]
    Decode(String),
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::PortalError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your portal.toml configuration file"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::PortalError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_maps_to_failure() {
        let parse = AuthError::MalformedSession("invalid utf-8".to_string());
        assert_eq!(SessionFailure::from(&parse), SessionFailure::SessionParseError);

        let rejected = AuthError::Rejected {
            status: 401,
            message: "invalid JWT".to_string(),
        };
        assert_eq!(
            SessionFailure::from(&rejected),
            SessionFailure::ProviderUnavailable
        );

        let down = AuthError::Unavailable("connection refused".to_string());
        assert_eq!(SessionFailure::from(&down), SessionFailure::ProviderUnavailable);
    }

    #[test]
    fn test_only_absent_session_keeps_cookies() {
        assert!(SessionFailure::SessionParseError.purges_cookies());
        assert!(SessionFailure::ProviderUnavailable.purges_cookies());
        assert!(!SessionFailure::SessionAbsent.purges_cookies());
    }

    #[test]
    fn test_validation_macro_carries_field() {
        let err = validation_error!("must not be empty", "auth.supabase_url", "config");
        match err {
            PortalError::Validation { field, context, .. } => {
                assert_eq!(field.as_deref(), Some("auth.supabase_url"));
                assert_eq!(context.component, "config");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
