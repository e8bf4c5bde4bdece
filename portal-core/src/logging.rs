//! Unified logging system
//!
//! Structured logging through `tracing`, with configurable output format and target

use crate::error::{ErrorContext, PortalError, PortalResult};
use serde::{Deserialize, Serialize};
use std::io;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Whether to include file and line information
    pub include_location: bool,
    /// Whether to include thread information
    pub include_thread: bool,
    /// Log file path; logs go to stdout when unset
    pub log_file_path: Option<String>,
    /// Emit a record when spans close, with their duration
    pub log_span_close: bool,
    /// Custom filter directives
    pub filter_directives: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            include_thread: false,
            log_file_path: None,
            log_span_close: false,
            filter_directives: vec![
                "portal_core=info".to_string(),
                "portal_identity=info".to_string(),
                "portal_web=info".to_string(),
                "tower_http=info".to_string(),
            ],
        }
    }
}

impl LoggingConfig {
    /// Same configuration with every portal crate raised to `level`
    pub fn with_level(mut self, level: &str) -> Self {
        self.level = level.to_string();
        self.filter_directives = self
            .filter_directives
            .into_iter()
            .map(|directive| match directive.split_once('=') {
                Some((target, _)) if target.starts_with("portal_") => {
                    format!("{}={}", target, level)
                }
                _ => directive,
            })
            .collect();
        self
    }

    fn span_events(&self) -> FmtSpan {
        if self.log_span_close {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn build_filter(&self) -> PortalResult<EnvFilter> {
        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        for directive in &self.filter_directives {
            let parsed = directive.parse().map_err(|e| PortalError::Logging {
                message: format!("Invalid filter directive '{}': {}", directive, e),
                context: ErrorContext::new("logging").with_operation("parse_directive"),
            })?;
            filter = filter.add_directive(parsed);
        }

        Ok(filter)
    }
}

/// Initialize the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> PortalResult<()> {
    let registry = tracing_subscriber::registry().with(config.build_filter()?);

    let file = match &config.log_file_path {
        Some(path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| PortalError::Logging {
                    message: format!("Cannot open log file '{}': {}", path, e),
                    context: ErrorContext::new("logging").with_operation("open_log_file"),
                })?,
        ),
        None => None,
    };

    let base = fmt::layer()
        .with_span_events(config.span_events())
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_thread_ids(config.include_thread)
        .with_thread_names(config.include_thread);

    let result = match (config.format, file) {
        (LogFormat::Json, Some(file)) => registry
            .with(base.json().with_writer(file))
            .try_init(),
        (LogFormat::Json, None) => registry.with(base.json().with_writer(io::stdout)).try_init(),
        (LogFormat::Pretty, Some(file)) => registry
            .with(base.pretty().with_ansi(false).with_writer(file))
            .try_init(),
        (LogFormat::Pretty, None) => registry
            .with(base.pretty().with_writer(io::stdout))
            .try_init(),
        (LogFormat::Compact, Some(file)) => registry
            .with(base.compact().with_ansi(false).with_writer(file))
            .try_init(),
        (LogFormat::Compact, None) => registry
            .with(base.compact().with_writer(io::stdout))
            .try_init(),
    };

    result.map_err(|e| PortalError::Logging {
        message: e.to_string(),
        context: ErrorContext::new("logging").with_operation("init"),
    })
}
