//! Portal Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use portal_core::PortalConfig;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main portal web server
pub struct PortalServer {
    config: WebConfig,
    state: AppState,
}

impl PortalServer {
    /// Create a server backed by the Supabase project in `portal`
    pub fn new(config: WebConfig, portal: PortalConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone(), portal)?;

        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting portal web server");
        info!("Server address: http://{}", address);
        info!("Development mode: {}", self.config.dev_mode);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        if let Err(e) = serve(listener, app).await {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }
}

/// Builder for PortalServer
pub struct PortalServerBuilder {
    config: WebConfig,
    portal: PortalConfig,
}

impl PortalServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: WebConfig::default(),
            portal: PortalConfig::default(),
        }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable development mode
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    /// Set static files directory
    pub fn static_dir<S: Into<String>>(mut self, static_dir: S) -> Self {
        self.config.static_dir = Some(static_dir.into());
        self
    }

    /// Set the portal configuration
    pub fn portal_config(mut self, portal: PortalConfig) -> Self {
        self.portal = portal;
        self
    }

    /// Build the server
    pub fn build(self) -> WebResult<PortalServer> {
        self.portal.validate()?;
        PortalServer::new(self.config, self.portal)
    }
}

impl Default for PortalServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portal_config() -> PortalConfig {
        let mut portal = PortalConfig::default();
        portal.auth.supabase_url = "https://proj.supabase.co".to_string();
        portal.auth.supabase_anon_key = "anon".to_string();
        portal
    }

    #[test]
    fn test_server_creation() {
        let server = PortalServer::new(WebConfig::default(), portal_config());
        assert!(server.is_ok());
    }

    #[test]
    fn test_server_builder() {
        let builder = PortalServerBuilder::new()
            .host("localhost")
            .port(3000)
            .dev_mode(true);

        assert_eq!(builder.config.host, "localhost");
        assert_eq!(builder.config.port, 3000);
        assert!(builder.config.dev_mode);
    }

    #[test]
    fn test_builder_rejects_missing_credentials() {
        assert!(PortalServerBuilder::new().build().is_err());

        let server = PortalServerBuilder::new()
            .portal_config(portal_config())
            .static_dir("static")
            .build()
            .unwrap();
        assert_eq!(server.config().static_dir.as_deref(), Some("static"));
    }
}
