//! Application state shared by every request

use crate::{cookies::CookieScope, WebConfig, WebResult};
use portal_core::{hostname_of, IdentityProvider, PortalConfig, ProfileStore};
use portal_identity::{SupabaseClient, SupabaseConfig};
use std::sync::Arc;
use tracing::info;

/// Immutable after startup. Per-request cookie state lives in a
/// [`portal_core::CookieStore`] built by each handler.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: WebConfig,
    /// Portal configuration (auth, login targets, directory content)
    pub portal: Arc<PortalConfig>,
    /// Session validation
    pub identity: Arc<dyn IdentityProvider>,
    /// User profile lookups
    pub profiles: Arc<dyn ProfileStore>,
}

impl AppState {
    /// Build the state with a Supabase client serving both provider roles
    pub fn new(config: WebConfig, portal: PortalConfig) -> WebResult<Self> {
        let client = Arc::new(SupabaseClient::new(SupabaseConfig::from_auth_config(
            &portal.auth,
        ))?);

        info!(
            "Session gate using Supabase project at {}",
            portal.auth.supabase_url
        );

        Ok(Self::with_providers(
            config,
            portal,
            client.clone(),
            client,
        ))
    }

    /// Build the state around explicit provider implementations
    pub fn with_providers(
        config: WebConfig,
        portal: PortalConfig,
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            config,
            portal: Arc::new(portal),
            identity,
            profiles,
        }
    }

    /// Cookie deletion scope for a request's `Host` header value
    pub fn cookie_scope(&self, host: &str) -> CookieScope {
        CookieScope::new(
            hostname_of(host),
            self.portal.auth.cookie_domain.as_deref(),
        )
    }
}
