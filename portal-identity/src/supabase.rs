//! Supabase Auth (GoTrue) and PostgREST client

use async_trait::async_trait;
use chrono::Utc;
use portal_core::{
    AuthError, AuthUser, CookieStore, IdentityProvider, PortalResult, ProfileError, ProfileStore,
    Session, UserProfile,
};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::client::{create_http_client, read_error, SupabaseConfig};
use crate::storage;

/// Refresh the access token when it expires within this many seconds
pub const EXPIRY_MARGIN_SECS: i64 = 10;

/// Session returned by the token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    token_type: Option<String>,
    user: Option<AuthUser>,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| Utc::now().timestamp() + secs));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            expires_in: self.expires_in,
            token_type: self.token_type.unwrap_or_else(|| "bearer".to_string()),
            user: self.user,
        }
    }
}

/// Client for a single Supabase project.
///
/// Holds no per-request state: every call takes the request's [`CookieStore`].
pub struct SupabaseClient {
    client: reqwest::Client,
    config: SupabaseConfig,
    storage_key: String,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> PortalResult<Self> {
        let client = create_http_client(&config)?;
        let storage_key = config.storage_key();

        info!(
            "Created Supabase client for {} (session cookie: {})",
            config.base_url, storage_key
        );

        Ok(Self {
            client,
            config,
            storage_key,
        })
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Map a non-success GoTrue response onto the auth taxonomy
    async fn auth_failure(response: reqwest::Response) -> AuthError {
        let (status, message) = read_error(response).await;
        if status.is_server_error() {
            AuthError::Unavailable(format!("HTTP {}: {}", status.as_u16(), message))
        } else {
            AuthError::Rejected {
                status: status.as_u16(),
                message,
            }
        }
    }

    /// Exchange the refresh token for a new session
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        debug!("Refreshing Supabase session");

        let response = self
            .client
            .post(self.endpoint("auth/v1/token"))
            .query(&[("grant_type", "refresh_token")])
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(format!("token refresh failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::auth_failure(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(format!("unexpected token payload: {}", e)))?;

        Ok(token.into_session())
    }

    async fn fetch_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .get(self.endpoint("auth/v1/user"))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(format!("user request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::auth_failure(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(format!("unexpected user payload: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn get_user(&self, cookies: &CookieStore) -> Result<Option<AuthUser>, AuthError> {
        let session = match self.get_session(cookies).await? {
            Some(session) => session,
            None => return Ok(None),
        };

        let user = self.fetch_user(&session.access_token).await?;
        debug!(user_id = %user.id, "Resolved Supabase user");
        Ok(Some(user))
    }

    async fn get_session(&self, cookies: &CookieStore) -> Result<Option<Session>, AuthError> {
        let current = cookies.get_all();
        let session = match storage::read_session(&current, &self.storage_key)? {
            Some(session) => session,
            None => return Ok(None),
        };

        if !session.expires_within(Utc::now(), EXPIRY_MARGIN_SECS) {
            return Ok(Some(session));
        }

        let refreshed = self.refresh_session(&session.refresh_token).await?;
        let written = storage::write_session(
            &current,
            &self.storage_key,
            &refreshed,
            &self.config.cookie_options,
        )?;
        cookies.set_all(written);

        info!("Supabase session refreshed");
        Ok(Some(refreshed))
    }

    async fn sign_out(&self, cookies: &CookieStore) -> Result<(), AuthError> {
        let current = cookies.get_all();
        let session = storage::read_session(&current, &self.storage_key);

        // Cookies go regardless of what the provider says.
        cookies.set_all(storage::remove_session(
            &current,
            &self.storage_key,
            &self.config.cookie_options,
        ));

        let session = match session {
            Ok(Some(session)) => session,
            Ok(None) => return Ok(()),
            Err(e) => {
                warn!("Signing out with unreadable session: {}", e);
                return Ok(());
            }
        };

        let response = self
            .client
            .post(self.endpoint("auth/v1/logout"))
            .query(&[("scope", "global")])
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(format!("logout request failed: {}", e)))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // Session already gone on the provider side
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(()),
            _ => Err(Self::auth_failure(response).await),
        }
    }

    fn cookie_namespace(&self) -> &str {
        &self.config.cookie_namespace
    }
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    async fn fetch_profile(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Option<UserProfile>, ProfileError> {
        let filter = format!("eq.{}", user_id);
        let response = self
            .client
            .get(self.endpoint("rest/v1/users"))
            .query(&[("id", filter.as_str()), ("select", "*")])
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProfileError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let (status, message) = read_error(response).await;
            return Err(ProfileError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let rows: Vec<UserProfile> = response
            .json()
            .await
            .map_err(|e| ProfileError::Decode(e.to_string()))?;

        Ok(rows.into_iter().next())
    }
}
