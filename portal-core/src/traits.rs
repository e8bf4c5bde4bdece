//! Core trait definitions

use crate::error::{AuthError, ProfileError};
use crate::types::*;
use async_trait::async_trait;

/// Identity provider that owns the session and its cookies.
///
/// Implementations read the session from the per-request [`CookieStore`] and queue
/// any refreshed or removed cookies back onto it through `set_all`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the current user.
    ///
    /// `Ok(None)` means no session is present. Errors cover malformed cookies,
    /// provider rejections and transport failures.
    async fn get_user(&self, cookies: &CookieStore) -> Result<Option<AuthUser>, AuthError>;

    /// Current session, refreshed if it is about to expire.
    async fn get_session(&self, cookies: &CookieStore) -> Result<Option<Session>, AuthError>;

    /// Revoke the session and queue removal of its cookies.
    async fn sign_out(&self, cookies: &CookieStore) -> Result<(), AuthError>;

    /// Cookie name prefix owned by the provider
    fn cookie_namespace(&self) -> &str;
}

/// Read-only lookup of user profiles by id
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch_profile(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Option<UserProfile>, ProfileError>;
}
