use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::identity::errors::AuthError;
use crate::domain::identity::models::AuthenticatedUser;

/// Port for the per-request authentication gate.
#[async_trait]
pub trait IdentityResolverPort: Send + Sync + 'static {
    /// Turn a raw `Authorization` header into an authenticated identity.
    ///
    /// # Arguments
    /// * `authorization` - Header value, `None` when the header is absent
    /// * `now` - Instant the request is evaluated at
    ///
    /// # Returns
    /// The current record of the user the token was issued to
    ///
    /// # Errors
    /// * `MissingHeader` / `MalformedHeader` - No usable bearer credential
    /// * `InvalidToken` - Signature, shape or expiry check failed
    /// * `InvalidSubject` / `UnknownUser` - Token names no existing user
    /// * `Lookup` - User store unavailable
    async fn resolve(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedUser, AuthError>;
}
