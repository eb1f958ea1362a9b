use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::identity::errors::AuthError;
use crate::domain::identity::models::bearer_token;
use crate::domain::identity::models::AuthenticatedUser;
use crate::domain::identity::ports::IdentityResolverPort;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;

/// Resolves bearer tokens to users, re-reading the user on every request.
pub struct IdentityResolver<UR>
where
    UR: UserRepository,
{
    authenticator: Arc<Authenticator>,
    users: Arc<UR>,
}

impl<UR> IdentityResolver<UR>
where
    UR: UserRepository,
{
    pub fn new(authenticator: Arc<Authenticator>, users: Arc<UR>) -> Self {
        Self {
            authenticator,
            users,
        }
    }
}

#[async_trait]
impl<UR> IdentityResolverPort for IdentityResolver<UR>
where
    UR: UserRepository,
{
    async fn resolve(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedUser, AuthError> {
        let header = authorization.ok_or(AuthError::MissingHeader)?;
        let token = bearer_token(header)?;

        let claims = self.authenticator.validate_token(token, now)?;

        let user_id = UserId::from_string(&claims.sub)
            .map_err(|e| AuthError::InvalidSubject(e.to_string()))?;

        let user = self
            .users
            .find_by_id(&user_id)
            .await
            .map_err(|e| AuthError::Lookup(e.to_string()))?
            .ok_or_else(|| AuthError::UnknownUser(user_id.to_string()))?;

        Ok(AuthenticatedUser::new(user))
    }
}
