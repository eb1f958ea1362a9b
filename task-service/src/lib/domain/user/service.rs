use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::PasswordHash;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::AccountServicePort;
use crate::user::ports::UserRepository;

/// Domain service implementation for account operations.
///
/// Concrete implementation of AccountServicePort with dependency injection.
pub struct AccountService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> AccountService<UR>
where
    UR: UserRepository,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hashing and token issuance
    ///
    /// # Returns
    /// Configured account service instance
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    fn reject_unknown_user(&self, password: &str) -> UserError {
        self.authenticator.verify_against_decoy(password);
        UserError::InvalidCredentials
    }
}

#[async_trait]
impl<UR> AccountServicePort for AccountService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<User, UserError> {
        let password_hash = self
            .authenticator
            .hash_password(command.password.as_str())
            .map_err(|e| UserError::Hashing(e.to_string()))?;

        let user = NewUser {
            username: command.username,
            email: command.email,
            password_hash: PasswordHash::new(password_hash),
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;

        tracing::info!(
            user_id = %created_user.id,
            username = %created_user.username,
            "User registered"
        );

        Ok(created_user)
    }

    async fn login(
        &self,
        command: LoginCommand,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, UserError> {
        let username = match Username::new(command.username) {
            Ok(username) => username,
            Err(_) => return Err(self.reject_unknown_user(&command.password)),
        };

        let user = match self.repository.find_by_username(&username).await? {
            Some(user) => user,
            None => return Err(self.reject_unknown_user(&command.password)),
        };

        let result = self
            .authenticator
            .authenticate(&command.password, user.password_hash.as_str(), user.id, now)
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => UserError::InvalidCredentials,
                AuthenticationError::PasswordError(err) => UserError::Hashing(err.to_string()),
                AuthenticationError::JwtError(err) => UserError::TokenIssuance(err.to_string()),
            })?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome {
            token: result.access_token,
            expires_at: result.expires_at,
            user,
        })
    }
}
