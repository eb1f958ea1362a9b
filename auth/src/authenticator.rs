use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::HashingCost;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Authentication coordinator combining password verification and JWT generation.
///
/// Provides high-level authentication operations by coordinating
/// password hashing and JWT token handling. Holds only read-only
/// configuration, so one instance is shared across all requests.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    token_ttl: Duration,
    decoy_hash: Option<String>,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
    /// Instant after which the token is rejected
    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// Tokens live for 24 hours and passwords use Argon2's default cost
    /// until overridden with the `with_*` builders.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    ///
    /// # Returns
    /// Configured Authenticator instance
    pub fn new(jwt_secret: &[u8]) -> Self {
        let password_hasher = PasswordHasher::new();
        let decoy_hash = Self::decoy_for(&password_hasher);

        Self {
            password_hasher,
            jwt_handler: JwtHandler::new(jwt_secret),
            token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            decoy_hash,
        }
    }

    /// Set how long issued tokens remain valid.
    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }

    /// Set the password hashing cost factor.
    ///
    /// # Errors
    /// * `InvalidCost` - Argon2 rejects the parameter combination
    pub fn with_hashing_cost(mut self, cost: HashingCost) -> Result<Self, PasswordError> {
        self.password_hasher = PasswordHasher::with_cost(cost)?;
        self.decoy_hash = Self::decoy_for(&self.password_hasher);
        Ok(self)
    }

    /// Lifetime of issued tokens.
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Hash a password for storage.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Hashed password string
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Burn one verification against a throwaway hash.
    ///
    /// Lets callers reject a login for an unknown account in roughly the
    /// same time as a wrong password for a known one.
    pub fn verify_against_decoy(&self, password: &str) {
        if let Some(hash) = &self.decoy_hash {
            let _ = self.password_hasher.verify(password, hash);
        }
    }

    // Built up front with the active cost so every decoy check is a single
    // verification.
    fn decoy_for(password_hasher: &PasswordHasher) -> Option<String> {
        password_hasher.hash("decoy-password").ok()
    }

    /// Verify credentials and generate JWT token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `subject` - User identifier to place in the token
    /// * `now` - Issuance instant
    ///
    /// # Returns
    /// AuthenticationResult with access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: impl ToString,
        now: DateTime<Utc>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        // Verify password
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        // Generate JWT token
        Ok(self.issue_token(subject, now)?)
    }

    /// Generate JWT token without password verification.
    ///
    /// # Arguments
    /// * `subject` - User identifier to place in the token
    /// * `now` - Issuance instant
    ///
    /// # Returns
    /// AuthenticationResult with the signed token and its expiry
    ///
    /// # Errors
    /// * `SigningFailed` - Secret unset or token generation failed
    pub fn issue_token(
        &self,
        subject: impl ToString,
        now: DateTime<Utc>,
    ) -> Result<AuthenticationResult, JwtError> {
        let claims = Claims::for_user(subject, now, self.token_ttl);
        let access_token = self.jwt_handler.encode(&claims)?;

        Ok(AuthenticationResult {
            access_token,
            expires_at: now + self.token_ttl,
        })
    }

    /// Validate and decode JWT token.
    ///
    /// # Arguments
    /// * `token` - JWT token string
    /// * `now` - Instant the token is presented at
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `JwtError` - Token signature, shape or expiry check failed
    pub fn validate_token(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        self.jwt_handler.decode(token, now.timestamp())
    }
}
