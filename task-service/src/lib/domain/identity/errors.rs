use auth::JwtError;
use thiserror::Error;

/// Reasons a request fails the bearer-token gate.
///
/// Every variant except `Lookup` reaches the client as the same
/// unauthenticated response. The distinctions exist for logs only.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header is not of the form 'Bearer <token>'")]
    MalformedHeader,

    #[error("Token rejected: {0}")]
    InvalidToken(#[from] JwtError),

    #[error("Token subject is not a user identifier: {0}")]
    InvalidSubject(String),

    #[error("Token subject {0} no longer exists")]
    UnknownUser(String),

    /// The user store could not be consulted. Not an authentication
    /// verdict, so it surfaces as an internal failure.
    #[error("User lookup failed: {0}")]
    Lookup(String),
}
