use crate::domain::identity::errors::AuthError;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

const BEARER_SCHEME: &str = "Bearer";

/// Identity resolved from a verified bearer token.
///
/// Only the identity resolver constructs it, so holding one proves the
/// gate ran to completion for the current request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user: User,
}

impl AuthenticatedUser {
    pub(crate) fn new(user: User) -> Self {
        Self { user }
    }

    pub fn id(&self) -> UserId {
        self.user.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The value must be exactly two space-separated parts, the first of which
/// is literally `Bearer`.
///
/// # Arguments
/// * `header` - Raw header value
///
/// # Returns
/// The token part
///
/// # Errors
/// * `MalformedHeader` - Any other shape, including an empty token
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}
