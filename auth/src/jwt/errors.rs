use thiserror::Error;

/// Error type for JWT operations.
///
/// The decode-side variants only exist for diagnostics. Callers deciding
/// whether a request is authenticated must treat them all the same way.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to sign token: {0}")]
    SigningFailed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token is malformed: {0}")]
    Malformed(String),
}
