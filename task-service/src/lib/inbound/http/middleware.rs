use axum::extract::Request;
use axum::extract::State;
use axum::http;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use crate::domain::identity::errors::AuthError;
use crate::domain::identity::ports::IdentityResolverPort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Middleware that resolves the bearer token to a user and adds it to
/// request extensions as `AuthenticatedUser`.
///
/// Rejected requests never reach the protected handler.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = match req.headers().get(http::header::AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedHeader)?),
        None => None,
    };

    let caller = state
        .identity_resolver
        .resolve(authorization, Utc::now())
        .await?;

    tracing::debug!(user_id = %caller.id(), "Request authenticated");

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}
