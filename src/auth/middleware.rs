// Request extractors for authentication and throttle session keys

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts},
};
use std::net::SocketAddr;
use tracing::debug;

use crate::auth::error::AuthError;
use crate::AppState;

/// Authenticated principal attached to protected requests
///
/// Accepts both credential forms the API issues:
/// `Authorization: Bearer <jwt>` (validated as an access token) and
/// `Authorization: Token <key>` (exact-match opaque token lookup).
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AuthError> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::TokenInvalid)?;

        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            let claims = state.auth_service.validate_access(token)?;
            debug!(user_id = claims.sub, "Authenticated via access token");
            return Ok(AuthenticatedUser {
                user_id: claims.sub,
                username: claims.username,
            });
        }

        if let Some(key) = auth_header.strip_prefix("Token ") {
            let user = state.auth_service.authenticate_opaque(key).await?;
            debug!(user_id = user.id, "Authenticated via opaque token");
            return Ok(AuthenticatedUser {
                user_id: user.id,
                username: user.username,
            });
        }

        Err(AuthError::TokenInvalid)
    }
}

/// Throttle key identifying the requesting session
///
/// Uses the `X-Session-Id` header when the client supplies one, otherwise
/// falls back to the peer IP, then to a fixed bucket. Counters scoped to
/// this key live only as long as the process.
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts
            .headers
            .get("x-session-id")
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
        {
            return Ok(SessionId(session.to_string()));
        }

        if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            return Ok(SessionId(addr.ip().to_string()));
        }

        Ok(SessionId("anonymous".to_string()))
    }
}
