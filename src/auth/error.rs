// Authentication error types and their HTTP mappings

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{error, warn};

/// Error type for all authentication and user-management operations
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Field-level validation failures, collected wholesale
    #[error("Request validation failed")]
    Validation(validator::ValidationErrors),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User account is disabled")]
    AccountDisabled,

    /// Login throttle tripped for this session and scheme
    #[error("Maximum login attempts exceeded.")]
    RateLimited,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Missing authentication token")]
    MissingToken,

    /// Logout presented a refresh token that is absent or fails verification
    #[error("Invalid or missing refresh token")]
    InvalidRefreshToken,

    #[error("Invalid login type")]
    InvalidLoginType,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Password hashing error")]
    PasswordHash,

    #[error("Token generation error: {0}")]
    TokenGeneration(String),
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AuthError::Validation(errors)
    }
}

/// Flatten `ValidationErrors` into a `{field: [messages]}` map so clients can
/// fix every field in one round trip
pub fn field_error_map(errors: &validator::ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .iter()
        .map(|(field, field_errors)| {
            let messages = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}.", field))
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AuthError::Validation(errors) => {
                warn!("Invalid request data: {:?}", errors);
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!(field_error_map(errors))),
                )
                    .into_response();
            }
            AuthError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            AuthError::AccountDisabled => {
                warn!("Login attempt against disabled account");
                (StatusCode::UNAUTHORIZED, "User account is disabled".to_string())
            }
            AuthError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Maximum login attempts exceeded.".to_string(),
            ),
            AuthError::TokenInvalid => {
                warn!("Invalid token presented");
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
            AuthError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "Token has expired".to_string())
            }
            AuthError::TokenRevoked => {
                warn!("Revoked token presented");
                (StatusCode::UNAUTHORIZED, "Token has been revoked".to_string())
            }
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "Missing authentication token".to_string(),
            ),
            AuthError::InvalidRefreshToken => (
                StatusCode::BAD_REQUEST,
                "Invalid or missing refresh token".to_string(),
            ),
            AuthError::InvalidLoginType => {
                (StatusCode::BAD_REQUEST, "Invalid login type".to_string())
            }
            AuthError::Database(msg) => {
                error!("Database error in auth: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong".to_string())
            }
            AuthError::PasswordHash => {
                error!("Password hashing error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong".to_string())
            }
            AuthError::TokenGeneration(msg) => {
                error!("Token generation error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong".to_string())
            }
        };

        (status, Json(json!({ "error": body }))).into_response()
    }
}

impl AuthError {
    /// HTTP status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::AccountDisabled => StatusCode::UNAUTHORIZED,
            AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AuthError::TokenInvalid => StatusCode::UNAUTHORIZED,
            AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::TokenRevoked => StatusCode::UNAUTHORIZED,
            AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidRefreshToken => StatusCode::BAD_REQUEST,
            AuthError::InvalidLoginType => StatusCode::BAD_REQUEST,
            AuthError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::TokenGeneration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
