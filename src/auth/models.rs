// User data models and request/response DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// User database model
///
/// `password_hash` is never serialized; every outward-facing view goes
/// through [`PublicUser`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub created_by: Option<i32>,
}

/// Public projection of a user (excludes the password hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicUser {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@x.com")]
    pub email: String,
    #[schema(example = "Alice")]
    pub first_name: String,
    #[schema(example = "Smith")]
    pub last_name: String,
    #[schema(example = "+1 (987) 654-3210")]
    pub phone_number: String,
    #[schema(example = false)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            is_admin: user.is_admin,
            created_at: user.created_at,
            modified_at: user.modified_at,
        }
    }
}

/// Opaque token database model
#[derive(Debug, Clone, FromRow)]
pub struct AuthToken {
    pub key: String,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

/// Registration request DTO
///
/// Fields are optional at the serde layer so that missing values surface as
/// per-field "required" validation errors instead of a deserialization
/// rejection.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(
        required(message = "This field is required."),
        length(min = 3, max = 150, message = "Username must be between 3 and 150 characters."),
        custom = "crate::validation::validate_username"
    )]
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[validate(
        required(message = "This field is required."),
        length(min = 5, max = 254, message = "Email must be between 5 and 254 characters."),
        custom = "crate::validation::validate_email_format"
    )]
    #[schema(example = "alice@x.com")]
    pub email: Option<String>,
    #[validate(
        required(message = "This field is required."),
        length(min = 8, message = "Password must be at least 8 characters long.")
    )]
    #[schema(example = "Secret123")]
    pub password: Option<String>,
    #[validate(
        required(message = "This field is required."),
        length(min = 1, max = 150, message = "First name must be between 1 and 150 characters.")
    )]
    #[schema(example = "Alice")]
    pub first_name: Option<String>,
    #[validate(
        required(message = "This field is required."),
        length(min = 1, max = 150, message = "Last name must be between 1 and 150 characters.")
    )]
    #[schema(example = "Smith")]
    pub last_name: Option<String>,
    #[validate(
        required(message = "This field is required."),
        custom = "crate::validation::validate_phone_number"
    )]
    #[schema(example = "+1 (987) 654-3210")]
    pub phone_number: Option<String>,
    #[schema(example = false)]
    pub is_admin: Option<bool>,
}

/// Login request DTO, shared by both login schemes
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "Secret123")]
    pub password: String,
}

/// Login-method chooser request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginChoiceRequest {
    #[schema(example = "username")]
    pub login_type: String,
}

/// Verified external identity handed over by a social provider integration
#[derive(Debug, Deserialize, ToSchema)]
pub struct SocialLoginRequest {
    #[schema(example = "google")]
    pub provider: String,
    #[schema(example = "alice@gmail.com")]
    pub email: String,
    #[schema(example = "alice")]
    pub username: Option<String>,
}

/// Logout request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct LogoutRequest {
    pub refresh: Option<String>,
}

/// Token refresh request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Response for successful registration
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    #[schema(example = "User registered successfully")]
    pub message: String,
    pub user: PublicUser,
}

/// Response for successful opaque-token login
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenLoginResponse {
    pub token: String,
    #[schema(example = "Login successful")]
    pub message: String,
    pub user: PublicUser,
}

/// Response for successful JWT login
#[derive(Debug, Serialize, ToSchema)]
pub struct JwtLoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: PublicUser,
}

/// Response for the login-method chooser
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginChoiceResponse {
    #[schema(example = "/api/users/login-token")]
    pub next: String,
    pub message: String,
}

/// Response for social login
#[derive(Debug, Serialize, ToSchema)]
pub struct SocialLoginResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Response for token refresh
#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access: String,
}

/// Generic message response
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Logged out successfully")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn valid_request() -> RegisterRequest {
        RegisterRequest {
            username: Some("alice".to_string()),
            email: Some("alice@x.com".to_string()),
            password: Some("Secret123".to_string()),
            first_name: Some("Alice".to_string()),
            last_name: Some("Smith".to_string()),
            phone_number: Some("+1 (987) 654-3210".to_string()),
            is_admin: None,
        }
    }

    #[test]
    fn test_valid_register_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_missing_fields_collected_per_field() {
        let request = RegisterRequest {
            username: None,
            email: None,
            password: None,
            first_name: None,
            last_name: None,
            phone_number: None,
            is_admin: None,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["username", "email", "password", "first_name", "last_name", "phone_number"] {
            assert!(fields.contains_key(field), "expected error for {}", field);
        }
    }

    #[test]
    fn test_invalid_formats_are_rejected() {
        let mut request = valid_request();
        request.username = Some("bad name!".to_string());
        request.email = Some("invalid-email".to_string());
        request.phone_number = Some("1234567890".to_string());
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("phone_number"));
        assert!(!fields.contains_key("password"));
    }

    #[test]
    fn test_short_password_rejected() {
        let mut request = valid_request();
        request.password = Some("short".to_string());
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_public_user_never_exposes_password_hash() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            password_hash: "argon2-hash".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            phone_number: "+1 (987) 654-3210".to_string(),
            is_admin: false,
            is_active: true,
            created_at: Utc::now(),
            modified_at: Utc::now(),
            created_by: None,
        };

        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("\"username\":\"alice\""));
        assert!(json.contains("\"email\":\"alice@x.com\""));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2-hash"));
    }
}
