// Database repositories for users, opaque tokens, and revoked refresh tokens

use sqlx::PgPool;
use validator::ValidationError;

use crate::auth::error::AuthError;
use crate::auth::models::{AuthToken, User};
use crate::auth::token::generate_opaque_key;

const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, \
     phone_number, is_admin, is_active, created_at, modified_at, created_by";

/// Fields needed to insert a new user row
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub is_admin: bool,
    pub created_by: Option<i32>,
}

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user row
    ///
    /// A uniqueness race lost to a concurrent registration surfaces as the
    /// same field-level validation error the pre-insert probes produce, so
    /// the client never sees it as a generic server failure.
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, AuthError> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, first_name, last_name, \
             phone_number, is_admin, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(&new_user.first_name)
            .bind(&new_user.last_name)
            .bind(&new_user.phone_number)
            .bind(new_user.is_admin)
            .bind(new_user.created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        let field = match db_err.constraint() {
                            Some("users_email_key") => "email",
                            _ => "username",
                        };
                        return duplicate_field_error(field);
                    }
                }
                AuthError::Database(e.to_string())
            })
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let query = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))
    }

    /// Find a user by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let query = format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, AuthError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))
    }

    /// All users, newest first
    pub async fn list_all(&self) -> Result<Vec<User>, AuthError> {
        let query = format!("SELECT {} FROM users ORDER BY created_at DESC", USER_COLUMNS);
        sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AuthError::Database(e.to_string()))?;
        Ok(exists.0)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AuthError::Database(e.to_string()))?;
        Ok(exists.0)
    }
}

/// The field-level "already exists" validation error
pub fn duplicate_validation_error(field: &str) -> ValidationError {
    let mut error = ValidationError::new("unique");
    error.message = Some(format!("A user with that {} already exists.", field).into());
    error
}

fn duplicate_field_error(field: &'static str) -> AuthError {
    let mut errors = validator::ValidationErrors::new();
    errors.add(field, duplicate_validation_error(field));
    AuthError::Validation(errors)
}

/// Opaque token repository
#[derive(Clone)]
pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Return the user's opaque token key, creating one if none exists
    ///
    /// Issuance is idempotent: at most one row per user. A concurrent insert
    /// losing the unique race falls through to re-reading the winner's key.
    pub async fn get_or_create(&self, user_id: i32) -> Result<String, AuthError> {
        if let Some(token) = self.find_by_user_id(user_id).await? {
            return Ok(token.key);
        }

        let key = generate_opaque_key();
        let inserted: Option<(String,)> = sqlx::query_as(
            "INSERT INTO auth_tokens (key, user_id) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO NOTHING RETURNING key",
        )
        .bind(&key)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

        match inserted {
            Some((key,)) => Ok(key),
            None => self
                .find_by_user_id(user_id)
                .await?
                .map(|token| token.key)
                .ok_or_else(|| AuthError::Database("token row vanished".to_string())),
        }
    }

    pub async fn find_by_user_id(&self, user_id: i32) -> Result<Option<AuthToken>, AuthError> {
        sqlx::query_as::<_, AuthToken>(
            "SELECT key, user_id, created_at FROM auth_tokens WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))
    }

    /// Resolve an opaque token key to its active owner
    pub async fn find_user_by_key(&self, key: &str) -> Result<Option<User>, AuthError> {
        let query = format!(
            "SELECT {} FROM users u JOIN auth_tokens t ON t.user_id = u.id WHERE t.key = $1",
            USER_COLUMNS
                .split(", ")
                .map(|c| format!("u.{}", c))
                .collect::<Vec<_>>()
                .join(", ")
        );
        sqlx::query_as::<_, User>(&query)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))
    }
}

/// Revocation list repository for blacklisted refresh tokens
#[derive(Clone)]
pub struct RevocationRepository {
    pool: PgPool,
}

impl RevocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a refresh token's identifier as revoked; idempotent
    pub async fn revoke(&self, jti: &str, user_id: i32) -> Result<(), AuthError> {
        sqlx::query(
            "INSERT INTO revoked_tokens (jti, user_id) VALUES ($1, $2) \
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn is_revoked(&self, jti: &str) -> Result<bool, AuthError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1)")
                .bind(jti)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AuthError::Database(e.to_string()))?;
        Ok(exists.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_field_error_targets_field() {
        let error = duplicate_field_error("username");
        match error {
            AuthError::Validation(errors) => {
                let fields = errors.field_errors();
                assert!(fields.contains_key("username"));
                assert!(!fields.contains_key("email"));
            }
            other => panic!("expected Validation error, got {:?}", other),
        }
    }
}
