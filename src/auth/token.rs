// JWT issuance/validation and opaque token key generation

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::error::AuthError;

/// Which half of the JWT pair a token claims to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id
    pub sub: i32,
    pub username: String,
    pub token_type: TokenType,
    /// Unique token identifier, the key used by the revocation list
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Token service for JWT operations
///
/// Access tokens expire in 15 minutes, refresh tokens in 7 days.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    access_lifetime: i64,
    refresh_lifetime: i64,
}

impl TokenService {
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            access_lifetime: 900,      // 15 minutes
            refresh_lifetime: 604_800, // 7 days
        }
    }

    fn generate(
        &self,
        user_id: i32,
        username: &str,
        token_type: TokenType,
        lifetime: i64,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            token_type,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + lifetime,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Generate a short-lived access token
    pub fn generate_access_token(&self, user_id: i32, username: &str) -> Result<String, AuthError> {
        self.generate(user_id, username, TokenType::Access, self.access_lifetime)
    }

    /// Generate a long-lived refresh token
    pub fn generate_refresh_token(&self, user_id: i32, username: &str) -> Result<String, AuthError> {
        self.generate(user_id, username, TokenType::Refresh, self.refresh_lifetime)
    }

    /// Generate both halves of the JWT pair, each with its own `jti`
    pub fn generate_token_pair(
        &self,
        user_id: i32,
        username: &str,
    ) -> Result<(String, String), AuthError> {
        let access = self.generate_access_token(user_id, username)?;
        let refresh = self.generate_refresh_token(user_id, username)?;
        Ok((access, refresh))
    }

    /// Validate a token's signature, expiry, and declared type
    ///
    /// Revocation is checked separately by the service layer; a token that
    /// passes here may still be rejected as revoked.
    pub fn validate(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        })?;

        if data.claims.token_type != expected {
            return Err(AuthError::TokenInvalid);
        }

        Ok(data.claims)
    }
}

/// Generate a fresh opaque token key: 20 random bytes, hex encoded (40 chars)
pub fn generate_opaque_key() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_token_service() -> TokenService {
        TokenService::new("test_secret_key_for_testing_purposes".to_string())
    }

    #[test]
    fn test_access_token_expiration_is_15_minutes() {
        let service = test_token_service();
        let token = service.generate_access_token(1, "alice").unwrap();
        let claims = service.validate(&token, TokenType::Access).unwrap();
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_refresh_token_expiration_is_7_days() {
        let service = test_token_service();
        let token = service.generate_refresh_token(1, "alice").unwrap();
        let claims = service.validate(&token, TokenType::Refresh).unwrap();
        assert_eq!(claims.exp - claims.iat, 604_800);
    }

    #[test]
    fn test_token_pair_carries_identity_and_distinct_jtis() {
        let service = test_token_service();
        let (access, refresh) = service.generate_token_pair(42, "alice").unwrap();
        assert_ne!(access, refresh);

        let access_claims = service.validate(&access, TokenType::Access).unwrap();
        let refresh_claims = service.validate(&refresh, TokenType::Refresh).unwrap();
        assert_eq!(access_claims.sub, 42);
        assert_eq!(refresh_claims.sub, 42);
        assert_eq!(access_claims.username, "alice");
        assert_ne!(access_claims.jti, refresh_claims.jti);
    }

    #[test]
    fn test_refresh_token_rejected_where_access_expected() {
        let service = test_token_service();
        let refresh = service.generate_refresh_token(1, "alice").unwrap();
        assert!(matches!(
            service.validate(&refresh, TokenType::Access),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn test_access_token_rejected_where_refresh_expected() {
        let service = test_token_service();
        let access = service.generate_access_token(1, "alice").unwrap();
        assert!(matches!(
            service.validate(&access, TokenType::Refresh),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = test_token_service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            username: "alice".to_string(),
            token_type: TokenType::Access,
            jti: Uuid::new_v4().to_string(),
            iat: now - 1000,
            exp: now - 500,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_key_for_testing_purposes".as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.validate(&token, TokenType::Access),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let service = test_token_service();
        for token in ["", "not.a.token", "invalid_token_format"] {
            assert!(service.validate(token, TokenType::Access).is_err());
        }
    }

    #[test]
    fn test_signature_from_other_secret_is_rejected() {
        let issuer = TokenService::new("secret1".to_string());
        let verifier = TokenService::new("secret2".to_string());
        let token = issuer.generate_access_token(1, "alice").unwrap();
        assert!(issuer.validate(&token, TokenType::Access).is_ok());
        assert!(verifier.validate(&token, TokenType::Access).is_err());
    }

    #[test]
    fn test_opaque_key_shape() {
        let key = generate_opaque_key();
        assert_eq!(key.len(), 40);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_opaque_keys_are_unique() {
        assert_ne!(generate_opaque_key(), generate_opaque_key());
    }

    proptest! {
        #[test]
        fn prop_valid_tokens_roundtrip_identity(
            user_id in 1i32..1_000_000,
            username in "[a-z][a-z0-9_-]{2,20}"
        ) {
            let service = test_token_service();
            let token = service.generate_access_token(user_id, &username)?;
            let claims = service.validate(&token, TokenType::Access)?;
            prop_assert_eq!(claims.sub, user_id);
            prop_assert_eq!(claims.username, username);
        }

        #[test]
        fn prop_malformed_tokens_rejected(malformed in "[a-zA-Z0-9]{10,50}") {
            let service = test_token_service();
            prop_assert!(service.validate(&malformed, TokenType::Access).is_err());
        }
    }
}
