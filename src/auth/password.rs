// Password hashing and verification backed by Argon2id

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::auth::error::AuthError;

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id with a fresh random salt
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHash)
    }

    /// Verify a password against a stored hash
    ///
    /// Returns `Ok(false)` for a mismatch; `Err` only when the stored hash
    /// itself cannot be parsed.
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = PasswordService::hash_password("Secret123").unwrap();
        assert!(PasswordService::verify_password("Secret123", &hash).unwrap());
    }

    #[test]
    fn test_wrong_password_fails_verification() {
        let hash = PasswordService::hash_password("Secret123").unwrap();
        assert!(!PasswordService::verify_password("WrongPass1", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let hash = PasswordService::hash_password("Secret123").unwrap();
        assert_ne!(hash, "Secret123");
        assert!(!hash.contains("Secret123"));
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let first = PasswordService::hash_password("Secret123").unwrap();
        let second = PasswordService::hash_password("Secret123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(PasswordService::verify_password("Secret123", "not-a-hash").is_err());
    }
}
