// Validation utilities module
// Provides custom validation functions for user field formats

use regex::Regex;
use std::sync::OnceLock;
use validator::ValidationError;

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap())
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").unwrap())
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+1 \(\d{3}\) \d{3}-\d{4}$").unwrap())
}

/// Validates that a username contains only letters, numbers, underscores, or hyphens
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username_regex().is_match(username) {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_username");
        error.message =
            Some("Username must contain only letters, numbers, underscores, or hyphens.".into());
        Err(error)
    }
}

/// Validates that an email has a valid address shape (e.g., xyz@zyx.com)
pub fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    if email_regex().is_match(email) {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_email");
        error.message = Some("Enter a valid email address (e.g., xyz@zyx.com).".into());
        Err(error)
    }
}

/// Validates that a phone number matches the fixed international format
/// +1 (XXX) XXX-XXXX
pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    if phone_regex().is_match(phone) {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_phone_number");
        error.message = Some("Phone number must be in the format: +1 (XXX) XXX-XXXX.".into());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        for username in ["alice", "alice_b", "alice-b", "User123", "a_1-B"] {
            assert!(validate_username(username).is_ok(), "{} should be valid", username);
        }
    }

    #[test]
    fn test_invalid_usernames() {
        for username in ["alice!", "a b", "user@name", "héllo", ""] {
            assert!(validate_username(username).is_err(), "{} should be invalid", username);
        }
    }

    #[test]
    fn test_valid_emails() {
        for email in ["alice@x.com", "a.b@mail.example.org", "a-b@x.co"] {
            assert!(validate_email_format(email).is_ok(), "{} should be valid", email);
        }
    }

    #[test]
    fn test_invalid_emails() {
        for email in ["invalid-email", "a@b", "@x.com", ""] {
            assert!(validate_email_format(email).is_err(), "{} should be invalid", email);
        }
    }

    #[test]
    fn test_valid_phone_numbers() {
        assert!(validate_phone_number("+1 (987) 654-3210").is_ok());
        assert!(validate_phone_number("+1 (000) 000-0000").is_ok());
    }

    #[test]
    fn test_invalid_phone_numbers() {
        for phone in ["1234567890", "+1 987 654 3210", "+2 (987) 654-3210", "+1 (987) 654-321"] {
            assert!(validate_phone_number(phone).is_err(), "{} should be invalid", phone);
        }
    }
}
