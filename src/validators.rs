/// Input validators
///
/// Email format, password bounds, and chirp length plus profanity masking.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MAX_PASSWORD_LENGTH: usize = 128;
pub const MAX_CHIRP_LENGTH: usize = 140;

const BLOCKED_WORDS: [&str; 3] = ["herfuffle", "sharbert", "fornax"];
const MASK: &str = "****";

lazy_static! {
    // RFC 5322 simplified
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("email regex is valid");
}

/// Validate an email address and return it trimmed
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Reject passwords that should never reach the hasher
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    // Bounds the cost of hashing attacker-supplied input.
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password".to_string(), MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

/// Check chirp length and mask blocked words
pub fn validate_chirp(body: &str) -> Result<String, ValidationError> {
    if body.trim().is_empty() {
        return Err(ValidationError::EmptyField("chirp".to_string()));
    }

    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ValidationError::TooLong("chirp".to_string(), MAX_CHIRP_LENGTH));
    }

    Ok(clean_body(body))
}

/// Replace blocked words with `****`
///
/// Words are split on single spaces and compared case-insensitively, so
/// punctuation attached to a word keeps it from matching.
pub fn clean_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if BLOCKED_WORDS.contains(&word.to_lowercase().as_str()) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert_eq!(is_valid_email("  walt@breakingbad.com ").unwrap(), "walt@breakingbad.com");
        assert!(is_valid_email("user.name+tag@sub.example.org").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        for email in ["", "notanemail", "user@", "@example.com", "user@@example.com"] {
            assert!(is_valid_email(email).is_err(), "accepted {:?}", email);
        }
    }

    #[test]
    fn test_password_bounds() {
        assert!(is_valid_password("04234").is_ok());
        assert_eq!(
            is_valid_password(""),
            Err(ValidationError::EmptyField("password".to_string()))
        );
        assert!(is_valid_password(&"a".repeat(MAX_PASSWORD_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_chirp_too_long() {
        let body = "a".repeat(MAX_CHIRP_LENGTH + 1);
        assert_eq!(
            validate_chirp(&body),
            Err(ValidationError::TooLong("chirp".to_string(), MAX_CHIRP_LENGTH))
        );
        assert!(validate_chirp(&"a".repeat(MAX_CHIRP_LENGTH)).is_ok());
    }

    #[test]
    fn test_chirp_length_counts_characters() {
        let body = "é".repeat(MAX_CHIRP_LENGTH);
        assert!(validate_chirp(&body).is_ok());
    }

    #[test]
    fn test_empty_chirp() {
        assert!(validate_chirp("   ").is_err());
    }

    #[test]
    fn test_clean_body_masks_blocked_words() {
        assert_eq!(
            clean_body("I had something interesting for breakfast"),
            "I had something interesting for breakfast"
        );
        assert_eq!(
            clean_body("I hear Mastodon is better than Chirpy. sharbert I need to migrate"),
            "I hear Mastodon is better than Chirpy. **** I need to migrate"
        );
        assert_eq!(clean_body("What a HERFUFFLE and Fornax"), "What a **** and ****");
    }

    #[test]
    fn test_clean_body_keeps_punctuated_words() {
        assert_eq!(clean_body("Sharbert! fornax."), "Sharbert! fornax.");
    }
}
