/// Password Hashing and Verification
///
/// Argon2id with a fresh random salt per hash. The PHC string output embeds
/// algorithm, cost parameters and salt, so verification needs nothing else.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::PasswordError;

/// Hash a password with Argon2id
///
/// Any input is hashable, including the empty string. Rejecting weak
/// passwords is the caller's job.
///
/// # Errors
/// Returns `PasswordError::HashingFailure` if salt generation or the
/// hasher itself fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashingFailure(e.to_string()))
}

/// Verify a password against a stored PHC hash
///
/// Returns `Ok(false)` on a plain mismatch. The comparison is constant time.
///
/// # Errors
/// Returns `PasswordError::VerificationFailure` only when `hash` cannot be
/// parsed or uses parameters we cannot evaluate
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::VerificationFailure(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerificationFailure(e.to_string())),
    }
}
