/// JWT Claims structure
///
/// Payload of an access token: standard registered claims only (RFC 7519).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TokenError;

/// Claims carried by every access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (account id as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for `user_id` expiring `ttl_seconds` from now
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if the expiry does not fit in an `i64`
    pub fn new(user_id: Uuid, ttl_seconds: i64, issuer: &str) -> Result<Self, TokenError> {
        let now = chrono::Utc::now().timestamp();
        let exp = now
            .checked_add(ttl_seconds)
            .ok_or_else(|| TokenError::Signing(format!("lifetime of {}s is out of range", ttl_seconds)))?;

        Ok(Self {
            iss: issuer.to_string(),
            sub: user_id.to_string(),
            iat: now,
            exp,
        })
    }

    /// Extract the account id from the subject claim
    ///
    /// # Errors
    /// Returns `TokenError::SubjectUnparseable` if `sub` is not a UUID
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::SubjectUnparseable(self.sub.clone()))
    }

    /// A token is usable only while `exp` is strictly in the future
    pub fn is_expired(&self) -> bool {
        self.exp <= chrono::Utc::now().timestamp()
    }
}
