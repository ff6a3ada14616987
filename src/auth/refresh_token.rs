/// Refresh Token Management
///
/// Refresh tokens are:
/// - 32 bytes from the OS random number generator, hex-encoded (64 chars)
/// - Stored server-side with an expiry and a nullable revocation time
/// - Revocable, permanently; a revoked token never becomes valid again
/// - Not rotated on use; the same token keeps minting access tokens until
///   it expires or is revoked

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Uuid;

use crate::db::{RefreshToken, RefreshTokenRepository};
use crate::error::AuthError;

const TOKEN_BYTES: usize = 32;

/// Generate a new opaque refresh token string
///
/// # Errors
/// Returns `AuthError::TokenGeneration` if the OS entropy source fails
pub fn generate_refresh_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::TokenGeneration(format!("entropy source failed: {}", e)))?;

    Ok(bytes.iter().map(|b| format!("{:02x}", b)).collect())
}

/// Issues, looks up, validates and revokes refresh tokens
#[derive(Clone)]
pub struct RefreshTokenStore {
    repository: Arc<dyn RefreshTokenRepository>,
}

impl RefreshTokenStore {
    pub fn new(repository: Arc<dyn RefreshTokenRepository>) -> Self {
        Self { repository }
    }

    /// Mint and persist a new token for `user_id`, expiring after `ttl`
    ///
    /// Each call creates a new token, so a failed call is not retried here.
    ///
    /// # Errors
    /// Returns `AuthError::StorageFailure` if the row cannot be written
    pub async fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<RefreshToken, AuthError> {
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::TokenGeneration("refresh token expiry is out of range".to_string()))?;
        let token = generate_refresh_token()?;
        let record = RefreshToken::new(token, user_id, expires_at);

        let saved = self.repository.create_refresh_token(&record).await.map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to store refresh token");
            AuthError::StorageFailure(e)
        })?;

        tracing::debug!(user_id = %user_id, expires_at = %saved.expires_at, "Refresh token issued");
        Ok(saved)
    }

    /// Fetch a token row by exact match
    ///
    /// # Errors
    /// Returns `AuthError::NotFound` when no row matches
    pub async fn lookup(&self, token: &str) -> Result<RefreshToken, AuthError> {
        self.repository
            .get_refresh_token(token)
            .await?
            .ok_or(AuthError::NotFound)
    }

    /// Check that a token is usable and return its owner
    ///
    /// Checks, in order:
    /// 1. Token exists
    /// 2. Token has not been revoked
    /// 3. Token has not expired
    pub async fn validate(&self, token: &str) -> Result<Uuid, AuthError> {
        let record = self.lookup(token).await.map_err(|e| {
            if e == AuthError::NotFound {
                tracing::warn!("Refresh token not found");
            }
            e
        })?;

        if record.is_revoked() {
            tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
            return Err(AuthError::Revoked);
        }

        if record.is_expired() {
            tracing::info!(user_id = %record.user_id, "Refresh token expired");
            return Err(AuthError::Expired);
        }

        Ok(record.user_id)
    }

    /// Revoke a token
    ///
    /// Revoking an already revoked token succeeds and keeps the original
    /// revocation time.
    ///
    /// # Errors
    /// Returns `AuthError::NotFound` when no row matches
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let updated = self.repository.revoke_refresh_token(token, Utc::now()).await?;

        if !updated {
            tracing::warn!("Attempt to revoke unknown refresh token");
            return Err(AuthError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ChirpyRepository, MemoryStore, User};

    async fn setup() -> (RefreshTokenStore, Arc<MemoryStore>, Uuid) {
        let db = Arc::new(MemoryStore::new());
        let user = db
            .create_user(&User::new("walt@breakingbad.com".to_string(), "hash".to_string()))
            .await
            .unwrap();
        (RefreshTokenStore::new(db.clone()), db, user.id)
    }

    #[test]
    fn test_generate_refresh_token() {
        let token = generate_refresh_token().unwrap();

        // 32 bytes, hex encoded
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let token1 = generate_refresh_token().unwrap();
        let token2 = generate_refresh_token().unwrap();

        assert_ne!(token1, token2);
    }

    #[tokio::test]
    async fn test_issue_persists_a_live_token() {
        let (store, _, user_id) = setup().await;

        let issued = store.issue(user_id, Duration::days(60)).await.unwrap();

        assert_eq!(issued.user_id, user_id);
        assert!(issued.revoked_at.is_none());
        assert!(issued.expires_at > Utc::now() + Duration::days(59));
        assert_eq!(store.lookup(&issued.token).await.unwrap(), issued);
    }

    #[tokio::test]
    async fn test_validate_returns_owner() {
        let (store, _, user_id) = setup().await;
        let issued = store.issue(user_id, Duration::days(60)).await.unwrap();

        assert_eq!(store.validate(&issued.token).await, Ok(user_id));
        // Not rotated: validating again still works.
        assert_eq!(store.validate(&issued.token).await, Ok(user_id));
    }

    #[tokio::test]
    async fn test_unknown_token_is_not_found() {
        let (store, _, _) = setup().await;

        assert_eq!(store.lookup("nope").await, Err(AuthError::NotFound));
        assert_eq!(store.validate("nope").await, Err(AuthError::NotFound));
        assert_eq!(store.revoke("nope").await, Err(AuthError::NotFound));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let (store, _, user_id) = setup().await;
        let issued = store.issue(user_id, Duration::seconds(-1)).await.unwrap();

        assert_eq!(store.validate(&issued.token).await, Err(AuthError::Expired));
    }

    #[tokio::test]
    async fn test_revoked_token_stays_revoked() {
        let (store, _, user_id) = setup().await;
        let issued = store.issue(user_id, Duration::days(60)).await.unwrap();

        store.revoke(&issued.token).await.unwrap();

        for _ in 0..3 {
            assert_eq!(store.validate(&issued.token).await, Err(AuthError::Revoked));
        }
    }

    #[tokio::test]
    async fn test_revoked_is_reported_before_expired() {
        let (store, _, user_id) = setup().await;
        let issued = store.issue(user_id, Duration::seconds(-1)).await.unwrap();

        store.revoke(&issued.token).await.unwrap();

        assert_eq!(store.validate(&issued.token).await, Err(AuthError::Revoked));
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let (store, _, user_id) = setup().await;
        let issued = store.issue(user_id, Duration::days(60)).await.unwrap();

        store.revoke(&issued.token).await.unwrap();
        let first = store.lookup(&issued.token).await.unwrap().revoked_at;

        store.revoke(&issued.token).await.unwrap();
        let second = store.lookup(&issued.token).await.unwrap().revoked_at;

        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_storage_failure_on_unknown_owner() {
        let (store, _, _) = setup().await;

        let result = store.issue(Uuid::new_v4(), Duration::days(60)).await;
        assert!(matches!(result, Err(AuthError::StorageFailure(_))));
    }
}
