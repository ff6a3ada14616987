/// Session orchestration: login, refresh, revoke
///
/// ```text
/// [Unauthenticated] --credentials verified--> [Active(access, refresh)]
/// [Active] --refresh token valid--> [Active(new access, same refresh)]
/// [Active] --revoke--> [Unauthenticated]
/// ```
///
/// Holds no state of its own beyond the injected codec, store and lifetimes.

use std::sync::Arc;

use chrono::Duration;
use lazy_static::lazy_static;
use uuid::Uuid;

use crate::auth::jwt::AccessTokenCodec;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::refresh_token::RefreshTokenStore;
use crate::configuration::JwtSettings;
use crate::db::{RefreshToken, RefreshTokenRepository};
use crate::error::AuthError;

lazy_static! {
    // Same Argon2 parameters as real account hashes, so checking a password
    // against it costs as much as a real login.
    static ref UNKNOWN_ACCOUNT_HASH: Option<String> =
        hash_password("chirpy-unknown-account").ok();
}

/// Token lifetimes in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenLifetimes {
    pub access: i64,
    pub max_access: i64,
    pub refresh: i64,
}

impl TokenLifetimes {
    /// Lifetime for an access token issued at login
    ///
    /// A requested value is honoured only inside `(0, max_access]`;
    /// anything else gets the default.
    pub fn login_access_ttl(&self, requested: Option<i64>) -> i64 {
        match requested {
            Some(seconds) if seconds > 0 && seconds <= self.max_access => seconds,
            _ => self.access,
        }
    }
}

impl From<&JwtSettings> for TokenLifetimes {
    fn from(config: &JwtSettings) -> Self {
        Self {
            access: config.access_token_expiry,
            max_access: config.max_access_token_expiry,
            refresh: config.refresh_token_expiry,
        }
    }
}

/// Tokens handed out by a successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: RefreshToken,
}

#[derive(Clone)]
pub struct SessionService {
    codec: AccessTokenCodec,
    refresh_tokens: RefreshTokenStore,
    lifetimes: TokenLifetimes,
}

impl SessionService {
    pub fn new(
        codec: AccessTokenCodec,
        refresh_tokens: RefreshTokenStore,
        lifetimes: TokenLifetimes,
    ) -> Self {
        Self {
            codec,
            refresh_tokens,
            lifetimes,
        }
    }

    pub fn from_settings(config: &JwtSettings, repository: Arc<dyn RefreshTokenRepository>) -> Self {
        Self::new(
            AccessTokenCodec::from_settings(config),
            RefreshTokenStore::new(repository),
            TokenLifetimes::from(config),
        )
    }

    /// Check a password and open a session for `user_id`
    ///
    /// # Errors
    /// - `AuthenticationFailed` for a wrong password or an unreadable stored
    ///   hash; the two are indistinguishable to the caller
    /// - `StorageFailure` / `TokenGeneration` when issuing fails
    pub async fn login(
        &self,
        user_id: Uuid,
        password: &str,
        password_hash: &str,
        requested_ttl: Option<i64>,
    ) -> Result<Session, AuthError> {
        match verify_password(password, password_hash) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(user_id = %user_id, "Incorrect password");
                return Err(AuthError::AuthenticationFailed);
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Stored password hash is unusable");
                return Err(AuthError::AuthenticationFailed);
            }
        }

        let ttl = self.lifetimes.login_access_ttl(requested_ttl);
        let access_token = self.codec.issue(user_id, ttl)?;
        let refresh_ttl = Duration::try_seconds(self.lifetimes.refresh).ok_or_else(|| {
            AuthError::TokenGeneration(format!(
                "refresh lifetime of {}s is out of range",
                self.lifetimes.refresh
            ))
        })?;
        let refresh_token = self.refresh_tokens.issue(user_id, refresh_ttl).await?;

        tracing::info!(user_id = %user_id, access_ttl = ttl, "Session opened");

        Ok(Session {
            access_token,
            refresh_token,
        })
    }

    /// Fail a login for an email with no account
    ///
    /// Runs a full password check against a placeholder hash first, so the
    /// response takes as long as a wrong password for a real account.
    pub fn reject_unknown_account(&self, password: &str) -> AuthError {
        match UNKNOWN_ACCOUNT_HASH.as_deref() {
            Some(hash) => {
                let _ = verify_password(password, hash);
            }
            None => tracing::error!("Placeholder password hash is unavailable"),
        }

        tracing::warn!("Login attempt for unknown email");
        AuthError::AuthenticationFailed
    }

    /// Mint a new access token from a refresh token
    ///
    /// Always uses the default access lifetime. The refresh token is left
    /// as is and stays valid.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let user_id = self.refresh_tokens.validate(refresh_token).await?;
        let access_token = self.codec.issue(user_id, self.lifetimes.access)?;

        tracing::info!(user_id = %user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Permanently invalidate a refresh token
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.refresh_tokens.revoke(refresh_token).await?;

        tracing::info!("Refresh token revoked");
        Ok(())
    }

    /// Resolve an access token to the account it was issued for
    pub fn authenticate(&self, access_token: &str) -> Result<Uuid, AuthError> {
        self.codec.validate(access_token).map_err(AuthError::from)
    }
}
