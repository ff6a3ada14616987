//! Persistence layer
//!
//! Handlers and the session service only see the repository traits below.
//! `PgStore` is the production backend; `MemoryStore` keeps the same rules
//! (unique emails and tokens, cascading deletes) in process memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DatabaseError;

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryStore;
pub use models::{Chirp, RefreshToken, User};
pub use postgres::PgStore;

/// Storage for refresh tokens
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Insert a new token row. A duplicate token string is a
    /// `Duplicate`; callers never pre-check.
    async fn create_refresh_token(&self, token: &RefreshToken) -> Result<RefreshToken, DatabaseError>;

    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, DatabaseError>;

    /// Set `revoked_at` to `at` unless it is already set, in a single
    /// update. Returns `false` when no row has this token.
    async fn revoke_refresh_token(&self, token: &str, at: DateTime<Utc>) -> Result<bool, DatabaseError>;
}

/// Storage for accounts and chirps
#[async_trait]
pub trait ChirpyRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<User, DatabaseError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn create_chirp(&self, chirp: &Chirp) -> Result<Chirp, DatabaseError>;

    /// All chirps, oldest first
    async fn get_chirps(&self) -> Result<Vec<Chirp>, DatabaseError>;

    async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>, DatabaseError>;

    /// Returns `false` when nothing was deleted
    async fn delete_chirp(&self, id: Uuid) -> Result<bool, DatabaseError>;

    /// Delete every user along with their chirps and refresh tokens
    async fn reset(&self) -> Result<(), DatabaseError>;
}
