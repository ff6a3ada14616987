use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::models::{Chirp, RefreshToken, User};
use crate::db::{ChirpyRepository, RefreshTokenRepository};
use crate::error::DatabaseError;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    chirps: Vec<Chirp>,
    refresh_tokens: HashMap<String, RefreshToken>,
}

/// In-process backend with the same constraints as the SQL schema
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing_user(user_id: Uuid) -> DatabaseError {
    DatabaseError::MissingReference(format!("user {} does not exist", user_id))
}

#[async_trait]
impl RefreshTokenRepository for MemoryStore {
    async fn create_refresh_token(&self, token: &RefreshToken) -> Result<RefreshToken, DatabaseError> {
        let mut tables = self.tables.lock().await;

        if !tables.users.contains_key(&token.user_id) {
            return Err(missing_user(token.user_id));
        }
        if tables.refresh_tokens.contains_key(&token.token) {
            return Err(DatabaseError::Duplicate(
                "refresh_tokens_pkey".to_string(),
            ));
        }

        tables.refresh_tokens.insert(token.token.clone(), token.clone());
        Ok(token.clone())
    }

    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, DatabaseError> {
        Ok(self.tables.lock().await.refresh_tokens.get(token).cloned())
    }

    async fn revoke_refresh_token(&self, token: &str, at: DateTime<Utc>) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.lock().await;

        match tables.refresh_tokens.get_mut(token) {
            Some(row) => {
                if row.revoked_at.is_none() {
                    row.revoked_at = Some(at);
                    row.updated_at = at;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ChirpyRepository for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<User, DatabaseError> {
        let mut tables = self.tables.lock().await;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::Duplicate(
                "users_email_key".to_string(),
            ));
        }

        tables.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_chirp(&self, chirp: &Chirp) -> Result<Chirp, DatabaseError> {
        let mut tables = self.tables.lock().await;

        if !tables.users.contains_key(&chirp.user_id) {
            return Err(missing_user(chirp.user_id));
        }

        tables.chirps.push(chirp.clone());
        Ok(chirp.clone())
    }

    async fn get_chirps(&self) -> Result<Vec<Chirp>, DatabaseError> {
        let mut chirps = self.tables.lock().await.chirps.clone();
        chirps.sort_by_key(|c| c.created_at);
        Ok(chirps)
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>, DatabaseError> {
        let tables = self.tables.lock().await;
        Ok(tables.chirps.iter().find(|c| c.id == id).cloned())
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.lock().await;
        let before = tables.chirps.len();
        tables.chirps.retain(|c| c.id != id);
        Ok(tables.chirps.len() < before)
    }

    async fn reset(&self) -> Result<(), DatabaseError> {
        *self.tables.lock().await = Tables::default();
        Ok(())
    }
}
