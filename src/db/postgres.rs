use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::configuration::DatabaseSettings;
use crate::db::models::{Chirp, RefreshToken, User};
use crate::db::{ChirpyRepository, RefreshTokenRepository};
use crate::error::DatabaseError;

/// PostgreSQL backend
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date
    pub async fn connect(config: &DatabaseSettings) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.connection_string())
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| DatabaseError::Unavailable(format!("Migration failed: {}", e)))?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl RefreshTokenRepository for PgStore {
    async fn create_refresh_token(&self, token: &RefreshToken) -> Result<RefreshToken, DatabaseError> {
        let row = sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (token, created_at, updated_at, user_id, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5, NULL)
            RETURNING token, user_id, created_at, updated_at, expires_at, revoked_at
            "#,
        )
        .bind(&token.token)
        .bind(token.created_at)
        .bind(token.updated_at)
        .bind(token.user_id)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, DatabaseError> {
        let row = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT token, user_id, created_at, updated_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn revoke_refresh_token(&self, token: &str, at: DateTime<Utc>) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = COALESCE(revoked_at, $2),
                updated_at = CASE WHEN revoked_at IS NULL THEN $2 ELSE updated_at END
            WHERE token = $1
            "#,
        )
        .bind(token)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ChirpyRepository for PgStore {
    async fn create_user(&self, user: &User) -> Result<User, DatabaseError> {
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, created_at, updated_at, email, hashed_password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, hashed_password, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, User>(
            "SELECT id, email, hashed_password, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create_chirp(&self, chirp: &Chirp) -> Result<Chirp, DatabaseError> {
        let row = sqlx::query_as::<_, Chirp>(
            r#"
            INSERT INTO chirps (id, created_at, updated_at, body, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, created_at, updated_at, body, user_id
            "#,
        )
        .bind(chirp.id)
        .bind(chirp.created_at)
        .bind(chirp.updated_at)
        .bind(&chirp.body)
        .bind(chirp.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_chirps(&self) -> Result<Vec<Chirp>, DatabaseError> {
        let rows = sqlx::query_as::<_, Chirp>(
            "SELECT id, created_at, updated_at, body, user_id FROM chirps ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>, DatabaseError> {
        let row = sqlx::query_as::<_, Chirp>(
            "SELECT id, created_at, updated_at, body, user_id FROM chirps WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn reset(&self) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM users").execute(&self.pool).await?;

        tracing::info!("All users, chirps and refresh tokens deleted");
        Ok(())
    }
}
