//! Bearer session repository.
//!
//! Only the SHA-256 digest of a token is stored; the plaintext is returned
//! once from [`PgSessionRepository::issue`] and never persisted.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use brain_core::defaults::SESSION_TTL_HOURS;
use brain_core::{Error, Result, SessionRepository};

/// Length of generated session tokens.
const TOKEN_LENGTH: usize = 48;

/// Prefix on issued tokens, to make them recognizable in logs and configs.
pub const TOKEN_PREFIX: &str = "sb_";

/// PostgreSQL implementation of SessionRepository.
pub struct PgSessionRepository {
    pool: Pool<Postgres>,
}

impl PgSessionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn generate_token() -> String {
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::thread_rng();
        let secret: String = (0..TOKEN_LENGTH)
            .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
            .collect();
        format!("{}{}", TOKEN_PREFIX, secret)
    }

    /// Hex SHA-256 digest of a token, as stored in `user_session`.
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Create a session for a user and return the plaintext token.
    pub async fn issue(&self, user_id: Uuid, ttl: Option<Duration>) -> Result<String> {
        let token = Self::generate_token();
        let now = Utc::now();
        let expires_at = now + ttl.unwrap_or_else(|| Duration::hours(SESSION_TTL_HOURS));

        sqlx::query(
            "INSERT INTO user_session (token_hash, user_id, created_at_utc, expires_at_utc)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(Self::hash_token(&token))
        .bind(user_id)
        .bind(now)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "sessions",
            op = "issue",
            user_id = %user_id,
            "Session issued"
        );
        Ok(token)
    }

    /// Remove expired sessions.
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM user_session WHERE expires_at_utc <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn resolve(&self, token: &str) -> Result<Option<Uuid>> {
        let row = sqlx::query(
            "SELECT user_id FROM user_session WHERE token_hash = $1 AND expires_at_utc > $2",
        )
        .bind(Self::hash_token(token))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| r.get("user_id")))
    }
}
