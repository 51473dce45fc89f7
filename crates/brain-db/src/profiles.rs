//! User profile repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use brain_core::{Error, ProfileRepository, Result, UserProfile};

/// PostgreSQL implementation of ProfileRepository.
pub struct PgProfileRepository {
    pool: Pool<Postgres>,
}

impl PgProfileRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn get(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        let row = sqlx::query(
            "SELECT user_id, onboarding_complete, template FROM user_profile WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| UserProfile {
            user_id: r.get("user_id"),
            onboarding_complete: r.get("onboarding_complete"),
            template: r.get("template"),
        }))
    }

    async fn upsert(&self, profile: &UserProfile) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_profile (user_id, onboarding_complete, template, updated_at_utc)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id) DO UPDATE
             SET onboarding_complete = EXCLUDED.onboarding_complete,
                 template = EXCLUDED.template,
                 updated_at_utc = EXCLUDED.updated_at_utc",
        )
        .bind(profile.user_id)
        .bind(profile.onboarding_complete)
        .bind(&profile.template)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }
}
