//! Card repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use brain_core::{Card, CardInput, CardRepository, Error, Result};

const CARD_COLUMNS: &str = "id, user_id, title, body, category, status, source_type, \
     source_title, source_url, scripture, connected_topic_ids, created_at_utc";

/// PostgreSQL implementation of CardRepository.
pub struct PgCardRepository {
    pool: Pool<Postgres>,
}

impl PgCardRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn parse_column<T: std::str::FromStr<Err = String>>(row: &PgRow, column: &str) -> Result<T> {
    let raw: String = row.try_get(column).map_err(Error::Database)?;
    raw.parse().map_err(Error::Serialization)
}

fn card_from_row(row: PgRow) -> Result<Card> {
    Ok(Card {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        body: row.get("body"),
        category: parse_column(&row, "category")?,
        status: parse_column(&row, "status")?,
        source_type: parse_column(&row, "source_type")?,
        source_title: row.get("source_title"),
        source_url: row.get("source_url"),
        scripture: row.get("scripture"),
        connected_topic_ids: row.get("connected_topic_ids"),
        created_at_utc: row.get("created_at_utc"),
    })
}

#[async_trait]
impl CardRepository for PgCardRepository {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Card>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM card WHERE user_id = $1 ORDER BY created_at_utc DESC, id DESC",
            CARD_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(card_from_row).collect()
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<Card>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM card WHERE id = $1 AND user_id = $2",
            CARD_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(card_from_row).transpose()
    }

    async fn insert(&self, user_id: Uuid, input: CardInput) -> Result<Card> {
        let input = input.normalized()?;
        let id = Uuid::now_v7();

        let row = sqlx::query(&format!(
            "INSERT INTO card (id, user_id, title, body, category, status, source_type,
                               source_title, source_url, scripture, connected_topic_ids,
                               created_at_utc)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {}",
            CARD_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(&input.title)
        .bind(&input.body)
        .bind(input.category.as_str())
        .bind(input.status().as_str())
        .bind(input.source_type.as_str())
        .bind(&input.source_title)
        .bind(&input.source_url)
        .bind(&input.scripture)
        .bind(&input.connected_topic_ids)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "cards",
            op = "insert",
            user_id = %user_id,
            card_id = %id,
            "Card inserted"
        );
        card_from_row(row)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, input: CardInput) -> Result<Card> {
        let input = input.normalized()?;

        let row = sqlx::query(&format!(
            "UPDATE card
             SET title = $3, body = $4, category = $5, status = $6, source_type = $7,
                 source_title = $8, source_url = $9, scripture = $10,
                 connected_topic_ids = $11
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            CARD_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(&input.title)
        .bind(&input.body)
        .bind(input.category.as_str())
        .bind(input.status().as_str())
        .bind(input.source_type.as_str())
        .bind(&input.source_title)
        .bind(&input.source_url)
        .bind(&input.scripture)
        .bind(&input.connected_topic_ids)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(card_from_row)
            .transpose()?
            .ok_or(Error::CardNotFound(id))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM card WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::CardNotFound(id));
        }
        Ok(())
    }
}
