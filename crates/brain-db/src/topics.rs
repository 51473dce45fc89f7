//! Topic repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use brain_core::{Error, NewTopic, Result, Topic, TopicChanges, TopicIndex, TopicRepository};

const TOPIC_COLUMNS: &str =
    "id, user_id, number, title, emoji, level, parent_id, related_topic_ids, created_at_utc";

/// PostgreSQL implementation of TopicRepository.
pub struct PgTopicRepository {
    pool: Pool<Postgres>,
}

impl PgTopicRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn insert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        topic: NewTopic,
    ) -> Result<Topic> {
        let row = sqlx::query(&format!(
            "INSERT INTO topic (id, user_id, number, title, emoji, level, parent_id,
                                related_topic_ids, created_at_utc)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {}",
            TOPIC_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(&topic.number)
        .bind(&topic.title)
        .bind(&topic.emoji)
        .bind(topic.level)
        .bind(topic.parent_id)
        .bind(&topic.related_topic_ids)
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| number_conflict(e, &topic.number))?;

        Ok(topic_from_row(row))
    }

    async fn list_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> Result<Vec<Topic>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM topic WHERE user_id = $1 ORDER BY number ASC",
            TOPIC_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(topic_from_row).collect())
    }
}

/// Unique violations on `(user_id, number)` mean another create won the number.
fn number_conflict(err: sqlx::Error, number: &str) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::Precondition(format!("topic number {} is already taken", number))
        }
        _ => Error::Database(err),
    }
}

fn topic_from_row(row: PgRow) -> Topic {
    Topic {
        id: row.get("id"),
        user_id: row.get("user_id"),
        number: row.get("number"),
        title: row.get("title"),
        emoji: row.get("emoji"),
        level: row.get("level"),
        parent_id: row.get("parent_id"),
        related_topic_ids: row.get("related_topic_ids"),
        created_at_utc: row.get("created_at_utc"),
    }
}

#[async_trait]
impl TopicRepository for PgTopicRepository {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Topic>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let topics = self.list_tx(&mut tx, user_id).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(topics)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<Topic>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM topic WHERE id = $1 AND user_id = $2",
            TOPIC_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(topic_from_row))
    }

    async fn insert(&self, user_id: Uuid, topic: NewTopic) -> Result<Topic> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let created = self.insert_tx(&mut tx, user_id, topic).await?;
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "topics",
            op = "insert",
            user_id = %user_id,
            topic_id = %created.id,
            topic_number = %created.number,
            "Topic inserted"
        );
        Ok(created)
    }

    async fn insert_many(&self, user_id: Uuid, topics: Vec<NewTopic>) -> Result<Vec<Topic>> {
        if topics.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let mut created = Vec::with_capacity(topics.len());
        for topic in topics {
            created.push(self.insert_tx(&mut tx, user_id, topic).await?);
        }
        tx.commit().await.map_err(Error::Database)?;
        Ok(created)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, changes: TopicChanges) -> Result<Topic> {
        let row = sqlx::query(&format!(
            "UPDATE topic SET title = $3, emoji = $4, related_topic_ids = $5
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            TOPIC_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(&changes.title)
        .bind(&changes.emoji)
        .bind(&changes.related_topic_ids)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(topic_from_row).ok_or(Error::TopicNotFound(id))
    }

    async fn delete_cascade(&self, user_id: Uuid, id: Uuid) -> Result<Vec<Uuid>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let index = TopicIndex::new(self.list_tx(&mut tx, user_id).await?);
        index.require(id)?;
        let doomed = index.descendants_inclusive(id);

        sqlx::query("DELETE FROM topic WHERE id = ANY($1) AND user_id = $2")
            .bind(&doomed)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "topics",
            op = "delete_cascade",
            user_id = %user_id,
            topic_id = %id,
            result_count = doomed.len(),
            "Topic subtree deleted"
        );
        Ok(doomed)
    }
}
