//! In-memory repositories.
//!
//! A single [`MemoryStore`] implements every repository trait so tests and
//! local demos can run the full API without PostgreSQL. Ordering and
//! validation follow the database implementations.
//!
//! ```rust,ignore
//! use brain_core::{CardInput, CardRepository, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let user = Uuid::new_v4();
//! let card = store
//!     .insert(user, CardInput { title: "Grace".into(), ..Default::default() })
//!     .await?;
//! assert_eq!(store.list(user).await?, vec![card]);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::*;
use crate::topic_tree::TopicIndex;
use crate::traits::{CardRepository, ProfileRepository, SessionRepository, TopicRepository};

#[derive(Debug, Default)]
struct State {
    cards: Vec<Card>,
    topics: Vec<Topic>,
    profiles: HashMap<Uuid, UserProfile>,
    sessions: HashMap<String, Uuid>,
}

/// Process-local store implementing all repository traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    fail_card_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bearer token for a user.
    pub async fn add_session(&self, token: impl Into<String>, user_id: Uuid) {
        self.state
            .write()
            .await
            .sessions
            .insert(token.into(), user_id);
    }

    /// Make card inserts and updates fail, to exercise error paths.
    pub fn set_fail_card_writes(&self, fail: bool) {
        self.fail_card_writes.store(fail, Ordering::SeqCst);
    }

    fn check_card_writes(&self) -> Result<()> {
        if self.fail_card_writes.load(Ordering::SeqCst) {
            return Err(Error::Internal("card storage unavailable".to_string()));
        }
        Ok(())
    }
}

fn build_card(user_id: Uuid, id: Uuid, input: CardInput, created: chrono::DateTime<Utc>) -> Card {
    Card {
        id,
        user_id,
        status: input.status(),
        title: input.title,
        body: input.body,
        category: input.category,
        source_type: input.source_type,
        source_title: input.source_title,
        source_url: input.source_url,
        scripture: input.scripture,
        connected_topic_ids: input.connected_topic_ids,
        created_at_utc: created,
    }
}

#[async_trait]
impl CardRepository for MemoryStore {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Card>> {
        let state = self.state.read().await;
        let mut cards: Vec<Card> = state
            .cards
            .iter()
            .rev()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        cards.sort_by(|a, b| b.created_at_utc.cmp(&a.created_at_utc));
        Ok(cards)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<Card>> {
        let state = self.state.read().await;
        Ok(state
            .cards
            .iter()
            .find(|c| c.id == id && c.user_id == user_id)
            .cloned())
    }

    async fn insert(&self, user_id: Uuid, input: CardInput) -> Result<Card> {
        let input = input.normalized()?;
        self.check_card_writes()?;
        let card = build_card(user_id, Uuid::now_v7(), input, Utc::now());
        self.state.write().await.cards.push(card.clone());
        Ok(card)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, input: CardInput) -> Result<Card> {
        let input = input.normalized()?;
        self.check_card_writes()?;
        let mut state = self.state.write().await;
        let slot = state
            .cards
            .iter_mut()
            .find(|c| c.id == id && c.user_id == user_id)
            .ok_or(Error::CardNotFound(id))?;
        *slot = build_card(user_id, id, input, slot.created_at_utc);
        Ok(slot.clone())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        let before = state.cards.len();
        state.cards.retain(|c| !(c.id == id && c.user_id == user_id));
        if state.cards.len() == before {
            return Err(Error::CardNotFound(id));
        }
        Ok(())
    }
}

fn build_topic(user_id: Uuid, topic: NewTopic) -> Topic {
    Topic {
        id: Uuid::now_v7(),
        user_id,
        number: topic.number,
        title: topic.title,
        emoji: topic.emoji,
        level: topic.level,
        parent_id: topic.parent_id,
        related_topic_ids: topic.related_topic_ids,
        created_at_utc: Utc::now(),
    }
}

fn ensure_number_free(topics: &[Topic], user_id: Uuid, number: &str) -> Result<()> {
    if topics
        .iter()
        .any(|t| t.user_id == user_id && t.number == number)
    {
        return Err(Error::Precondition(format!(
            "topic number {} is already taken",
            number
        )));
    }
    Ok(())
}

#[async_trait]
impl TopicRepository for MemoryStore {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Topic>> {
        let state = self.state.read().await;
        let mut topics: Vec<Topic> = state
            .topics
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        topics.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(topics)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<Topic>> {
        let state = self.state.read().await;
        Ok(state
            .topics
            .iter()
            .find(|t| t.id == id && t.user_id == user_id)
            .cloned())
    }

    async fn insert(&self, user_id: Uuid, topic: NewTopic) -> Result<Topic> {
        let mut state = self.state.write().await;
        ensure_number_free(&state.topics, user_id, &topic.number)?;
        let topic = build_topic(user_id, topic);
        state.topics.push(topic.clone());
        Ok(topic)
    }

    async fn insert_many(&self, user_id: Uuid, topics: Vec<NewTopic>) -> Result<Vec<Topic>> {
        let mut state = self.state.write().await;
        let mut created: Vec<Topic> = Vec::with_capacity(topics.len());
        for topic in topics {
            ensure_number_free(&state.topics, user_id, &topic.number)?;
            ensure_number_free(&created, user_id, &topic.number)?;
            created.push(build_topic(user_id, topic));
        }
        state.topics.extend(created.iter().cloned());
        Ok(created)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, changes: TopicChanges) -> Result<Topic> {
        let mut state = self.state.write().await;
        let topic = state
            .topics
            .iter_mut()
            .find(|t| t.id == id && t.user_id == user_id)
            .ok_or(Error::TopicNotFound(id))?;
        topic.title = changes.title;
        topic.emoji = changes.emoji;
        topic.related_topic_ids = changes.related_topic_ids;
        Ok(topic.clone())
    }

    async fn delete_cascade(&self, user_id: Uuid, id: Uuid) -> Result<Vec<Uuid>> {
        let mut state = self.state.write().await;
        let owned: Vec<Topic> = state
            .topics
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        let index = TopicIndex::new(owned);
        index.require(id)?;

        let removed = index.descendants_inclusive(id);
        let doomed: HashSet<Uuid> = removed.iter().copied().collect();
        state
            .topics
            .retain(|t| !(t.user_id == user_id && doomed.contains(&t.id)));
        Ok(removed)
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        Ok(self.state.read().await.profiles.get(&user_id).cloned())
    }

    async fn upsert(&self, profile: &UserProfile) -> Result<()> {
        self.state
            .write()
            .await
            .profiles
            .insert(profile.user_id, profile.clone());
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn resolve(&self, token: &str) -> Result<Option<Uuid>> {
        Ok(self.state.read().await.sessions.get(token).copied())
    }
}
