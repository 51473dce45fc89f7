//! Core traits for second-brain abstractions.
//!
//! These traits define the interfaces that storage backends and external
//! collaborators must satisfy, enabling pluggable backends and testability.
//! Every repository call is scoped to the owning user.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::settings::Settings;

// =============================================================================
// CARD REPOSITORY
// =============================================================================

/// Repository for card CRUD operations.
///
/// Implementations must derive the stored status from the category
/// (see [`CardInput::normalized`] and [`Category::implied_status`]).
#[async_trait]
pub trait CardRepository: Send + Sync {
    /// All cards of a user, newest first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Card>>;

    /// Fetch one card.
    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<Card>>;

    /// Insert a new card.
    async fn insert(&self, user_id: Uuid, input: CardInput) -> Result<Card>;

    /// Replace the writable fields of a card.
    async fn update(&self, user_id: Uuid, id: Uuid, input: CardInput) -> Result<Card>;

    /// Delete a card.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()>;
}

// =============================================================================
// TOPIC REPOSITORY
// =============================================================================

/// Repository for topic tree operations.
#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// All topics of a user, ordered by number ascending.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Topic>>;

    /// Fetch one topic.
    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<Topic>>;

    /// Insert a planned topic.
    async fn insert(&self, user_id: Uuid, topic: NewTopic) -> Result<Topic>;

    /// Insert several planned topics in one transaction.
    async fn insert_many(&self, user_id: Uuid, topics: Vec<NewTopic>) -> Result<Vec<Topic>>;

    /// Update title, emoji and related topics.
    async fn update(&self, user_id: Uuid, id: Uuid, changes: TopicChanges) -> Result<Topic>;

    /// Delete a topic and all of its descendants. Returns the removed ids.
    async fn delete_cascade(&self, user_id: Uuid, id: Uuid) -> Result<Vec<Uuid>>;
}

// =============================================================================
// PROFILE & SESSION REPOSITORIES
// =============================================================================

/// Repository for onboarding state.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch the profile of a user, if one was ever written.
    async fn get(&self, user_id: Uuid) -> Result<Option<UserProfile>>;

    /// Insert or replace the profile.
    async fn upsert(&self, profile: &UserProfile) -> Result<()>;
}

/// Resolves bearer tokens to users.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// The user owning an unexpired session for this token, if any.
    async fn resolve(&self, token: &str) -> Result<Option<Uuid>>;
}

// =============================================================================
// COLLABORATORS
// =============================================================================

/// Converts word-processor documents to plain text before chunking.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn to_plain_text(&self, data: &[u8], filename: &str) -> Result<String>;
}

/// Persisted per-user preferences with an explicit load/save contract.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load settings, falling back to defaults when nothing was saved.
    async fn load(&self, user_id: Uuid) -> Result<Settings>;

    /// Persist settings.
    async fn save(&self, user_id: Uuid, settings: &Settings) -> Result<()>;
}
