//! Shared application state.

use std::sync::Arc;

use governor::RateLimiter;

use brain_core::{
    CardRepository, DocumentConverter, MemoryStore, ProfileRepository, SessionRepository,
    SettingsStore, TopicRepository,
};
use brain_db::Database;

use crate::services::TriageRegistry;

/// Global rate limiter type (direct quota, no keyed bucketing).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub cards: Arc<dyn CardRepository>,
    pub topics: Arc<dyn TopicRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub settings: Arc<dyn SettingsStore>,
    /// Converts `.docx` uploads before chunking.
    pub converter: Arc<dyn DocumentConverter>,
    pub triage: TriageRegistry,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    /// State backed by PostgreSQL repositories.
    pub fn from_database(
        db: Database,
        settings: Arc<dyn SettingsStore>,
        converter: Arc<dyn DocumentConverter>,
    ) -> Self {
        let Database {
            cards,
            topics,
            profiles,
            sessions,
            ..
        } = db;
        Self {
            cards: Arc::new(cards),
            topics: Arc::new(topics),
            profiles: Arc::new(profiles),
            sessions: Arc::new(sessions),
            settings,
            converter,
            triage: TriageRegistry::new(),
            rate_limiter: None,
        }
    }

    /// State backed by a single in-memory store.
    pub fn in_memory(
        store: Arc<MemoryStore>,
        settings: Arc<dyn SettingsStore>,
        converter: Arc<dyn DocumentConverter>,
    ) -> Self {
        Self {
            cards: store.clone(),
            topics: store.clone(),
            profiles: store.clone(),
            sessions: store,
            settings,
            converter,
            triage: TriageRegistry::new(),
            rate_limiter: None,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Option<Arc<GlobalRateLimiter>>) -> Self {
        self.rate_limiter = limiter;
        self
    }
}
