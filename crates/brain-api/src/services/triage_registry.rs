//! Per-user import triage sessions.
//!
//! Sessions live in process memory only, one per user. Each sits behind its
//! own async mutex, so a disposition holds the lock until its card insert
//! resolves and concurrent requests from the same user queue behind it.
//!
//! Only an upload registers a session. It is dropped again on reset or once
//! the walk completes, so idle users hold no entry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use brain_core::TriageSession;

#[derive(Clone, Default)]
pub struct TriageRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<TriageSession>>>>>,
}

impl TriageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session for a user, created in the `Upload` phase on first use.
    pub async fn session(&self, user_id: Uuid) -> Arc<Mutex<TriageSession>> {
        if let Some(session) = self.sessions.read().await.get(&user_id) {
            return session.clone();
        }
        self.sessions
            .write()
            .await
            .entry(user_id)
            .or_default()
            .clone()
    }

    /// The registered session for a user, if an import is under way.
    pub async fn existing(&self, user_id: Uuid) -> Option<Arc<Mutex<TriageSession>>> {
        self.sessions.read().await.get(&user_id).cloned()
    }

    pub async fn remove(&self, user_id: Uuid) {
        self.sessions.write().await.remove(&user_id);
    }

    /// Number of users with a session.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::{chunk_text, TriagePhase};

    #[tokio::test]
    async fn test_sessions_are_per_user_and_reused() {
        let registry = TriageRegistry::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        registry
            .session(alice)
            .await
            .lock()
            .await
            .start("a.txt", chunk_text("A paragraph that is long enough."))
            .unwrap();

        assert_eq!(
            registry.session(alice).await.lock().await.phase(),
            TriagePhase::Triage
        );
        assert_eq!(
            registry.session(bob).await.lock().await.phase(),
            TriagePhase::Upload
        );
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_existing_does_not_register() {
        let registry = TriageRegistry::new();
        let user = Uuid::new_v4();
        assert!(registry.existing(user).await.is_none());
        assert_eq!(registry.len().await, 0);

        registry.session(user).await;
        assert!(registry.existing(user).await.is_some());

        registry.remove(user).await;
        assert!(registry.existing(user).await.is_none());
        assert_eq!(registry.len().await, 0);
    }
}
