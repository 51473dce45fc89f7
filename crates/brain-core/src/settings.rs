//! Per-user view preferences behind an injected store.
//!
//! The only preference today is the capture view mode (list or kanban),
//! which must survive restarts. Stores are passed in explicitly; nothing
//! here is global state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::traits::SettingsStore;

/// How the capture page lays out cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Kanban,
}

/// User preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Settings {
    #[serde(default)]
    pub view_mode: ViewMode,
}

/// Settings kept in process memory only.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    entries: RwLock<HashMap<Uuid, Settings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self, user_id: Uuid) -> Result<Settings> {
        Ok(self
            .entries
            .read()
            .await
            .get(&user_id)
            .copied()
            .unwrap_or_default())
    }

    async fn save(&self, user_id: Uuid, settings: &Settings) -> Result<()> {
        self.entries.write().await.insert(user_id, *settings);
        Ok(())
    }
}

/// Settings persisted as one JSON document mapping user id to settings.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash mid-write leaves the previous document intact.
#[derive(Debug)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<HashMap<Uuid, Settings>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(HashMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    async fn load(&self, user_id: Uuid) -> Result<Settings> {
        Ok(self
            .read_all()
            .await?
            .get(&user_id)
            .copied()
            .unwrap_or_default())
    }

    async fn save(&self, user_id: Uuid, settings: &Settings) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut all = self.read_all().await?;
        all.insert(user_id, *settings);

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&all)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(
            subsystem = "api",
            component = "settings",
            op = "save",
            user_id = %user_id,
            path = %self.path.display(),
            "Saved settings"
        );
        Ok(())
    }
}
