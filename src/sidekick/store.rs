//! Persisted sidekick state
//!
//! Two values are persisted, in two scopes:
//! - the project configuration set, shared between installs ("sync")
//! - the display flag, local to this install ("local")
//!
//! The configuration set is always read and written as a whole.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::error::{Result, SidekickError};
use super::project::ConfigSet;

#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load_display(&self) -> Result<bool>;
    async fn save_display(&self, display: bool) -> Result<()>;
    async fn load_configs(&self) -> Result<ConfigSet>;
    async fn save_configs(&self, configs: &ConfigSet) -> Result<()>;
    /// Forget everything: configurations and display flag
    async fn clear(&self) -> Result<()>;
}

/// Flip the display flag and return its new value
pub async fn toggle_display(store: &dyn StateStore) -> Result<bool> {
    let display = !store.load_display().await?;
    store.save_display(display).await?;
    Ok(display)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SyncArea {
    #[serde(rename = "hlxSidekickConfigs", default)]
    configs: ConfigSet,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LocalArea {
    #[serde(rename = "hlxSidekickDisplay", default)]
    display: bool,
}

/// JSON files on disk, one per scope
#[derive(Debug, Clone)]
pub struct FileStore {
    sync_path: PathBuf,
    local_path: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(sync_path: P, local_path: P) -> Self {
        Self {
            sync_path: sync_path.into(),
            local_path: local_path.into(),
        }
    }

    /// Store at the default locations
    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::new(
            crate::config::sync_store_path()?,
            crate::config::local_store_path()?,
        ))
    }

    async fn read<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> Result<T> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => {
                return Err(SidekickError::Storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        serde_json::from_str(&content).map_err(|e| {
            SidekickError::Storage(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    async fn write<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                SidekickError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| SidekickError::Storage(e.to_string()))?;
        tokio::fs::write(path, content).await.map_err(|e| {
            SidekickError::Storage(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    async fn remove(path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SidekickError::Storage(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[async_trait]
impl StateStore for FileStore {
    async fn load_display(&self) -> Result<bool> {
        let local: LocalArea = Self::read(&self.local_path).await?;
        Ok(local.display)
    }

    async fn save_display(&self, display: bool) -> Result<()> {
        Self::write(&self.local_path, &LocalArea { display }).await
    }

    async fn load_configs(&self) -> Result<ConfigSet> {
        let sync: SyncArea = Self::read(&self.sync_path).await?;
        Ok(sync.configs)
    }

    async fn save_configs(&self, configs: &ConfigSet) -> Result<()> {
        let sync = SyncArea {
            configs: configs.clone(),
        };
        Self::write(&self.sync_path, &sync).await
    }

    async fn clear(&self) -> Result<()> {
        Self::remove(&self.sync_path).await?;
        Self::remove(&self.local_path).await
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    display: Mutex<bool>,
    configs: Mutex<ConfigSet>,
}

impl MemoryStore {
    pub fn new(configs: ConfigSet, display: bool) -> Self {
        Self {
            display: Mutex::new(display),
            configs: Mutex::new(configs),
        }
    }
}

fn poisoned<T>(_: T) -> SidekickError {
    SidekickError::Storage("memory store lock poisoned".to_string())
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load_display(&self) -> Result<bool> {
        Ok(*self.display.lock().map_err(poisoned)?)
    }

    async fn save_display(&self, display: bool) -> Result<()> {
        *self.display.lock().map_err(poisoned)? = display;
        Ok(())
    }

    async fn load_configs(&self) -> Result<ConfigSet> {
        Ok(self.configs.lock().map_err(poisoned)?.clone())
    }

    async fn save_configs(&self, configs: &ConfigSet) -> Result<()> {
        *self.configs.lock().map_err(poisoned)? = configs.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.configs.lock().map_err(poisoned)?.clear();
        *self.display.lock().map_err(poisoned)? = false;
        Ok(())
    }
}
