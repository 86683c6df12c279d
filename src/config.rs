//! Platform-specific paths and runtime settings

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the sidekick data directory
pub const DIR_ENV: &str = "HELIX_SIDEKICK_DIR";

/// Get the sidekick data directory
/// - `$HELIX_SIDEKICK_DIR` if set
/// - macOS: ~/Library/Application Support/helix-sidekick/
/// - Linux: ~/.config/helix-sidekick/
/// - Windows: %APPDATA%/helix-sidekick/
pub fn sidekick_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let config = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config.join("helix-sidekick"))
}

/// Shared ("sync") scope: the project configuration set
pub fn sync_store_path() -> Result<PathBuf> {
    Ok(sidekick_dir()?.join("sync.json"))
}

/// Per-install ("local") scope: the display flag
pub fn local_store_path() -> Result<PathBuf> {
    Ok(sidekick_dir()?.join("local.json"))
}

pub fn settings_path() -> Result<PathBuf> {
    Ok(sidekick_dir()?.join("settings.json"))
}

/// Runtime settings, read from settings.json
///
/// Every field has a default, so a missing or partial file is fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Local development host (host:port) that every project matches
    pub dev_host: String,

    /// Branch whose inner host carries no ref prefix
    pub default_ref: String,

    /// How often an injected helper is checked for having been closed
    pub poll_interval_ms: u64,

    /// Plugin host forwarded to the helper UI
    pub plugin_host: Option<String>,

    /// Host serving raw repository files (fstab.yaml)
    pub raw_host: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dev_host: "localhost:3000".to_string(),
            default_ref: crate::sidekick::project::DEFAULT_REF.to_string(),
            poll_interval_ms: 1000,
            plugin_host: None,
            raw_host: "raw.githubusercontent.com".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default location
    pub fn load() -> Result<Self> {
        Self::read(settings_path()?)
    }

    /// Read settings from a file, falling back to defaults if it does not exist
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse: {}", path.display()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_paths_exist() {
        // These should not panic
        let _ = sidekick_dir();
        let _ = sync_store_path();
        let _ = local_store_path();
        let _ = settings_path();
    }

    #[test]
    fn test_missing_settings_use_defaults() {
        let settings = Settings::read("/nonexistent/helix-sidekick/settings.json").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.dev_host, "localhost:3000");
        assert_eq!(settings.poll_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_partial_settings() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "devHost": "localhost:8080", "defaultRef": "main" }}"#).unwrap();

        let settings = Settings::read(file.path()).unwrap();
        assert_eq!(settings.dev_host, "localhost:8080");
        assert_eq!(settings.default_ref, "main");
        assert_eq!(settings.raw_host, "raw.githubusercontent.com");
        assert_eq!(settings.plugin_host, None);
    }

    #[test]
    fn test_invalid_settings() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(Settings::read(file.path()).is_err());
    }
}
