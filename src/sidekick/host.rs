//! Host environment interface
//!
//! The browser (or whatever embeds the sidekick) owns tabs, the toolbar
//! affordance and script injection. The display controller only talks to it
//! through [`Host`].

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use url::Url;

use super::error::Result;
use super::project::ProjectConfig;
use crate::config::Settings;

/// Most candidates a chooser offers
pub const MAX_CHOOSER_ENTRIES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tab as currently reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    pub url: Option<Url>,
}

/// Tooltip semantics of an enabled toolbar affordance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTitle {
    /// Clicking shows the sidekick
    Show,
    /// Clicking hides the sidekick
    Hide,
}

impl ActionTitle {
    pub fn for_display(display: bool) -> Self {
        if display {
            Self::Hide
        } else {
            Self::Show
        }
    }
}

/// What an injected helper reports about itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperStatus {
    Visible,
    /// Dismissed by the user
    Hidden,
    /// Not present in the page
    Absent,
}

/// Configuration object exposed to the injected helper UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidekickConfig {
    pub owner: String,
    pub repo: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_host: Option<String>,
}

impl SidekickConfig {
    pub fn new(config: &ProjectConfig, settings: &Settings) -> Self {
        Self {
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            git_ref: config.git_ref.clone(),
            host: config.host.clone(),
            project: config.project.clone(),
            plugin_host: settings.plugin_host.clone(),
        }
    }
}

/// One candidate in the chooser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChooserEntry {
    pub config_id: String,
    pub label: String,
    /// Number key (1-8) selecting this entry
    pub shortcut: u8,
}

impl ChooserEntry {
    /// Entries for the first [`MAX_CHOOSER_ENTRIES`] candidates
    pub fn for_candidates<'a, I>(candidates: I, default_ref: &str) -> Vec<Self>
    where
        I: IntoIterator<Item = &'a ProjectConfig>,
    {
        candidates
            .into_iter()
            .take(MAX_CHOOSER_ENTRIES)
            .zip(1u8..)
            .map(|(config, shortcut)| Self {
                config_id: config.id.clone(),
                label: config.label(default_ref),
                shortcut,
            })
            .collect()
    }
}

/// A key pressed while the chooser is open
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

/// What a key press means to the chooser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChooserKey {
    /// 1-based entry number
    Select(u8),
    Cancel,
    Ignore,
}

impl KeyPress {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    fn modifiers(&self) -> usize {
        [self.ctrl, self.alt, self.shift, self.meta]
            .iter()
            .filter(|held| **held)
            .count()
    }

    /// Escape cancels; digits 1-8 select, but only with two modifiers held
    pub fn chooser_key(&self) -> ChooserKey {
        if self.key == "Escape" {
            return ChooserKey::Cancel;
        }
        if self.modifiers() < 2 {
            return ChooserKey::Ignore;
        }
        match self.key.parse::<u8>() {
            Ok(n) if (1..=MAX_CHOOSER_ENTRIES as u8).contains(&n) => ChooserKey::Select(n),
            _ => ChooserKey::Ignore,
        }
    }
}

/// Operations the host environment provides to the display controller
#[async_trait]
pub trait Host: Send + Sync {
    /// Look up a tab; fails if the tab is gone
    async fn tab(&self, tab_id: TabId) -> Result<Tab>;

    /// All tabs of the current window
    async fn tabs(&self) -> Result<Vec<Tab>>;

    async fn enable_action(&self, tab_id: TabId, title: ActionTitle) -> Result<()>;

    /// Disable the affordance and reset its tooltip
    async fn disable_action(&self, tab_id: TabId) -> Result<()>;

    /// Inject (or refresh) the helper UI with the given configuration
    async fn inject_helper(&self, tab_id: TabId, config: &SidekickConfig) -> Result<()>;

    async fn remove_helper(&self, tab_id: TabId) -> Result<()>;

    async fn show_chooser(&self, tab_id: TabId, entries: &[ChooserEntry]) -> Result<()>;

    async fn hide_chooser(&self, tab_id: TabId) -> Result<()>;

    /// Additionally inject a plugins manifest into the helper
    async fn inject_plugins(&self, tab_id: TabId, manifest_url: &Url) -> Result<()>;

    /// Inspect the injected helper; used by hosts without close notifications
    async fn helper_status(&self, tab_id: TabId) -> Result<HelperStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sidekick::project::GitHubSettings;

    fn config(n: usize) -> ProjectConfig {
        ProjectConfig::new(
            GitHubSettings::parse(&format!("https://github.com/adobe/repo{}", n)).unwrap(),
            None,
            Some(format!("Project {}", n)),
            vec![],
        )
    }

    #[test]
    fn test_chooser_entries_capped() {
        let configs: Vec<_> = (0..10).map(config).collect();
        let entries = ChooserEntry::for_candidates(&configs, "master");
        assert_eq!(entries.len(), 8);
        assert_eq!(entries[0].shortcut, 1);
        assert_eq!(entries[7].shortcut, 8);
        assert_eq!(entries[7].label, "Project 7");
    }

    #[test]
    fn test_chooser_keys() {
        let mut key = KeyPress::new("3");
        assert_eq!(key.chooser_key(), ChooserKey::Ignore);
        key.ctrl = true;
        assert_eq!(key.chooser_key(), ChooserKey::Ignore);
        key.shift = true;
        assert_eq!(key.chooser_key(), ChooserKey::Select(3));

        key.key = "9".to_string();
        assert_eq!(key.chooser_key(), ChooserKey::Ignore);
        key.key = "0".to_string();
        assert_eq!(key.chooser_key(), ChooserKey::Ignore);

        assert_eq!(KeyPress::new("Escape").chooser_key(), ChooserKey::Cancel);
    }

    #[test]
    fn test_sidekick_config_fields() {
        let mut project = config(1);
        project.mountpoints = vec!["https://drive.google.com/drive/folders/1".to_string()];
        let settings = Settings {
            plugin_host: Some("https://plugins.example.com".to_string()),
            ..Settings::default()
        };
        let json = serde_json::to_value(SidekickConfig::new(&project, &settings)).unwrap();
        assert_eq!(json["owner"], "adobe");
        assert_eq!(json["ref"], "master");
        assert_eq!(json["project"], "Project 1");
        assert_eq!(json["pluginHost"], "https://plugins.example.com");
        assert!(json.get("mountpoints").is_none());
        assert!(json.get("host").is_none());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_action_title() {
        assert_eq!(ActionTitle::for_display(true), ActionTitle::Hide);
        assert_eq!(ActionTitle::for_display(false), ActionTitle::Show);
    }
}
