//! Display controller
//!
//! Reacts to host events (navigation, toolbar clicks, chooser input, helper
//! closure, display flag changes) and decides per tab whether the sidekick
//! stays out of the way, loads the single matching project, or asks the user
//! to pick one of several.
//!
//! Events are handled one at a time. Every handler re-reads the tab from the
//! host before acting, so events for tabs that are gone or have navigated
//! elsewhere in the meantime are dropped.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

use super::error::{Result, SidekickError};
use super::host::{
    ActionTitle, ChooserEntry, ChooserKey, Host, HelperStatus, KeyPress, SidekickConfig, TabId,
};
use super::matcher::{matching, MatchOptions};
use super::project::{ConfigSet, ProjectConfig};
use super::store::{toggle_display, StateStore};
use crate::config::Settings;

/// Signals delivered by the host environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Toolbar affordance clicked
    ActionClicked { tab_id: TabId },
    TabActivated { tab_id: TabId },
    NavigationComplete { tab_id: TabId },
    /// Display flag changed in storage; `source` is the tab that changed it, if any
    DisplayChanged { display: bool, source: Option<TabId> },
    ChooserSelected { tab_id: TabId, config_id: String },
    ChooserKey { tab_id: TabId, key: KeyPress },
    ChooserCancelled { tab_id: TabId },
    /// The helper UI was dismissed by the user
    HelperClosed { tab_id: TabId },
    PluginsRequested { tab_id: TabId, manifest_url: Url },
    TabClosed { tab_id: TabId },
}

impl Event {
    pub fn tab_id(&self) -> Option<TabId> {
        match self {
            Self::ActionClicked { tab_id }
            | Self::TabActivated { tab_id }
            | Self::NavigationComplete { tab_id }
            | Self::ChooserSelected { tab_id, .. }
            | Self::ChooserKey { tab_id, .. }
            | Self::ChooserCancelled { tab_id }
            | Self::HelperClosed { tab_id }
            | Self::PluginsRequested { tab_id, .. }
            | Self::TabClosed { tab_id } => Some(*tab_id),
            Self::DisplayChanged { source, .. } => *source,
        }
    }
}

/// Where a tab stands with respect to the sidekick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TabState {
    /// No configuration matches the tab
    #[default]
    Unmanaged,
    MatchedSingle { config_id: String },
    /// Several configurations match and none has been picked
    MatchedMultiple { candidates: Vec<String> },
    /// Helper injected for this configuration
    Active { config_id: String },
}

/// Polls the helper for closure; aborted when dropped
#[derive(Debug)]
struct CloseWatch(JoinHandle<()>);

impl Drop for CloseWatch {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[derive(Debug, Default)]
struct TabSession {
    state: TabState,
    /// Config picked from the chooser, per page origin
    chosen: HashMap<String, String>,
    watch: Option<CloseWatch>,
}

pub struct DisplayController {
    host: Arc<dyn Host>,
    store: Arc<dyn StateStore>,
    settings: Settings,
    options: MatchOptions,
    sessions: HashMap<TabId, TabSession>,
    events: mpsc::UnboundedSender<Event>,
}

impl DisplayController {
    /// Create a controller and the receiving end of its event channel
    pub fn new(
        host: Arc<dyn Host>,
        store: Arc<dyn StateStore>,
        settings: Settings,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let options = MatchOptions::from(&settings);
        let controller = Self {
            host,
            store,
            settings,
            options,
            sessions: HashMap::new(),
            events,
        };
        (controller, receiver)
    }

    /// Sender the host uses to deliver events
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.events.clone()
    }

    pub fn state(&self, tab_id: TabId) -> TabState {
        self.sessions
            .get(&tab_id)
            .map(|s| s.state.clone())
            .unwrap_or_default()
    }

    /// Handle events until the task running this is dropped
    pub async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<Event>) {
        while let Some(event) = receiver.recv().await {
            self.handle(event).await;
        }
    }

    /// Handle a single event; failures are logged, never propagated
    pub async fn handle(&mut self, event: Event) {
        let tab_id = event.tab_id();
        let result = match event {
            Event::ActionClicked { tab_id } => self.action_clicked(tab_id).await,
            Event::TabActivated { tab_id } | Event::NavigationComplete { tab_id } => {
                self.classify(tab_id, None).await
            }
            Event::DisplayChanged { display, source } => self.fan_out(source, display).await,
            Event::ChooserSelected { tab_id, config_id } => {
                self.chooser_selected(tab_id, &config_id).await
            }
            Event::ChooserKey { tab_id, key } => self.chooser_key(tab_id, &key).await,
            Event::ChooserCancelled { tab_id } => self.chooser_cancelled(tab_id).await,
            Event::HelperClosed { tab_id } => self.helper_closed(tab_id).await,
            Event::PluginsRequested {
                tab_id,
                manifest_url,
            } => self.plugins_requested(tab_id, &manifest_url).await,
            Event::TabClosed { tab_id } => {
                self.sessions.remove(&tab_id);
                Ok(())
            }
        };

        match result {
            Ok(()) => {}
            Err(SidekickError::TabUnavailable(id)) => {
                tracing::debug!(tab = %id, "dropping event for unavailable tab");
            }
            Err(error) => {
                tracing::warn!(tab = ?tab_id, %error, "failed to handle event");
            }
        }
    }

    fn session(&mut self, tab_id: TabId) -> &mut TabSession {
        self.sessions.entry(tab_id).or_default()
    }

    fn set_state(&mut self, tab_id: TabId, state: TabState) {
        tracing::debug!(tab = %tab_id, ?state, "tab state");
        self.session(tab_id).state = state;
    }

    /// Tab URL and configuration set, or `None` if the tab navigated meanwhile
    async fn snapshot(&self, tab_id: TabId) -> Result<Option<(Option<Url>, ConfigSet)>> {
        let tab = self.host.tab(tab_id).await?;
        let configs = self.store.load_configs().await?;
        let current = self.host.tab(tab_id).await?;
        if current.url != tab.url {
            tracing::debug!(tab = %tab_id, "tab navigated during classification");
            return Ok(None);
        }
        Ok(Some((tab.url, configs)))
    }

    /// Recompute matches for a tab and act on them
    async fn classify(&mut self, tab_id: TabId, display: Option<bool>) -> Result<()> {
        let Some((url, configs)) = self.snapshot(tab_id).await? else {
            return Ok(());
        };
        let display = match display {
            Some(display) => display,
            None => self.store.load_display().await?,
        };
        self.apply(tab_id, url.as_ref(), display, &configs).await
    }

    async fn apply(
        &mut self,
        tab_id: TabId,
        url: Option<&Url>,
        display: bool,
        configs: &ConfigSet,
    ) -> Result<()> {
        let matched: Vec<&ProjectConfig> = match url {
            Some(url) => matching(configs, url, &self.options),
            None => Vec::new(),
        };
        let previous = self.session(tab_id).state.clone();

        if matched.is_empty() {
            self.host.disable_action(tab_id).await?;
            self.teardown(tab_id, &previous).await?;
            self.set_state(tab_id, TabState::Unmanaged);
            return Ok(());
        }

        self.host
            .enable_action(tab_id, ActionTitle::for_display(display))
            .await?;

        if !display {
            self.teardown(tab_id, &previous).await?;
            let state = match matched.as_slice() {
                [single] => TabState::MatchedSingle {
                    config_id: single.id.clone(),
                },
                _ => TabState::MatchedMultiple {
                    candidates: matched.iter().map(|c| c.id.clone()).collect(),
                },
            };
            self.set_state(tab_id, state);
            return Ok(());
        }

        let remembered = url
            .and_then(|url| self.session(tab_id).chosen.get(&origin(url)).cloned())
            .and_then(|id| matched.iter().copied().find(|c| c.id == id));
        let chosen = match matched.as_slice() {
            [single] => Some(*single),
            _ => remembered,
        };

        match chosen {
            Some(config) => {
                if matches!(previous, TabState::MatchedMultiple { .. }) {
                    self.host.hide_chooser(tab_id).await?;
                }
                self.activate(tab_id, config).await
            }
            None => {
                if matches!(previous, TabState::Active { .. }) {
                    self.teardown(tab_id, &previous).await?;
                }
                let entries = ChooserEntry::for_candidates(
                    matched.iter().copied(),
                    &self.options.default_ref,
                );
                self.host.show_chooser(tab_id, &entries).await?;
                let candidates = entries.into_iter().map(|e| e.config_id).collect();
                self.set_state(tab_id, TabState::MatchedMultiple { candidates });
                Ok(())
            }
        }
    }

    /// Remove whatever the previous state put into the page
    async fn teardown(&mut self, tab_id: TabId, previous: &TabState) -> Result<()> {
        match previous {
            TabState::Active { .. } => {
                self.session(tab_id).watch = None;
                self.host.remove_helper(tab_id).await
            }
            TabState::MatchedMultiple { .. } => self.host.hide_chooser(tab_id).await,
            _ => Ok(()),
        }
    }

    async fn activate(&mut self, tab_id: TabId, config: &ProjectConfig) -> Result<()> {
        let injected = SidekickConfig::new(config, &self.settings);
        self.host.inject_helper(tab_id, &injected).await?;
        self.arm_close_watch(tab_id);
        self.set_state(
            tab_id,
            TabState::Active {
                config_id: config.id.clone(),
            },
        );
        Ok(())
    }

    /// Poll the helper until it reports being hidden; replaces any previous watch
    fn arm_close_watch(&mut self, tab_id: TabId) {
        let host = Arc::clone(&self.host);
        let events = self.events.clone();
        let period = self.settings.poll_interval();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match host.helper_status(tab_id).await {
                    Ok(HelperStatus::Hidden) => {
                        let _ = events.send(Event::HelperClosed { tab_id });
                        break;
                    }
                    Ok(HelperStatus::Visible | HelperStatus::Absent) => {}
                    Err(error) => {
                        tracing::debug!(tab = %tab_id, %error, "stopping close watch");
                        break;
                    }
                }
            }
        });

        self.session(tab_id).watch = Some(CloseWatch(handle));
    }

    async fn action_clicked(&mut self, tab_id: TabId) -> Result<()> {
        let Some((url, configs)) = self.snapshot(tab_id).await? else {
            return Ok(());
        };
        let allowed = url
            .as_ref()
            .is_some_and(|url| !matching(&configs, url, &self.options).is_empty());
        if !allowed {
            let display = self.store.load_display().await?;
            return self.apply(tab_id, url.as_ref(), display, &configs).await;
        }

        let shown = toggle_display(self.store.as_ref()).await?;
        tracing::debug!(tab = %tab_id, shown, "display toggled");

        // the page may have changed while the flag was written; its own
        // navigation event takes care of it then
        let current = self.host.tab(tab_id).await?;
        if current.url == url {
            self.apply(tab_id, url.as_ref(), shown, &configs).await?;
        } else {
            tracing::debug!(tab = %tab_id, "tab navigated during toggle");
        }
        self.fan_out(Some(tab_id), shown).await
    }

    /// Reclassify every tab except the one the change came from
    async fn fan_out(&mut self, source: Option<TabId>, display: bool) -> Result<()> {
        let tabs = self.host.tabs().await?;
        for tab in tabs {
            if Some(tab.id) == source {
                continue;
            }
            match self.classify(tab.id, Some(display)).await {
                Ok(()) => {}
                Err(SidekickError::TabUnavailable(id)) => {
                    tracing::debug!(tab = %id, "skipping unavailable tab");
                }
                Err(error) => {
                    tracing::warn!(tab = %tab.id, %error, "failed to update tab");
                }
            }
        }
        Ok(())
    }

    fn chooser_candidates(&self, tab_id: TabId) -> Option<Vec<String>> {
        match self.sessions.get(&tab_id).map(|s| &s.state) {
            Some(TabState::MatchedMultiple { candidates }) => Some(candidates.clone()),
            _ => None,
        }
    }

    async fn chooser_selected(&mut self, tab_id: TabId, config_id: &str) -> Result<()> {
        let Some(candidates) = self.chooser_candidates(tab_id) else {
            tracing::debug!(tab = %tab_id, "no chooser open");
            return Ok(());
        };
        if !candidates.iter().any(|c| c == config_id) {
            return Err(SidekickError::UnknownProject(config_id.to_string()));
        }
        let Some((url, configs)) = self.snapshot(tab_id).await? else {
            return Ok(());
        };
        let config = configs
            .get(config_id)
            .ok_or_else(|| SidekickError::UnknownProject(config_id.to_string()))?;

        if let Some(url) = &url {
            self.session(tab_id)
                .chosen
                .insert(origin(url), config_id.to_string());
        }
        self.host.hide_chooser(tab_id).await?;
        self.activate(tab_id, config).await
    }

    async fn chooser_key(&mut self, tab_id: TabId, key: &KeyPress) -> Result<()> {
        let Some(candidates) = self.chooser_candidates(tab_id) else {
            return Ok(());
        };
        match key.chooser_key() {
            ChooserKey::Select(n) => match candidates.get(usize::from(n) - 1) {
                Some(config_id) => self.chooser_selected(tab_id, config_id).await,
                None => Ok(()),
            },
            ChooserKey::Cancel => self.chooser_cancelled(tab_id).await,
            ChooserKey::Ignore => Ok(()),
        }
    }

    async fn chooser_cancelled(&mut self, tab_id: TabId) -> Result<()> {
        if self.chooser_candidates(tab_id).is_none() {
            tracing::debug!(tab = %tab_id, "no chooser open");
            return Ok(());
        }
        self.store.save_display(false).await?;
        self.host.hide_chooser(tab_id).await?;
        self.host
            .enable_action(tab_id, ActionTitle::for_display(false))
            .await?;
        self.set_state(tab_id, TabState::Unmanaged);
        self.fan_out(Some(tab_id), false).await
    }

    async fn helper_closed(&mut self, tab_id: TabId) -> Result<()> {
        if !matches!(self.state(tab_id), TabState::Active { .. }) {
            tracing::debug!(tab = %tab_id, "helper closed on inactive tab");
            return Ok(());
        }
        self.session(tab_id).watch = None;
        self.store.save_display(false).await?;
        self.host
            .enable_action(tab_id, ActionTitle::for_display(false))
            .await?;
        self.set_state(tab_id, TabState::Unmanaged);
        self.fan_out(Some(tab_id), false).await
    }

    async fn plugins_requested(&mut self, tab_id: TabId, manifest_url: &Url) -> Result<()> {
        if !matches!(self.state(tab_id), TabState::Active { .. }) {
            tracing::debug!(tab = %tab_id, "ignoring plugins for inactive tab");
            return Ok(());
        }
        self.host.inject_plugins(tab_id, manifest_url).await
    }
}

fn origin(url: &Url) -> String {
    url.origin().ascii_serialization()
}
