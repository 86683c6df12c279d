//! Display command - Show or change whether the sidekick is displayed

use anyhow::{Context, Result};
use clap::ValueEnum;

use helix_sidekick::sidekick::store::toggle_display;
use helix_sidekick::sidekick::StateStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DisplayAction {
    Show,
    Hide,
    Toggle,
}

/// Apply an action (or just read the flag) and return the resulting value
pub async fn execute(store: &dyn StateStore, action: Option<DisplayAction>) -> Result<bool> {
    let shown = match action {
        None => store.load_display().await?,
        Some(DisplayAction::Toggle) => toggle_display(store).await?,
        Some(DisplayAction::Show) => {
            store
                .save_display(true)
                .await
                .context("Failed to save display setting")?;
            true
        }
        Some(DisplayAction::Hide) => {
            store
                .save_display(false)
                .await
                .context("Failed to save display setting")?;
            false
        }
    };
    tracing::debug!(shown, "display flag");
    Ok(shown)
}

/// Human readable flag value
pub fn describe(display: bool) -> &'static str {
    if display {
        "shown"
    } else {
        "hidden"
    }
}
