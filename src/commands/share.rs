//! Share command - Print a share URL for a project

use anyhow::{Context, Result};

use helix_sidekick::sidekick::{SidekickError, StateStore};

/// Execute the share command
pub async fn execute(store: &dyn StateStore, id: &str) -> Result<String> {
    let configs = store
        .load_configs()
        .await
        .context("Failed to load project configurations")?;
    let config = configs
        .get(id)
        .ok_or_else(|| SidekickError::UnknownProject(id.to_string()))?;
    Ok(config.share_url())
}
