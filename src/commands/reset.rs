//! Reset command - Remove all projects and the display setting

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::utils;
use helix_sidekick::sidekick::StateStore;

/// Execute the reset command
pub async fn execute(store: &dyn StateStore, yes: bool) -> Result<()> {
    if !yes && !utils::confirm("Delete all projects and settings?")? {
        println!("Aborted.");
        return Ok(());
    }

    store.clear().await.context("Failed to reset storage")?;
    println!("{}", "All projects deleted.".green());
    Ok(())
}
