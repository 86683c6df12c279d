//! Remove command - Delete a project configuration

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::utils;
use helix_sidekick::sidekick::{ProjectConfig, StateStore};

pub async fn remove(store: &dyn StateStore, id: &str) -> Result<ProjectConfig> {
    let mut configs = store
        .load_configs()
        .await
        .context("Failed to load project configurations")?;
    let removed = configs.remove(id)?;
    store
        .save_configs(&configs)
        .await
        .context("Failed to save project configurations")?;
    Ok(removed)
}

/// Execute the remove command
pub async fn execute(
    store: &dyn StateStore,
    id: &str,
    yes: bool,
    default_ref: &str,
) -> Result<()> {
    if !yes && !utils::confirm("Delete this project?")? {
        println!("Aborted.");
        return Ok(());
    }

    let removed = remove(store, id).await?;
    println!("{} {}", "Deleted:".green(), removed.label(default_ref));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use helix_sidekick::sidekick::project::GitHubSettings;
    use helix_sidekick::sidekick::{ConfigSet, MemoryStore};

    #[tokio::test]
    async fn test_remove() {
        let a = ProjectConfig::new(
            GitHubSettings::parse("https://github.com/adobe/a").unwrap(),
            None,
            None,
            vec![],
        );
        let b = ProjectConfig::new(
            GitHubSettings::parse("https://github.com/adobe/b").unwrap(),
            None,
            None,
            vec![],
        );
        let store = MemoryStore::new(ConfigSet::new(vec![a.clone(), b.clone()]), false);

        let removed = remove(&store, &a.id).await.unwrap();
        assert_eq!(removed, a);
        assert_eq!(store.load_configs().await.unwrap(), ConfigSet::new(vec![b]));
        assert!(remove(&store, &a.id).await.is_err());
    }
}
