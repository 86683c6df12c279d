//! Edit command - Change a project's repository, host or name
//!
//! Mountpoints are fetched again, since the repository or ref may have changed.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use helix_sidekick::sidekick::fstab::MountpointSource;
use helix_sidekick::sidekick::project::{GitHubSettings, ProjectConfig};
use helix_sidekick::sidekick::{SidekickError, StateStore};

/// Requested changes; `None` keeps the current value, an empty string clears it
#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    pub giturl: Option<String>,
    pub host: Option<String>,
    pub project: Option<String>,
}

pub async fn edit(
    store: &dyn StateStore,
    mountpoints: &dyn MountpointSource,
    id: &str,
    options: EditOptions,
) -> Result<ProjectConfig> {
    let mut configs = store
        .load_configs()
        .await
        .context("Failed to load project configurations")?;
    let current = configs
        .get(id)
        .cloned()
        .ok_or_else(|| SidekickError::UnknownProject(id.to_string()))?;

    let giturl = options.giturl.unwrap_or_else(|| current.git_url());
    let gh = GitHubSettings::parse(&giturl)?;
    let host = options.host.or(current.host);
    let project = options.project.or(current.project);
    let fetched = mountpoints
        .mountpoints(&gh.owner, &gh.repo, &gh.git_ref)
        .await;

    configs.update(id, gh, host, project, fetched)?;
    store
        .save_configs(&configs)
        .await
        .context("Failed to save project configurations")?;

    configs
        .get(id)
        .cloned()
        .ok_or_else(|| SidekickError::UnknownProject(id.to_string()).into())
}

/// Execute the edit command
pub async fn execute(
    store: &dyn StateStore,
    mountpoints: &dyn MountpointSource,
    id: &str,
    options: EditOptions,
    default_ref: &str,
) -> Result<()> {
    let config = edit(store, mountpoints, id, options).await?;
    println!(
        "{} {} ({}/{} @ {})",
        "Updated:".green(),
        config.label(default_ref),
        config.owner,
        config.repo,
        config.git_ref
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use helix_sidekick::sidekick::fstab::StaticMountpoints;
    use helix_sidekick::sidekick::{ConfigSet, MemoryStore};

    fn store_with_blog() -> (MemoryStore, String) {
        let config = ProjectConfig::new(
            GitHubSettings::parse("https://github.com/adobe/theblog").unwrap(),
            Some("blog.adobe.com".to_string()),
            Some("Blog".to_string()),
            vec![],
        );
        let id = config.id.clone();
        (MemoryStore::new(ConfigSet::new(vec![config]), false), id)
    }

    #[tokio::test]
    async fn test_edit_keeps_unspecified_fields() {
        let (store, id) = store_with_blog();
        let mountpoints = StaticMountpoints(vec!["https://drive.google.com/drive/folders/1".into()]);

        let config = edit(
            &store,
            &mountpoints,
            &id,
            EditOptions {
                giturl: Some("https://github.com/adobe/theblog/tree/feature".to_string()),
                host: Some(String::new()),
                project: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(config.git_ref, "feature");
        assert_eq!(config.host, None);
        assert_eq!(config.project.as_deref(), Some("Blog"));
        assert_eq!(config.mountpoints.len(), 1);
        assert_eq!(store.load_configs().await.unwrap().get(&id), Some(&config));
    }

    #[tokio::test]
    async fn test_edit_unknown_project() {
        let (store, _) = store_with_blog();
        let result = edit(
            &store,
            &StaticMountpoints::default(),
            "missing",
            EditOptions::default(),
        )
        .await;
        assert!(result.is_err());
    }
}
