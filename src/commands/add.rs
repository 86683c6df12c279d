//! Add command - Register a project from a share URL or a GitHub URL

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::utils;
use helix_sidekick::sidekick::fstab::MountpointSource;
use helix_sidekick::sidekick::project::{GitHubSettings, ProjectConfig, ShareSettings};
use helix_sidekick::sidekick::StateStore;

/// Where the new project's settings come from
#[derive(Debug, Clone)]
pub enum AddSource {
    /// Share URL handed out by another user
    Share(String),
    /// GitHub URL entered by hand
    Manual {
        giturl: String,
        host: Option<String>,
        project: Option<String>,
    },
}

impl AddSource {
    fn resolve(self) -> Result<(GitHubSettings, Option<String>, Option<String>)> {
        match self {
            Self::Share(share_url) => {
                let share = ShareSettings::parse(&share_url)?;
                let gh = GitHubSettings::parse(&share.giturl)?;
                Ok((gh, share.host, share.project))
            }
            Self::Manual {
                giturl,
                host,
                project,
            } => {
                let gh = GitHubSettings::parse(&giturl)?;
                Ok((gh, utils::non_empty(host), utils::non_empty(project)))
            }
        }
    }
}

/// Add a project; fails without touching storage if it already exists
pub async fn add(
    store: &dyn StateStore,
    mountpoints: &dyn MountpointSource,
    source: AddSource,
) -> Result<ProjectConfig> {
    let (gh, host, project) = source.resolve()?;
    let fetched = mountpoints
        .mountpoints(&gh.owner, &gh.repo, &gh.git_ref)
        .await;
    let config = ProjectConfig::new(gh, host, project, fetched);

    let mut configs = store
        .load_configs()
        .await
        .context("Failed to load project configurations")?;
    configs.add(config.clone())?;
    store
        .save_configs(&configs)
        .await
        .context("Failed to save project configurations")?;

    tracing::info!(id = %config.id, owner = %config.owner, repo = %config.repo, "project added");
    Ok(config)
}

/// Execute the add command
pub async fn execute(
    store: &dyn StateStore,
    mountpoints: &dyn MountpointSource,
    source: AddSource,
    default_ref: &str,
) -> Result<()> {
    let config = add(store, mountpoints, source).await?;
    println!(
        "{} {} ({}/{} @ {})",
        "Added:".green(),
        config.label(default_ref),
        config.owner,
        config.repo,
        config.git_ref
    );
    println!("  ID: {}", config.id.dimmed());
    if config.mountpoints.is_empty() {
        println!("  {}", "No mountpoints found in fstab.yaml".yellow());
    }
    Ok(())
}
