//! List command - Show all configured projects

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};

use helix_sidekick::config::Settings;
use helix_sidekick::sidekick::project::{mountpoint_label, ConfigSet};
use helix_sidekick::sidekick::StateStore;

/// Render projects as a table
pub fn format_table(configs: &ConfigSet, settings: &Settings) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "ID",
            "Project",
            "Repository",
            "Host",
            "Inner Host",
            "Mountpoints",
        ]);

    for config in configs {
        let mountpoints = config
            .mountpoints
            .iter()
            .map(|mp| mountpoint_label(mp))
            .collect::<Vec<_>>()
            .join(", ");

        table.add_row(vec![
            Cell::new(&config.id),
            Cell::new(config.project.as_deref().unwrap_or("Helix Project")),
            Cell::new(format!(
                "{}/{} @ {}",
                config.owner, config.repo, config.git_ref
            )),
            Cell::new(config.host.as_deref().unwrap_or("-")),
            Cell::new(config.inner_host(&settings.default_ref)),
            Cell::new(if mountpoints.is_empty() {
                "-".to_string()
            } else {
                mountpoints
            }),
        ]);
    }

    table.to_string()
}

/// Execute the list command
pub async fn execute(store: &dyn StateStore, settings: &Settings) -> Result<String> {
    let configs = store
        .load_configs()
        .await
        .context("Failed to load project configurations")?;

    if configs.is_empty() {
        return Ok("No projects configured. Add one with `helix-sidekick add`.".to_string());
    }

    Ok(format_table(&configs, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use helix_sidekick::sidekick::project::{GitHubSettings, ProjectConfig};
    use helix_sidekick::sidekick::MemoryStore;

    #[test]
    fn test_format_table() {
        let config = ProjectConfig::new(
            GitHubSettings::parse("https://github.com/adobe/theblog/tree/foo").unwrap(),
            Some("blog.adobe.com".to_string()),
            None,
            vec!["https://adobe.sharepoint.com/sites/TheBlog".to_string()],
        );
        let output = format_table(&ConfigSet::new(vec![config]), &Settings::default());
        assert!(output.contains("adobe/theblog @ foo"));
        assert!(output.contains("foo--theblog--adobe.hlx.page"));
        assert!(output.contains("SharePoint"));
        assert!(output.contains("Helix Project"));
    }

    #[tokio::test]
    async fn test_list_empty() {
        let output = execute(&MemoryStore::default(), &Settings::default())
            .await
            .unwrap();
        assert!(output.contains("No projects configured"));
    }
}
