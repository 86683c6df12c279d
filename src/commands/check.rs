//! Check command - Show which projects apply to a page URL

use anyhow::{Context, Result};
use url::Url;

use helix_sidekick::config::Settings;
use helix_sidekick::sidekick::matcher::matching;
use helix_sidekick::sidekick::{MatchOptions, StateStore};

/// Labels of matching projects, in configuration order
pub async fn check(store: &dyn StateStore, settings: &Settings, url: &str) -> Result<Vec<String>> {
    let url = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
    let configs = store
        .load_configs()
        .await
        .context("Failed to load project configurations")?;
    let options = MatchOptions::from(settings);

    Ok(matching(&configs, &url, &options)
        .into_iter()
        .map(|config| format!("{}  {}", config.id, config.label(&options.default_ref)))
        .collect())
}

/// Execute the check command
pub async fn execute(store: &dyn StateStore, settings: &Settings, url: &str) -> Result<String> {
    let matched = check(store, settings, url).await?;
    if matched.is_empty() {
        return Ok("No project matches this URL.".to_string());
    }
    Ok(matched.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use helix_sidekick::sidekick::project::{GitHubSettings, ProjectConfig};
    use helix_sidekick::sidekick::{ConfigSet, MemoryStore};

    #[tokio::test]
    async fn test_check() {
        let config = ProjectConfig::new(
            GitHubSettings::parse("https://github.com/adobe/theblog").unwrap(),
            Some("blog.adobe.com".to_string()),
            None,
            vec![],
        );
        let store = MemoryStore::new(ConfigSet::new(vec![config.clone()]), false);
        let settings = Settings::default();

        let matched = check(&store, &settings, "https://theblog--adobe.hlx.page/x")
            .await
            .unwrap();
        assert_eq!(matched, vec![format!("{}  blog.adobe.com", config.id)]);

        let output = execute(&store, &settings, "https://example.com/").await.unwrap();
        assert_eq!(output, "No project matches this URL.");

        assert!(check(&store, &settings, "not a url").await.is_err());
    }

    #[tokio::test]
    async fn test_check_labels_use_configured_default_ref() {
        let config = ProjectConfig::new(
            GitHubSettings::parse("https://github.com/adobe/theblog/tree/main").unwrap(),
            None,
            None,
            vec![],
        );
        let store = MemoryStore::new(ConfigSet::new(vec![config.clone()]), false);
        let settings = Settings {
            default_ref: "main".to_string(),
            ..Settings::default()
        };

        let matched = check(&store, &settings, "https://theblog--adobe.hlx.page/")
            .await
            .unwrap();
        assert_eq!(matched, vec![format!("{}  theblog--adobe.hlx.page", config.id)]);
    }
}
