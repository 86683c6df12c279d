//! Mountpoint manifests (fstab.yaml)
//!
//! A project's mountpoints are declared in the `fstab.yaml` at the root of its
//! repository. Fetch failures never surface as errors: a project without a
//! readable manifest simply has no mountpoints.

use async_trait::async_trait;
use serde::Deserialize;
use serde_yaml::Value;

use crate::config::Settings;

/// Source of a project's mountpoint URLs
#[async_trait]
pub trait MountpointSource: Send + Sync {
    async fn mountpoints(&self, owner: &str, repo: &str, git_ref: &str) -> Vec<String>;
}

#[derive(Debug, Deserialize)]
struct Fstab {
    #[serde(default)]
    mountpoints: Option<serde_yaml::Mapping>,
}

/// Extract mountpoint URLs in declaration order
///
/// Values are either plain URLs or mappings with a `url` key.
pub fn parse_fstab(yaml: &str) -> Result<Vec<String>, serde_yaml::Error> {
    let fstab: Fstab = serde_yaml::from_str(yaml)?;
    let Some(mountpoints) = fstab.mountpoints else {
        return Ok(Vec::new());
    };

    Ok(mountpoints
        .values()
        .filter_map(|value| match value {
            Value::String(url) => Some(url.clone()),
            Value::Mapping(entry) => entry
                .get("url")
                .and_then(|u| u.as_str())
                .map(String::from),
            _ => None,
        })
        .collect())
}

/// Fetches fstab.yaml from the raw GitHub content host
#[derive(Debug, Clone)]
pub struct GitHubFstab {
    client: reqwest::Client,
    raw_host: String,
}

impl GitHubFstab {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: reqwest::Client::new(),
            raw_host: settings.raw_host.clone(),
        }
    }

    pub fn manifest_url(&self, owner: &str, repo: &str, git_ref: &str) -> String {
        format!(
            "https://{}/{}/{}/{}/fstab.yaml",
            self.raw_host, owner, repo, git_ref
        )
    }
}

#[async_trait]
impl MountpointSource for GitHubFstab {
    async fn mountpoints(&self, owner: &str, repo: &str, git_ref: &str) -> Vec<String> {
        let url = self.manifest_url(owner, repo, git_ref);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(%url, %error, "fstab request failed");
                return Vec::new();
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, %status, "no fstab available");
            return Vec::new();
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(error) => {
                tracing::warn!(%url, %error, "fstab response read failed");
                return Vec::new();
            }
        };

        parse_fstab(&body).unwrap_or_else(|error| {
            tracing::warn!(%url, %error, "fstab is not valid YAML");
            Vec::new()
        })
    }
}

/// Fixed mountpoints, regardless of project; used when fetching is disabled
#[derive(Debug, Clone, Default)]
pub struct StaticMountpoints(pub Vec<String>);

#[async_trait]
impl MountpointSource for StaticMountpoints {
    async fn mountpoints(&self, _owner: &str, _repo: &str, _git_ref: &str) -> Vec<String> {
        self.0.clone()
    }
}
