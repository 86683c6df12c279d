//! Project configurations
//!
//! A project configuration binds a GitHub repository (owner, repo, ref) to the
//! hosts it is delivered from and the authoring locations ("mountpoints") its
//! content lives in. Configurations are created from a GitHub URL or from a
//! share URL handed out by another user.

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::error::{Result, SidekickError};

/// Branch assumed when a GitHub URL names none
pub const DEFAULT_REF: &str = "master";

/// Base URL of share links
pub const SHARE_BASE_URL: &str = "https://www.hlx.page/tools/sidekick/";

/// Owner, repository and ref extracted from a GitHub URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubSettings {
    pub owner: String,
    pub repo: String,
    pub git_ref: String,
}

impl GitHubSettings {
    /// Parse `https://github.com/{owner}/{repo}[/tree/{ref}]`
    ///
    /// # Example
    /// ```
    /// use helix_sidekick::sidekick::project::GitHubSettings;
    ///
    /// let gh = GitHubSettings::parse("https://github.com/adobe/theblog/tree/main").unwrap();
    /// assert_eq!(gh.git_ref, "main");
    /// ```
    pub fn parse(giturl: &str) -> Result<Self> {
        let invalid = || SidekickError::InvalidGitUrl(giturl.to_string());

        if !giturl.starts_with("https://github.com") {
            return Err(invalid());
        }

        let url = Url::parse(giturl).map_err(|_| invalid())?;
        let segs: Vec<&str> = url.path().trim_start_matches('/').split('/').collect();

        // need at least owner and repo
        let (owner, repo) = match segs.as_slice() {
            [owner, repo, ..] if !owner.is_empty() && !repo.is_empty() => (*owner, *repo),
            _ => return Err(invalid()),
        };

        let git_ref = match (segs.get(2), segs.get(3)) {
            (Some(&"tree"), Some(r)) if !r.is_empty() => r.to_string(),
            _ => DEFAULT_REF.to_string(),
        };

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            git_ref,
        })
    }
}

/// Settings carried by a share URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareSettings {
    pub giturl: String,
    pub host: Option<String>,
    pub project: Option<String>,
}

impl ShareSettings {
    /// Parse a share URL; its `giturl` parameter must be a valid GitHub URL
    pub fn parse(share_url: &str) -> Result<Self> {
        let invalid = || SidekickError::InvalidShareUrl(share_url.to_string());

        let url = Url::parse(share_url).map_err(|_| invalid())?;
        let param = |name: &str| {
            url.query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
                .filter(|v| !v.is_empty())
        };

        let giturl = param("giturl").ok_or_else(invalid)?;
        GitHubSettings::parse(&giturl).map_err(|_| invalid())?;

        Ok(Self {
            giturl,
            host: param("host"),
            project: param("project"),
        })
    }
}

/// A stored project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub id: String,
    pub owner: String,
    pub repo: String,
    #[serde(rename = "ref", default = "default_ref")]
    pub git_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default)]
    pub mountpoints: Vec<String>,
}

fn default_ref() -> String {
    DEFAULT_REF.to_string()
}

impl ProjectConfig {
    /// Create a configuration with a fresh id
    pub fn new(
        gh: GitHubSettings,
        host: Option<String>,
        project: Option<String>,
        mountpoints: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner: gh.owner,
            repo: gh.repo,
            git_ref: gh.git_ref,
            host: host.filter(|h| !h.is_empty()),
            project: project.filter(|p| !p.is_empty()),
            mountpoints,
        }
    }

    /// Preview host serving this config's branch
    pub fn inner_host(&self, default_ref: &str) -> String {
        inner_host(&self.owner, &self.repo, &self.git_ref, default_ref)
    }

    /// CDN host serving published content
    pub fn outer_host(&self) -> String {
        format!("{}--{}.hlx.live", self.repo, self.owner)
    }

    pub fn git_url(&self) -> String {
        format!(
            "https://github.com/{}/{}/tree/{}",
            self.owner, self.repo, self.git_ref
        )
    }

    /// Human readable name: project name, else production host, else inner host
    pub fn label(&self, default_ref: &str) -> String {
        self.project
            .clone()
            .or_else(|| self.host.clone())
            .unwrap_or_else(|| self.inner_host(default_ref))
    }

    /// Share URL another user can import this configuration from
    pub fn share_url(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("project", self.project.as_deref().unwrap_or(""))
            .append_pair("host", self.host.as_deref().unwrap_or(""))
            .append_pair("giturl", &self.git_url())
            .finish();
        format!("{}?{}", SHARE_BASE_URL, query)
    }

    fn same_project(&self, owner: &str, repo: &str, git_ref: &str) -> bool {
        self.owner == owner && self.repo == repo && self.git_ref == git_ref
    }
}

/// Inner delivery host for a branch; the default branch has no ref prefix
pub fn inner_host(owner: &str, repo: &str, git_ref: &str, default_ref: &str) -> String {
    if git_ref == default_ref {
        format!("{}--{}.hlx.page", repo, owner)
    } else {
        format!("{}--{}--{}.hlx.page", git_ref, repo, owner)
    }
}

/// Display text for a mountpoint link
pub fn mountpoint_label(mountpoint: &str) -> &str {
    if mountpoint.contains("sharepoint") {
        "SharePoint"
    } else if mountpoint.contains("drive") {
        "Google Drive"
    } else {
        mountpoint
    }
}

/// Ordered set of project configurations, unique on (owner, repo, ref)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSet(Vec<ProjectConfig>);

impl ConfigSet {
    pub fn new(configs: Vec<ProjectConfig>) -> Self {
        Self(configs)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProjectConfig> {
        self.0.iter()
    }

    pub fn get(&self, id: &str) -> Option<&ProjectConfig> {
        self.0.iter().find(|c| c.id == id)
    }

    /// Append a configuration, rejecting duplicates without touching the set
    pub fn add(&mut self, config: ProjectConfig) -> Result<()> {
        if self
            .0
            .iter()
            .any(|c| c.same_project(&config.owner, &config.repo, &config.git_ref))
        {
            return Err(SidekickError::DuplicateProject {
                owner: config.owner,
                repo: config.repo,
                git_ref: config.git_ref,
            });
        }
        self.0.push(config);
        Ok(())
    }

    /// Replace the editable fields of an existing configuration
    pub fn update(
        &mut self,
        id: &str,
        gh: GitHubSettings,
        host: Option<String>,
        project: Option<String>,
        mountpoints: Vec<String>,
    ) -> Result<()> {
        let index = self
            .0
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| SidekickError::UnknownProject(id.to_string()))?;

        if self.0.iter().enumerate().any(|(i, c)| {
            i != index && c.same_project(&gh.owner, &gh.repo, &gh.git_ref)
        }) {
            return Err(SidekickError::DuplicateProject {
                owner: gh.owner,
                repo: gh.repo,
                git_ref: gh.git_ref,
            });
        }

        let config = &mut self.0[index];
        config.owner = gh.owner;
        config.repo = gh.repo;
        config.git_ref = gh.git_ref;
        config.host = host.filter(|h| !h.is_empty());
        config.project = project.filter(|p| !p.is_empty());
        config.mountpoints = mountpoints;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<ProjectConfig> {
        let index = self
            .0
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| SidekickError::UnknownProject(id.to_string()))?;
        Ok(self.0.remove(index))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<'a> IntoIterator for &'a ConfigSet {
    type Item = &'a ProjectConfig;
    type IntoIter = std::slice::Iter<'a, ProjectConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blog() -> ProjectConfig {
        ProjectConfig::new(
            GitHubSettings::parse("https://github.com/adobe/theblog").unwrap(),
            Some("blog.adobe.com".to_string()),
            None,
            vec![],
        )
    }

    #[test]
    fn test_parse_github_url_default_ref() {
        let gh = GitHubSettings::parse("https://github.com/adobe/theblog").unwrap();
        assert_eq!(gh.owner, "adobe");
        assert_eq!(gh.repo, "theblog");
        assert_eq!(gh.git_ref, "master");
    }

    #[test]
    fn test_parse_github_url_with_tree() {
        let gh = GitHubSettings::parse("https://github.com/adobe/theblog/tree/foo").unwrap();
        assert_eq!(gh.git_ref, "foo");
    }

    #[test]
    fn test_parse_github_url_blob_is_not_a_ref() {
        let gh = GitHubSettings::parse("https://github.com/adobe/theblog/blob/foo").unwrap();
        assert_eq!(gh.git_ref, "master");
    }

    #[test]
    fn test_parse_github_url_invalid() {
        assert!(GitHubSettings::parse("https://github.com/adobe").is_err());
        assert!(GitHubSettings::parse("https://gitlab.com/adobe/theblog").is_err());
        assert!(GitHubSettings::parse("not a url").is_err());
    }

    #[test]
    fn test_parse_share_url() {
        let share = ShareSettings::parse(
            "https://www.hlx.page/tools/sidekick/?project=Blog&host=blog.adobe.com&giturl=https%3A%2F%2Fgithub.com%2Fadobe%2Ftheblog",
        )
        .unwrap();
        assert_eq!(share.giturl, "https://github.com/adobe/theblog");
        assert_eq!(share.host.as_deref(), Some("blog.adobe.com"));
        assert_eq!(share.project.as_deref(), Some("Blog"));
    }

    #[test]
    fn test_parse_share_url_without_giturl() {
        assert!(ShareSettings::parse("https://www.hlx.page/tools/sidekick/?host=x").is_err());
    }

    #[test]
    fn test_share_url_round_trips() {
        let mut config = blog();
        config.project = Some("The Blog".to_string());
        let share = ShareSettings::parse(&config.share_url()).unwrap();
        assert_eq!(share.giturl, "https://github.com/adobe/theblog/tree/master");
        assert_eq!(share.host.as_deref(), Some("blog.adobe.com"));
        assert_eq!(share.project.as_deref(), Some("The Blog"));
    }

    #[test]
    fn test_hosts() {
        let mut config = blog();
        assert_eq!(config.inner_host("master"), "theblog--adobe.hlx.page");
        assert_eq!(config.outer_host(), "theblog--adobe.hlx.live");
        config.git_ref = "foo".to_string();
        assert_eq!(config.inner_host("master"), "foo--theblog--adobe.hlx.page");
    }

    #[test]
    fn test_label_fallbacks() {
        let mut config = blog();
        assert_eq!(config.label("master"), "blog.adobe.com");
        config.host = None;
        assert_eq!(config.label("master"), "theblog--adobe.hlx.page");
        config.project = Some("Blog".to_string());
        assert_eq!(config.label("master"), "Blog");
    }

    #[test]
    fn test_label_follows_configured_default_ref() {
        let mut config = blog();
        config.host = None;
        config.git_ref = "main".to_string();
        assert_eq!(config.label("main"), "theblog--adobe.hlx.page");
        assert_eq!(config.label("master"), "main--theblog--adobe.hlx.page");
    }

    #[test]
    fn test_add_duplicate_leaves_set_unchanged() {
        let mut set = ConfigSet::default();
        set.add(blog()).unwrap();
        let before = set.clone();

        let err = set.add(blog()).unwrap_err();
        assert!(matches!(err, SidekickError::DuplicateProject { .. }));
        assert_eq!(set.len(), 1);
        assert_eq!(set, before);
    }

    #[test]
    fn test_add_same_repo_other_ref() {
        let mut set = ConfigSet::default();
        set.add(blog()).unwrap();
        let other = ProjectConfig::new(
            GitHubSettings::parse("https://github.com/adobe/theblog/tree/foo").unwrap(),
            None,
            None,
            vec![],
        );
        set.add(other).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_update_and_remove() {
        let mut set = ConfigSet::default();
        let config = blog();
        let id = config.id.clone();
        set.add(config).unwrap();

        set.update(
            &id,
            GitHubSettings::parse("https://github.com/adobe/pages/tree/main").unwrap(),
            Some(String::new()),
            Some("Pages".to_string()),
            vec!["https://drive.google.com/drive/folders/abc".to_string()],
        )
        .unwrap();
        let updated = set.get(&id).unwrap();
        assert_eq!(updated.repo, "pages");
        assert_eq!(updated.git_ref, "main");
        assert_eq!(updated.host, None);
        assert_eq!(updated.mountpoints.len(), 1);

        set.remove(&id).unwrap();
        assert!(set.is_empty());
        assert!(matches!(
            set.remove(&id),
            Err(SidekickError::UnknownProject(_))
        ));
    }

    #[test]
    fn test_deserialize_defaults_ref() {
        let set: ConfigSet =
            serde_json::from_str(r#"[{"id":"1","owner":"adobe","repo":"theblog"}]"#).unwrap();
        let config = set.get("1").unwrap();
        assert_eq!(config.git_ref, "master");
        assert!(config.mountpoints.is_empty());
    }

    #[test]
    fn test_mountpoint_label() {
        assert_eq!(
            mountpoint_label("https://adobe.sharepoint.com/sites/TeamA"),
            "SharePoint"
        );
        assert_eq!(
            mountpoint_label("https://drive.google.com/drive/folders/abc"),
            "Google Drive"
        );
        assert_eq!(
            mountpoint_label("https://example.com/x"),
            "https://example.com/x"
        );
    }
}
