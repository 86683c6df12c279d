//! Config matching
//!
//! Decides which project configurations apply to a page URL. A configuration
//! matches if the page is served from the local development host, its
//! production host, one of its delivery hosts, or one of its mountpoints.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use super::project::{inner_host, ConfigSet, ProjectConfig};
use crate::config::Settings;

const SHAREPOINT_MARKER: &str = "sharepoint.com";
const GOOGLE_DOCS_HOST: &str = "docs.google.com";
const GOOGLE_DRIVE_HOST: &str = "drive.google.com";

/// Characters left alone by JavaScript's `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Environment-specific inputs to matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOptions {
    pub dev_host: String,
    pub default_ref: String,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for MatchOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            dev_host: settings.dev_host.clone(),
            default_ref: settings.default_ref.clone(),
        }
    }
}

/// Ids of all configurations matching `url`, in configuration order
pub fn matches(configs: &ConfigSet, url: &Url, options: &MatchOptions) -> Vec<String> {
    matching(configs, url, options)
        .into_iter()
        .map(|config| config.id.clone())
        .collect()
}

/// Configurations matching `url`, in configuration order
///
/// The result borrows only from `configs`.
pub fn matching<'a>(
    configs: &'a ConfigSet,
    url: &Url,
    options: &MatchOptions,
) -> Vec<&'a ProjectConfig> {
    let host = host_of(url);
    configs
        .iter()
        .filter(|config| config_matches(config, &host, url, options))
        .collect()
}

/// `host[:port]` of a URL, the way browsers report `location.host`
pub fn host_of(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

fn config_matches(config: &ProjectConfig, host: &str, url: &Url, options: &MatchOptions) -> bool {
    if host == options.dev_host {
        return true;
    }
    if config.host.as_deref().is_some_and(|h| h == host) {
        return true;
    }
    if host.ends_with(&config.outer_host()) {
        return true;
    }
    let inner = inner_host(
        &config.owner,
        &config.repo,
        &config.git_ref,
        &options.default_ref,
    );
    if host.ends_with(&inner) {
        return true;
    }
    config
        .mountpoints
        .iter()
        .any(|mp| mountpoint_matches(mp, host, url))
}

fn mountpoint_matches(mountpoint: &str, host: &str, url: &Url) -> bool {
    let mp = match Url::parse(mountpoint) {
        Ok(mp) => mp,
        Err(e) => {
            tracing::debug!(mountpoint, error = %e, "skipping invalid mountpoint");
            return false;
        }
    };
    let mp_host = host_of(&mp);

    if host == mp_host {
        if mp_host.contains(SHAREPOINT_MARKER) && mp.path().starts_with("/sites") {
            // sharepoint: the page must belong to the same site
            let site = mp.path().split('/').nth(2).unwrap_or("");
            let site = utf8_percent_encode(site, URI_COMPONENT);
            return url.path().contains(&format!(":/r/sites/{}/", site));
        }
        return true;
    }

    host == GOOGLE_DOCS_HOST && mp_host == GOOGLE_DRIVE_HOST
}
