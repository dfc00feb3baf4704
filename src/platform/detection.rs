//! Repository identity parsing

use crate::error::{Error, Result};
use crate::types::PlatformConfig;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Default REST API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default web endpoint
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

fn slug_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"^git@[^:]+:([^/]+)/([^/]+?)(?:\.git)?$").expect("valid regex"),
            Regex::new(r"^https?://[^/]+/([^/]+)/([^/]+?)(?:\.git)?/?$").expect("valid regex"),
            Regex::new(r"^([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?$").expect("valid regex"),
        ]
    })
}

/// Parse `owner/repo` from a slug or a remote URL
///
/// Accepts `owner/repo`, `https://host/owner/repo(.git)` and
/// `git@host:owner/repo(.git)`.
pub fn parse_repo_slug(input: &str) -> Result<(String, String)> {
    let input = input.trim();
    slug_patterns()
        .iter()
        .find_map(|re| re.captures(input))
        .map(|c| (c[1].to_string(), c[2].to_string()))
        .ok_or_else(|| Error::Config(format!("cannot parse repository '{input}' as owner/repo")))
}

/// Validate an http(s) base URL and strip its trailing slash
pub fn normalize_base_url(input: &str) -> Result<String> {
    let url = Url::parse(input.trim())
        .map_err(|e| Error::Config(format!("invalid URL '{input}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(Error::Config(format!("invalid URL '{input}': expected http(s)://host")));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Build the platform configuration from raw settings
pub fn parse_repo_info(repository: &str, api_url: &str, server_url: &str) -> Result<PlatformConfig> {
    let (owner, repo) = parse_repo_slug(repository)?;
    Ok(PlatformConfig {
        owner,
        repo,
        api_url: normalize_base_url(api_url)?,
        server_url: normalize_base_url(server_url)?,
    })
}

/// HTTPS clone URL carrying an installation/personal token
pub fn authenticated_clone_url(config: &PlatformConfig, token: &str) -> Result<String> {
    let mut url = Url::parse(&format!("{}/{}/{}.git", config.server_url, config.owner, config.repo))
        .map_err(|e| Error::Parse(format!("cannot build clone URL: {e}")))?;
    url.set_username("x-access-token")
        .and_then(|()| url.set_password(Some(token)))
        .map_err(|()| Error::Parse("clone URL cannot carry credentials".to_string()))?;
    Ok(url.to_string())
}
