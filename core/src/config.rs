//! Client configuration: where to send requests and which identity headers
//! to attach.

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

pub const ENV_BASE_URL: &str = "GITHUB_API_URL";
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_USER_AGENT: &str = "GITHUB_USER_AGENT";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    concat!("github-client/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Settings consumed by `GithubApi::from_config`.
///
/// The token is attached verbatim as `Authorization: token <token>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Build a config from `GITHUB_API_URL`, `GITHUB_TOKEN` and
    /// `GITHUB_USER_AGENT`. Unset or empty variables fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();
        Self {
            base_url: get(ENV_BASE_URL).unwrap_or(defaults.base_url),
            token: get(ENV_TOKEN),
            user_agent: get(ENV_USER_AGENT).unwrap_or(defaults.user_agent),
        }
    }
}
