//! Configuration file support for gistdeck.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `GISTDECK_`, sections separated
//!    by a double underscore, e.g. `GISTDECK_GITHUB__TOKEN`)
//! 3. Config file (./gistdeck.toml, then ~/.config/gistdeck/config.toml)
//! 4. Built-in defaults
//!
//! The saved login lives in `session.json` under the XDG state directory
//! (`~/.local/state/gistdeck` on Linux).
//!
//! Example config file:
//! ```toml
//! [github]
//! api_url = "https://api.github.com"
//! token = "ghp_..."          # overrides the saved login
//! per_page = 10
//! requests_per_second = 10   # 0 disables client-side pacing
//!
//! [search]
//! user_pages = 5
//! public_pages = 1
//! max_results = 10
//!
//! [retry]
//! max_retries = 3
//! min_delay_ms = 1000
//! max_delay_ms = 8000
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use gistdeck::gist::{DEFAULT_API_URL, DEFAULT_PER_PAGE};
use gistdeck::rate_limit::GITHUB_DEFAULT_RPS;
use gistdeck::retry::{DEFAULT_MAX_RETRIES, INITIAL_BACKOFF_MS, MAX_BACKOFF_MS};
use gistdeck::search::{DEFAULT_PUBLIC_PAGES, DEFAULT_USER_PAGES, MAX_SEARCH_RESULTS};
use gistdeck::{RetryConfig, SearchConfig};
use serde::Deserialize;

const APP_NAME: &str = "gistdeck";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub API configuration.
    pub github: GitHubConfig,
    /// Search crawl bounds.
    pub search: SearchSettings,
    /// Retry policy for read requests.
    pub retry: RetrySettings,
}

/// GitHub API configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API root, for GitHub Enterprise or a proxy.
    pub api_url: String,
    /// Personal access token. Takes precedence over `gistdeck login`.
    pub token: Option<String>,
    /// Page size for listings when `--per-page` is not given.
    pub per_page: u32,
    /// Client-side request pacing. 0 disables it.
    pub requests_per_second: u32,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            per_page: DEFAULT_PER_PAGE,
            requests_per_second: GITHUB_DEFAULT_RPS,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub user_pages: u32,
    pub public_pages: u32,
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            user_pages: DEFAULT_USER_PAGES,
            public_pages: DEFAULT_PUBLIC_PAGES,
            max_results: MAX_SEARCH_RESULTS,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: usize,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            min_delay_ms: INITIAL_BACKOFF_MS,
            max_delay_ms: MAX_BACKOFF_MS,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/gistdeck/config.toml)
    /// 3. Local config file (./gistdeck.toml)
    /// 4. Environment variables with GISTDECK_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("gistdeck.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./gistdeck.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g. GISTDECK_SEARCH__USER_PAGES -> search.user_pages
        builder = builder.add_source(Self::environment());

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    fn environment() -> Environment {
        Environment::with_prefix("GISTDECK")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Non-blank configured token.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            user_pages: self.search.user_pages,
            public_pages: self.search.public_pages,
            max_results: self.search.max_results.min(MAX_SEARCH_RESULTS),
            ..SearchConfig::default()
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            Duration::from_millis(self.retry.min_delay_ms),
            Duration::from_millis(self.retry.max_delay_ms),
            self.retry.max_retries,
        )
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/gistdeck` or `~/.local/state/gistdeck`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }

    /// Where `gistdeck login` keeps the token and cached user.
    pub fn session_path() -> Option<PathBuf> {
        Self::default_state_dir().map(|dir| dir.join("session.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        ConfigBuilder::builder()
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.github.api_url, DEFAULT_API_URL);
        assert!(config.github.token.is_none());
        assert_eq!(config.github.per_page, 10);
        assert_eq!(config.github.requests_per_second, 10);
        assert_eq!(config.search.user_pages, 5);
        assert_eq!(config.search.public_pages, 1);
        assert_eq!(config.search.max_results, 10);
        assert_eq!(config.retry.max_retries, 3);
    }

    #[test]
    fn test_full_config_parsing() {
        let config = parse(
            r#"
            [github]
            api_url = "https://ghe.example.com/api/v3"
            token = "ghp_test123"
            per_page = 50
            requests_per_second = 0

            [search]
            user_pages = 2
            public_pages = 0
            max_results = 5

            [retry]
            max_retries = 1
            min_delay_ms = 200
            max_delay_ms = 400
        "#,
        );

        assert_eq!(config.github.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.github_token().as_deref(), Some("ghp_test123"));
        assert_eq!(config.github.per_page, 50);
        assert_eq!(config.github.requests_per_second, 0);

        let search = config.search_config();
        assert_eq!(search.user_pages, 2);
        assert_eq!(search.public_pages, 0);
        assert_eq!(search.max_results, 5);
        assert_eq!(search.per_page, SearchConfig::default().per_page);

        let retry = config.retry_config();
        assert_eq!(retry.max_retries, 1);
        assert_eq!(retry.min_delay, Duration::from_millis(200));
        assert_eq!(retry.max_delay, Duration::from_millis(400));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = parse(
            r#"
            [search]
            user_pages = 1
        "#,
        );
        assert_eq!(config.search.user_pages, 1);
        assert_eq!(config.search.max_results, 10);
        assert_eq!(config.github.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_max_results_above_limit_is_capped() {
        let config = parse(
            r#"
            [search]
            max_results = 50
        "#,
        );
        assert_eq!(config.search_config().max_results, MAX_SEARCH_RESULTS);
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let config = parse(
            r#"
            [github]
            token = "   "
        "#,
        );
        assert_eq!(config.github_token(), None);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let config = parse(
            r#"
            [github]
            per_page = 20
            unknown_field = "should be ignored"
        "#,
        );
        assert_eq!(config.github.per_page, 20);
    }

    #[test]
    fn test_invalid_toml_fails_to_build() {
        let result = ConfigBuilder::builder()
            .add_source(config::File::from_str("[github\nper_page = 1", FileFormat::Toml))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_session_path_is_under_state_dir() {
        let path = Config::session_path().expect("state dir");
        assert!(path.ends_with("session.json"));
        assert!(path.to_string_lossy().contains("gistdeck"));
    }
}
