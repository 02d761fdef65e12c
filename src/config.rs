//! Configuration and settings management
//!
//! Loads settings from config files and environment variables and defines
//! the catalog and content-filter defaults.

use crate::utils::split_list;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Jikan v4 API base URL
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://api.jikan.moe/v4";
/// Per-request timeout for catalog calls
pub const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 10;
/// Maximum number of search results offered to the user
pub const SEARCH_RESULT_LIMIT: usize = 5;
/// Canonical MyAnimeList page prefix, the anime id is appended
pub const CATALOG_PAGE_URL: &str = "https://myanimelist.net/anime";

/// Genre, theme and demographic names that mark a title as mature
pub const DEFAULT_FORBIDDEN_TAGS: &[&str] = &["Hentai", "Erotica", "Ecchi"];

/// Regexes searched in the lower-cased synopsis
pub const DEFAULT_BLOCKLIST_PATTERNS: &[&str] = &[
    r"\bhentai\b",
    r"\berotic",
    r"\bnsfw\b",
    r"\bsexually explicit\b",
    r"\bpornograph",
];

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// Catalog API base URL, without a trailing slash
    #[serde(default = "default_catalog_base_url")]
    pub catalog_base_url: String,

    /// Timeout applied to every catalog request, in seconds
    #[serde(default = "default_catalog_timeout_secs")]
    pub catalog_timeout_secs: u64,

    /// Comma-separated list of forbidden genre/theme/demographic names
    #[serde(rename = "forbidden_tags")]
    pub forbidden_tags_str: Option<String>,

    /// Semicolon-separated list of synopsis blocklist regexes
    #[serde(rename = "blocklist_patterns")]
    pub blocklist_patterns_str: Option<String>,
}

fn default_catalog_base_url() -> String {
    DEFAULT_CATALOG_BASE_URL.to_string()
}

const fn default_catalog_timeout_secs() -> u64 {
    DEFAULT_CATALOG_TIMEOUT_SECS
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use anime_lookup_bot::config::Settings;
    ///
    /// let settings = Settings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or the token is missing.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Not checked into git
            .add_source(File::with_name("config/local").required(false))
            // Eg.. `APP__CATALOG_TIMEOUT_SECS=5 ./target/app`, the prefix is joined with `__` too
            .add_source(Environment::with_prefix("APP").separator("__"))
            // UPPER_SNAKE_CASE variables without a prefix, empty values count as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        let settings: Self = s.try_deserialize()?;
        if settings.telegram_token.trim().is_empty() {
            return Err(ConfigError::Message("TELEGRAM_TOKEN is empty".to_string()));
        }
        Ok(settings)
    }

    /// Catalog request timeout as a [`Duration`]
    #[must_use]
    pub const fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_secs)
    }

    /// Returns the configured forbidden tags, or the built-in set when unset
    #[must_use]
    pub fn forbidden_tags(&self) -> HashSet<String> {
        match self.forbidden_tags_str.as_deref() {
            Some(raw) => split_list(raw).into_iter().collect(),
            None => DEFAULT_FORBIDDEN_TAGS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Returns the configured blocklist patterns, or the built-in list when unset.
    ///
    /// Patterns are separated by `;` or newlines so that commas stay usable
    /// inside quantifiers.
    #[must_use]
    pub fn blocklist_patterns(&self) -> Vec<String> {
        match self.blocklist_patterns_str.as_deref() {
            Some(raw) => raw
                .split([';', '\n'])
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(ToString::to_string)
                .collect(),
            None => DEFAULT_BLOCKLIST_PATTERNS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}
