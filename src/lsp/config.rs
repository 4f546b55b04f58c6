//! Server configuration
//!
//! Values come from environment variables and are overridden by command-line
//! flags in `main`.

use std::path::PathBuf;

use crate::web_features::ResolverOptions;

/// Environment variable naming the web-features dataset file.
pub const DATASET_PATH_ENV: &str = "BASELINE_FEATURES_PATH";
/// Environment variable toggling the substring match strategy.
pub const SUBSTRING_FALLBACK_ENV: &str = "BASELINE_SUBSTRING_FALLBACK";
/// Environment variable listing language ids to annotate, comma separated.
pub const LANGUAGES_ENV: &str = "BASELINE_LANGUAGES";

pub const DEFAULT_LANGUAGES: [&str; 4] = [
    "javascript",
    "typescript",
    "javascriptreact",
    "typescriptreact",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Dataset file; `None` starts the server without feature data.
    pub dataset_path: Option<PathBuf>,
    pub substring_fallback: bool,
    /// Language ids that get hover and diagnostics. Empty means all.
    pub languages: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            substring_fallback: true,
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
        }
    }
}

impl ServerConfig {
    /// Builds the configuration from the process environment.
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = var(DATASET_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            config.dataset_path = Some(PathBuf::from(path));
        }

        if let Some(value) = var(SUBSTRING_FALLBACK_ENV) {
            match parse_flag(&value) {
                Some(enabled) => config.substring_fallback = enabled,
                None => tracing::warn!(
                    "Ignoring {}='{}', expected true/false",
                    SUBSTRING_FALLBACK_ENV,
                    value
                ),
            }
        }

        if let Some(value) = var(LANGUAGES_ENV) {
            config.languages = parse_languages(&value);
        }

        config
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            substring_fallback: self.substring_fallback,
        }
    }

    pub fn handles_language(&self, language_id: &str) -> bool {
        self.languages.is_empty() || self.languages.iter().any(|l| l == language_id)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn parse_languages(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
