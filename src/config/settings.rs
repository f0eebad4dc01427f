//! Engine tuning loaded from config.toml
//!
//! The matching threshold, ranking bonuses and suggestion penalty are empirical
//! constants. They live here as named, overridable values so they can be tuned
//! without touching the algorithms. Every section is optional in the file; any
//! key left out keeps its default.

use crate::core::ledger::Goals;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Offline lexicon matching
    pub matching: MatchingSettings,
    /// Remote candidate scoring
    pub ranking: RankingSettings,
    /// "What to eat next" ranking
    pub suggestions: SuggestionSettings,
    /// Goals applied to a day that has none saved
    pub goals: Goals,
    /// Open Food Facts client
    pub remote: RemoteSettings,
}

/// Offline matcher settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingSettings {
    /// Minimum Jaccard score for an offline match to be trusted
    pub offline_threshold: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            offline_threshold: 0.20,
        }
    }
}

/// Weights used to score remote candidates against the query
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingSettings {
    /// Weight of the token-set similarity term
    pub similarity_weight: f64,
    /// Bonus when the whole normalized query appears in the candidate text
    pub substring_bonus: f64,
    /// Bonus when every query token appears among the candidate tokens
    pub all_tokens_bonus: f64,
    /// Maximum bonus for short candidate text
    pub brevity_bonus: f64,
    /// Text length at which the brevity bonus reaches zero
    pub brevity_cap_chars: usize,
    /// Size of the selectable shortlist
    pub max_options: usize,
    /// Share of non-Latin letters above which a name is not displayed
    pub non_latin_threshold: f64,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            similarity_weight: 1.0,
            substring_bonus: 0.35,
            all_tokens_bonus: 0.25,
            brevity_bonus: 0.10,
            brevity_cap_chars: 120,
            max_options: 8,
            non_latin_threshold: 0.35,
        }
    }
}

/// Suggestion ranking settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SuggestionSettings {
    /// Maximum number of suggestions returned
    pub limit: usize,
    /// Foods above `overshoot_ratio` x remaining calories get penalized
    pub overshoot_ratio: f64,
    /// Score multiplier applied to overshooting foods
    pub overshoot_penalty: f64,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            limit: 8,
            overshoot_ratio: 1.5,
            overshoot_penalty: 0.6,
        }
    }
}

/// Open Food Facts client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Base URL of the Open Food Facts instance
    pub base_url: String,
    /// Number of products requested per search
    pub page_size: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: "https://world.openfoodfacts.org".to_string(),
            page_size: 24,
            timeout_secs: 10,
            user_agent: format!("calorie-quest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses settings from TOML text.
pub fn parse_config(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `path`, or the defaults when that file is absent.
///
/// # Errors
/// Returns [`Error::Io`] if the file exists but cannot be read, and
/// [`Error::Config`] if it cannot be parsed.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    match std::fs::read_to_string(path_ref) {
        Ok(contents) => parse_config(&contents),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!("No config file at {}, using default settings", path_ref.display());
            Ok(Settings::default())
        }
        Err(e) => {
            tracing::error!("Failed to read config file {}: {e}", path_ref.display());
            Err(e.into())
        }
    }
}

/// Loads settings from ./config.toml, or the defaults when that file is absent.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_default_config() -> Result<Settings> {
    load_config_or_default("config.toml")
}
