//! Tuning configuration for the clue ranking engine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RankError, StoreError};

// Ranking thresholds, calibrated for unit-length embeddings
pub const DEFAULT_ENEMY_CUTOFF: f32 = 0.58;
pub const DEFAULT_FRIENDLY_CUTOFF: f32 = 0.560;

// Reporting
pub const DEFAULT_RESULTS_PER_TIER: usize = 3;
pub const DEFAULT_CLOSEST: usize = 30;
pub const DEFAULT_FARTHEST: usize = 5;

/// Phrase template used to turn a plain word into a stored embedding key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum KeyStyle {
    #[default]
    Plain,    // Word stored as-is
    Spaces,   // Leading space, stored trimmed
    Meaning,  // The meaning of the word "<word>"
}

const MEANING_PREFIX: &str = "The meaning of the word \"";
const MEANING_SUFFIX: &str = "\"";

impl KeyStyle {
    pub fn transform(&self, word: &str) -> String {
        let word = word.trim();
        match self {
            KeyStyle::Plain => word.to_string(),
            KeyStyle::Spaces => format!(" {}", word),
            KeyStyle::Meaning => format!("{}{}{}", MEANING_PREFIX, word, MEANING_SUFFIX),
        }
    }

    /// Inverse of [`KeyStyle::transform`]. Keys that don't follow the
    /// template come back trimmed but otherwise untouched.
    pub fn untransform<'a>(&self, key: &'a str) -> &'a str {
        let key = key.trim();
        match self {
            KeyStyle::Plain | KeyStyle::Spaces => key,
            KeyStyle::Meaning => key
                .strip_prefix(MEANING_PREFIX)
                .and_then(|rest| rest.strip_suffix(MEANING_SUFFIX))
                .unwrap_or(key),
        }
    }
}

/// Ordering applied to each tier once all workers have reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreakStrategy {
    #[default]
    Penultimate,      // Closest second-to-last covered word
    Nearest,          // Closest first covered word
    Sum,              // Smallest sum of covered distances
    MaxDifferential,  // Largest frenemy differential
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub enemy_cutoff: f32,
    pub friendly_cutoff: f32,
    pub workers: usize,
    pub results_per_tier: usize,
    pub tie_break: TieBreakStrategy,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            enemy_cutoff: DEFAULT_ENEMY_CUTOFF,
            friendly_cutoff: DEFAULT_FRIENDLY_CUTOFF,
            workers: default_workers(),
            results_per_tier: DEFAULT_RESULTS_PER_TIER,
            tie_break: TieBreakStrategy::default(),
        }
    }
}

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl RankingConfig {
    pub fn validate(&self) -> Result<(), RankError> {
        for (name, value) in [
            ("enemy_cutoff", self.enemy_cutoff),
            ("friendly_cutoff", self.friendly_cutoff),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(RankError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.workers == 0 {
            return Err(RankError::InvalidConfig("workers must be at least 1".to_string()));
        }
        if self.results_per_tier == 0 {
            return Err(RankError::InvalidConfig(
                "results_per_tier must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Primary embeddings file (finalfusion binary, word2vec text or GloVe text)
    pub embeddings: PathBuf,
    /// Secondary "missing words" file merged over the primary table
    pub overlay: Option<PathBuf>,
    pub style: KeyStyle,
    /// Display words dropped after loading
    pub exclude: Vec<String>,
    /// Write a .fifu copy next to a parsed text file
    pub cache_binary: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            embeddings: PathBuf::from("./data/embeddings.fifu"),
            overlay: None,
            style: KeyStyle::default(),
            exclude: Vec::new(),
            cache_binary: true,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ranking: RankingConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, StoreError> {
        toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meaning_style_round_trip() {
        let key = KeyStyle::Meaning.transform(" apple ");
        assert_eq!(key, "The meaning of the word \"apple\"");
        assert_eq!(KeyStyle::Meaning.untransform(&key), "apple");
    }

    #[test]
    fn test_untransform_leaves_foreign_keys() {
        assert_eq!(KeyStyle::Meaning.untransform("apple"), "apple");
        assert_eq!(KeyStyle::Spaces.untransform(" apple"), "apple");
        assert_eq!(KeyStyle::Spaces.transform("apple"), " apple");
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = RankingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.enemy_cutoff, 0.58);
        assert_eq!(config.friendly_cutoff, 0.560);
        assert!(config.workers >= 1);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RankingConfig::default();
        config.workers = 0;
        assert!(config.validate().is_err());

        let mut config = RankingConfig::default();
        config.friendly_cutoff = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = RankingConfig::default();
        config.results_per_tier = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_partial_override() {
        let config = AppConfig::from_toml_str(
            r#"
            [ranking]
            friendly_cutoff = 1.0
            tie_break = "max-differential"

            [store]
            embeddings = "words.txt"
            style = "meaning"
            exclude = ["bad"]
            "#,
        )
        .unwrap();

        assert_eq!(config.ranking.friendly_cutoff, 1.0);
        assert_eq!(config.ranking.enemy_cutoff, DEFAULT_ENEMY_CUTOFF);
        assert_eq!(config.ranking.tie_break, TieBreakStrategy::MaxDifferential);
        assert_eq!(config.store.style, KeyStyle::Meaning);
        assert_eq!(config.store.exclude, vec!["bad".to_string()]);
        assert!(config.store.overlay.is_none());
    }

    #[test]
    fn test_toml_rejects_garbage() {
        assert!(AppConfig::from_toml_str("[ranking]\nworkers = \"many\"").is_err());
    }
}
