// Configuration — engine tuning plus CLI environment.
//
// `EngineConfig` holds every numeric knob the scoring core uses and is
// validated once when the engine is built. `Config` is what the binary reads
// from the environment (and .env, via dotenvy) to find the database and any
// override files.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{InkprintError, Result};
use crate::scoring::anomaly::AnomalyThresholds;
use crate::scoring::attribution::{ScoringWeights, TierThresholds};
use crate::scoring::similarity::SimilarityTolerances;

/// Default minimum word count below which a sample is low confidence.
pub const DEFAULT_MIN_WORDS: u32 = 50;

/// Tuning for the whole attribution core. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_words: u32,
    pub tolerances: SimilarityTolerances,
    pub weights: ScoringWeights,
    pub tiers: TierThresholds,
    pub anomaly_thresholds: AnomalyThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_words: DEFAULT_MIN_WORDS,
            tolerances: SimilarityTolerances::default(),
            weights: ScoringWeights::default(),
            tiers: TierThresholds::default(),
            anomaly_thresholds: AnomalyThresholds::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_words == 0 {
            return Err(InkprintError::Config(
                "min_words must be at least 1".to_string(),
            ));
        }
        self.tolerances.validate()?;
        self.weights.validate()?;
        self.tiers.validate()?;
        self.anomaly_thresholds.validate()
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| InkprintError::Config(format!("malformed engine config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            InkprintError::Config(format!(
                "cannot read engine config {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&json)
    }
}

/// CLI configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy.
pub struct Config {
    pub db_path: String,
    /// Optional JSON file with an `EngineConfig`
    pub engine_config_path: Option<PathBuf>,
    /// Optional JSON pattern dictionary replacing the built-in one
    pub patterns_path: Option<PathBuf>,
    /// Overrides `EngineConfig::min_words` when set
    pub min_words: Option<u32>,
}

impl Config {
    /// Load configuration from environment variables. Nothing is required;
    /// every setting has a default.
    pub fn load() -> anyhow::Result<Self> {
        let min_words = match env::var("INKPRINT_MIN_WORDS") {
            Ok(raw) => Some(raw.trim().parse::<u32>().map_err(|e| {
                anyhow::anyhow!("INKPRINT_MIN_WORDS must be a positive integer, got '{raw}': {e}")
            })?),
            Err(_) => None,
        };

        Ok(Self {
            db_path: env::var("INKPRINT_DB_PATH").unwrap_or_else(|_| default_db_path()),
            engine_config_path: env::var("INKPRINT_ENGINE_CONFIG").ok().map(PathBuf::from),
            patterns_path: env::var("INKPRINT_PATTERNS").ok().map(PathBuf::from),
            min_words,
        })
    }

    /// The engine config from `INKPRINT_ENGINE_CONFIG` (or defaults), with
    /// the `INKPRINT_MIN_WORDS` override applied and validated.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.engine_config_path {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        if let Some(min_words) = self.min_words {
            config.min_words = min_words;
        }
        config.validate()?;
        Ok(config)
    }
}

/// `<data dir>/inkprint/inkprint.db`, or `./inkprint.db` when the platform
/// has no data directory.
pub fn default_db_path() -> String {
    dirs::data_dir()
        .map(|dir| dir.join("inkprint").join("inkprint.db"))
        .unwrap_or_else(|| PathBuf::from("./inkprint.db"))
        .to_string_lossy()
        .into_owned()
}
