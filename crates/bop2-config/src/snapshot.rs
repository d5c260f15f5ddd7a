//! Configuration snapshots for reproducible search runs.
//!
//! A snapshot captures the exact configuration a search was run with,
//! so a selected design can be traced back to its inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resolve::ConfigPaths;
use crate::search::SearchConfig;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// SHA-256 hash of the canonical config JSON.
    pub config_hash: String,

    /// Path the config was loaded from.
    #[serde(default)]
    pub config_path: Option<String>,

    /// Source of the configuration.
    pub config_source: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub prior_a: f64,
    pub prior_b: f64,
    pub theta_null: f64,
    pub theta_alt: f64,
    pub alpha_max: f64,
    pub beta_max: f64,

    /// Number of grid points with n1 <= n2.
    pub grid_points: usize,
}

impl ConfigSnapshot {
    /// Create a new snapshot from a loaded configuration.
    ///
    /// The hash covers the re-serialized config, so two files that differ
    /// only in whitespace or key order produce the same hash.
    pub fn new(config: &SearchConfig, paths: &ConfigPaths) -> Self {
        let canonical = serde_json::to_string(config).unwrap_or_default();

        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            config_hash: hash_content(&canonical),
            config_path: paths.search.as_ref().map(|p| p.display().to_string()),
            config_source: paths.search_source.to_string(),
            summary: ConfigSummary::from_config(config),
        }
    }

    /// Create a snapshot of the built-in default configuration.
    pub fn defaults_only() -> Self {
        Self::new(&SearchConfig::default(), &ConfigPaths::default())
    }

    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if this snapshot matches another (same config).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.config_hash == other.config_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.config_hash[..12.min(self.config_hash.len())]
    }
}

impl ConfigSummary {
    fn from_config(config: &SearchConfig) -> Self {
        ConfigSummary {
            prior_a: config.prior.a,
            prior_b: config.prior.b,
            theta_null: config.hypotheses.theta_null,
            theta_alt: config.hypotheses.theta_alt,
            alpha_max: config.constraints.alpha_max,
            beta_max: config.constraints.beta_max,
            grid_points: config.grid.point_count(),
        }
    }
}

/// Hash content with SHA-256 and return hex string.
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
