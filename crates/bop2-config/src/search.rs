//! Design search configuration types.
//!
//! A search configuration names the Beta prior, the four grid axes
//! (lambda, gamma, n1, n2), the hypothesis response rates, and the
//! error-rate constraints. Axes are either explicit value lists or
//! `{start, stop, step}` ranges.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::validate::{validate_search_config, ValidationError, ValidationResult};

/// Complete search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    pub prior: PriorConfig,

    pub grid: GridConfig,

    #[serde(default)]
    pub hypotheses: HypothesisConfig,

    #[serde(default)]
    pub constraints: ConstraintConfig,

    /// Evaluate candidates on the rayon pool when the `parallel` feature is built.
    #[serde(default)]
    pub parallel: bool,
}

/// Beta(a, b) prior on the response rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorConfig {
    pub a: f64,
    pub b: f64,

    #[serde(rename = "_comment", default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Discretized search grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub lambda: FloatAxis,
    pub gamma: FloatAxis,
    pub n1: IntAxis,
    pub n2: IntAxis,
}

/// A real-valued grid axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FloatAxis {
    Values(Vec<f64>),
    Range { start: f64, stop: f64, step: f64 },
}

/// An integer-valued grid axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntAxis {
    Values(Vec<u32>),
    Range { start: u32, stop: u32, step: u32 },
}

/// Null and alternative response rates used for the error rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisConfig {
    #[serde(default = "default_theta_null")]
    pub theta_null: f64,

    #[serde(default = "default_theta_alt")]
    pub theta_alt: f64,
}

/// Maximum tolerated type I and type II error rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintConfig {
    #[serde(default = "default_alpha_max")]
    pub alpha_max: f64,

    #[serde(default = "default_beta_max")]
    pub beta_max: f64,
}

fn default_theta_null() -> f64 {
    0.5
}

fn default_theta_alt() -> f64 {
    0.7
}

fn default_alpha_max() -> f64 {
    0.05
}

fn default_beta_max() -> f64 {
    0.2
}

impl Default for HypothesisConfig {
    fn default() -> Self {
        Self {
            theta_null: default_theta_null(),
            theta_alt: default_theta_alt(),
        }
    }
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            alpha_max: default_alpha_max(),
            beta_max: default_beta_max(),
        }
    }
}

impl Default for GridConfig {
    /// lambda 0..1 by 0.05, gamma 0.05..2 by 0.05, n1 4..20 by 4, n2 5..80 by 5.
    fn default() -> Self {
        Self {
            lambda: FloatAxis::Range {
                start: 0.0,
                stop: 1.0,
                step: 0.05,
            },
            gamma: FloatAxis::Range {
                start: 0.05,
                stop: 2.0,
                step: 0.05,
            },
            n1: IntAxis::Range {
                start: 4,
                stop: 20,
                step: 4,
            },
            n2: IntAxis::Range {
                start: 5,
                stop: 80,
                step: 5,
            },
        }
    }
}

impl Default for SearchConfig {
    /// Jeffreys prior over the standard grid with the conventional constraints.
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: None,
            prior: PriorConfig {
                a: 0.5,
                b: 0.5,
                comment: None,
            },
            grid: GridConfig::default(),
            hypotheses: HypothesisConfig::default(),
            constraints: ConstraintConfig::default(),
            parallel: false,
        }
    }
}

/// Slack when counting range points, so `0.0..=1.0 step 0.05` keeps its endpoint.
const RANGE_SLACK: f64 = 1e-9;

/// Most points a single grid axis may expand to.
pub const MAX_AXIS_POINTS: usize = 10_000;

/// Largest sample size accepted on the `n1` and `n2` axes. Evaluator tables
/// grow with the square of the largest `n2`.
pub const MAX_SAMPLE_SIZE: u32 = 1_000;

/// Most `(lambda, gamma, n1, n2)` points a grid may contain.
pub const MAX_GRID_POINTS: usize = 10_000_000;

impl FloatAxis {
    /// Number of values the axis expands to, without materializing them.
    ///
    /// Saturates at `usize::MAX` for ranges with a vanishingly small step.
    pub fn point_count(&self) -> usize {
        match self {
            FloatAxis::Values(values) => values.len(),
            FloatAxis::Range { start, stop, step } => {
                if !start.is_finite() || !stop.is_finite() || !step.is_finite() {
                    return 0;
                }
                if *step <= 0.0 || stop < start {
                    return 0;
                }
                // Float-to-int casts saturate; inf maps to usize::MAX.
                (((stop - start) / step + RANGE_SLACK).floor() + 1.0) as usize
            }
        }
    }

    /// Expand the axis into its ordered grid values.
    ///
    /// Range points are `start + i * step`, capped at `stop`. Malformed
    /// ranges (non-finite bounds, non-positive step, or `stop < start`) and
    /// ranges longer than [`MAX_AXIS_POINTS`] expand to nothing.
    pub fn values(&self) -> Vec<f64> {
        match self {
            FloatAxis::Values(values) => values.clone(),
            FloatAxis::Range { start, stop, step } => {
                let count = self.point_count();
                if count > MAX_AXIS_POINTS {
                    return Vec::new();
                }
                (0..count)
                    .map(|i| (start + i as f64 * step).min(*stop))
                    .collect()
            }
        }
    }
}

impl IntAxis {
    /// Number of values the axis expands to, without materializing them.
    pub fn point_count(&self) -> usize {
        match self {
            IntAxis::Values(values) => values.len(),
            IntAxis::Range { start, stop, step } => {
                if *step == 0 || stop < start {
                    return 0;
                }
                let count = u64::from(stop - start) / u64::from(*step) + 1;
                usize::try_from(count).unwrap_or(usize::MAX)
            }
        }
    }

    /// Expand the axis into its ordered grid values.
    ///
    /// Malformed ranges and ranges longer than [`MAX_AXIS_POINTS`] expand
    /// to nothing.
    pub fn values(&self) -> Vec<u32> {
        match self {
            IntAxis::Values(values) => values.clone(),
            IntAxis::Range { start, stop, step } => {
                let count = self.point_count();
                if count == 0 || count > MAX_AXIS_POINTS {
                    return Vec::new();
                }
                (*start..=*stop).step_by(*step as usize).collect()
            }
        }
    }
}

impl GridConfig {
    /// Number of (lambda, gamma, n1, n2) points with `n1 <= n2`.
    pub fn point_count(&self) -> usize {
        let n2 = self.n2.values();
        let pairs = self
            .n1
            .values()
            .iter()
            .map(|n1| n2.iter().filter(|n2| n1 <= *n2).count())
            .sum::<usize>();
        self.lambda
            .point_count()
            .saturating_mul(self.gamma.point_count())
            .saturating_mul(pairs)
    }
}

impl SearchConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> ValidationResult<Self> {
        let config: SearchConfig =
            serde_json::from_str(json).map_err(|e| ValidationError::ParseError(e.to_string()))?;
        validate_search_config(&config)?;
        Ok(config)
    }

    /// Read, parse, and validate a configuration file.
    pub fn load(path: &Path) -> ValidationResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ValidationError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }

    /// Serialize configuration to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
