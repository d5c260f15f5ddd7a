//! Validated design-space types.
//!
//! Every type here is immutable once built and rejects invalid parameter
//! domains at construction. Nothing is clamped: a bad value is an error
//! naming the offending field.

use bop2_config::{ConstraintConfig, HypothesisConfig, PriorConfig};
use bop2_math::BetaShape;
use serde::Serialize;
use thiserror::Error;

use crate::evaluate::EvaluationResult;
use crate::rule::ThresholdPair;

/// Response rate below which a treatment is considered futile.
pub const FUTILITY_CUTOFF: f64 = 0.5;

/// Errors raised when constructing or evaluating a design.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DesignError {
    #[error("prior shape {field} must be positive and finite, got {value}")]
    InvalidPrior { field: &'static str, value: f64 },

    #[error("lambda must be in [0, 1], got {0}")]
    InvalidLambda(f64),

    #[error("gamma must be positive and finite, got {0}")]
    InvalidGamma(f64),

    #[error("stage 1 sample size n1 must be at least 1")]
    EmptyFirstStage,

    #[error("n1 ({n1}) must not exceed n2 ({n2})")]
    StageOrder { n1: u32, n2: u32 },

    #[error("{field} must be a probability in [0, 1], got {value}")]
    InvalidProbability { field: &'static str, value: f64 },

    #[error("response count {y} exceeds sample size {n}")]
    CountExceedsTrials { y: u32, n: u32 },

    #[error("design needs n2 = {n2} but evaluator tables stop at {max_n}")]
    ExceedsCapacity { n2: u32, max_n: u32 },
}

impl DesignError {
    /// Name of the parameter that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            DesignError::InvalidPrior { field, .. } => *field,
            DesignError::InvalidLambda(_) => "lambda",
            DesignError::InvalidGamma(_) => "gamma",
            DesignError::EmptyFirstStage => "n1",
            DesignError::StageOrder { .. } => "n2",
            DesignError::InvalidProbability { field, .. } => *field,
            DesignError::CountExceedsTrials { .. } => "y",
            DesignError::ExceedsCapacity { .. } => "n2",
        }
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<f64, DesignError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(DesignError::InvalidProbability { field, value });
    }
    Ok(value)
}

/// Beta(a, b) prior on the response rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriorParameters {
    a: f64,
    b: f64,
}

impl PriorParameters {
    pub fn new(a: f64, b: f64) -> Result<Self, DesignError> {
        if !a.is_finite() || a <= 0.0 {
            return Err(DesignError::InvalidPrior { field: "a", value: a });
        }
        if !b.is_finite() || b <= 0.0 {
            return Err(DesignError::InvalidPrior { field: "b", value: b });
        }
        Ok(Self { a, b })
    }

    /// Jeffreys prior Beta(0.5, 0.5).
    pub fn jeffreys() -> Self {
        Self { a: 0.5, b: 0.5 }
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn shape(&self) -> BetaShape {
        BetaShape {
            alpha: self.a,
            beta: self.b,
        }
    }

    /// Posterior Beta(a + y, b + n - y) after `y` responses in `n` patients.
    pub fn posterior(&self, y: u32, n: u32) -> Result<BetaShape, DesignError> {
        if y > n {
            return Err(DesignError::CountExceedsTrials { y, n });
        }
        Ok(self.shape().posterior(u64::from(y), u64::from(n)))
    }

    /// Posterior probability that the response rate is at most 0.5.
    pub fn futility_probability(&self, y: u32, n: u32) -> Result<f64, DesignError> {
        Ok(self.posterior(y, n)?.cdf(FUTILITY_CUTOFF))
    }
}

impl TryFrom<&PriorConfig> for PriorParameters {
    type Error = DesignError;

    fn try_from(config: &PriorConfig) -> Result<Self, Self::Error> {
        Self::new(config.a, config.b)
    }
}

/// One candidate two-stage design.
///
/// `n1` patients are enrolled at stage 1 and `n2` in total; stage 2 adds
/// `n2 - n1`. When `n1 == n2` the design has a single look.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Design {
    lambda: f64,
    gamma: f64,
    n1: u32,
    n2: u32,
}

impl Design {
    pub fn new(lambda: f64, gamma: f64, n1: u32, n2: u32) -> Result<Self, DesignError> {
        if !(0.0..=1.0).contains(&lambda) {
            return Err(DesignError::InvalidLambda(lambda));
        }
        if !gamma.is_finite() || gamma <= 0.0 {
            return Err(DesignError::InvalidGamma(gamma));
        }
        if n1 == 0 {
            return Err(DesignError::EmptyFirstStage);
        }
        if n1 > n2 {
            return Err(DesignError::StageOrder { n1, n2 });
        }
        Ok(Self {
            lambda,
            gamma,
            n1,
            n2,
        })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn n1(&self) -> u32 {
        self.n1
    }

    pub fn n2(&self) -> u32 {
        self.n2
    }

    /// Patients enrolled at stage 2 only.
    pub fn stage2_size(&self) -> u32 {
        self.n2 - self.n1
    }

    pub fn thresholds(&self) -> ThresholdPair {
        ThresholdPair::compute(self.lambda, self.gamma, self.n1, self.n2)
    }
}

impl std::fmt::Display for Design {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lambda={}, gamma={}, n1={}, n2={}",
            self.lambda, self.gamma, self.n1, self.n2
        )
    }
}

/// Response rates at which the error rates are computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hypotheses {
    theta_null: f64,
    theta_alt: f64,
}

impl Hypotheses {
    pub fn new(theta_null: f64, theta_alt: f64) -> Result<Self, DesignError> {
        Ok(Self {
            theta_null: check_probability("theta_null", theta_null)?,
            theta_alt: check_probability("theta_alt", theta_alt)?,
        })
    }

    pub fn theta_null(&self) -> f64 {
        self.theta_null
    }

    pub fn theta_alt(&self) -> f64 {
        self.theta_alt
    }
}

impl Default for Hypotheses {
    fn default() -> Self {
        Self {
            theta_null: 0.5,
            theta_alt: 0.7,
        }
    }
}

impl TryFrom<&HypothesisConfig> for Hypotheses {
    type Error = DesignError;

    fn try_from(config: &HypothesisConfig) -> Result<Self, Self::Error> {
        Self::new(config.theta_null, config.theta_alt)
    }
}

/// Upper bounds on the type I and type II error rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Constraints {
    alpha_max: f64,
    beta_max: f64,
}

impl Constraints {
    pub fn new(alpha_max: f64, beta_max: f64) -> Result<Self, DesignError> {
        Ok(Self {
            alpha_max: check_probability("alpha_max", alpha_max)?,
            beta_max: check_probability("beta_max", beta_max)?,
        })
    }

    pub fn alpha_max(&self) -> f64 {
        self.alpha_max
    }

    pub fn beta_max(&self) -> f64 {
        self.beta_max
    }

    pub fn is_satisfied_by(&self, evaluation: &EvaluationResult) -> bool {
        evaluation.type_i_error <= self.alpha_max && evaluation.type_ii_error <= self.beta_max
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            alpha_max: 0.05,
            beta_max: 0.2,
        }
    }
}

impl TryFrom<&ConstraintConfig> for Constraints {
    type Error = DesignError;

    fn try_from(config: &ConstraintConfig) -> Result<Self, Self::Error> {
        Self::new(config.alpha_max, config.beta_max)
    }
}
