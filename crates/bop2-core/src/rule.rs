//! Two-stage futility decision rule.
//!
//! The stage-1 threshold is `C1 = 1 - lambda * (n1 / n2)^gamma` and the
//! final threshold is `C2 = 1 - lambda`. A stage declares futility when the
//! posterior probability `F = P(p <= 0.5 | data)` is strictly greater than
//! its threshold; `F == C` continues.

use serde::Serialize;

use crate::design::{Design, DesignError, PriorParameters, FUTILITY_CUTOFF};

/// Futility thresholds for the two looks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdPair {
    /// C1, applied after `n1` patients.
    pub c1: f64,
    /// C2, applied after `n2` patients.
    pub c2: f64,
}

impl ThresholdPair {
    pub fn compute(lambda: f64, gamma: f64, n1: u32, n2: u32) -> Self {
        let information = f64::from(n1) / f64::from(n2);
        Self {
            c1: 1.0 - lambda * information.powf(gamma),
            c2: 1.0 - lambda,
        }
    }

    pub fn for_stage(&self, stage: Stage) -> f64 {
        match stage {
            Stage::Interim => self.c1,
            Stage::Final => self.c2,
        }
    }
}

/// Which look of the trial a decision applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// After `n1` patients.
    Interim,
    /// After all `n2` patients.
    Final,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Interim => write!(f, "interim"),
            Stage::Final => write!(f, "final"),
        }
    }
}

/// Outcome of applying the rule at one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageDecision {
    /// Continue to stage 2, or advance to the next phase after the final look.
    Go,
    /// Stop for futility.
    Stop,
}

impl StageDecision {
    pub fn is_go(self) -> bool {
        self == StageDecision::Go
    }
}

/// Strict futility comparison shared by every caller.
#[inline]
pub fn is_futile(futility_probability: f64, threshold: f64) -> bool {
    futility_probability > threshold
}

/// Decision rule bound to one design.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionRule {
    thresholds: ThresholdPair,
    n1: u32,
    n2: u32,
}

impl DecisionRule {
    pub fn new(design: &Design) -> Self {
        Self {
            thresholds: design.thresholds(),
            n1: design.n1(),
            n2: design.n2(),
        }
    }

    pub fn thresholds(&self) -> ThresholdPair {
        self.thresholds
    }

    /// Cumulative sample size at a stage.
    pub fn stage_size(&self, stage: Stage) -> u32 {
        match stage {
            Stage::Interim => self.n1,
            Stage::Final => self.n2,
        }
    }

    /// Classify a posterior futility probability at a stage.
    pub fn classify(&self, stage: Stage, futility_probability: f64) -> StageDecision {
        if is_futile(futility_probability, self.thresholds.for_stage(stage)) {
            StageDecision::Stop
        } else {
            StageDecision::Go
        }
    }

    /// Decide at a stage given `y` cumulative responses.
    pub fn decide(
        &self,
        stage: Stage,
        y: u32,
        prior: &PriorParameters,
    ) -> Result<StageDecision, DesignError> {
        let f = prior.futility_probability(y, self.stage_size(stage))?;
        Ok(self.classify(stage, f))
    }

    /// Largest cumulative response count that stops the trial at `stage`.
    ///
    /// The trial stops at that stage when `y <= r`. `None` means no count
    /// stops it. `F` is non-increasing in `y`, so the stopping region is
    /// always a prefix of `0..=n`.
    pub fn stopping_boundary(&self, stage: Stage, prior: &PriorParameters) -> Option<u32> {
        let n = self.stage_size(stage);
        let threshold = self.thresholds.for_stage(stage);
        let mut boundary = None;
        for y in 0..=n {
            let shape = prior.shape().posterior(u64::from(y), u64::from(n));
            if !is_futile(shape.cdf(FUTILITY_CUTOFF), threshold) {
                break;
            }
            boundary = Some(y);
        }
        boundary
    }
}
