//! Operating characteristics of a single design.
//!
//! A [`DesignEvaluator`] holds, for every cumulative sample size up to
//! `max_n`, the posterior futility probabilities `F(y | n)`, the prior
//! predictive masses, and the Binomial masses at both hypotheses. Grid
//! searches share one evaluator across all candidates; every table is
//! read-only after construction.

use bop2_math::binomial::{beta_binomial_pmf_vec, binomial_pmf_vec};
use serde::Serialize;

use crate::design::{Design, DesignError, Hypotheses, PriorParameters, FUTILITY_CUTOFF};
use crate::model::binomial_distribution;
use crate::rule::{is_futile, ThresholdPair};

/// Expected sample size and error rates of one design.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationResult {
    /// Expected enrollment under the prior predictive distribution.
    pub expected_sample_size: f64,
    /// P(go at both stages | theta_null).
    pub type_i_error: f64,
    /// P(stop at either stage | theta_alt).
    pub type_ii_error: f64,
}

/// Shared lookup tables for evaluating designs with `n2 <= max_n`.
#[derive(Debug, Clone)]
pub struct DesignEvaluator {
    prior: PriorParameters,
    hypotheses: Hypotheses,
    max_n: u32,
    /// futility[n][y] = P(p <= 0.5 | y responses in n)
    futility: Vec<Vec<f64>>,
    predictive: Vec<Vec<f64>>,
    null_binomial: Vec<Vec<f64>>,
    alt_binomial: Vec<Vec<f64>>,
}

impl DesignEvaluator {
    pub fn new(prior: PriorParameters, hypotheses: Hypotheses, max_n: u32) -> Self {
        let shape = prior.shape();
        let sizes = || (0..=u64::from(max_n));

        let futility = sizes()
            .map(|n| {
                (0..=n)
                    .map(|y| shape.posterior(y, n).cdf(FUTILITY_CUTOFF))
                    .collect()
            })
            .collect();
        let predictive = sizes()
            .map(|n| beta_binomial_pmf_vec(n, prior.a(), prior.b()))
            .collect();
        let null_binomial = sizes()
            .map(|n| binomial_pmf_vec(n, hypotheses.theta_null()))
            .collect();
        let alt_binomial = sizes()
            .map(|n| binomial_pmf_vec(n, hypotheses.theta_alt()))
            .collect();

        Self {
            prior,
            hypotheses,
            max_n,
            futility,
            predictive,
            null_binomial,
            alt_binomial,
        }
    }

    pub fn prior(&self) -> &PriorParameters {
        &self.prior
    }

    pub fn hypotheses(&self) -> &Hypotheses {
        &self.hypotheses
    }

    /// Largest `n2` this evaluator can handle.
    pub fn max_n(&self) -> u32 {
        self.max_n
    }

    fn check_capacity(&self, design: &Design) -> Result<(), DesignError> {
        if design.n2() > self.max_n {
            return Err(DesignError::ExceedsCapacity {
                n2: design.n2(),
                max_n: self.max_n,
            });
        }
        Ok(())
    }

    /// Stage-1 go flags indexed by `y1`.
    fn interim_go(&self, design: &Design, thresholds: &ThresholdPair) -> Vec<bool> {
        self.futility[design.n1() as usize]
            .iter()
            .map(|&f| !is_futile(f, thresholds.c1))
            .collect()
    }

    /// Expected sample size, type I error, and type II error.
    pub fn evaluate(&self, design: &Design) -> Result<EvaluationResult, DesignError> {
        self.check_capacity(design)?;
        let thresholds = design.thresholds();
        let go1 = self.interim_go(design, &thresholds);

        let expected_sample_size = self.expected_size(design, &go1, &self.predictive);
        let type_i_error = self.joint_mass(design, &thresholds, &go1, &self.null_binomial, |g1, g2| {
            g1 && g2
        });
        let type_ii_error = self.joint_mass(design, &thresholds, &go1, &self.alt_binomial, |g1, g2| {
            !g1 || !g2
        });

        Ok(EvaluationResult {
            expected_sample_size,
            type_i_error,
            type_ii_error,
        })
    }

    /// Prior predictive probability of stopping at the interim look.
    pub fn early_stop_probability(&self, design: &Design) -> Result<f64, DesignError> {
        self.check_capacity(design)?;
        let go1 = self.interim_go(design, &design.thresholds());
        let stop: f64 = self.predictive[design.n1() as usize]
            .iter()
            .zip(&go1)
            .filter(|(_, go)| !**go)
            .map(|(p, _)| p)
            .sum();
        Ok(stop.clamp(0.0, 1.0))
    }

    /// Expected sample size when the true response rate is `theta`.
    pub fn expected_sample_size_at(&self, design: &Design, theta: f64) -> Result<f64, DesignError> {
        self.check_capacity(design)?;
        let stage1 = binomial_distribution(design.n1(), theta)?;
        let go1 = self.interim_go(design, &design.thresholds());
        let go_mass: f64 = stage1
            .masses()
            .iter()
            .zip(&go1)
            .filter(|(_, go)| **go)
            .map(|(p, _)| p)
            .sum();
        Ok(f64::from(design.n1()) + f64::from(design.stage2_size()) * go_mass)
    }

    /// `n1 + (n2 - n1) * P(go at stage 1)`, weighting `y1` by `stage1_masses`.
    ///
    /// Written this way a single-stage design (`n1 == n2`) gives exactly `n1`.
    fn expected_size(&self, design: &Design, go1: &[bool], tables: &[Vec<f64>]) -> f64 {
        let go_mass: f64 = tables[design.n1() as usize]
            .iter()
            .zip(go1)
            .filter(|(_, go)| **go)
            .map(|(p, _)| p)
            .sum();
        f64::from(design.n1()) + f64::from(design.stage2_size()) * go_mass
    }

    /// Sum the joint Binomial mass of `(y1, y2)` over pairs where
    /// `include(go_1, go_2)` holds, clamped to [0, 1].
    fn joint_mass(
        &self,
        design: &Design,
        thresholds: &ThresholdPair,
        go1: &[bool],
        tables: &[Vec<f64>],
        include: impl Fn(bool, bool) -> bool,
    ) -> f64 {
        let stage1 = &tables[design.n1() as usize];
        let stage2 = &tables[design.stage2_size() as usize];
        let final_futility = &self.futility[design.n2() as usize];

        let mut total = 0.0;
        for (y1, (&w1, &g1)) in stage1.iter().zip(go1).enumerate() {
            for (y2, &w2) in stage2.iter().enumerate() {
                let g2 = !is_futile(final_futility[y1 + y2], thresholds.c2);
                if include(g1, g2) {
                    total += w1 * w2;
                }
            }
        }
        total.clamp(0.0, 1.0)
    }
}

/// Evaluate one hand-built design with tables sized to it.
pub fn evaluate_design(
    design: &Design,
    prior: &PriorParameters,
    hypotheses: &Hypotheses,
) -> Result<EvaluationResult, DesignError> {
    DesignEvaluator::new(*prior, *hypotheses, design.n2()).evaluate(design)
}
