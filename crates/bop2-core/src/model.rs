//! Outcome probability model.
//!
//! Two distributions over the number of responses `y` in `n` patients:
//! the Beta-Binomial prior predictive, used for the expected sample size,
//! and the Binomial likelihood at a fixed response rate, used for the
//! error rates. Both are computed in log space by `bop2-math` and only
//! exponentiated at the end.

use bop2_math::binomial::{
    beta_binomial_pmf, beta_binomial_pmf_vec, binomial_pmf, binomial_pmf_vec,
};
use serde::Serialize;

use crate::design::{DesignError, PriorParameters};

/// Probability mass over `0..=n` responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeDistribution {
    masses: Vec<f64>,
}

impl OutcomeDistribution {
    /// Number of patients `n`.
    pub fn trials(&self) -> u32 {
        // masses always holds n + 1 entries
        (self.masses.len() - 1) as u32
    }

    /// P(Y = y); zero outside `0..=n`.
    pub fn mass(&self, y: u32) -> f64 {
        self.masses.get(y as usize).copied().unwrap_or(0.0)
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn total(&self) -> f64 {
        self.masses.iter().sum()
    }

    pub fn mean(&self) -> f64 {
        self.masses
            .iter()
            .enumerate()
            .map(|(y, p)| y as f64 * p)
            .sum()
    }
}

fn check_counts(ys: &[u32], n: u32) -> Result<(), DesignError> {
    match ys.iter().find(|&&y| y > n) {
        Some(&y) => Err(DesignError::CountExceedsTrials { y, n }),
        None => Ok(()),
    }
}

fn check_rate(theta: f64) -> Result<(), DesignError> {
    if !(0.0..=1.0).contains(&theta) {
        return Err(DesignError::InvalidProbability {
            field: "theta",
            value: theta,
        });
    }
    Ok(())
}

/// Beta-Binomial predictive mass `C(n,y) B(y+a, n-y+b) / B(a,b)` for each `y`.
pub fn predictive_pmf(ys: &[u32], n: u32, prior: &PriorParameters) -> Result<Vec<f64>, DesignError> {
    check_counts(ys, n)?;
    Ok(ys
        .iter()
        .map(|&y| beta_binomial_pmf(u64::from(y), u64::from(n), prior.a(), prior.b()))
        .collect())
}

/// Binomial likelihood `C(n,y) θ^y (1-θ)^(n-y)` for each `y`.
pub fn binomial_likelihood(ys: &[u32], n: u32, theta: f64) -> Result<Vec<f64>, DesignError> {
    check_rate(theta)?;
    check_counts(ys, n)?;
    Ok(ys
        .iter()
        .map(|&y| binomial_pmf(u64::from(y), u64::from(n), theta))
        .collect())
}

/// Full prior predictive distribution of responses in `n` patients.
pub fn predictive_distribution(n: u32, prior: &PriorParameters) -> OutcomeDistribution {
    OutcomeDistribution {
        masses: beta_binomial_pmf_vec(u64::from(n), prior.a(), prior.b()),
    }
}

/// Full Binomial distribution of responses in `n` patients at rate `theta`.
pub fn binomial_distribution(n: u32, theta: f64) -> Result<OutcomeDistribution, DesignError> {
    check_rate(theta)?;
    Ok(OutcomeDistribution {
        masses: binomial_pmf_vec(u64::from(n), theta),
    })
}
