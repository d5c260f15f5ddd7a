//! Beta distribution utilities for conjugate posterior updates.
//!
//! The CDF uses the regularized incomplete beta function with a
//! continued-fraction approximation (Numerical Recipes, modified Lentz).
//! Tolerances are tight enough that posterior probabilities compared
//! against decision thresholds are stable to ~1e-14.

use serde::{Deserialize, Serialize};

use super::stable::log_beta;

const BETACF_MAX_ITERS: usize = 300;
const BETACF_EPS: f64 = 1.0e-15;
const BETACF_FPMIN: f64 = 1.0e-300;

/// Shape parameters of a Beta(alpha, beta) distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaShape {
    pub alpha: f64,
    pub beta: f64,
}

impl BetaShape {
    /// Create new Beta shape parameters with validation.
    ///
    /// Returns None if either parameter is non-positive or not finite.
    pub fn new(alpha: f64, beta: f64) -> Option<Self> {
        if !alpha.is_finite() || !beta.is_finite() || alpha <= 0.0 || beta <= 0.0 {
            return None;
        }
        Some(Self { alpha, beta })
    }

    /// Jeffreys prior Beta(0.5, 0.5).
    pub fn jeffreys() -> Self {
        Self {
            alpha: 0.5,
            beta: 0.5,
        }
    }

    /// Conjugate update after `successes` out of `trials`:
    /// Beta(alpha + y, beta + n - y).
    ///
    /// Callers must ensure `successes <= trials`.
    pub fn posterior(&self, successes: u64, trials: u64) -> Self {
        debug_assert!(successes <= trials);
        Self {
            alpha: self.alpha + successes as f64,
            beta: self.beta + (trials - successes) as f64,
        }
    }

    /// E[p] = alpha / (alpha + beta).
    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// P(p <= x) under this distribution.
    pub fn cdf(&self, x: f64) -> f64 {
        beta_cdf(x, self.alpha, self.beta)
    }
}

/// Regularized incomplete beta function I_x(a,b).
///
/// Result is clamped to [0, 1]; invalid parameters yield NaN.
pub fn beta_cdf(x: f64, alpha: f64, beta: f64) -> f64 {
    if x.is_nan() || alpha.is_nan() || beta.is_nan() {
        return f64::NAN;
    }
    if alpha <= 0.0 || beta <= 0.0 {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = alpha * x.ln() + beta * (-x).ln_1p() - log_beta(alpha, beta);
    let front = ln_front.exp();
    let threshold = (alpha + 1.0) / (alpha + beta + 2.0);
    let value = if x < threshold {
        front * betacf(alpha, beta, x) / alpha
    } else {
        1.0 - front * betacf(beta, alpha, 1.0 - x) / beta
    };
    value.clamp(0.0, 1.0)
}

fn betacf(alpha: f64, beta: f64, x: f64) -> f64 {
    let qab = alpha + beta;
    let qap = alpha + 1.0;
    let qam = alpha - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < BETACF_FPMIN {
        d = BETACF_FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=BETACF_MAX_ITERS {
        let m_f = m as f64;
        let m2 = 2.0 * m_f;

        // Even step.
        let aa = m_f * (beta - m_f) * x / ((qam + m2) * (alpha + m2));
        d = 1.0 + aa * d;
        if d.abs() < BETACF_FPMIN {
            d = BETACF_FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < BETACF_FPMIN {
            c = BETACF_FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        // Odd step.
        let aa = -(alpha + m_f) * (qab + m_f) * x / ((alpha + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < BETACF_FPMIN {
            d = BETACF_FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < BETACF_FPMIN {
            c = BETACF_FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < BETACF_EPS {
            break;
        }
    }

    h
}
