//! Binomial likelihood and Beta-Binomial predictive distributions.
//!
//! The model uses:
//! - Prior: `p ~ Beta(α, β)`
//! - Likelihood: `k | p ~ Binomial(n, p)`
//! - Prior predictive: `k ~ BetaBinomial(n, α, β)`
//!
//! Everything is evaluated in log space; only the final mass is
//! exponentiated, so binomial coefficients for n in the hundreds neither
//! overflow nor underflow.

use super::stable::{log_beta, log_binomial};

/// Log PMF of Binomial(n, p) at k.
///
/// The degenerate `p = 0` and `p = 1` cases return exact point masses.
/// Returns NaN for `p` outside [0, 1] and NEG_INFINITY for `k > n`.
pub fn log_binomial_pmf(k: u64, n: u64, p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if k > n {
        return f64::NEG_INFINITY;
    }
    if p == 0.0 {
        return if k == 0 { 0.0 } else { f64::NEG_INFINITY };
    }
    if p == 1.0 {
        return if k == n { 0.0 } else { f64::NEG_INFINITY };
    }
    let k_f = k as f64;
    let n_f = n as f64;
    log_binomial(n, k) + k_f * p.ln() + (n_f - k_f) * (-p).ln_1p()
}

/// PMF of Binomial(n, p) at k.
pub fn binomial_pmf(k: u64, n: u64, p: f64) -> f64 {
    let log_p = log_binomial_pmf(k, n, p);
    if log_p.is_nan() {
        return f64::NAN;
    }
    log_p.exp()
}

/// Log PMF of the Beta-Binomial distribution:
///
/// log P(k | n, α, β) = log C(n, k) + log B(α + k, β + n - k) - log B(α, β)
///
/// Returns NaN for non-positive shape parameters and NEG_INFINITY for `k > n`.
pub fn log_beta_binomial_pmf(k: u64, n: u64, alpha: f64, beta: f64) -> f64 {
    if alpha.is_nan() || beta.is_nan() || alpha <= 0.0 || beta <= 0.0 {
        return f64::NAN;
    }
    if k > n {
        return f64::NEG_INFINITY;
    }
    let k_f = k as f64;
    let n_f = n as f64;
    log_binomial(n, k) + log_beta(alpha + k_f, beta + n_f - k_f) - log_beta(alpha, beta)
}

/// PMF of the Beta-Binomial distribution.
pub fn beta_binomial_pmf(k: u64, n: u64, alpha: f64, beta: f64) -> f64 {
    let log_p = log_beta_binomial_pmf(k, n, alpha, beta);
    if log_p.is_nan() {
        return f64::NAN;
    }
    log_p.exp()
}

/// Full Binomial(n, p) mass vector over `0..=n`.
pub fn binomial_pmf_vec(n: u64, p: f64) -> Vec<f64> {
    (0..=n).map(|k| binomial_pmf(k, n, p)).collect()
}

/// Full Beta-Binomial(n, α, β) mass vector over `0..=n`.
pub fn beta_binomial_pmf_vec(n: u64, alpha: f64, beta: f64) -> Vec<f64> {
    (0..=n).map(|k| beta_binomial_pmf(k, n, alpha, beta)).collect()
}

/// Beta-Binomial mean: n · α / (α + β).
pub fn beta_binomial_mean(n: u64, alpha: f64, beta: f64) -> f64 {
    n as f64 * alpha / (alpha + beta)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    // =======================================================================
    // Binomial likelihood
    // =======================================================================

    #[test]
    fn binomial_known_values() {
        // C(8,3) 0.5^8 = 56/256
        assert!(approx_eq(binomial_pmf(3, 8, 0.5), 56.0 / 256.0, 1e-14));
        // 0.7^10
        assert!(approx_eq(binomial_pmf(10, 10, 0.7), 0.7f64.powi(10), 1e-14));
    }

    #[test]
    fn binomial_sums_to_one() {
        for &(n, p) in &[(0u64, 0.3), (8, 0.5), (32, 0.7), (80, 0.05)] {
            let total: f64 = binomial_pmf_vec(n, p).iter().sum();
            assert!(approx_eq(total, 1.0, 1e-12), "n={} p={} total={}", n, p, total);
        }
    }

    #[test]
    fn binomial_degenerate_probabilities() {
        assert_eq!(binomial_pmf(0, 5, 0.0), 1.0);
        assert_eq!(binomial_pmf(1, 5, 0.0), 0.0);
        assert_eq!(binomial_pmf(5, 5, 1.0), 1.0);
        assert_eq!(binomial_pmf(4, 5, 1.0), 0.0);
    }

    #[test]
    fn binomial_invalid_inputs() {
        assert!(binomial_pmf(1, 5, -0.1).is_nan());
        assert!(binomial_pmf(1, 5, 1.5).is_nan());
        assert!(binomial_pmf(1, 5, f64::NAN).is_nan());
        assert_eq!(binomial_pmf(6, 5, 0.5), 0.0);
    }

    // =======================================================================
    // Beta-Binomial predictive
    // =======================================================================

    #[test]
    fn beta_binomial_uniform_prior_is_uniform() {
        // Beta(1,1) prior: P(k | n) = 1/(n+1) for every k
        let n = 10;
        for k in 0..=n {
            let p = beta_binomial_pmf(k, n, 1.0, 1.0);
            assert!(approx_eq(p, 1.0 / 11.0, 1e-12), "k={}: {}", k, p);
        }
    }

    #[test]
    fn beta_binomial_known_value() {
        // Beta(1,1), k=2, n=5: C(5,2) B(3,4) = 10/60
        assert!(approx_eq(beta_binomial_pmf(2, 5, 1.0, 1.0), 1.0 / 6.0, 1e-12));
    }

    #[test]
    fn beta_binomial_jeffreys_sums_to_one() {
        for n in [0u64, 1, 8, 40, 100, 250] {
            let total: f64 = beta_binomial_pmf_vec(n, 0.5, 0.5).iter().sum();
            assert!(approx_eq(total, 1.0, 1e-10), "n={} total={}", n, total);
        }
    }

    #[test]
    fn beta_binomial_large_n_is_finite() {
        let log_p = log_beta_binomial_pmf(500, 1000, 0.5, 0.5);
        assert!(log_p.is_finite());
        let tail = beta_binomial_pmf(0, 1000, 50.0, 0.5);
        assert!(tail >= 0.0 && tail.is_finite());
    }

    #[test]
    fn beta_binomial_mean_matches_masses() {
        let n = 20;
        let masses = beta_binomial_pmf_vec(n, 2.0, 3.0);
        let mean: f64 = masses.iter().enumerate().map(|(k, p)| k as f64 * p).sum();
        assert!(approx_eq(mean, beta_binomial_mean(n, 2.0, 3.0), 1e-10));
    }

    #[test]
    fn beta_binomial_invalid_inputs() {
        assert!(beta_binomial_pmf(1, 5, 0.0, 1.0).is_nan());
        assert!(beta_binomial_pmf(1, 5, 1.0, -1.0).is_nan());
        assert_eq!(beta_binomial_pmf(6, 5, 1.0, 1.0), 0.0);
    }
}
