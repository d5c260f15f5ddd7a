//! Property-based tests for design evaluation.
//!
//! Uses proptest to check that operating characteristics stay well formed
//! across random priors and designs.

use bop2_core::{
    predictive_distribution, DecisionRule, Design, DesignEvaluator, Hypotheses, PriorParameters,
    Stage, StageDecision, ThresholdPair,
};
use proptest::prelude::*;

/// Normalization tolerance for predictive and sampling distributions.
const NORM_TOL: f64 = 1e-8;

fn prior_strategy() -> impl Strategy<Value = PriorParameters> {
    (0.1..5.0f64, 0.1..5.0f64).prop_map(|(a, b)| PriorParameters::new(a, b).unwrap())
}

fn design_strategy() -> impl Strategy<Value = Design> {
    (0.0..=1.0f64, 0.05..2.0f64, 1u32..=30, 0u32..=30).prop_map(|(lambda, gamma, n1, extra)| {
        Design::new(lambda, gamma, n1, n1 + extra).unwrap()
    })
}

fn hypotheses_strategy() -> impl Strategy<Value = Hypotheses> {
    (0.05..0.95f64, 0.05..0.95f64).prop_map(|(t0, t1)| Hypotheses::new(t0, t1).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn error_rates_are_probabilities(
        prior in prior_strategy(),
        design in design_strategy(),
        hypotheses in hypotheses_strategy(),
    ) {
        let evaluator = DesignEvaluator::new(prior, hypotheses, design.n2());
        let result = evaluator.evaluate(&design).unwrap();
        prop_assert!((0.0..=1.0).contains(&result.type_i_error));
        prop_assert!((0.0..=1.0).contains(&result.type_ii_error));
    }

    #[test]
    fn expected_size_between_stages(prior in prior_strategy(), design in design_strategy()) {
        let evaluator = DesignEvaluator::new(prior, Hypotheses::default(), design.n2());
        let ess = evaluator.evaluate(&design).unwrap().expected_sample_size;
        let (n1, n2) = (f64::from(design.n1()), f64::from(design.n2()));
        prop_assert!(ess >= n1 - NORM_TOL && ess <= n2 + NORM_TOL, "ess {} outside [{}, {}]", ess, n1, n2);

        let pet = evaluator.early_stop_probability(&design).unwrap();
        prop_assert!((ess - (n2 - (n2 - n1) * pet)).abs() < 1e-6);
    }

    #[test]
    fn final_threshold_never_exceeds_interim(
        lambda in 0.0..=1.0f64,
        gamma in 0.01..5.0f64,
        n1 in 1u32..=100,
        extra in 0u32..=100,
    ) {
        let t = ThresholdPair::compute(lambda, gamma, n1, n1 + extra);
        prop_assert!(t.c2 <= t.c1 + 1e-15);
        prop_assert!((0.0..=1.0).contains(&t.c1));
    }

    #[test]
    fn single_stage_size_is_exact(prior in prior_strategy(), lambda in 0.0..=1.0f64, n in 1u32..=60) {
        let design = Design::new(lambda, 1.0, n, n).unwrap();
        let result = DesignEvaluator::new(prior, Hypotheses::default(), n)
            .evaluate(&design)
            .unwrap();
        prop_assert_eq!(result.expected_sample_size, f64::from(n));
    }

    #[test]
    fn zero_lambda_runs_to_completion(
        prior in prior_strategy(),
        gamma in 0.05..2.0f64,
        n1 in 1u32..=30,
        extra in 0u32..=30,
    ) {
        let design = Design::new(0.0, gamma, n1, n1 + extra).unwrap();
        let evaluator = DesignEvaluator::new(prior, Hypotheses::default(), design.n2());
        let result = evaluator.evaluate(&design).unwrap();
        prop_assert!((result.expected_sample_size - f64::from(design.n2())).abs() < 1e-9);
        prop_assert_eq!(result.type_ii_error, 0.0);
        prop_assert!(result.type_i_error > 1.0 - NORM_TOL);
    }

    #[test]
    fn predictive_is_normalized(prior in prior_strategy(), n in 0u32..=120) {
        let dist = predictive_distribution(n, &prior);
        prop_assert!((dist.total() - 1.0).abs() < NORM_TOL, "total {}", dist.total());
        prop_assert!(dist.masses().iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn stopping_region_is_a_prefix(prior in prior_strategy(), design in design_strategy()) {
        let rule = DecisionRule::new(&design);
        for stage in [Stage::Interim, Stage::Final] {
            let boundary = rule.stopping_boundary(stage, &prior);
            for y in 0..=rule.stage_size(stage) {
                let decision = rule.decide(stage, y, &prior).unwrap();
                let expected = match boundary {
                    Some(r) if y <= r => StageDecision::Stop,
                    _ => StageDecision::Go,
                };
                prop_assert_eq!(decision, expected, "stage {} y {}", stage, y);
            }
        }
    }
}
