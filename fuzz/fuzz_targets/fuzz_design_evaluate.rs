//! Fuzz target for single-design evaluation.
//!
//! Arbitrary design parameters and priors either fail construction or
//! evaluate to well-formed operating characteristics.

#![no_main]

use arbitrary::Arbitrary;
use bop2_core::{Design, DesignEvaluator, Hypotheses, PriorParameters};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    lambda: f64,
    gamma: f64,
    n1: u8,
    n2: u8,
    a: f64,
    b: f64,
    theta_null: f64,
    theta_alt: f64,
}

fuzz_target!(|input: Input| {
    let Ok(design) = Design::new(input.lambda, input.gamma, u32::from(input.n1), u32::from(input.n2))
    else {
        return;
    };
    let Ok(prior) = PriorParameters::new(input.a, input.b) else {
        return;
    };
    let Ok(hypotheses) = Hypotheses::new(input.theta_null, input.theta_alt) else {
        return;
    };

    let evaluator = DesignEvaluator::new(prior, hypotheses, design.n2());
    if let Ok(result) = evaluator.evaluate(&design) {
        assert!(!(result.type_i_error > 1.0 || result.type_i_error < 0.0));
        assert!(!(result.type_ii_error > 1.0 || result.type_ii_error < 0.0));
    }
});
