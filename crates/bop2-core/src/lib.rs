//! BOP2 Core Library
//!
//! Two-stage Bayesian optimal phase II designs with futility stopping:
//! - Design parameters, priors, hypotheses and error-rate constraints
//! - Beta-Binomial predictive and Binomial sampling models
//! - The posterior futility rule and its stage thresholds
//! - Exact operating characteristics (expected sample size, type I/II error)
//! - Exhaustive grid search for the feasible design with the smallest
//!   expected sample size
//! - Structured logging

pub mod design;
pub mod error;
pub mod evaluate;
pub mod logging;
pub mod model;
pub mod rule;
pub mod run;
pub mod search;

pub use design::{Constraints, Design, DesignError, Hypotheses, PriorParameters, FUTILITY_CUTOFF};
pub use error::{Error, ErrorCategory, Result};
pub use evaluate::{evaluate_design, DesignEvaluator, EvaluationResult};
pub use model::{
    binomial_distribution, binomial_likelihood, predictive_distribution, predictive_pmf,
    OutcomeDistribution,
};
pub use rule::{is_futile, DecisionRule, Stage, StageDecision, ThresholdPair};
pub use run::{run_search, search_resolved, SearchRun};
pub use search::{
    CandidateEvaluation, GridPoint, GridSearchOptimizer, SearchGrid, SearchResult, SearchStats,
};
