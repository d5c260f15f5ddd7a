//! Exhaustive grid search over two-stage designs.
//!
//! Grid points are enumerated row-major (lambda outermost, n2 innermost),
//! keeping only `n1 <= n2`. Each point gets its enumeration index. The
//! selected design is the feasible candidate minimizing
//! `(expected_sample_size, grid_index)`, so ties go to the earliest point
//! and the answer does not depend on evaluation order.

use std::time::Instant;

use bop2_config::{GridConfig, SearchConfig};
use serde::Serialize;

use crate::design::{Constraints, Design, DesignError, Hypotheses, PriorParameters};
use crate::error::Result;
use crate::evaluate::{DesignEvaluator, EvaluationResult};
use crate::logging::{event_names, LogContext, Phase};

/// Discretized values of each design parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchGrid {
    pub lambda: Vec<f64>,
    pub gamma: Vec<f64>,
    pub n1: Vec<u32>,
    pub n2: Vec<u32>,
}

/// One enumerated `(lambda, gamma, n1, n2)` combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridPoint {
    pub index: usize,
    pub lambda: f64,
    pub gamma: f64,
    pub n1: u32,
    pub n2: u32,
}

impl GridPoint {
    pub fn design(&self) -> std::result::Result<Design, DesignError> {
        Design::new(self.lambda, self.gamma, self.n1, self.n2)
    }
}

impl SearchGrid {
    pub fn new(lambda: Vec<f64>, gamma: Vec<f64>, n1: Vec<u32>, n2: Vec<u32>) -> Self {
        Self {
            lambda,
            gamma,
            n1,
            n2,
        }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(
            config.lambda.values(),
            config.gamma.values(),
            config.n1.values(),
            config.n2.values(),
        )
    }

    /// Grid points with `n1 <= n2` in enumeration order.
    pub fn points(&self) -> impl Iterator<Item = GridPoint> + '_ {
        self.lambda
            .iter()
            .flat_map(move |&lambda| {
                self.gamma.iter().flat_map(move |&gamma| {
                    self.n1.iter().flat_map(move |&n1| {
                        self.n2
                            .iter()
                            .filter(move |&&n2| n1 <= n2)
                            .map(move |&n2| (lambda, gamma, n1, n2))
                    })
                })
            })
            .enumerate()
            .map(|(index, (lambda, gamma, n1, n2))| GridPoint {
                index,
                lambda,
                gamma,
                n1,
                n2,
            })
    }

    /// Number of enumerated points.
    pub fn len(&self) -> usize {
        let pairs: usize = self
            .n1
            .iter()
            .map(|n1| self.n2.iter().filter(|n2| n1 <= *n2).count())
            .sum();
        self.lambda.len() * self.gamma.len() * pairs
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest total sample size on the grid.
    pub fn max_n(&self) -> u32 {
        self.n2.iter().copied().max().unwrap_or(0)
    }
}

impl Default for SearchGrid {
    fn default() -> Self {
        Self::from_config(&GridConfig::default())
    }
}

/// A grid point that produced a valid design, with its evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidateEvaluation {
    pub grid_index: usize,
    pub design: Design,
    pub evaluation: EvaluationResult,
    /// Whether the error-rate constraints hold.
    pub feasible: bool,
}

/// Counts accumulated over one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Grid points enumerated.
    pub candidates: usize,
    /// Points whose design failed validation.
    pub rejected: usize,
    /// Points meeting both error-rate constraints.
    pub feasible: usize,
}

/// Outcome of a grid search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchResult {
    Feasible {
        design: Design,
        evaluation: EvaluationResult,
        grid_index: usize,
        stats: SearchStats,
    },
    /// No grid point satisfies the constraints.
    Infeasible { stats: SearchStats },
}

impl SearchResult {
    pub fn is_feasible(&self) -> bool {
        matches!(self, SearchResult::Feasible { .. })
    }

    pub fn design(&self) -> Option<&Design> {
        match self {
            SearchResult::Feasible { design, .. } => Some(design),
            SearchResult::Infeasible { .. } => None,
        }
    }

    pub fn evaluation(&self) -> Option<&EvaluationResult> {
        match self {
            SearchResult::Feasible { evaluation, .. } => Some(evaluation),
            SearchResult::Infeasible { .. } => None,
        }
    }

    pub fn grid_index(&self) -> Option<usize> {
        match self {
            SearchResult::Feasible { grid_index, .. } => Some(*grid_index),
            SearchResult::Infeasible { .. } => None,
        }
    }

    pub fn stats(&self) -> &SearchStats {
        match self {
            SearchResult::Feasible { stats, .. } | SearchResult::Infeasible { stats } => stats,
        }
    }
}

/// Whether `challenger` beats `incumbent` under `(ess, grid_index)` ordering.
fn is_better(challenger: &CandidateEvaluation, incumbent: &CandidateEvaluation) -> bool {
    challenger
        .evaluation
        .expected_sample_size
        .total_cmp(&incumbent.evaluation.expected_sample_size)
        .then(challenger.grid_index.cmp(&incumbent.grid_index))
        .is_lt()
}

fn select(
    a: Option<CandidateEvaluation>,
    b: Option<CandidateEvaluation>,
) -> Option<CandidateEvaluation> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if is_better(&b, &a) { b } else { a }),
        (a, b) => a.or(b),
    }
}

/// Partial reduction over a subset of the grid.
#[derive(Debug, Default)]
struct Tally {
    best: Option<CandidateEvaluation>,
    stats: SearchStats,
}

impl Tally {
    /// Fold in one point; `None` marks a rejected point.
    fn observe(mut self, outcome: Option<CandidateEvaluation>) -> Self {
        self.stats.candidates += 1;
        match outcome {
            None => self.stats.rejected += 1,
            Some(candidate) if candidate.feasible => {
                self.stats.feasible += 1;
                self.best = select(self.best, Some(candidate));
            }
            Some(_) => {}
        }
        self
    }

    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    fn merge(self, other: Tally) -> Tally {
        Tally {
            best: select(self.best, other.best),
            stats: SearchStats {
                candidates: self.stats.candidates + other.stats.candidates,
                rejected: self.stats.rejected + other.stats.rejected,
                feasible: self.stats.feasible + other.stats.feasible,
            },
        }
    }

    fn into_result(self) -> SearchResult {
        match self.best {
            Some(best) => SearchResult::Feasible {
                design: best.design,
                evaluation: best.evaluation,
                grid_index: best.grid_index,
                stats: self.stats,
            },
            None => SearchResult::Infeasible { stats: self.stats },
        }
    }
}

/// Exhaustive search for the feasible design with the smallest expected
/// sample size.
#[derive(Debug, Clone)]
pub struct GridSearchOptimizer {
    prior: PriorParameters,
    grid: SearchGrid,
    hypotheses: Hypotheses,
    constraints: Constraints,
    parallel: bool,
}

impl GridSearchOptimizer {
    pub fn new(
        prior: PriorParameters,
        grid: SearchGrid,
        hypotheses: Hypotheses,
        constraints: Constraints,
    ) -> Self {
        Self {
            prior,
            grid,
            hypotheses,
            constraints,
            parallel: false,
        }
    }

    /// Build from a search configuration, validating it first.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        bop2_config::validate_search_config(config)?;
        Ok(Self::new(
            PriorParameters::try_from(&config.prior)?,
            SearchGrid::from_config(&config.grid),
            Hypotheses::try_from(&config.hypotheses)?,
            Constraints::try_from(&config.constraints)?,
        )
        .with_parallel(config.parallel))
    }

    /// Evaluate candidates on the rayon pool. Without the `parallel`
    /// feature this falls back to sequential evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn prior(&self) -> &PriorParameters {
        &self.prior
    }

    pub fn grid(&self) -> &SearchGrid {
        &self.grid
    }

    pub fn hypotheses(&self) -> &Hypotheses {
        &self.hypotheses
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Evaluator with tables covering every `n2` on the grid.
    pub fn evaluator(&self) -> DesignEvaluator {
        DesignEvaluator::new(self.prior, self.hypotheses, self.grid.max_n())
    }

    /// Run the search under a fresh run id.
    pub fn search(&self) -> SearchResult {
        self.search_with_context(&LogContext::generate())
    }

    pub fn search_with_context(&self, ctx: &LogContext) -> SearchResult {
        let started = Instant::now();
        crate::log_event!(
            ctx,
            INFO,
            event_names::SEARCH_STARTED,
            Phase::Search,
            "Starting design grid search",
            candidates = self.grid.len(),
            max_n = self.grid.max_n(),
            parallel = self.parallel,
        );

        let evaluator = self.evaluator();
        crate::log_event!(
            ctx,
            DEBUG,
            event_names::EVALUATOR_READY,
            Phase::Evaluate,
            "Evaluator tables built",
            max_n = evaluator.max_n(),
        );

        let tally = if self.parallel {
            self.tally_parallel(ctx, &evaluator)
        } else {
            self.tally_sequential(ctx, &evaluator)
        };
        let result = tally.into_result();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let stats = *result.stats();

        match &result {
            SearchResult::Feasible {
                design,
                evaluation,
                grid_index,
                ..
            } => crate::log_event!(
                ctx,
                INFO,
                event_names::SEARCH_COMPLETED,
                Phase::Search,
                "Selected design",
                lambda = design.lambda(),
                gamma = design.gamma(),
                n1 = design.n1(),
                n2 = design.n2(),
                grid_index = *grid_index,
                ess = evaluation.expected_sample_size,
                type_i = evaluation.type_i_error,
                type_ii = evaluation.type_ii_error,
                candidates = stats.candidates,
                rejected = stats.rejected,
                feasible = stats.feasible,
                elapsed_ms = elapsed_ms,
            ),
            SearchResult::Infeasible { .. } => crate::log_event!(
                ctx,
                INFO,
                event_names::SEARCH_INFEASIBLE,
                Phase::Search,
                "No design satisfies the error-rate constraints",
                alpha_max = self.constraints.alpha_max(),
                beta_max = self.constraints.beta_max(),
                candidates = stats.candidates,
                rejected = stats.rejected,
                elapsed_ms = elapsed_ms,
            ),
        }

        result
    }

    /// Every valid grid point with its evaluation, in enumeration order.
    pub fn evaluate_grid(&self) -> Vec<CandidateEvaluation> {
        let ctx = LogContext::generate();
        let evaluator = self.evaluator();
        if self.parallel {
            self.evaluate_grid_parallel(&ctx, &evaluator)
        } else {
            self.evaluate_grid_sequential(&ctx, &evaluator)
        }
    }

    fn evaluate_grid_sequential(
        &self,
        ctx: &LogContext,
        evaluator: &DesignEvaluator,
    ) -> Vec<CandidateEvaluation> {
        self.grid
            .points()
            .filter_map(|point| self.evaluate_point(ctx, evaluator, &point))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn evaluate_grid_parallel(
        &self,
        ctx: &LogContext,
        evaluator: &DesignEvaluator,
    ) -> Vec<CandidateEvaluation> {
        use rayon::prelude::*;

        let points: Vec<GridPoint> = self.grid.points().collect();
        points
            .par_iter()
            .filter_map(|point| self.evaluate_point(ctx, evaluator, point))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_grid_parallel(
        &self,
        ctx: &LogContext,
        evaluator: &DesignEvaluator,
    ) -> Vec<CandidateEvaluation> {
        self.evaluate_grid_sequential(ctx, evaluator)
    }

    fn evaluate_point(
        &self,
        ctx: &LogContext,
        evaluator: &DesignEvaluator,
        point: &GridPoint,
    ) -> Option<CandidateEvaluation> {
        let evaluated = point
            .design()
            .and_then(|design| Ok((design, evaluator.evaluate(&design)?)));

        match evaluated {
            Ok((design, evaluation)) => Some(CandidateEvaluation {
                grid_index: point.index,
                design,
                evaluation,
                feasible: self.constraints.is_satisfied_by(&evaluation),
            }),
            Err(err) => {
                crate::log_event!(
                    ctx,
                    WARN,
                    event_names::SEARCH_CANDIDATE_REJECTED,
                    Phase::Search,
                    "Skipping invalid grid point",
                    grid_index = point.index,
                    field = err.field(),
                    reason = tracing::field::display(&err),
                );
                None
            }
        }
    }

    fn tally_sequential(&self, ctx: &LogContext, evaluator: &DesignEvaluator) -> Tally {
        self.grid.points().fold(Tally::default(), |tally, point| {
            let outcome = self.evaluate_point(ctx, evaluator, &point);
            if let Some(candidate) = outcome.as_ref().filter(|c| c.feasible) {
                if tally.best.as_ref().map_or(true, |best| is_better(candidate, best)) {
                    crate::log_event!(
                        ctx,
                        DEBUG,
                        event_names::SEARCH_BEST_IMPROVED,
                        Phase::Search,
                        "New best design",
                        grid_index = candidate.grid_index,
                        ess = candidate.evaluation.expected_sample_size,
                    );
                }
            }
            tally.observe(outcome)
        })
    }

    #[cfg(feature = "parallel")]
    fn tally_parallel(&self, ctx: &LogContext, evaluator: &DesignEvaluator) -> Tally {
        use rayon::prelude::*;

        let points: Vec<GridPoint> = self.grid.points().collect();
        points
            .par_iter()
            .map(|point| Tally::default().observe(self.evaluate_point(ctx, evaluator, point)))
            .reduce(Tally::default, Tally::merge)
    }

    #[cfg(not(feature = "parallel"))]
    fn tally_parallel(&self, ctx: &LogContext, evaluator: &DesignEvaluator) -> Tally {
        tracing::debug!(run_id = %ctx.run_id, "parallel feature not built; evaluating sequentially");
        self.tally_sequential(ctx, evaluator)
    }
}
