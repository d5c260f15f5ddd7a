//! Structured event names and correlation context.

use serde::{Deserialize, Serialize};

/// Phase of a design search that emitted an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Configuration loading and validation.
    Config,
    /// Building evaluator tables.
    Evaluate,
    /// Grid enumeration and selection.
    Search,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Config => "config",
            Phase::Evaluate => "evaluate",
            Phase::Search => "search",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Config
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";

    // Evaluator
    pub const EVALUATOR_READY: &str = "evaluate.tables_ready";

    // Search
    pub const SEARCH_STARTED: &str = "search.started";
    pub const SEARCH_CANDIDATE_REJECTED: &str = "search.candidate_rejected";
    pub const SEARCH_BEST_IMPROVED: &str = "search.best_improved";
    pub const SEARCH_COMPLETED: &str = "search.completed";
    pub const SEARCH_INFEASIBLE: &str = "search.infeasible";
}

/// Correlation fields attached to every event of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    pub run_id: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
        }
    }

    /// Context with a freshly generated run id.
    pub fn generate() -> Self {
        Self::new(super::generate_run_id())
    }
}
