//! BOP2 design search configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for search.json (prior, grid axes, hypotheses, constraints)
//! - Config resolution (explicit path → env → XDG → defaults)
//! - Semantic validation
//! - Config snapshots for reproducible search runs

pub mod resolve;
pub mod search;
pub mod snapshot;
pub mod validate;

pub use resolve::{load_resolved, resolve_config, ConfigPaths, ConfigSource};
pub use search::{
    ConstraintConfig, FloatAxis, GridConfig, HypothesisConfig, IntAxis, PriorConfig, SearchConfig,
    MAX_AXIS_POINTS, MAX_GRID_POINTS, MAX_SAMPLE_SIZE,
};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_search_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
