//! Configuration-driven search entry points.

use std::path::Path;

use bop2_config::{load_resolved, ConfigPaths, ConfigSnapshot, ConfigSource, SearchConfig};

use crate::error::Result;
use crate::logging::{event_names, LogContext, Phase};
use crate::search::{GridSearchOptimizer, SearchResult};

/// A completed search together with the configuration it ran under.
#[derive(Debug, Clone)]
pub struct SearchRun {
    pub run_id: String,
    pub snapshot: ConfigSnapshot,
    pub result: SearchResult,
}

/// Run a search for an already-loaded configuration.
pub fn run_search(config: &SearchConfig, paths: &ConfigPaths) -> Result<SearchRun> {
    let ctx = LogContext::generate();
    let snapshot = ConfigSnapshot::new(config, paths);

    if paths.search_source == ConfigSource::BuiltinDefault {
        crate::log_event!(
            ctx,
            INFO,
            event_names::CONFIG_DEFAULT_USED,
            Phase::Config,
            "No search config found; using built-in defaults",
            config_hash = snapshot.short_id(),
        );
    } else {
        crate::log_event!(
            ctx,
            INFO,
            event_names::CONFIG_LOADED,
            Phase::Config,
            "Search config loaded",
            config_hash = snapshot.short_id(),
            source = snapshot.config_source.as_str(),
            path = snapshot.config_path.as_deref().unwrap_or(""),
            grid_points = snapshot.summary.grid_points,
        );
    }

    let optimizer = GridSearchOptimizer::from_config(config)?;
    let result = optimizer.search_with_context(&ctx);

    Ok(SearchRun {
        run_id: ctx.run_id,
        snapshot,
        result,
    })
}

/// Resolve, load, validate and search in one call.
///
/// Resolution order: `explicit`, then `BOP2_CONFIG`, then
/// `BOP2_CONFIG_DIR/search.json`, then the XDG config directory, then the
/// built-in reference configuration.
pub fn search_resolved(explicit: Option<&Path>) -> Result<SearchRun> {
    let (config, paths) = load_resolved(explicit)?;
    run_search(&config, &paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorCategory};

    fn small_config() -> SearchConfig {
        SearchConfig::from_json_str(
            r#"{
                "schema_version": "1.0.0",
                "prior": {"a": 0.5, "b": 0.5},
                "grid": {
                    "lambda": [0.9, 0.95],
                    "gamma": [0.9, 1.0],
                    "n1": [8, 10],
                    "n2": [40]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn run_search_attaches_snapshot() {
        let config = small_config();
        let run = run_search(&config, &ConfigPaths::default()).unwrap();
        assert!(run.run_id.starts_with("run-"));
        assert_eq!(run.snapshot.summary.grid_points, 8);
        assert_eq!(run.result.stats().candidates, 8);
        assert!(run.result.is_feasible());
    }

    #[test]
    fn explicit_unparseable_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = search_resolved(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.code(), 61);
        assert_eq!(err.category(), ErrorCategory::Config);
    }
}
