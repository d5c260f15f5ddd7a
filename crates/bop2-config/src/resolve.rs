//! Configuration resolution and path discovery.
//!
//! Resolution order: explicit path → environment variables → XDG path → defaults.

use std::path::{Path, PathBuf};

use crate::search::SearchConfig;
use crate::validate::ValidationResult;

/// Discovered configuration file path.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to search.json (or None if not found).
    pub search: Option<PathBuf>,

    /// Source of the search config (for diagnostics).
    pub search_source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided by the caller.
    Explicit,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Explicit => write!(f, "explicit path"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "BOP2_CONFIG";
pub const ENV_CONFIG_DIR: &str = "BOP2_CONFIG_DIR";

/// Standard config file name.
const SEARCH_FILENAME: &str = "search.json";

/// Application name for XDG directories.
const APP_NAME: &str = "bop2";

/// Resolve the search configuration path.
///
/// Resolution order:
/// 1. Explicit path (if provided and present)
/// 2. BOP2_CONFIG environment variable
/// 3. BOP2_CONFIG_DIR environment variable + search.json
/// 4. XDG config directory (~/.config/bop2/search.json)
/// 5. Built-in defaults (None)
pub fn resolve_config(explicit: Option<&Path>) -> ConfigPaths {
    let (search, search_source) = resolve_with(
        explicit,
        std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from),
        std::env::var(ENV_CONFIG_DIR).ok().map(PathBuf::from),
        xdg_config_dir(),
    );
    ConfigPaths {
        search,
        search_source,
    }
}

/// Resolution over already-read candidate locations.
fn resolve_with(
    explicit: Option<&Path>,
    env_path: Option<PathBuf>,
    env_dir: Option<PathBuf>,
    xdg_dir: Option<PathBuf>,
) -> (Option<PathBuf>, ConfigSource) {
    if let Some(path) = explicit {
        if path.exists() {
            return (Some(path.to_path_buf()), ConfigSource::Explicit);
        }
    }

    if let Some(path) = env_path {
        if path.exists() {
            return (Some(path), ConfigSource::Environment);
        }
    }

    if let Some(dir) = env_dir {
        let path = dir.join(SEARCH_FILENAME);
        if path.exists() {
            return (Some(path), ConfigSource::Environment);
        }
    }

    if let Some(dir) = xdg_dir {
        let path = dir.join(SEARCH_FILENAME);
        if path.exists() {
            return (Some(path), ConfigSource::XdgConfig);
        }
    }

    (None, ConfigSource::BuiltinDefault)
}

/// Get the XDG config directory for bop2.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Resolve and load the search configuration.
///
/// Returns the built-in default when no file is found. A file that is
/// found but fails to parse or validate is an error.
pub fn load_resolved(explicit: Option<&Path>) -> ValidationResult<(SearchConfig, ConfigPaths)> {
    let paths = resolve_config(explicit);
    let config = match &paths.search {
        Some(path) => SearchConfig::load(path)?,
        None => SearchConfig::default(),
    };
    Ok((config, paths))
}
