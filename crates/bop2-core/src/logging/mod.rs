//! Structured logging for design searches.
//!
//! Provides dual-mode logging:
//! - Human-readable console output for interactive use
//! - Machine-parseable JSONL for batch runs
//!
//! # Usage
//!
//! ```ignore
//! use bop2_core::logging::{init_logging, LogConfig, LogContext, Phase, event_names};
//!
//! let config = LogConfig::from_env(None, None);
//! init_logging(&config)?;
//!
//! let ctx = LogContext::generate();
//! bop2_core::log_event!(ctx, INFO, event_names::SEARCH_STARTED, Phase::Search, "Starting search");
//! ```
//!
//! All log output goes to stderr. The library never writes to stdout.

pub mod config;
pub mod events;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, LogContext, Phase};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// RUST_LOG directives win when present; otherwise `config.level` applies
/// to the bop2 crates. Fails if a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "bop2_core={level},bop2_config={level}",
            level = config.level
        ))
    });

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi);

            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init()
        }
    }
}

/// Initialize logging from the environment alone.
pub fn init_default_logging() -> Result<(), TryInitError> {
    init_logging(&LogConfig::from_env(None, None))
}

/// Generate a unique run ID for one search.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("run-{}", &uuid.simple().to_string()[..12])
}

/// Structured event logging with run correlation.
///
/// ```ignore
/// log_event!(ctx, INFO, event_names::SEARCH_STARTED, Phase::Search, "Starting search",
///     candidates = 59640usize);
/// ```
#[macro_export]
macro_rules! log_event {
    ($ctx:expr, INFO, $event:expr, $phase:expr, $msg:expr $(, $key:ident = $val:expr)* $(,)?) => {
        tracing::info!(
            event = $event,
            run_id = %$ctx.run_id,
            phase = %$phase,
            $($key = $val,)*
            "{}", $msg
        )
    };
    ($ctx:expr, DEBUG, $event:expr, $phase:expr, $msg:expr $(, $key:ident = $val:expr)* $(,)?) => {
        tracing::debug!(
            event = $event,
            run_id = %$ctx.run_id,
            phase = %$phase,
            $($key = $val,)*
            "{}", $msg
        )
    };
    ($ctx:expr, WARN, $event:expr, $phase:expr, $msg:expr $(, $key:ident = $val:expr)* $(,)?) => {
        tracing::warn!(
            event = $event,
            run_id = %$ctx.run_id,
            phase = %$phase,
            $($key = $val,)*
            "{}", $msg
        )
    };
}
