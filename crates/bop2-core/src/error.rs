//! Crate-level error type.

use bop2_config::ValidationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::design::DesignError;

/// Errors surfaced by the public API.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid design parameters: {0}")]
    Design(#[from] DesignError),

    #[error("invalid search configuration: {0}")]
    Config(#[from] ValidationError),
}

/// Error category for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Config,
    Design,
    Evaluation,
}

impl Error {
    /// Stable numeric code for structured error reporting.
    ///
    /// Configuration errors keep the 60-range codes of
    /// [`ValidationError::code`]; design errors use 70+.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(e) => e.code(),
            Error::Design(e) => match e {
                DesignError::InvalidPrior { .. } => 70,
                DesignError::InvalidLambda(_) => 71,
                DesignError::InvalidGamma(_) => 72,
                DesignError::EmptyFirstStage => 73,
                DesignError::StageOrder { .. } => 74,
                DesignError::InvalidProbability { .. } => 75,
                DesignError::CountExceedsTrials { .. } => 80,
                DesignError::ExceedsCapacity { .. } => 81,
            },
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) => ErrorCategory::Config,
            Error::Design(
                DesignError::CountExceedsTrials { .. } | DesignError::ExceedsCapacity { .. },
            ) => ErrorCategory::Evaluation,
            Error::Design(_) => ErrorCategory::Design,
        }
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_errors_map_to_codes() {
        let err: Error = DesignError::InvalidGamma(0.0).into();
        assert_eq!(err.code(), 72);
        assert_eq!(err.category(), ErrorCategory::Design);
        assert!(err.to_string().contains("gamma"));

        let err: Error = DesignError::ExceedsCapacity { n2: 90, max_n: 80 }.into();
        assert_eq!(err.category(), ErrorCategory::Evaluation);
    }

    #[test]
    fn config_errors_keep_their_codes() {
        let err: Error = ValidationError::ParseError("eof".into()).into();
        assert_eq!(err.code(), 61);
        assert_eq!(err.category(), ErrorCategory::Config);
    }

    #[test]
    fn category_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorCategory::Evaluation).unwrap(),
            "\"evaluation\""
        );
    }
}
