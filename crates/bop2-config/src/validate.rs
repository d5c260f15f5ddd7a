//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::search::{
    FloatAxis, IntAxis, SearchConfig, MAX_AXIS_POINTS, MAX_GRID_POINTS, MAX_SAMPLE_SIZE,
};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate a search configuration semantically.
pub fn validate_search_config(config: &SearchConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    validate_shape("prior.a", config.prior.a)?;
    validate_shape("prior.b", config.prior.b)?;

    // Grid axes
    validate_float_axis(
        "grid.lambda",
        &config.grid.lambda,
        |v| (0.0..=1.0).contains(&v),
        "Must be in [0, 1]",
    )?;
    validate_float_axis(
        "grid.gamma",
        &config.grid.gamma,
        |v| v > 0.0,
        "Must be positive",
    )?;
    validate_int_axis("grid.n1", &config.grid.n1)?;
    validate_int_axis("grid.n2", &config.grid.n2)?;

    let n1 = config.grid.n1.values();
    let n2 = config.grid.n2.values();
    if !n1.iter().any(|a| n2.iter().any(|b| a <= b)) {
        return Err(ValidationError::SemanticError(format!(
            "No (n1, n2) pair satisfies n1 <= n2 (n1={:?}, n2={:?})",
            n1, n2
        )));
    }

    let points = config.grid.point_count();
    if points > MAX_GRID_POINTS {
        return Err(ValidationError::InvalidValue {
            field: "grid".to_string(),
            message: format!("Grid has {} points; at most {} allowed", points, MAX_GRID_POINTS),
        });
    }

    validate_probability("hypotheses.theta_null", config.hypotheses.theta_null)?;
    validate_probability("hypotheses.theta_alt", config.hypotheses.theta_alt)?;
    validate_probability("constraints.alpha_max", config.constraints.alpha_max)?;
    validate_probability("constraints.beta_max", config.constraints.beta_max)?;

    Ok(())
}

/// Beta shape parameters must be finite and strictly positive.
fn validate_shape(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be positive and finite, got {}", value),
        });
    }
    Ok(())
}

fn validate_probability(field: &str, value: f64) -> ValidationResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be in [0, 1], got {}", value),
        });
    }
    Ok(())
}

fn validate_float_axis(
    field: &str,
    axis: &FloatAxis,
    accept: impl Fn(f64) -> bool,
    requirement: &str,
) -> ValidationResult<()> {
    if let FloatAxis::Range { start, stop, step } = axis {
        if !step.is_finite() || *step <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("{}.step", field),
                message: format!("Must be positive, got {}", step),
            });
        }
        if !start.is_finite() || !stop.is_finite() || stop < start {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                message: format!("Range start {} must not exceed stop {}", start, stop),
            });
        }
    }
    check_axis_size(field, axis.point_count())?;

    let values = axis.values();
    if values.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: "Axis has no values".to_string(),
        });
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite() || !accept(**v)) {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("{}, got {}", requirement, bad),
        });
    }
    Ok(())
}

fn validate_int_axis(field: &str, axis: &IntAxis) -> ValidationResult<()> {
    if let IntAxis::Range { start, stop, step } = axis {
        if *step == 0 {
            return Err(ValidationError::InvalidValue {
                field: format!("{}.step", field),
                message: "Must be positive, got 0".to_string(),
            });
        }
        if stop < start {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                message: format!("Range start {} must not exceed stop {}", start, stop),
            });
        }
    }
    check_axis_size(field, axis.point_count())?;

    let values = axis.values();
    if values.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: "Axis has no values".to_string(),
        });
    }
    if values.contains(&0) {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: "Sample sizes must be at least 1".to_string(),
        });
    }
    if let Some(&largest) = values.iter().max() {
        if largest > MAX_SAMPLE_SIZE {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                message: format!(
                    "Sample sizes must not exceed {}, got {}",
                    MAX_SAMPLE_SIZE, largest
                ),
            });
        }
    }
    Ok(())
}

fn check_axis_size(field: &str, count: usize) -> ValidationResult<()> {
    if count > MAX_AXIS_POINTS {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!(
                "Axis expands to {} points; at most {} allowed",
                count, MAX_AXIS_POINTS
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{GridConfig, SearchConfig};

    fn single_point() -> SearchConfig {
        SearchConfig {
            grid: GridConfig {
                lambda: FloatAxis::Values(vec![0.9]),
                gamma: FloatAxis::Values(vec![1.0]),
                n1: IntAxis::Values(vec![10]),
                n2: IntAxis::Values(vec![30]),
            },
            ..SearchConfig::default()
        }
    }

    #[test]
    fn default_config_is_valid() {
        validate_search_config(&SearchConfig::default()).unwrap();
        validate_search_config(&single_point()).unwrap();
    }

    #[test]
    fn rejects_version_mismatch() {
        let mut config = single_point();
        config.schema_version = "0.9.0".to_string();
        let err = validate_search_config(&config).unwrap_err();
        assert!(matches!(err, ValidationError::VersionMismatch { .. }));
        assert_eq!(err.code(), 66);
    }

    #[test]
    fn rejects_non_positive_prior() {
        let mut config = single_point();
        config.prior.b = 0.0;
        let err = validate_search_config(&config).unwrap_err();
        match err {
            ValidationError::InvalidValue { field, .. } => assert_eq!(field, "prior.b"),
            other => panic!("unexpected error: {other:?}"),
        }

        let mut config = single_point();
        config.prior.a = f64::NAN;
        assert!(validate_search_config(&config).is_err());
    }

    #[test]
    fn rejects_lambda_outside_unit_interval() {
        let mut config = single_point();
        config.grid.lambda = FloatAxis::Values(vec![0.5, 1.2]);
        let err = validate_search_config(&config).unwrap_err();
        assert_eq!(err.code(), 65);
    }

    #[test]
    fn rejects_non_positive_gamma() {
        let mut config = single_point();
        config.grid.gamma = FloatAxis::Values(vec![0.0]);
        assert!(validate_search_config(&config).is_err());
    }

    #[test]
    fn rejects_zero_step_and_empty_axes() {
        let mut config = single_point();
        config.grid.gamma = FloatAxis::Range {
            start: 0.1,
            stop: 1.0,
            step: 0.0,
        };
        match validate_search_config(&config).unwrap_err() {
            ValidationError::InvalidValue { field, .. } => assert_eq!(field, "grid.gamma.step"),
            other => panic!("unexpected error: {other:?}"),
        }

        let mut config = single_point();
        config.grid.n1 = IntAxis::Values(vec![]);
        assert!(validate_search_config(&config).is_err());
    }

    #[test]
    fn rejects_zero_sample_size() {
        let mut config = single_point();
        config.grid.n1 = IntAxis::Values(vec![0, 10]);
        assert!(validate_search_config(&config).is_err());
    }

    #[test]
    fn rejects_grid_without_ordered_stage_pair() {
        let mut config = single_point();
        config.grid.n1 = IntAxis::Values(vec![40]);
        config.grid.n2 = IntAxis::Values(vec![20, 30]);
        let err = validate_search_config(&config).unwrap_err();
        assert!(matches!(err, ValidationError::SemanticError(_)));
    }

    #[test]
    fn rejects_out_of_range_hypotheses_and_constraints() {
        let mut config = single_point();
        config.hypotheses.theta_alt = 1.5;
        assert!(validate_search_config(&config).is_err());

        let mut config = single_point();
        config.constraints.alpha_max = -0.1;
        assert!(validate_search_config(&config).is_err());
    }

    #[test]
    fn rejects_vanishing_step_without_expanding() {
        for step in [1e-300, 1e-12, 5e-324] {
            let mut config = single_point();
            config.grid.lambda = FloatAxis::Range {
                start: 0.0,
                stop: 1.0,
                step,
            };
            match validate_search_config(&config).unwrap_err() {
                ValidationError::InvalidValue { field, message } => {
                    assert_eq!(field, "grid.lambda");
                    assert!(message.contains("at most"), "{message}");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        let json = r#"{
            "schema_version": "1.0.0",
            "prior": {"a": 0.5, "b": 0.5},
            "grid": {
                "lambda": {"start": 0.0, "stop": 1.0, "step": 1e-300},
                "gamma": [1.0],
                "n1": [10],
                "n2": [30]
            }
        }"#;
        let err = SearchConfig::from_json_str(json).unwrap_err();
        assert_eq!(err.code(), 65);
    }

    #[test]
    fn rejects_oversized_sample_axes() {
        let mut config = single_point();
        config.grid.n2 = IntAxis::Values(vec![30, 4_000_000_000]);
        match validate_search_config(&config).unwrap_err() {
            ValidationError::InvalidValue { field, .. } => assert_eq!(field, "grid.n2"),
            other => panic!("unexpected error: {other:?}"),
        }

        let mut config = single_point();
        config.grid.n2 = IntAxis::Range {
            start: 1,
            stop: u32::MAX,
            step: 1,
        };
        match validate_search_config(&config).unwrap_err() {
            ValidationError::InvalidValue { field, message } => {
                assert_eq!(field, "grid.n2");
                assert!(message.contains("at most"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let mut config = single_point();
        config.grid.n2 = IntAxis::Values(vec![MAX_SAMPLE_SIZE]);
        validate_search_config(&config).unwrap();
    }

    #[test]
    fn rejects_grid_over_total_cap() {
        let mut config = single_point();
        config.grid.lambda = FloatAxis::Values(vec![0.5; MAX_AXIS_POINTS]);
        config.grid.gamma = FloatAxis::Values(vec![1.0; MAX_AXIS_POINTS]);
        match validate_search_config(&config).unwrap_err() {
            ValidationError::InvalidValue { field, .. } => assert_eq!(field, "grid"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn range_endpoint_stays_inside_unit_interval() {
        // 0.09 + 13 * 0.07 rounds to 1.0000000000000002 before capping
        let mut config = single_point();
        config.grid.lambda = FloatAxis::Range {
            start: 0.09,
            stop: 1.0,
            step: 0.07,
        };
        validate_search_config(&config).unwrap();

        let values = config.grid.lambda.values();
        assert_eq!(values.len(), 14);
        assert_eq!(values.last().copied(), Some(1.0));
        assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn rejects_lambda_just_above_one() {
        let mut config = single_point();
        config.grid.lambda = FloatAxis::Values(vec![0.5, 1.0 + 1e-12]);
        assert!(validate_search_config(&config).is_err());
    }
}
