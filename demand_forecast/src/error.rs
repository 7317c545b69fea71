//! Error types for the demand_forecast crate

use polars::prelude::PolarsError;
use std::fmt;
use thiserror::Error;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Caller supplied data or parameters that cannot be used
    #[error("Input error: {0}")]
    Input(String),

    /// A store/item filter matched no rows
    #[error("Not found: {0}")]
    NotFound(String),

    /// The model backend failed to produce output
    #[error("Model error: {0}")]
    Model(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::Polars(err.to_string())
    }
}

impl From<sales_math::MathError> for ForecastError {
    fn from(err: sales_math::MathError) -> Self {
        ForecastError::Input(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::Io(std::io::Error::new(std::io::ErrorKind::Other, err))
    }
}

impl ForecastError {
    /// HTTP status equivalent of this error
    pub fn status_code(&self) -> u16 {
        match self {
            ForecastError::Input(_) | ForecastError::Polars(_) | ForecastError::Json(_) => 400,
            ForecastError::NotFound(_) => 404,
            ForecastError::Model(_) | ForecastError::Io(_) => 500,
        }
    }

    /// Message that is safe to hand back to a caller
    pub fn client_message(&self) -> String {
        match self {
            ForecastError::Input(msg) | ForecastError::NotFound(msg) => msg.clone(),
            ForecastError::Polars(_) => "Data processing error. Check your data format.".to_string(),
            ForecastError::Json(_) => "Invalid JSON format".to_string(),
            ForecastError::Model(msg) => format!("An unexpected error occurred: {}", msg),
            ForecastError::Io(_) => "An internal error occurred".to_string(),
        }
    }
}

/// A length mismatch that was repaired by truncation instead of failing the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentWarning {
    /// Where the mismatch was found
    pub stage: &'static str,
    /// Length the stage expected
    pub expected: usize,
    /// Length it actually received
    pub actual: usize,
    /// Length kept after truncation
    pub kept: usize,
}

impl AlignmentWarning {
    /// Record a mismatch, or `None` when the lengths agree
    pub fn check(stage: &'static str, expected: usize, actual: usize) -> Option<Self> {
        (expected != actual).then(|| Self {
            stage,
            expected,
            actual,
            kept: expected.min(actual),
        })
    }

    /// Emit the warning through `tracing`
    pub fn log(&self) {
        tracing::warn!(
            stage = self.stage,
            expected = self.expected,
            actual = self.actual,
            kept = self.kept,
            "length mismatch, truncating"
        );
    }
}

impl fmt::Display for AlignmentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {} values, got {}; kept {}",
            self.stage, self.expected, self.actual, self.kept
        )
    }
}
