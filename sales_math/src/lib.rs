//! # Sales Math
//!
//! Numeric kernels used to turn a single entity's sales history into model features.
//! Every function works on nullable series (`Option<f64>`), where `None` marks a day
//! with no known sales, and never reads past the row it is producing a value for.

use thiserror::Error;

pub mod ewm;
pub mod window;

pub use ewm::ExponentialWeightedMean;
pub use window::{rolling_mean, shift, triangular_weights, TriangularWeightedMean};

/// Errors that can occur in feature calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for sales math operations
pub type Result<T> = std::result::Result<T, MathError>;
