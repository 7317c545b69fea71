//! Model backends
//!
//! Two families plug into the pipeline:
//! - `ModelRuntime`: a regression model loaded once at start-up and shared
//!   read-only between requests. It scores a design matrix and reports
//!   per-feature importances.
//! - `SeriesForecaster`: a per-request, interval-capable model fitted on a
//!   single aggregated series.

use crate::error::{ForecastError, Result};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod exponential_smoothing;
pub mod linear;

pub use exponential_smoothing::{ExponentialSmoothing, HoltLinear};
pub use linear::LinearModel;

/// Transform a runtime applied to the target during training
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetTransform {
    #[default]
    Identity,
    /// Trained on `ln(1 + sales)`; predictions are mapped back with `expm1`
    Log1p,
}

impl TargetTransform {
    /// Map raw model output back to sales units
    pub fn invert(&self, values: &mut [f64]) {
        if let TargetTransform::Log1p = self {
            values.iter_mut().for_each(|v| *v = v.exp_m1());
        }
    }
}

/// A trained regression model, immutable after loading
pub trait ModelRuntime: Debug + Send + Sync {
    /// Name of the model
    fn name(&self) -> &str;

    /// Importance per training column, in training column order
    fn feature_importance(&self) -> Vec<f64>;

    /// Score every row of the design matrix
    fn predict(&self, features: &DataFrame) -> Result<Vec<f64>>;

    /// Transform to undo on predictions
    fn target_transform(&self) -> TargetTransform {
        TargetTransform::Identity
    }
}

/// Forecast result containing predicted values
#[derive(Debug, Clone)]
pub struct ForecastResult {
    /// Forecasted values
    pub(crate) values: Vec<f64>,
    /// Number of periods forecasted
    horizons: usize,
    /// Prediction intervals (optional)
    pub(crate) intervals: Option<Vec<(f64, f64)>>,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(values: Vec<f64>, horizons: usize) -> Result<Self> {
        if values.len() != horizons {
            return Err(ForecastError::Model(format!(
                "Values length ({}) doesn't match horizons ({})",
                values.len(),
                horizons
            )));
        }

        Ok(Self {
            values,
            horizons,
            intervals: None,
        })
    }

    /// Create a new forecast result with prediction intervals
    pub fn new_with_intervals(
        values: Vec<f64>,
        horizons: usize,
        intervals: Vec<(f64, f64)>,
    ) -> Result<Self> {
        if values.len() != intervals.len() {
            return Err(ForecastError::Model(format!(
                "Values length ({}) doesn't match intervals length ({})",
                values.len(),
                intervals.len()
            )));
        }

        let mut result = Self::new(values, horizons)?;
        result.intervals = Some(intervals);
        Ok(result)
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.horizons
    }

    /// Get the prediction intervals, if available
    pub fn intervals(&self) -> Option<&[(f64, f64)]> {
        self.intervals.as_deref()
    }
}

/// Trained single-series forecaster
pub trait TrainedSeriesForecaster: Debug {
    /// Forecast `horizons` steps with intervals covering `interval_width` of outcomes
    fn forecast(&self, horizons: usize, interval_width: f64) -> Result<ForecastResult>;

    /// One-step-ahead predictions over the training series
    fn fitted(&self) -> &[f64];

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecaster that is fitted on each request's series
pub trait SeriesForecaster: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedSeriesForecaster;

    /// Fit the model on an ordered series of observations
    fn fit(&self, series: &[f64]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Two-sided standard normal quantile for an interval of the given width
pub fn interval_z(interval_width: f64) -> Result<f64> {
    use statrs::distribution::{ContinuousCDF, Normal};

    if !(interval_width > 0.0 && interval_width < 1.0) {
        return Err(ForecastError::Input(format!(
            "Interval width must be between 0 and 1, got {}",
            interval_width
        )));
    }

    let normal = Normal::new(0.0, 1.0).map_err(|e| ForecastError::Model(e.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + interval_width / 2.0))
}
