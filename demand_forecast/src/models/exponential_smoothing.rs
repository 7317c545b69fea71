//! Exponential smoothing models for single-series forecasting

use crate::error::{ForecastError, Result};
use crate::models::{interval_z, ForecastResult, SeriesForecaster, TrainedSeriesForecaster};

/// Simple exponential smoothing model
#[derive(Debug, Clone)]
pub struct ExponentialSmoothing {
    /// Name of the model
    name: String,
    /// Smoothing parameter
    alpha: f64,
}

/// Trained simple exponential smoothing model
#[derive(Debug, Clone)]
pub struct TrainedExponentialSmoothing {
    /// Name of the model
    name: String,
    /// Smoothing parameter
    alpha: f64,
    /// Current level
    level: f64,
    /// One-step-ahead predictions over the training data
    fitted: Vec<f64>,
    /// Standard deviation of the one-step-ahead errors
    sigma: f64,
}

impl ExponentialSmoothing {
    /// Create a new exponential smoothing model
    pub fn new(alpha: f64) -> Result<Self> {
        if alpha <= 0.0 || alpha >= 1.0 {
            return Err(ForecastError::Input(
                "Alpha must be between 0 and 1".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Exponential Smoothing (alpha={})", alpha),
            alpha,
        })
    }
}

impl SeriesForecaster for ExponentialSmoothing {
    type Trained = TrainedExponentialSmoothing;

    fn fit(&self, series: &[f64]) -> Result<Self::Trained> {
        require_observations(series)?;

        // Initialize level with first observation
        let mut level = series[0];
        let mut fitted = Vec::with_capacity(series.len());

        for &value in series {
            fitted.push(level);
            level = self.alpha * value + (1.0 - self.alpha) * level;
        }

        Ok(TrainedExponentialSmoothing {
            name: self.name.clone(),
            alpha: self.alpha,
            level,
            sigma: residual_sigma(series, &fitted),
            fitted,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSeriesForecaster for TrainedExponentialSmoothing {
    fn forecast(&self, horizons: usize, interval_width: f64) -> Result<ForecastResult> {
        let z = interval_z(interval_width)?;

        // Forecast is flat at the last level; uncertainty grows with the horizon
        let values = vec![self.level; horizons];
        let intervals = (1..=horizons)
            .map(|h| {
                let spread = (1.0 + (h as f64 - 1.0) * self.alpha.powi(2)).sqrt();
                let margin = z * self.sigma * spread;
                (self.level - margin, self.level + margin)
            })
            .collect();

        ForecastResult::new_with_intervals(values, horizons, intervals)
    }

    fn fitted(&self) -> &[f64] {
        &self.fitted
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Holt's linear trend model (double exponential smoothing)
#[derive(Debug, Clone)]
pub struct HoltLinear {
    /// Name of the model
    name: String,
    /// Level smoothing parameter
    alpha: f64,
    /// Trend smoothing parameter
    beta: f64,
}

/// Trained Holt linear trend model
#[derive(Debug, Clone)]
pub struct TrainedHoltLinear {
    name: String,
    alpha: f64,
    beta: f64,
    level: f64,
    trend: f64,
    fitted: Vec<f64>,
    sigma: f64,
}

impl HoltLinear {
    /// Create a new Holt model
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        if alpha <= 0.0 || alpha >= 1.0 || beta <= 0.0 || beta >= 1.0 {
            return Err(ForecastError::Input(
                "Alpha and beta must be between 0 and 1".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Holt Linear (alpha={}, beta={})", alpha, beta),
            alpha,
            beta,
        })
    }
}

impl SeriesForecaster for HoltLinear {
    type Trained = TrainedHoltLinear;

    fn fit(&self, series: &[f64]) -> Result<Self::Trained> {
        require_observations(series)?;

        let mut level = series[0];
        let mut trend = series[1] - series[0];
        let mut fitted = Vec::with_capacity(series.len());
        fitted.push(level);

        for &value in &series[1..] {
            let prediction = level + trend;
            fitted.push(prediction);

            let previous_level = level;
            level = self.alpha * value + (1.0 - self.alpha) * prediction;
            trend = self.beta * (level - previous_level) + (1.0 - self.beta) * trend;
        }

        Ok(TrainedHoltLinear {
            name: self.name.clone(),
            alpha: self.alpha,
            beta: self.beta,
            level,
            trend,
            sigma: residual_sigma(series, &fitted),
            fitted,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSeriesForecaster for TrainedHoltLinear {
    fn forecast(&self, horizons: usize, interval_width: f64) -> Result<ForecastResult> {
        let z = interval_z(interval_width)?;

        let mut values = Vec::with_capacity(horizons);
        let mut intervals = Vec::with_capacity(horizons);
        let mut variance_factor = 1.0;

        for h in 1..=horizons {
            if h > 1 {
                let j = (h - 1) as f64;
                variance_factor += (self.alpha * (1.0 + j * self.beta)).powi(2);
            }
            let value = self.level + h as f64 * self.trend;
            let margin = z * self.sigma * variance_factor.sqrt();
            values.push(value);
            intervals.push((value - margin, value + margin));
        }

        ForecastResult::new_with_intervals(values, horizons, intervals)
    }

    fn fitted(&self) -> &[f64] {
        &self.fitted
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn require_observations(series: &[f64]) -> Result<()> {
    if series.len() < 2 {
        return Err(ForecastError::Input(format!(
            "At least 2 observations are needed to fit, got {}",
            series.len()
        )));
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::Input(
            "Series contains non-finite values".to_string(),
        ));
    }
    Ok(())
}

/// Standard deviation of one-step-ahead errors, skipping the seed row
fn residual_sigma(series: &[f64], fitted: &[f64]) -> f64 {
    let errors: Vec<f64> = series
        .iter()
        .zip(fitted)
        .skip(1)
        .map(|(actual, predicted)| actual - predicted)
        .collect();
    if errors.is_empty() {
        return 0.0;
    }
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / errors.len() as f64;
    mse.sqrt()
}
