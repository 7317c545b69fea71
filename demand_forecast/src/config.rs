//! Pipeline configuration

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Lag offsets (days) the reference model was trained with
pub const DEFAULT_LAGS: [usize; 10] = [91, 98, 105, 112, 119, 126, 182, 364, 546, 728];

/// Rolling window sizes (days)
pub const DEFAULT_ROLL_WINDOWS: [usize; 3] = [365, 546, 730];

/// Decay factors for the exponentially weighted features
pub const DEFAULT_EWM_ALPHAS: [f64; 5] = [0.95, 0.9, 0.8, 0.7, 0.5];

/// Standard deviation of the noise added to lag and rolling features
pub const DEFAULT_NOISE_STD: f64 = 1.6;

/// Features scoring below this importance are dropped before inference
pub const DEFAULT_IMPORTANCE_THRESHOLD: f64 = 50.0;

/// Settings for the feature pipeline and feature selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Lag offsets for `sales_lag_<N>`
    pub lags: Vec<usize>,
    /// Window sizes for `sales_roll_mean_<N>`
    pub roll_windows: Vec<usize>,
    /// Minimum observations inside a rolling window
    pub roll_min_periods: usize,
    /// Decay factors for `sales_ewm_alpha_<A>_lag_<N>`
    pub ewm_alphas: Vec<f64>,
    /// Lag offsets for the exponentially weighted features
    pub ewm_lags: Vec<usize>,
    /// Normalise the weighted mean by the decaying weight sum
    pub ewm_adjust: bool,
    /// Noise standard deviation for lag and rolling features
    pub noise_std: f64,
    /// Absolute importance threshold for feature selection
    pub importance_threshold: f64,
    /// Columns never offered to the model
    pub excluded_columns: Vec<String>,
    /// Seed for the noise generator; entropy when unset
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lags: DEFAULT_LAGS.to_vec(),
            roll_windows: DEFAULT_ROLL_WINDOWS.to_vec(),
            roll_min_periods: 10,
            ewm_alphas: DEFAULT_EWM_ALPHAS.to_vec(),
            ewm_lags: DEFAULT_LAGS.to_vec(),
            ewm_adjust: true,
            noise_std: DEFAULT_NOISE_STD,
            importance_threshold: DEFAULT_IMPORTANCE_THRESHOLD,
            excluded_columns: ["date", "id", "sales", "year"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            seed: None,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `FORECAST_SEED`, `FORECAST_NOISE_STD` and
    /// `FORECAST_IMPORTANCE_THRESHOLD` when they parse
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            seed: std::env::var("FORECAST_SEED")
                .ok()
                .and_then(|s| s.parse().ok()),
            noise_std: std::env::var("FORECAST_NOISE_STD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.noise_std),
            importance_threshold: std::env::var("FORECAST_IMPORTANCE_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.importance_threshold),
            ..defaults
        }
    }

    /// Set the noise seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every parameter before a pipeline is built from it
    pub fn validate(&self) -> Result<()> {
        if self.lags.iter().chain(&self.ewm_lags).any(|&lag| lag == 0) {
            return Err(ForecastError::Input(
                "Lag offsets must be greater than zero".to_string(),
            ));
        }
        if self.roll_windows.iter().any(|&w| w == 0) {
            return Err(ForecastError::Input(
                "Rolling windows must be greater than zero".to_string(),
            ));
        }
        if let Some(alpha) = self
            .ewm_alphas
            .iter()
            .find(|&&a| !(a > 0.0 && a <= 1.0))
        {
            return Err(ForecastError::Input(format!(
                "EWM alpha must be in (0, 1], got {}",
                alpha
            )));
        }
        if !self.noise_std.is_finite() || self.noise_std < 0.0 {
            return Err(ForecastError::Input(format!(
                "Noise standard deviation must be finite and non-negative, got {}",
                self.noise_std
            )));
        }
        if !self.importance_threshold.is_finite() || self.importance_threshold < 0.0 {
            return Err(ForecastError::Input(format!(
                "Importance threshold must be non-negative, got {}",
                self.importance_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"lags": [7], "seed": 3}"#).unwrap();
        assert_eq!(config.lags, vec![7]);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.roll_windows, DEFAULT_ROLL_WINDOWS.to_vec());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_lag = PipelineConfig {
            lags: vec![0],
            ..PipelineConfig::default()
        };
        assert!(zero_lag.validate().is_err());

        let negative_noise = PipelineConfig {
            noise_std: -1.0,
            ..PipelineConfig::default()
        };
        assert!(negative_noise.validate().is_err());

        let alpha = PipelineConfig {
            ewm_alphas: vec![0.0],
            ..PipelineConfig::default()
        };
        assert!(alpha.validate().is_err());
    }
}
