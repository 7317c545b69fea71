//! Noisy lagged sales

use super::{FeatureFrame, GaussianNoise};
use crate::error::Result;
use rand::Rng;
use sales_math::shift;

/// Column name for a lag offset
pub fn lag_column(lag: usize) -> String {
    format!("sales_lag_{}", lag)
}

/// Adds `sales_lag_<N>` for each offset: the sales value N rows earlier within
/// the same entity, plus Gaussian noise drawn fresh for each column
#[derive(Debug, Clone)]
pub struct LagFeatureGenerator {
    lags: Vec<usize>,
    noise: GaussianNoise,
}

impl LagFeatureGenerator {
    pub fn new(lags: Vec<usize>, noise: GaussianNoise) -> Self {
        Self { lags, noise }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.lags.iter().map(|&lag| lag_column(lag)).collect()
    }

    pub fn apply<R: Rng + ?Sized>(&self, frame: &mut FeatureFrame, rng: &mut R) -> Result<()> {
        for &lag in &self.lags {
            let shifted = frame.map_entities(|sales| shift(sales, lag));
            let column = self.noise.perturb(shifted, rng);
            frame.push_column(lag_column(lag), column)?;
        }
        tracing::debug!(lags = ?self.lags, "lag features created");
        Ok(())
    }
}
