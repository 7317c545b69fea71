//! Noisy triangular-weighted rolling means

use super::{FeatureFrame, GaussianNoise};
use crate::error::Result;
use rand::Rng;
use sales_math::{shift, TriangularWeightedMean};

/// Column name for a rolling window
pub fn roll_mean_column(window: usize) -> String {
    format!("sales_roll_mean_{}", window)
}

/// Adds `sales_roll_mean_<W>` for each window.
///
/// The series is shifted by one row first, so a row's own sales never enter
/// its window.
#[derive(Debug, Clone)]
pub struct RollingStatisticGenerator {
    means: Vec<TriangularWeightedMean>,
    noise: GaussianNoise,
}

impl RollingStatisticGenerator {
    pub fn new(windows: Vec<usize>, min_periods: usize, noise: GaussianNoise) -> Result<Self> {
        let means = windows
            .into_iter()
            .map(|w| TriangularWeightedMean::new(w, min_periods.min(w)))
            .collect::<sales_math::Result<Vec<_>>>()?;
        Ok(Self { means, noise })
    }

    pub fn column_names(&self) -> Vec<String> {
        self.means.iter().map(|m| roll_mean_column(m.window())).collect()
    }

    pub fn apply<R: Rng + ?Sized>(&self, frame: &mut FeatureFrame, rng: &mut R) -> Result<()> {
        for mean in &self.means {
            let rolled = frame.map_entities(|sales| mean.compute(&shift(sales, 1)));
            let column = self.noise.perturb(rolled, rng);
            frame.push_column(roll_mean_column(mean.window()), column)?;
        }
        tracing::debug!(windows = self.means.len(), "rolling mean features created");
        Ok(())
    }
}
