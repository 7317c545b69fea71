//! Exponentially weighted mean over a nullable series
//!
//! Follows the recurrence pandas uses for `ewm(alpha=..).mean()` with
//! `ignore_na=False`: missing rows still decay the weight of older observations,
//! and the running mean is carried through them once it has been seeded.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Exponentially weighted mean with a fixed decay factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExponentialWeightedMean {
    alpha: f64,
    adjust: bool,
    #[serde(skip)]
    weighted: Option<f64>,
    #[serde(skip)]
    old_weight: f64,
}

impl ExponentialWeightedMean {
    /// Create a new weighted mean with smoothing factor `alpha` in (0, 1].
    ///
    /// With `adjust` the mean divides by the decaying sum of weights (pandas default);
    /// without it the plain `alpha * x + (1 - alpha) * prev` recursion is used.
    pub fn new(alpha: f64, adjust: bool) -> Result<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(MathError::InvalidInput(format!(
                "Alpha must be in (0, 1], got {}",
                alpha
            )));
        }

        Ok(Self {
            alpha,
            adjust,
            weighted: None,
            old_weight: 1.0,
        })
    }

    /// Get the smoothing factor
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Feed the next row and return the current mean, `None` until the first observation
    pub fn update(&mut self, value: Option<f64>) -> Option<f64> {
        let new_weight = if self.adjust { 1.0 } else { self.alpha };

        match (self.weighted, value) {
            (None, Some(current)) => {
                self.weighted = Some(current);
                self.old_weight = 1.0;
            }
            (None, None) => {}
            (Some(weighted), observation) => {
                self.old_weight *= 1.0 - self.alpha;
                if let Some(current) = observation {
                    if weighted != current {
                        self.weighted = Some(
                            (self.old_weight * weighted + new_weight * current)
                                / (self.old_weight + new_weight),
                        );
                    }
                    if self.adjust {
                        self.old_weight += new_weight;
                    } else {
                        self.old_weight = 1.0;
                    }
                }
            }
        }

        self.weighted
    }

    /// Run the mean over a whole series from a fresh state
    pub fn compute(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let mut state = self.clone();
        state.reset();
        values.iter().map(|value| state.update(*value)).collect()
    }

    /// Reset the mean, forgetting all observations
    pub fn reset(&mut self) {
        self.weighted = None;
        self.old_weight = 1.0;
    }
}
