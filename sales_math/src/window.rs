//! Shifted and windowed views over a nullable series
//!
//! Contains:
//! - `shift`, the building block for lag features
//! - Triangular-weighted rolling mean (scipy `triang` kernel)
//! - Plain rolling mean

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Move every value `periods` rows later. The first `periods` rows become `None`.
pub fn shift(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut shifted = vec![None; n];
    if periods < n {
        shifted[periods..].copy_from_slice(&values[..n - periods]);
    }
    shifted
}

/// Symmetric triangular weights of length `window`, peaking at the centre.
///
/// Matches `scipy.signal.windows.triang`: odd windows reach 1.0 at the centre,
/// even windows never touch 0.0 at the ends.
pub fn triangular_weights(window: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(MathError::InvalidInput(
            "Window must be greater than zero".to_string(),
        ));
    }

    let half: Vec<f64> = (1..=(window + 1) / 2)
        .map(|n| {
            let n = n as f64;
            if window % 2 == 0 {
                (2.0 * n - 1.0) / window as f64
            } else {
                2.0 * n / (window as f64 + 1.0)
            }
        })
        .collect();

    let mut weights = half.clone();
    let mirrored = if window % 2 == 0 {
        &half[..]
    } else {
        &half[..half.len() - 1]
    };
    weights.extend(mirrored.iter().rev());

    Ok(weights)
}

/// Rolling mean weighted by a triangular kernel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangularWeightedMean {
    window: usize,
    min_periods: usize,
    weights: Vec<f64>,
}

impl TriangularWeightedMean {
    /// Create a new weighted mean over `window` rows, requiring `min_periods` observations
    pub fn new(window: usize, min_periods: usize) -> Result<Self> {
        if min_periods > window {
            return Err(MathError::InvalidInput(format!(
                "min_periods ({}) cannot exceed the window ({})",
                min_periods, window
            )));
        }

        Ok(Self {
            window,
            min_periods,
            weights: triangular_weights(window)?,
        })
    }

    /// Get the window size
    pub fn window(&self) -> usize {
        self.window
    }

    /// Weighted mean of the window ending at each row (inclusive).
    ///
    /// The newest row in a window takes the last kernel weight. Missing values are
    /// skipped and their weight left out of the denominator; rows whose window holds
    /// fewer than `min_periods` observations yield `None`.
    pub fn compute(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let mut result = Vec::with_capacity(values.len());

        for i in 0..values.len() {
            let mut weighted_sum = 0.0;
            let mut weight_sum = 0.0;
            let mut count = 0;

            for offset in 0..self.window.min(i + 1) {
                if let Some(value) = values[i - offset] {
                    let weight = self.weights[self.window - 1 - offset];
                    weighted_sum += weight * value;
                    weight_sum += weight;
                    count += 1;
                }
            }

            if count >= self.min_periods.max(1) && weight_sum > 0.0 {
                result.push(Some(weighted_sum / weight_sum));
            } else {
                result.push(None);
            }
        }

        result
    }
}

/// Unweighted rolling mean over the window ending at each row (inclusive)
pub fn rolling_mean(
    values: &[Option<f64>],
    window: usize,
    min_periods: usize,
) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(MathError::InvalidInput(
            "Window must be greater than zero".to_string(),
        ));
    }

    let mut result = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let start = (i + 1).saturating_sub(window);
        let observed: Vec<f64> = values[start..=i].iter().flatten().copied().collect();

        if !observed.is_empty() && observed.len() >= min_periods {
            result.push(Some(observed.iter().sum::<f64>() / observed.len() as f64));
        } else {
            result.push(None);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shift() {
        let values = vec![Some(1.0), Some(2.0), None, Some(4.0)];

        assert_eq!(shift(&values, 0), values);
        assert_eq!(shift(&values, 2), vec![None, None, Some(1.0), Some(2.0)]);
        assert_eq!(shift(&values, 10), vec![None; 4]);
    }

    #[test]
    fn test_triangular_weights_odd() {
        let weights = triangular_weights(3).unwrap();
        assert_eq!(weights, vec![0.5, 1.0, 0.5]);

        let weights = triangular_weights(5).unwrap();
        let expected = [1.0 / 3.0, 2.0 / 3.0, 1.0, 2.0 / 3.0, 1.0 / 3.0];
        for (w, e) in weights.iter().zip(expected.iter()) {
            assert_relative_eq!(w, e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_triangular_weights_even() {
        let weights = triangular_weights(4).unwrap();
        assert_eq!(weights, vec![0.25, 0.75, 0.75, 0.25]);

        assert_eq!(triangular_weights(1).unwrap(), vec![1.0]);
        assert!(triangular_weights(0).is_err());
    }

    #[test]
    fn test_weighted_mean_full_window() {
        let mean = TriangularWeightedMean::new(3, 1).unwrap();
        let values = vec![Some(2.0), Some(4.0), Some(6.0), Some(8.0)];
        let result = mean.compute(&values);

        // (0.5 * 2 + 1.0 * 4 + 0.5 * 6) / 2.0
        assert_relative_eq!(result[2].unwrap(), 4.0);
        // (0.5 * 4 + 1.0 * 6 + 0.5 * 8) / 2.0
        assert_relative_eq!(result[3].unwrap(), 6.0);
    }

    #[test]
    fn test_weighted_mean_partial_window_uses_newest_weights() {
        let mean = TriangularWeightedMean::new(4, 1).unwrap();
        let values = vec![Some(10.0), Some(20.0)];
        let result = mean.compute(&values);

        // Single observation takes the last weight, so the mean is the value itself
        assert_relative_eq!(result[0].unwrap(), 10.0);
        // 10 * 0.75 + 20 * 0.25 over 1.0
        assert_relative_eq!(result[1].unwrap(), 12.5);
    }

    #[test]
    fn test_weighted_mean_min_periods() {
        let mean = TriangularWeightedMean::new(5, 3).unwrap();
        let values = vec![Some(1.0), None, Some(1.0), None, Some(1.0)];
        let result = mean.compute(&values);

        assert_eq!(result[0], None);
        assert_eq!(result[3], None);
        assert_relative_eq!(result[4].unwrap(), 1.0);

        assert!(TriangularWeightedMean::new(3, 4).is_err());
    }

    #[test]
    fn test_rolling_mean() {
        let values = vec![Some(1.0), Some(3.0), None, Some(5.0)];
        let result = rolling_mean(&values, 2, 1).unwrap();

        assert_eq!(result, vec![Some(1.0), Some(2.0), Some(3.0), Some(5.0)]);
        assert_eq!(rolling_mean(&[None], 3, 1).unwrap(), vec![None]);
        assert!(rolling_mean(&values, 0, 1).is_err());
    }
}
