//! Exponentially weighted means of lagged sales

use super::FeatureFrame;
use crate::error::Result;
use sales_math::{shift, ExponentialWeightedMean};

/// `0.95` -> `"095"`, `1.0` -> `"10"`
pub fn alpha_token(alpha: f64) -> String {
    let mut text = alpha.to_string();
    if !text.contains('.') {
        text.push_str(".0");
    }
    text.replace('.', "")
}

/// Column name for an (alpha, lag) pair
pub fn ewm_column(alpha: f64, lag: usize) -> String {
    format!("sales_ewm_alpha_{}_lag_{}", alpha_token(alpha), lag)
}

/// Adds `sales_ewm_alpha_<A>_lag_<N>` for every (alpha, lag) pair, alpha-major.
/// No noise is added.
#[derive(Debug, Clone)]
pub struct ExponentialWeightedFeatureGenerator {
    means: Vec<ExponentialWeightedMean>,
    lags: Vec<usize>,
}

impl ExponentialWeightedFeatureGenerator {
    pub fn new(alphas: Vec<f64>, lags: Vec<usize>, adjust: bool) -> Result<Self> {
        let means = alphas
            .into_iter()
            .map(|alpha| ExponentialWeightedMean::new(alpha, adjust))
            .collect::<sales_math::Result<Vec<_>>>()?;
        Ok(Self { means, lags })
    }

    pub fn column_names(&self) -> Vec<String> {
        self.means
            .iter()
            .flat_map(|m| self.lags.iter().map(move |&lag| ewm_column(m.alpha(), lag)))
            .collect()
    }

    pub fn apply(&self, frame: &mut FeatureFrame) -> Result<()> {
        for mean in &self.means {
            for &lag in &self.lags {
                let column = frame.map_entities(|sales| mean.compute(&shift(sales, lag)));
                frame.push_column(ewm_column(mean.alpha(), lag), column)?;
            }
        }
        tracing::debug!(
            alphas = self.means.len(),
            lags = self.lags.len(),
            "exponentially weighted mean features created"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_token() {
        assert_eq!(alpha_token(0.95), "095");
        assert_eq!(alpha_token(0.5), "05");
        assert_eq!(alpha_token(1.0), "10");
        assert_eq!(ewm_column(0.7, 364), "sales_ewm_alpha_07_lag_364");
    }
}
