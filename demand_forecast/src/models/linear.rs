//! Linear regression runtime over named features

use crate::error::{ForecastError, Result};
use crate::models::{ModelRuntime, TargetTransform};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Linear model scored column-by-name.
///
/// Missing cells and columns absent from the design matrix contribute
/// nothing, the way tree ensembles route missing values down a default branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default = "LinearModel::default_name")]
    name: String,
    features: Vec<String>,
    coefficients: Vec<f64>,
    #[serde(default)]
    intercept: f64,
    #[serde(default)]
    importances: Vec<f64>,
    #[serde(default)]
    target_transform: TargetTransform,
}

impl LinearModel {
    /// Create a model from training column names and one coefficient per column
    pub fn new(features: Vec<String>, coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        let model = Self {
            name: Self::default_name(),
            importances: coefficients.iter().map(|c| c.abs()).collect(),
            features,
            coefficients,
            intercept,
            target_transform: TargetTransform::Identity,
        };
        model.validate()?;
        Ok(model)
    }

    /// Replace the reported importances
    pub fn with_importances(mut self, importances: Vec<f64>) -> Self {
        self.importances = importances;
        self
    }

    /// Declare the target transform the coefficients were fitted under
    pub fn with_target_transform(mut self, transform: TargetTransform) -> Self {
        self.target_transform = transform;
        self
    }

    /// Load a model from its JSON description
    pub fn from_json_str(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Load a model from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Training column names
    pub fn features(&self) -> &[String] {
        &self.features
    }

    fn default_name() -> String {
        "Linear Model".to_string()
    }

    fn validate(&self) -> Result<()> {
        if self.features.len() != self.coefficients.len() {
            return Err(ForecastError::Input(format!(
                "Model has {} features but {} coefficients",
                self.features.len(),
                self.coefficients.len()
            )));
        }
        if let Some(bad) = self.importances.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(ForecastError::Input(format!(
                "Feature importances must be non-negative, got {}",
                bad
            )));
        }
        Ok(())
    }
}

impl ModelRuntime for LinearModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn feature_importance(&self) -> Vec<f64> {
        self.importances.clone()
    }

    fn predict(&self, features: &DataFrame) -> Result<Vec<f64>> {
        let mut predictions = vec![self.intercept; features.height()];

        for (name, coefficient) in self.features.iter().zip(&self.coefficients) {
            let Ok(column) = features.column(name) else {
                continue;
            };
            let column = column.cast(&DataType::Float64)?;
            for (prediction, value) in predictions.iter_mut().zip(column.f64()?.into_iter()) {
                if let Some(value) = value {
                    *prediction += coefficient * value;
                }
            }
        }

        Ok(predictions)
    }

    fn target_transform(&self) -> TargetTransform {
        self.target_transform
    }
}
