//! Importance-driven feature selection and the prediction row set

use crate::config::DEFAULT_IMPORTANCE_THRESHOLD;
use crate::error::{AlignmentWarning, ForecastError, Result};
use crate::features::FeatureFrame;
use crate::future::FutureMetadata;
use crate::models::ModelRuntime;
use polars::prelude::DataFrame;
use std::cmp::Ordering;

/// Importance score paired with its feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureImportance {
    pub feature: String,
    pub value: f64,
}

/// Importances paired with candidate features, highest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportanceReport {
    pub entries: Vec<FeatureImportance>,
    /// Set when the importance and feature counts disagreed
    pub alignment: Option<AlignmentWarning>,
}

impl ImportanceReport {
    /// Pair scores with names positionally, truncating both to the shorter length
    pub fn pair<S: AsRef<str>>(importances: &[f64], features: &[S]) -> Self {
        tracing::debug!(
            importances = importances.len(),
            features = features.len(),
            "pairing feature importances"
        );

        let alignment = AlignmentWarning::check("feature_importance", features.len(), importances.len());
        if let Some(warning) = &alignment {
            warning.log();
        }

        let mut entries: Vec<FeatureImportance> = features
            .iter()
            .zip(importances)
            .map(|(feature, &value)| FeatureImportance {
                feature: feature.as_ref().to_string(),
                value,
            })
            .collect();
        entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));

        Self { entries, alignment }
    }

    /// Features scoring strictly below `threshold`
    pub fn below(&self, threshold: f64) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.value < threshold)
            .map(|e| e.feature.as_str())
            .collect()
    }
}

/// Outcome of feature selection
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSelection {
    /// Features sent to the model, in candidate order
    pub kept: Vec<String>,
    /// Features scoring below the threshold
    pub dropped: Vec<String>,
    pub report: ImportanceReport,
}

/// Rows sent to inference and their design matrix
#[derive(Debug, Clone)]
pub struct PredictionSet {
    pub matrix: DataFrame,
    /// Row indices into the feature frame
    pub rows: Vec<usize>,
    /// Date, store and item of each prediction row
    pub metadata: FutureMetadata,
}

/// Drops low-importance features and picks the rows to predict
#[derive(Debug, Clone, Copy)]
pub struct FeatureSelector {
    threshold: f64,
}

impl Default for FeatureSelector {
    fn default() -> Self {
        Self::new(DEFAULT_IMPORTANCE_THRESHOLD)
    }
}

impl FeatureSelector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Select from explicit importance scores.
    ///
    /// Only features with a paired score below the threshold are dropped; when
    /// the counts disagree, trailing unpaired features are kept.
    pub fn select_with<S: AsRef<str>>(&self, importances: &[f64], candidates: &[S]) -> FeatureSelection {
        let report = ImportanceReport::pair(importances, candidates);
        let low = report.below(self.threshold);

        let (kept, dropped): (Vec<String>, Vec<String>) = candidates
            .iter()
            .map(|c| c.as_ref().to_string())
            .partition(|c| !low.contains(&c.as_str()));

        tracing::info!(
            kept = kept.len(),
            dropped = dropped.len(),
            threshold = self.threshold,
            "feature selection done"
        );
        tracing::debug!(?dropped, "low importance features");

        FeatureSelection {
            kept,
            dropped,
            report,
        }
    }

    /// Select using the importances the model reports
    pub fn select<S: AsRef<str>>(&self, model: &dyn ModelRuntime, candidates: &[S]) -> FeatureSelection {
        self.select_with(&model.feature_importance(), candidates)
    }

    /// Design matrix of the kept features over rows whose sales are unknown
    pub fn prediction_set(&self, frame: &FeatureFrame, selection: &FeatureSelection) -> Result<PredictionSet> {
        let sales = frame.base().sales();
        let rows: Vec<usize> = (0..frame.height()).filter(|&i| sales[i].is_none()).collect();
        if selection.kept.is_empty() && !rows.is_empty() {
            return Err(ForecastError::Model(format!(
                "No feature reaches the importance threshold of {}; nothing left to predict from",
                self.threshold
            )));
        }
        tracing::info!(
            training_rows = frame.height() - rows.len(),
            prediction_rows = rows.len(),
            features = selection.kept.len(),
            "prediction set built"
        );

        let matrix = frame.to_dataframe(&selection.kept, &rows)?;
        let metadata = FutureMetadata::from(&frame.base().select_rows(&rows));

        Ok(PredictionSet {
            matrix,
            rows,
            metadata,
        })
    }
}
