//! Feature construction for the sales design matrix
//!
//! Stages run in a fixed order over a `FeatureFrame`:
//! calendar fields, noisy lags, noisy triangular rolling means, then
//! exponentially weighted means. Every windowed stage works on explicit
//! per-entity row ranges and only ever looks at earlier rows.

use crate::config::PipelineConfig;
use crate::data::SalesFrame;
use crate::error::{ForecastError, Result};
use polars::prelude::*;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::ops::Range;

pub mod date;
pub mod ewm;
pub mod lag;
pub mod rolling;

pub use date::DateFeatureExtractor;
pub use ewm::ExponentialWeightedFeatureGenerator;
pub use lag::LagFeatureGenerator;
pub use rolling::RollingStatisticGenerator;

/// Columns of the underlying sales frame that can be offered to the model
pub const ENTITY_COLUMNS: [&str; 2] = ["store", "item"];

/// A named numeric feature column
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Sales rows sorted by (store, item, date) plus derived feature columns
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    base: SalesFrame,
    groups: Vec<Range<usize>>,
    columns: Vec<FeatureColumn>,
}

impl FeatureFrame {
    /// Sort the rows and index the per-entity ranges
    pub fn new(frame: &SalesFrame) -> Result<Self> {
        let base = frame.sorted_by_entity()?;

        let mut groups = Vec::new();
        let mut start = 0;
        for i in 1..=base.len() {
            if i == base.len() || base.key(i) != base.key(start) {
                groups.push(start..i);
                start = i;
            }
        }

        Ok(Self {
            base,
            groups,
            columns: Vec::new(),
        })
    }

    /// The sorted sales rows
    pub fn base(&self) -> &SalesFrame {
        &self.base
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.base.len()
    }

    /// Contiguous row range of each entity, in key order
    pub fn entity_groups(&self) -> &[Range<usize>] {
        &self.groups
    }

    /// Feature column names in insertion order
    pub fn feature_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Values of a feature column
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Values of a feature column or of the `store`/`item` columns, as floats
    pub fn numeric_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        match name {
            "store" => Some(self.base.stores().iter().map(|&s| Some(s as f64)).collect()),
            "item" => Some(self.base.items().iter().map(|&i| Some(i as f64)).collect()),
            "sales" => Some(self.base.sales().to_vec()),
            _ => self.column(name).map(|values| values.to_vec()),
        }
    }

    /// Add a feature column, replacing any column of the same name
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        let name = name.into();
        if values.len() != self.height() {
            return Err(ForecastError::Input(format!(
                "Feature '{}' has {} values for {} rows",
                name,
                values.len(),
                self.height()
            )));
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(FeatureColumn { name, values }),
        }
        Ok(())
    }

    /// Fail with an input error naming the first absent column
    pub fn require_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        for name in names {
            let name = name.as_ref();
            if self.numeric_column(name).is_none() {
                return Err(ForecastError::Input(format!(
                    "Missing required column '{}'",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Columns the model may see: `store`, `item`, then features in insertion order,
    /// minus `excluded`
    pub fn candidate_columns<S: AsRef<str>>(&self, excluded: &[S]) -> Vec<String> {
        let is_excluded = |name: &str| excluded.iter().any(|e| e.as_ref() == name);
        ENTITY_COLUMNS
            .iter()
            .copied()
            .chain(self.columns.iter().map(|c| c.name.as_str()))
            .filter(|name| !is_excluded(name))
            .map(str::to_string)
            .collect()
    }

    /// Apply a per-entity transform to the sales column.
    ///
    /// `transform` receives one entity's sales in date order and must return a
    /// series of the same length.
    pub fn map_entities<F>(&self, mut transform: F) -> Vec<Option<f64>>
    where
        F: FnMut(&[Option<f64>]) -> Vec<Option<f64>>,
    {
        let sales = self.base.sales();
        let mut output = Vec::with_capacity(sales.len());
        for group in &self.groups {
            output.extend(transform(&sales[group.clone()]));
        }
        output
    }

    /// Export the given columns for the given rows as a design matrix
    pub fn to_dataframe<S: AsRef<str>>(&self, columns: &[S], rows: &[usize]) -> Result<DataFrame> {
        self.require_columns(columns)?;

        let series: Vec<Series> = columns
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let values = self.numeric_column(name).unwrap_or_default();
                let picked: Vec<Option<f64>> = rows.iter().map(|&r| values[r]).collect();
                Series::new(name, picked)
            })
            .collect();

        Ok(DataFrame::new(series)?)
    }
}

/// Zero-mean Gaussian noise, drawn one value per row
#[derive(Debug, Clone, Copy)]
pub struct GaussianNoise {
    normal: Normal<f64>,
}

impl GaussianNoise {
    /// Create a noise source with the given standard deviation
    pub fn new(std_dev: f64) -> Result<Self> {
        let normal = Normal::new(0.0, std_dev).map_err(|e| {
            ForecastError::Input(format!("Invalid noise standard deviation {}: {}", std_dev, e))
        })?;
        Ok(Self { normal })
    }

    /// Draw `n` fresh values
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        (0..n).map(|_| self.normal.sample(rng)).collect()
    }

    /// Add freshly drawn noise to every row; missing values stay missing
    pub fn perturb<R: Rng + ?Sized>(&self, values: Vec<Option<f64>>, rng: &mut R) -> Vec<Option<f64>> {
        let noise = self.sample(values.len(), rng);
        values
            .into_iter()
            .zip(noise)
            .map(|(value, eps)| value.map(|v| v + eps))
            .collect()
    }
}

/// The four feature stages composed in their fixed order
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    dates: DateFeatureExtractor,
    lags: LagFeatureGenerator,
    rolling: RollingStatisticGenerator,
    ewm: ExponentialWeightedFeatureGenerator,
}

impl FeaturePipeline {
    /// Build every stage from the configuration
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let noise = GaussianNoise::new(config.noise_std)?;

        Ok(Self {
            dates: DateFeatureExtractor,
            lags: LagFeatureGenerator::new(config.lags.clone(), noise),
            rolling: RollingStatisticGenerator::new(
                config.roll_windows.clone(),
                config.roll_min_periods,
                noise,
            )?,
            ewm: ExponentialWeightedFeatureGenerator::new(
                config.ewm_alphas.clone(),
                config.ewm_lags.clone(),
                config.ewm_adjust,
            )?,
        })
    }

    /// Names of every column the pipeline adds, in order
    pub fn output_columns(&self) -> Vec<String> {
        let mut names: Vec<String> = date::DATE_FEATURES.iter().map(|s| s.to_string()).collect();
        names.extend(self.lags.column_names());
        names.extend(self.rolling.column_names());
        names.extend(self.ewm.column_names());
        names
    }

    /// Sort the frame and add every feature column
    pub fn transform<R: Rng + ?Sized>(&self, frame: &SalesFrame, rng: &mut R) -> Result<FeatureFrame> {
        let mut features = FeatureFrame::new(frame)?;
        tracing::info!(
            rows = features.height(),
            entities = features.entity_groups().len(),
            "building features"
        );

        self.dates.apply(&mut features)?;
        self.lags.apply(&mut features, rng)?;
        self.rolling.apply(&mut features, rng)?;
        self.ewm.apply(&mut features)?;

        features.require_columns(&self.output_columns())?;
        tracing::info!(columns = features.feature_names().len(), "features built");
        Ok(features)
    }
}
