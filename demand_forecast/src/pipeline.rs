//! Request orchestration
//!
//! `ForecastPipeline` produces the per-entity graph response from a shared
//! regression runtime. `TrendForecaster` produces the smoothed trend response
//! from a series model fitted on each request.

use crate::assembler::{ForecastAssembler, ForecastFrame, GraphResponse, TrendResponse};
use crate::config::PipelineConfig;
use crate::data::SalesFrame;
use crate::error::{ForecastError, Result};
use crate::features::FeaturePipeline;
use crate::future::FutureFrameSynthesizer;
use crate::models::{ModelRuntime, SeriesForecaster, TrainedSeriesForecaster};
use crate::request::ForecastRequest;
use crate::selection::{FeatureSelection, FeatureSelector};
use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Interval width used by the trend response
pub const DEFAULT_INTERVAL_WIDTH: f64 = 0.8;

/// Everything one graph run produced
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub response: GraphResponse,
    /// All predicted rows, for every entity in scope
    pub forecast: ForecastFrame,
    pub selection: FeatureSelection,
}

/// Feature engineering, selection, inference and assembly over one runtime
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    model: Arc<dyn ModelRuntime>,
    config: PipelineConfig,
    features: FeaturePipeline,
    selector: FeatureSelector,
}

impl ForecastPipeline {
    /// Create a pipeline around a loaded model
    pub fn new(model: Arc<dyn ModelRuntime>, config: PipelineConfig) -> Result<Self> {
        let features = FeaturePipeline::from_config(&config)?;
        let selector = FeatureSelector::new(config.importance_threshold);
        tracing::info!(model = model.name(), "forecast pipeline ready");

        Ok(Self {
            model,
            config,
            features,
            selector,
        })
    }

    /// Run with noise drawn from the configured seed, or from entropy
    pub fn run(&self, history: &SalesFrame, request: &ForecastRequest) -> Result<ForecastRun> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run_with_rng(history, request, &mut rng)
    }

    /// Run with noise drawn from `rng`
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        history: &SalesFrame,
        request: &ForecastRequest,
        rng: &mut R,
    ) -> Result<ForecastRun> {
        let horizon = request.horizon()?;
        let scope = request.scope();
        tracing::info!(
            store = ?request.store_num,
            item = ?request.item_num,
            period_type = %request.period_type,
            num_periods = request.num_periods,
            "forecast requested"
        );

        require_history(history)?;
        let scoped = scope.apply(history);
        let key = scoped.entity_keys().first().copied().ok_or_else(|| {
            ForecastError::NotFound("No data found for the specified store and item".to_string())
        })?;

        let future = FutureFrameSynthesizer.synthesize(&scoped, horizon, scope)?;
        let combined = scoped.concat(&future);

        let features = self.features.transform(&combined, rng)?;
        let candidates = features.candidate_columns(&self.config.excluded_columns);
        let selection = self.selector.select(self.model.as_ref(), &candidates);
        let prediction_set = self.selector.prediction_set(&features, &selection)?;

        let mut predictions = self
            .model
            .predict(&prediction_set.matrix)
            .map_err(|e| match e {
                ForecastError::Model(_) => e,
                other => ForecastError::Model(other.to_string()),
            })?;
        self.model.target_transform().invert(&mut predictions);
        tracing::info!(predictions = predictions.len(), "inference done");

        let forecast = ForecastAssembler.forecast(&prediction_set.metadata, &predictions);
        let response = ForecastAssembler.prepare(key, &scoped, &forecast);

        Ok(ForecastRun {
            response,
            forecast,
            selection,
        })
    }
}

/// Trend response from a series model fitted per request
#[derive(Debug, Clone)]
pub struct TrendForecaster<M: SeriesForecaster> {
    model: M,
    interval_width: f64,
}

impl<M: SeriesForecaster> TrendForecaster<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            interval_width: DEFAULT_INTERVAL_WIDTH,
        }
    }

    pub fn with_interval_width(mut self, interval_width: f64) -> Self {
        self.interval_width = interval_width;
        self
    }

    /// Fit on the scoped history averaged per date and forecast the horizon
    pub fn forecast(&self, history: &SalesFrame, request: &ForecastRequest) -> Result<TrendResponse> {
        let horizon = request.horizon()?;
        require_history(history)?;
        let scoped = request.scope().apply(history);
        if scoped.is_empty() {
            return Err(ForecastError::NotFound(
                "No data found for the specified store and item".to_string(),
            ));
        }

        let (dates, values) = daily_mean(&scoped);
        if values.len() < 2 {
            return Err(ForecastError::Input(
                "Not enough data points for forecasting".to_string(),
            ));
        }

        tracing::info!(model = self.model.name(), observations = values.len(), "fitting trend model");
        let trained = self.model.fit(&values)?;
        let result = trained.forecast(horizon.days(), self.interval_width)?;

        let last_date = dates[dates.len() - 1];
        let forecast_dates = (1..=horizon.days() as u64)
            .map(|offset| {
                last_date.checked_add_days(Days::new(offset)).ok_or_else(|| {
                    ForecastError::Input("Forecast horizon overflows the calendar".to_string())
                })
            })
            .collect::<Result<Vec<NaiveDate>>>()?;

        ForecastAssembler.trend(&dates, &values, &forecast_dates, &result)
    }
}

fn require_history(history: &SalesFrame) -> Result<()> {
    if history.is_empty() {
        return Err(ForecastError::Input("No data provided".to_string()));
    }
    Ok(())
}

/// Mean of the known sales on each date, in date order
fn daily_mean(frame: &SalesFrame) -> (Vec<NaiveDate>, Vec<f64>) {
    let mut totals: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for (date, sales) in frame.dates().iter().zip(frame.sales()) {
        if let Some(value) = sales {
            let entry = totals.entry(*date).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }

    totals
        .into_iter()
        .map(|(date, (sum, count))| (date, sum / count as f64))
        .unzip()
}
