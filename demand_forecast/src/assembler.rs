//! Reshaping model output into client responses

use crate::data::{EntityKey, SalesFrame};
use crate::error::{AlignmentWarning, ForecastError, Result};
use crate::future::FutureMetadata;
use crate::models::ForecastResult;
use chrono::NaiveDate;
use sales_math::rolling_mean;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Rows smoothed into each trend point
pub const TREND_WINDOW: usize = 30;

/// Predictions keyed by entity and date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastFrame {
    pub date: Vec<NaiveDate>,
    pub store: Vec<u32>,
    pub item: Vec<u32>,
    pub sales: Vec<f64>,
    /// Lower interval bound, for interval-capable backends
    pub lower: Option<Vec<f64>>,
    /// Upper interval bound, for interval-capable backends
    pub upper: Option<Vec<f64>>,
    /// Set when metadata and predictions had different lengths
    pub alignment: Option<AlignmentWarning>,
}

#[derive(Debug, Serialize)]
struct ForecastRow {
    date: String,
    store: u32,
    item: u32,
    sales: f64,
    lower: Option<f64>,
    upper: Option<f64>,
}

impl ForecastFrame {
    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    /// Dates and predicted sales for one entity, in row order
    pub fn series_for(&self, key: EntityKey) -> (Vec<NaiveDate>, Vec<f64>) {
        (0..self.len())
            .filter(|&i| self.store[i] == key.store && self.item[i] == key.item)
            .map(|i| (self.date[i], self.sales[i]))
            .unzip()
    }

    /// Write the frame as CSV with a header row
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for i in 0..self.len() {
            csv_writer.serialize(ForecastRow {
                date: self.date[i].to_string(),
                store: self.store[i],
                item: self.item[i],
                sales: self.sales[i],
                lower: self.lower.as_ref().map(|l| l[i]),
                upper: self.upper.as_ref().map(|u| u[i]),
            })?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// One labelled series of the graph response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPayload {
    pub date: Vec<String>,
    pub sales: Vec<Option<f64>>,
    pub label: String,
}

/// History and forecast for a single entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphResponse {
    pub train: SeriesPayload,
    pub forecast: SeriesPayload,
}

/// Smoothed actual sales point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualSalesPoint {
    pub ds: String,
    pub sales_trend: Option<f64>,
}

/// Smoothed forecast point with interval bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendForecastPoint {
    pub ds: String,
    pub yhat_trend: Option<f64>,
    pub yhat_upper_trend: Option<f64>,
    pub yhat_lower_trend: Option<f64>,
}

/// Smoothed history and interval forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResponse {
    pub actual_sales: Vec<ActualSalesPoint>,
    pub forecast: Vec<TrendForecastPoint>,
}

/// Either canonical response shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForecastResponse {
    Graph(GraphResponse),
    Trend(TrendResponse),
}

/// Merges predictions with their row metadata and shapes responses
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastAssembler;

impl ForecastAssembler {
    /// Pair predictions with metadata rows.
    ///
    /// All four arrays are cut to the shortest length first, so misaligned
    /// upstream output is truncated rather than indexed out of bounds.
    pub fn forecast(&self, output: &FutureMetadata, predictions: &[f64]) -> ForecastFrame {
        tracing::info!(
            dates = output.date.len(),
            stores = output.store.len(),
            items = output.item.len(),
            predictions = predictions.len(),
            "creating forecast frame"
        );

        let metadata_len = output.date.len().min(output.store.len()).min(output.item.len());
        let min_length = metadata_len.min(predictions.len());

        let alignment = if output.date.len() != output.store.len()
            || output.date.len() != output.item.len()
        {
            Some(AlignmentWarning {
                stage: "forecast_metadata",
                expected: output.date.len(),
                actual: output.store.len().min(output.item.len()),
                kept: min_length,
            })
        } else {
            AlignmentWarning::check("forecast_predictions", metadata_len, predictions.len())
                .map(|w| AlignmentWarning { kept: min_length, ..w })
        };
        if let Some(warning) = &alignment {
            warning.log();
        }

        ForecastFrame {
            date: output.date[..min_length].to_vec(),
            store: output.store[..min_length].to_vec(),
            item: output.item[..min_length].to_vec(),
            sales: predictions[..min_length].to_vec(),
            lower: None,
            upper: None,
            alignment,
        }
    }

    /// History and forecast series for one entity
    pub fn prepare(&self, key: EntityKey, history: &SalesFrame, forecast: &ForecastFrame) -> GraphResponse {
        tracing::info!(store = key.store, item = key.item, "preparing response data");

        let entity_history = history.filter(Some(key.store), Some(key.item));
        let mut order: Vec<usize> = (0..entity_history.len()).collect();
        order.sort_by_key(|&i| entity_history.dates()[i]);
        let entity_history = entity_history.select_rows(&order);

        let (forecast_dates, forecast_sales) = forecast.series_for(key);

        GraphResponse {
            train: SeriesPayload {
                date: entity_history.dates().iter().map(|d| d.to_string()).collect(),
                sales: entity_history.sales().to_vec(),
                label: format!("{} Sales", key),
            },
            forecast: SeriesPayload {
                date: forecast_dates.iter().map(|d| d.to_string()).collect(),
                sales: forecast_sales.into_iter().map(Some).collect(),
                label: format!("{} Forecast", key),
            },
        }
    }

    /// Smooth actual values and an interval forecast into trend points
    pub fn trend(
        &self,
        history_dates: &[NaiveDate],
        history_values: &[f64],
        forecast_dates: &[NaiveDate],
        result: &ForecastResult,
    ) -> Result<TrendResponse> {
        let intervals = result.intervals().ok_or_else(|| {
            ForecastError::Model("Forecast backend did not produce intervals".to_string())
        })?;

        let smooth = |values: Vec<Option<f64>>| rolling_mean(&values, TREND_WINDOW, 1);
        let sales_trend = smooth(history_values.iter().copied().map(Some).collect())?;
        let yhat_trend = smooth(result.values().iter().copied().map(Some).collect())?;
        let lower_trend = smooth(intervals.iter().map(|(l, _)| Some(*l)).collect())?;
        let upper_trend = smooth(intervals.iter().map(|(_, u)| Some(*u)).collect())?;

        let actual_sales = history_dates
            .iter()
            .zip(sales_trend)
            .map(|(date, trend)| ActualSalesPoint {
                ds: format_timestamp(*date),
                sales_trend: trend,
            })
            .collect();

        let forecast = forecast_dates
            .iter()
            .enumerate()
            .take(yhat_trend.len())
            .map(|(i, date)| TrendForecastPoint {
                ds: format_timestamp(*date),
                yhat_trend: yhat_trend[i],
                yhat_upper_trend: upper_trend[i],
                yhat_lower_trend: lower_trend[i],
            })
            .collect();

        Ok(TrendResponse {
            actual_sales,
            forecast,
        })
    }
}

/// Midnight timestamp rendering used by the trend response
fn format_timestamp(date: NaiveDate) -> String {
    format!("{} 00:00:00", date.format("%Y-%m-%d"))
}
