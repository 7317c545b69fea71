//! # Demand Forecast
//!
//! Per-store, per-item daily sales forecasting on top of a pre-trained model.
//!
//! ## Features
//!
//! - Sales history ingest from CSV uploads or inline JSON records
//! - Calendar, lag, rolling-window and exponentially weighted features per entity
//! - Future frame synthesis over day, month (30 days) and year (365 days) horizons
//! - Importance-based feature selection against the loaded model
//! - Graph and trend response shapes ready for a client
//!
//! ## Quick Start
//!
//! ```no_run
//! use demand_forecast::{
//!     DataLoader, ForecastPipeline, ForecastRequest, LinearModel, PeriodType, PipelineConfig,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> demand_forecast::Result<()> {
//! // Load history and a model
//! let history = DataLoader::from_csv("train.csv")?;
//! let model = LinearModel::from_json_file("model.json")?;
//!
//! // Build the pipeline once, run it per request
//! let pipeline = ForecastPipeline::new(Arc::new(model), PipelineConfig::default().with_seed(7))?;
//! let request = ForecastRequest::new(PeriodType::Month, 3).with_store(1).with_item(1);
//!
//! let run = pipeline.run(&history, &request)?;
//! println!("{}", serde_json::to_string(&run.response)?);
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod future;
pub mod models;
pub mod pipeline;
pub mod request;
pub mod selection;

// Re-export commonly used types
pub use crate::assembler::{ForecastAssembler, ForecastFrame, ForecastResponse, GraphResponse, TrendResponse};
pub use crate::config::PipelineConfig;
pub use crate::data::{DataLoader, EntityKey, SalesFrame, SalesRecord};
pub use crate::error::{AlignmentWarning, ForecastError, Result};
pub use crate::features::{FeatureFrame, FeaturePipeline};
pub use crate::future::{EntityScope, FutureFrameSynthesizer, Horizon, PeriodType};
pub use crate::models::{LinearModel, ModelRuntime, SeriesForecaster, TargetTransform};
pub use crate::pipeline::{ForecastPipeline, ForecastRun, TrendForecaster};
pub use crate::request::ForecastRequest;
pub use crate::selection::{FeatureSelection, FeatureSelector};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
