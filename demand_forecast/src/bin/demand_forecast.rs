//! Demand Forecast CLI
//!
//! Runs one forecast request against a CSV history and prints the JSON response.

use clap::{Parser, ValueEnum};
use demand_forecast::assembler::ForecastResponse;
use demand_forecast::models::{ExponentialSmoothing, HoltLinear};
use demand_forecast::{
    DataLoader, ForecastError, ForecastPipeline, ForecastRequest, LinearModel, PeriodType,
    PipelineConfig, Result, TrendForecaster,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Regression model over engineered features
    Graph,
    /// Smoothed series forecast with intervals
    Trend,
}

#[derive(Debug, Parser)]
#[command(name = "demand-forecast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Forecast per-store, per-item daily sales", long_about = None)]
struct Cli {
    /// Sales history CSV with date, store, item and sales columns
    #[arg(long)]
    history: PathBuf,

    /// Linear model JSON, required in graph mode
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Store filter
    #[arg(short, long)]
    store: Option<u32>,

    /// Item filter
    #[arg(short, long)]
    item: Option<u32>,

    /// Period type (D, M or Y)
    #[arg(long, default_value = "M")]
    period_type: PeriodType,

    /// Number of periods to forecast
    #[arg(long, default_value = "1")]
    num_periods: usize,

    /// Noise seed, overriding FORECAST_SEED
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value = "graph")]
    mode: Mode,

    /// Level smoothing for trend mode
    #[arg(long, default_value = "0.3")]
    alpha: f64,

    /// Trend smoothing for trend mode; switches to Holt's linear method
    #[arg(long)]
    beta: Option<f64>,

    /// Write every predicted row to this CSV (graph mode)
    #[arg(long)]
    forecast_csv: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(response) => match serde_json::to_string_pretty(&response) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => report(ForecastError::from(e)),
        },
        Err(e) => report(e),
    }
}

fn run(cli: &Cli) -> Result<ForecastResponse> {
    let history = DataLoader::from_csv(&cli.history)?;
    let mut request = ForecastRequest::new(cli.period_type, cli.num_periods);
    request.store_num = cli.store;
    request.item_num = cli.item;

    match cli.mode {
        Mode::Graph => {
            let model_path = cli.model.as_ref().ok_or_else(|| {
                ForecastError::Input("--model is required in graph mode".to_string())
            })?;
            let model = LinearModel::from_json_file(model_path)?;

            let mut config = PipelineConfig::from_env();
            if let Some(seed) = cli.seed {
                config = config.with_seed(seed);
            }

            let pipeline = ForecastPipeline::new(Arc::new(model), config)?;
            let run = pipeline.run(&history, &request)?;

            if let Some(path) = &cli.forecast_csv {
                run.forecast.write_csv(BufWriter::new(File::create(path)?))?;
                tracing::info!(path = %path.display(), rows = run.forecast.len(), "forecast written");
            }
            Ok(ForecastResponse::Graph(run.response))
        }
        Mode::Trend => {
            let response = match cli.beta {
                Some(beta) => TrendForecaster::new(HoltLinear::new(cli.alpha, beta)?)
                    .forecast(&history, &request)?,
                None => TrendForecaster::new(ExponentialSmoothing::new(cli.alpha)?)
                    .forecast(&history, &request)?,
            };
            Ok(ForecastResponse::Trend(response))
        }
    }
}

fn report(err: ForecastError) -> ExitCode {
    tracing::error!(error = %err, status = err.status_code(), "forecast failed");
    eprintln!("error: {}", err.client_message());
    ExitCode::FAILURE
}
