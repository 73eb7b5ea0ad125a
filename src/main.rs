//! CLI entry point for the grid measurement ETL job.
//!
//! Reads `data/raw/measurements.csv`, aggregates purchase and feed-in energy
//! by hour of day, and writes `data/processed/result.csv`. Paths default to
//! the working directory and can be overridden by flags or a JSON config.

use anyhow::Result;
use clap::Parser;
use grid_etl::config::PipelineConfig;
use grid_etl::pipeline::{RunOutcome, run};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "grid_etl")]
#[command(about = "Hourly grid purchase/feed-in aggregation", long_about = None)]
struct Cli {
    /// JSON file with `input_path` and `output_dir`
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Measurements CSV to read (overrides the config file)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Directory to write the result CSV into (overrides the config file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

impl Cli {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::from_current_dir()?,
        };
        if let Some(input) = &self.input {
            config = config.with_input_path(input);
        }
        if let Some(output_dir) = &self.output_dir {
            config = config.with_output_dir(output_dir);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/grid_etl.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("grid_etl.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = cli.pipeline_config()?;

    match run(&config)? {
        RunOutcome::Saved(path) => info!(path = %path.display(), "Run complete"),
        RunOutcome::InputMissing(path) => {
            info!(path = %path.display(), "Run skipped, no input")
        }
    }

    Ok(())
}
