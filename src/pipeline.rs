//! Runs extract, clean, aggregate and save in sequence.

use std::path::PathBuf;
use tracing::{info, warn};

use crate::analyzers::aggregate::aggregate_hourly;
use crate::clean::clean;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::extract::extract;
use crate::output::{print_json, print_report, save_result};

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The result table was written to this path.
    Saved(PathBuf),
    /// The input file was missing; nothing was processed or written.
    InputMissing(PathBuf),
}

/// Runs the whole pipeline for `config`.
///
/// A missing input file is an expected condition and yields
/// [`RunOutcome::InputMissing`]. Every other failure is returned as an error.
#[tracing::instrument(skip_all, fields(
    input = %config.input_path.display(),
    output_dir = %config.output_dir.display(),
))]
pub fn run(config: &PipelineConfig) -> Result<RunOutcome> {
    let raw = match extract(&config.input_path) {
        Ok(raw) => raw,
        Err(PipelineError::FileNotFound { path, source }) => {
            warn!(
                error = %source,
                "Dataset is not found. Please check if file exists : {}",
                path.display()
            );
            return Ok(RunOutcome::InputMissing(path));
        }
        Err(e) => return Err(e),
    };
    info!(rows = raw.len(), "Extracted raw measurements");

    let (cleaned, report) = clean(&raw)?;
    if let Err(e) = print_report(&report) {
        warn!(error = %e, "Could not render clean report as JSON");
    }
    let hourly = aggregate_hourly(&cleaned);
    if let Err(e) = print_json(&hourly) {
        warn!(error = %e, "Could not render hourly table as JSON");
    }
    let path = save_result(&hourly, &config.output_dir)?;

    Ok(RunOutcome::Saved(path))
}
