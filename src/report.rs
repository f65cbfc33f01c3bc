//! CSV reports of simulation output.
//!
//! Each report is one CSV file with a header row derived from the `Serialize` implementation of
//! its row type. Three reports are produced by the runner:
//!
//! * `sir_scenario_{k}.csv`: the full time series of scenario `k` (1-based)
//! * `sir_comparison.csv`: one [`ScenarioSummary`] row per scenario
//! * `sir_diagnostics.csv`: numerical correction statistics, only when requested
//!
//! All file names are prefixed with [`ReportOptions::file_prefix`].
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use csv::Writer;
use serde::Serialize;

use crate::error::SirError;
use crate::integrator::CorrectionDiagnostics;
use crate::log::{debug, info};
use crate::result::SimulationResult;
use crate::summary::ScenarioSummary;

/// Where reports go and how existing files are treated.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub directory: PathBuf,
    pub file_prefix: String,
    /// Replace existing report files instead of failing.
    pub overwrite: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            directory: PathBuf::from("data_output"),
            file_prefix: String::new(),
            overwrite: false,
        }
    }
}

impl ReportOptions {
    #[must_use]
    pub fn directory(mut self, directory: PathBuf) -> Self {
        self.directory = directory;
        self
    }

    #[must_use]
    pub fn file_prefix(mut self, file_prefix: String) -> Self {
        self.file_prefix = file_prefix;
        self
    }

    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// The full path of the report called `short_name`.
    #[must_use]
    pub fn path_for(&self, short_name: &str) -> PathBuf {
        self.directory
            .join(format!("{}{}.csv", self.file_prefix, short_name))
    }
}

/// Report name of the time series of scenario `index` (1-based).
#[must_use]
pub fn series_name(index: usize) -> String {
    format!("sir_scenario_{index}")
}

pub const COMPARISON_NAME: &str = "sir_comparison";
pub const DIAGNOSTICS_NAME: &str = "sir_diagnostics";

/// Fails if any of the named reports already exists and overwriting is disabled. Run before
/// writing a batch so that a refused run leaves the directory untouched.
///
/// # Errors
///
/// Returns [`SirError::ReportError`] naming the first existing report.
pub fn ensure_writable<S: AsRef<str>>(
    options: &ReportOptions,
    short_names: &[S],
) -> Result<(), SirError> {
    if options.overwrite {
        return Ok(());
    }
    match short_names
        .iter()
        .map(|name| options.path_for(name.as_ref()))
        .find(|path| path.exists())
    {
        Some(path) => Err(already_exists(&path)),
        None => Ok(()),
    }
}

fn already_exists(path: &Path) -> SirError {
    SirError::ReportError(format!(
        "{} already exists; pass --force-overwrite to replace it",
        path.display()
    ))
}

// Checks that the path is a CSV path and creates it along with any missing parent directories.
fn generate_validate_filepath(path: &Path, overwrite: bool) -> Result<File, SirError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            if path.exists() && !overwrite {
                return Err(already_exists(path));
            }
            Ok(File::create(path)?)
        }
        _ => Err(SirError::ReportError(
            "Report output files must be CSVs at this time".to_string(),
        )),
    }
}

/// Writes `rows` to the report called `short_name` and returns the path written.
///
/// # Errors
///
/// Returns an error if the file exists and overwriting is disabled, if it cannot be created, or
/// if a row fails to serialize.
pub fn write_report<T, I>(
    options: &ReportOptions,
    short_name: &str,
    rows: I,
) -> Result<PathBuf, SirError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let path = options.path_for(short_name);
    let file = generate_validate_filepath(&path, options.overwrite)?;
    let mut writer = Writer::from_writer(file);
    let mut count = 0usize;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;
    debug!("wrote {} rows to {}", count, path.display());
    Ok(path)
}

/// Writes the time series of one run as `sir_scenario_{index}`.
///
/// # Errors
///
/// As [`write_report`].
pub fn write_series(
    options: &ReportOptions,
    index: usize,
    result: &SimulationResult,
) -> Result<PathBuf, SirError> {
    let path = write_report(options, &series_name(index), result.points())?;
    info!("Time series saved to: {}", path.display());
    Ok(path)
}

/// Writes one summary row per scenario as `sir_comparison`.
///
/// # Errors
///
/// As [`write_report`].
pub fn write_comparison(
    options: &ReportOptions,
    summaries: &[ScenarioSummary],
) -> Result<PathBuf, SirError> {
    let path = write_report(options, COMPARISON_NAME, summaries)?;
    info!("Comparison saved to: {}", path.display());
    Ok(path)
}

#[derive(Debug, Serialize)]
struct DiagnosticsRow<'a> {
    scenario: &'a str,
    clamped_steps: usize,
    renormalized_steps: usize,
    max_relative_drift: f64,
    max_drift_step: Option<usize>,
}

/// Writes the correction statistics of each named run as `sir_diagnostics`.
///
/// # Errors
///
/// As [`write_report`].
pub fn write_diagnostics<'a, I>(options: &ReportOptions, runs: I) -> Result<PathBuf, SirError>
where
    I: IntoIterator<Item = (&'a str, &'a CorrectionDiagnostics)>,
{
    let rows = runs.into_iter().map(|(scenario, diagnostics)| DiagnosticsRow {
        scenario,
        clamped_steps: diagnostics.clamped_steps,
        renormalized_steps: diagnostics.renormalized_steps,
        max_relative_drift: diagnostics.max_relative_drift,
        max_drift_step: diagnostics.max_drift_step,
    });
    let path = write_report(options, DIAGNOSTICS_NAME, rows)?;
    info!("Diagnostics saved to: {}", path.display());
    Ok(path)
}
