use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Command, FromArgMatches as _};
use rayon::prelude::*;

use crate::error::SirError;
use crate::integrator::{integrate_with_diagnostics, CorrectionDiagnostics};
use crate::log::{info, set_log_level, verbosity_level, warn, LogLevelSpec};
use crate::report::{
    ensure_writable, series_name, write_comparison, write_diagnostics, write_series,
    ReportOptions, COMPARISON_NAME, DIAGNOSTICS_NAME,
};
use crate::result::SimulationResult;
use crate::scenarios::{builtin_scenarios, load_scenarios, Scenario};
use crate::summary::ScenarioSummary;

/// Relative drift above which a run is reported as having needed heavy correction.
pub const DRIFT_WARNING_THRESHOLD: f64 = 1e-3;

/// Default cli arguments for the sir-euler runner
#[derive(Args, Debug, Clone, PartialEq)]
pub struct BaseArgs {
    /// Optional path to a JSON scenario file; the built-in scenarios are used otherwise
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Directory for report output
    #[arg(short, long, default_value = "data_output")]
    pub output_dir: String,

    /// Prefix for report file names
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Overwrite existing report files
    #[arg(short, long)]
    pub force_overwrite: bool,

    /// Integrate scenarios in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Also write per-scenario numerical correction statistics
    #[arg(long)]
    pub diagnostics: bool,

    /// Enable logging: a level (`info`) or a list of module levels (`sir_euler::integrator=trace`)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Default for BaseArgs {
    fn default() -> Self {
        BaseArgs {
            config: String::new(),
            output_dir: "data_output".to_string(),
            prefix: String::new(),
            force_overwrite: false,
            parallel: false,
            diagnostics: false,
            log_level: None,
            verbose: 0,
        }
    }
}

fn create_sir_cli() -> Command {
    let cli = Command::new("sir-euler")
        .about("Simulates SIR outbreak scenarios and writes the results as CSV reports");
    BaseArgs::augment_args(cli)
}

/// One scenario together with everything produced for it.
#[derive(Debug, Clone)]
pub struct ScenarioRun {
    pub scenario: Scenario,
    pub result: SimulationResult,
    pub diagnostics: CorrectionDiagnostics,
    pub summary: ScenarioSummary,
}

/// Everything a call to [`run_scenarios`] produced, in scenario order.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub runs: Vec<ScenarioRun>,
    pub reports: Vec<PathBuf>,
}

fn simulate_one(scenario: Scenario) -> Result<ScenarioRun, SirError> {
    info!("Simulating: {}", scenario.name);
    let (result, diagnostics) = integrate_with_diagnostics(&scenario.config)?;
    if diagnostics.max_relative_drift > DRIFT_WARNING_THRESHOLD {
        warn!(
            "{}: renormalization corrected a relative drift of {:e} at step {:?}; \
             consider more steps (step size {})",
            scenario.name,
            diagnostics.max_relative_drift,
            diagnostics.max_drift_step,
            scenario.config.step_size()
        );
    }
    let summary = ScenarioSummary::new(&scenario, &result);
    Ok(ScenarioRun {
        scenario,
        result,
        diagnostics,
        summary,
    })
}

/// Integrates every scenario. Runs share no state, so with `parallel` they are spread over the
/// rayon thread pool; the output order matches the input order either way.
///
/// # Errors
///
/// Returns the first [`SirError::InvalidConfig`] encountered.
pub fn simulate(scenarios: Vec<Scenario>, parallel: bool) -> Result<Vec<ScenarioRun>, SirError> {
    if parallel {
        scenarios.into_par_iter().map(simulate_one).collect()
    } else {
        scenarios.into_iter().map(simulate_one).collect()
    }
}

fn init_logging(args: &BaseArgs) -> Result<(), SirError> {
    if args.verbose > 0 {
        set_log_level(verbosity_level(args.verbose));
    }
    if let Some(spec) = &args.log_level {
        spec.parse::<LogLevelSpec>()?.apply();
    }
    if args.verbose > 0 && args.log_level.is_none() {
        info!("Logging enabled at level {}", verbosity_level(args.verbose));
    }
    Ok(())
}

/// Runs the scenarios selected by `args` and writes their reports.
///
/// # Errors
///
/// Returns an error if the log level cannot be parsed, the scenario file cannot be loaded, a
/// scenario is invalid, or a report cannot be written.
pub fn run_scenarios(args: &BaseArgs) -> Result<RunOutput, SirError> {
    init_logging(args)?;

    let scenarios = if args.config.is_empty() {
        builtin_scenarios()
    } else {
        println!("Loading scenarios from: {}", args.config);
        load_scenarios(Path::new(&args.config))?
    };
    println!("Starting simulations for {} scenarios...", scenarios.len());

    let options = ReportOptions::default()
        .directory(PathBuf::from(&args.output_dir))
        .file_prefix(args.prefix.clone())
        .overwrite(args.force_overwrite);

    let mut report_names: Vec<String> = (1..=scenarios.len()).map(series_name).collect();
    report_names.push(COMPARISON_NAME.to_string());
    if args.diagnostics {
        report_names.push(DIAGNOSTICS_NAME.to_string());
    }
    ensure_writable(&options, &report_names)?;

    let runs = simulate(scenarios, args.parallel)?;

    let mut reports = Vec::with_capacity(runs.len() + 2);
    for (index, run) in runs.iter().enumerate() {
        let summary = &run.summary;
        println!(
            "{}: R0 = {:.1}, peak of {:.0} infected at t = {}",
            summary.name, summary.basic_reproduction_number, summary.peak_infected, summary.peak_time
        );
        reports.push(write_series(&options, index + 1, &run.result)?);
    }

    let summaries: Vec<ScenarioSummary> = runs.iter().map(|run| run.summary.clone()).collect();
    reports.push(write_comparison(&options, &summaries)?);

    if args.diagnostics {
        reports.push(write_diagnostics(
            &options,
            runs.iter()
                .map(|run| (run.scenario.name.as_str(), &run.diagnostics)),
        )?);
    }

    println!(
        "Simulations finished. Wrote {} reports to {}",
        reports.len(),
        options.directory.display()
    );
    Ok(RunOutput { runs, reports })
}

/// Parses the process arguments and runs the selected scenarios.
///
/// # Errors
///
/// Returns an error if argument parsing fails or as [`run_scenarios`].
pub fn run_with_args() -> Result<RunOutput, Box<dyn std::error::Error>> {
    let args = args_from_env()?;
    Ok(run_scenarios(&args)?)
}

/// Parses the process arguments. Exits the process for `--help` or on a usage error, as clap
/// does.
///
/// # Errors
///
/// Returns a `clap` error if the matched arguments cannot be converted into [`BaseArgs`].
pub fn args_from_env() -> Result<BaseArgs, clap::Error> {
    let matches = create_sir_cli().get_matches();
    BaseArgs::from_arg_matches(&matches)
}

/// Parses `args` (including the program name) as the command line.
///
/// # Errors
///
/// Returns a `clap` error for unknown or malformed arguments.
pub fn parse_args<I, T>(args: I) -> Result<BaseArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = create_sir_cli().try_get_matches_from(args)?;
    BaseArgs::from_arg_matches(&matches)
}
