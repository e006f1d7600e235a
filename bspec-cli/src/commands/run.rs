//! Run command implementation

use anyhow::{Context, Result};
use bspec_engine::{ConsoleReporter, JsonReporter, Reporter, RunnerConfig, SpecRunner};

use crate::samples::sample_suite;
use crate::ReporterKind;

pub fn run_command(
    threads: Option<usize>,
    filter: Option<String>,
    reporter: ReporterKind,
    verbose: bool,
) -> Result<()> {
    let defaults = RunnerConfig::default();
    let config = RunnerConfig {
        num_threads: threads.unwrap_or(defaults.num_threads),
        filter,
        verbose,
    };

    let runner = SpecRunner::new(config).context("Failed to start the runner")?;
    let reporter: Box<dyn Reporter> = match reporter {
        ReporterKind::Json => Box::new(JsonReporter::new()),
        ReporterKind::Console => Box::new(ConsoleReporter::new(verbose)),
    };

    let suite = sample_suite();
    let report = runner
        .run_suite(&suite, reporter.as_ref())
        .context("Failed to collect the sample specifications")?;

    // Exit with appropriate code
    if report.is_success() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
