//! Reporters observe a run as it happens and print its report
//!
//! `on_example_finish` is called from worker threads, in completion order.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::OnceCell;
use tracing::warn;

use crate::collector::ExampleId;
use crate::outcome::Outcome;
use crate::report::Report;

pub trait Reporter: Sync {
    /// Called once collection is done and the examples are known
    fn on_run_start(&self, specs: usize, examples: usize);

    /// Called when an example finished, with the outcomes it recorded
    fn on_example_finish(&self, example: &ExampleId, outcomes: &[Outcome]);

    /// Called with the aggregated report
    fn on_run_finish(&self, report: &Report);
}

/// Coloured terminal output with a progress bar for larger runs
pub struct ConsoleReporter {
    verbose: bool,
    progress: OnceCell<ProgressBar>,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            progress: OnceCell::new(),
        }
    }

    fn print_outcome(&self, outcome: &Outcome) {
        let status = if outcome.passed() {
            "PASS".green()
        } else {
            "FAIL".red()
        };
        println!("{} ... should {} ... {}", outcome.example, outcome.description, status);
        if let Some(cause) = &outcome.cause {
            for line in cause.to_string().lines() {
                println!("    {}", line.dimmed());
            }
        }
    }
}

impl Reporter for ConsoleReporter {
    fn on_run_start(&self, specs: usize, examples: usize) {
        println!(
            "\n{} {} examples from {} specifications\n",
            "Running".bold(),
            examples,
            specs
        );

        if !self.verbose && examples > 5 {
            let progress = ProgressBar::new(examples as u64);
            match ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            {
                Ok(style) => progress.set_style(style.progress_chars("#>-")),
                Err(error) => warn!(%error, "invalid progress template"),
            }
            let _ = self.progress.set(progress);
        }
    }

    fn on_example_finish(&self, _example: &ExampleId, outcomes: &[Outcome]) {
        if self.verbose {
            for outcome in outcomes {
                self.print_outcome(outcome);
            }
        }

        if let Some(progress) = self.progress.get() {
            progress.inc(1);
        }
    }

    fn on_run_finish(&self, report: &Report) {
        if let Some(progress) = self.progress.get() {
            progress.finish_and_clear();
        }

        println!("{}", report);
        println!("\n{}", "Summary".bold().underline());
        let passed = report.total - report.failed;
        if passed > 0 {
            println!("  {} passed", passed.to_string().green());
        }
        if report.failed > 0 {
            println!("  {} failed", report.failed.to_string().red());
        }

        if report.is_success() {
            println!("\n{}", "All assertions passed!".green().bold());
        } else {
            println!("\n{}", "Some assertions failed.".red().bold());
        }
    }
}

/// Prints the whole report as pretty JSON once the run is over
#[derive(Debug, Default)]
pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(report: &Report) -> serde_json::Result<String> {
        let document = serde_json::json!({
            "success": report.is_success(),
            "total": report.total,
            "failed": report.failed,
            "report": report,
        });
        serde_json::to_string_pretty(&document)
    }
}

impl Reporter for JsonReporter {
    fn on_run_start(&self, _specs: usize, _examples: usize) {
        // No action needed for JSON
    }

    fn on_example_finish(&self, _example: &ExampleId, _outcomes: &[Outcome]) {
        // No action needed for JSON
    }

    fn on_run_finish(&self, report: &Report) {
        match JsonReporter::render(report) {
            Ok(json) => println!("{}", json),
            Err(error) => warn!(%error, "cannot serialize report"),
        }
    }
}

/// Prints nothing
#[derive(Debug, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn on_run_start(&self, _specs: usize, _examples: usize) {}

    fn on_example_finish(&self, _example: &ExampleId, _outcomes: &[Outcome]) {}

    fn on_run_finish(&self, _report: &Report) {}
}
