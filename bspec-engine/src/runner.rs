//! Parallel execution of collected examples

use std::time::Instant;

use chrono::Utc;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, trace, warn};

use crate::behavior::ExecutionGuard;
use crate::capture::run_captured;
use crate::collector::{Example, ExampleId};
use crate::error::{Result, SpecError};
use crate::outcome::{Cause, Outcome, GIVEN_BLOCK};
use crate::report::Report;
use crate::reporter::{Reporter, SilentReporter};
use crate::spec::SpecSuite;

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Number of worker threads
    pub num_threads: usize,

    /// Only run examples whose subject or description contains this text
    pub filter: Option<String>,

    /// Whether reporters show every outcome
    pub verbose: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            num_threads: std::thread::available_parallelism()
                .map(|threads| threads.get())
                .unwrap_or(1),
            filter: None,
            verbose: false,
        }
    }
}

/// Runs examples on a dedicated worker pool
pub struct SpecRunner {
    config: RunnerConfig,
    pool: ThreadPool,
}

impl SpecRunner {
    pub fn new(config: RunnerConfig) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.num_threads.max(1))
            .thread_name(|index| format!("bspec-worker-{}", index))
            .build()
            .map_err(|error| SpecError::WorkerPool(error.to_string()))?;

        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Drop the examples the configured filter excludes
    pub fn select(&self, examples: Vec<Example>) -> Vec<Example> {
        match &self.config.filter {
            Some(filter) => examples
                .into_iter()
                .filter(|example| matches_filter(example.id(), filter))
                .collect(),
            None => examples,
        }
    }

    /// Run every example; the outcomes of one example stay together and in
    /// declaration order
    pub fn run(&self, examples: Vec<Example>) -> Vec<Outcome> {
        self.run_reported(examples, &SilentReporter)
    }

    pub fn run_reported(&self, examples: Vec<Example>, reporter: &dyn Reporter) -> Vec<Outcome> {
        debug!(
            examples = examples.len(),
            threads = self.pool.current_num_threads(),
            "dispatching examples"
        );
        self.pool.install(|| {
            examples
                .into_par_iter()
                .flat_map_iter(|example| {
                    let id = example.id().clone();
                    let outcomes = execute(example);
                    reporter.on_example_finish(&id, &outcomes);
                    outcomes
                })
                .collect()
        })
    }

    /// Collect, filter, run and aggregate a whole suite.
    ///
    /// Only collection can fail; a failing example is part of the report.
    pub fn run_suite(&self, suite: &SpecSuite, reporter: &dyn Reporter) -> Result<Report> {
        let started_at = Utc::now();
        let start = Instant::now();

        let examples = self.select(suite.collect()?);
        reporter.on_run_start(suite.len(), examples.len());

        let outcomes = self.run_reported(examples, reporter);
        let report = Report::aggregate(outcomes, started_at, start.elapsed());
        reporter.on_run_finish(&report);
        Ok(report)
    }
}

fn matches_filter(id: &ExampleId, filter: &str) -> bool {
    id.subject.contains(filter) || id.description.contains(filter)
}

fn execute(example: Example) -> Vec<Outcome> {
    let (id, action) = example.into_parts();
    trace!(example = %id, "running");

    let guard = ExecutionGuard::enter(id.clone());
    let result = run_captured(action);
    let mut outcomes = guard.finish();

    if let Err(error) = result {
        warn!(example = %id, error = %error.message, "given block failed outside any should block");
        outcomes.push(Outcome {
            example: id,
            description: GIVEN_BLOCK.to_string(),
            cause: Some(Cause::Unexpected {
                error,
                failures: Vec::new(),
            }),
        });
    }
    outcomes
}
