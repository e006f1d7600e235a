//! Behavior-specification engine
//!
//! Specifications are registered with [`SpecSuite::describe`]. Their
//! definition procedures run once, during collection, and declare examples
//! with [`given`]. Each example's action later runs on a worker thread and
//! records one [`Outcome`] per [`Behavior::should`] call.
//!
//! ```no_run
//! use bspec_engine::prelude::*;
//!
//! let mut suite = SpecSuite::new();
//! suite.describe(Subject::of::<Vec<String>>(), |behavior| {
//!     given("an empty vector", move || {
//!         let items: Vec<String> = Vec::new();
//!         behavior.should("have size 0", |verify| {
//!             verify.that(&items).size().is_equal_to(0);
//!             Ok(())
//!         })?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! });
//!
//! let runner = SpecRunner::new(RunnerConfig::default())?;
//! let report = runner.run_suite(&suite, &ConsoleReporter::new(false))?;
//! assert!(report.is_success());
//! # Ok::<(), SpecError>(())
//! ```

pub mod behavior;
pub mod capture;
pub mod collector;
pub mod error;
pub mod outcome;
pub mod report;
pub mod reporter;
pub mod runner;
pub mod spec;

pub use behavior::Behavior;
pub use capture::{trim_engine_frames, UnexpectedError};
pub use collector::{collect, given, Action, Example, ExampleId};
pub use error::{Result, SpecError};
pub use outcome::{Cause, Outcome, GIVEN_BLOCK};
pub use report::{ExampleReport, Report, SpecReport};
pub use reporter::{ConsoleReporter, JsonReporter, Reporter, SilentReporter};
pub use runner::{RunnerConfig, SpecRunner};
pub use spec::{Definition, SpecSuite, Specification, Subject};

pub mod prelude {
    pub use crate::{
        given, Behavior, ConsoleReporter, JsonReporter, Report, Reporter, RunnerConfig,
        SilentReporter, SpecError, SpecRunner, SpecSuite, Subject,
    };
    pub use bspec_assert::{Node, Verifier};
}
