//! bspec - behavior specifications for Rust
//!
//! This crate re-exports the workspace:
//!
//! - [`descriptor`]: decoding (and writing) serialized closure descriptors
//! - [`assert`]: the checker protocol and the fluent assertion algebra
//! - [`engine`]: collection, parallel execution and reporting

pub use bspec_assert as assert;
pub use bspec_descriptor as descriptor;
pub use bspec_engine as engine;

pub use bspec_assert::{AssertError, AssertionFailure, Checker, Node, Verifier};
pub use bspec_engine::{
    given, Behavior, Outcome, Report, RunnerConfig, SpecError, SpecRunner, SpecSuite, Subject,
};

pub mod prelude {
    pub use bspec_engine::prelude::*;
}
