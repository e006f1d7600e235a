//! The behavior-registration handle and the execution scope it reads
//!
//! While an example's action runs, its worker thread holds an execution
//! scope: the example's identity and the outcomes recorded so far.
//! [`Behavior::should`] evaluates its closure against a checker of its own
//! and appends exactly one outcome, pass or fail.

use std::cell::RefCell;
use std::rc::Rc;

use bspec_assert::{CollectingChecker, Verifier};
use tracing::trace;

use crate::capture::run_captured;
use crate::collector::{self, ExampleId};
use crate::error::{Result, SpecError};
use crate::outcome::{Cause, Outcome};

/// Handle given to every definition procedure.
///
/// It carries no state of its own; it is `Copy` so given-blocks can move
/// it into their actions.
#[derive(Debug, Clone, Copy)]
pub struct Behavior {
    _private: (),
}

impl Behavior {
    pub(crate) fn new() -> Self {
        Behavior { _private: () }
    }

    /// Same as the free [`given`](crate::given) function
    pub fn given<F>(self, description: impl Into<String>, action: F) -> Result<()>
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        collector::given(description, action)
    }

    /// Evaluate `assertion` for the running example and record its outcome
    pub fn should<F>(self, description: impl Into<String>, assertion: F) -> Result<()>
    where
        F: FnOnce(&Verifier) -> anyhow::Result<()>,
    {
        let example = EXECUTION
            .with(|scope| scope.borrow().as_ref().map(|scope| scope.example.clone()))
            .ok_or_else(|| SpecError::illegal_usage("should", "can only be called in a given() block"))?;

        // not shared: a should nested in another must not drain its failures
        let checker = Rc::new(CollectingChecker::new());
        let description = description.into();
        let verifier = Verifier::new(checker.clone());
        let result = run_captured(|| assertion(&verifier));
        let cause = Cause::from_result(result, checker.take_failures());
        trace!(example = %example, should = %description, passed = cause.is_none(), "evaluated");

        let outcome = Outcome {
            example,
            description,
            cause,
        };
        EXECUTION.with(|scope| {
            if let Some(scope) = scope.borrow_mut().as_mut() {
                scope.outcomes.push(outcome);
            }
        });
        Ok(())
    }
}

struct ExecutionScope {
    example: ExampleId,
    outcomes: Vec<Outcome>,
}

thread_local! {
    static EXECUTION: RefCell<Option<ExecutionScope>> = RefCell::new(None);
}

/// Binds a fresh outcome list to the current thread for one example. Whatever scope was bound before is restored on drop, so a
/// worker that steals another example mid-action keeps both apart.
pub(crate) struct ExecutionGuard {
    previous: Option<ExecutionScope>,
}

impl ExecutionGuard {
    pub(crate) fn enter(example: ExampleId) -> Self {
        let scope = ExecutionScope {
            example,
            outcomes: Vec::new(),
        };
        let previous = EXECUTION.with(|current| current.borrow_mut().replace(scope));
        ExecutionGuard { previous }
    }

    /// Outcomes recorded under this guard, in declaration order
    pub(crate) fn finish(self) -> Vec<Outcome> {
        EXECUTION
            .with(|current| {
                current
                    .borrow_mut()
                    .as_mut()
                    .map(|scope| std::mem::take(&mut scope.outcomes))
            })
            .unwrap_or_default()
    }
}

impl Drop for ExecutionGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        let _ = EXECUTION.try_with(|current| *current.borrow_mut() = previous);
    }
}
