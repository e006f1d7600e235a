//! Definition phase: flattens specifications into examples
//!
//! While [`collect`] walks the registered specifications, the collecting
//! thread carries the current specification and the example list in a
//! thread-local scope. [`given`] appends to that scope; outside of it there
//! is nothing to append to and the call is refused. The scope is torn down
//! when collection ends, whether it succeeds, fails or unwinds.

use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::behavior::Behavior;
use crate::capture::panic_message;
use crate::error::{Result, SpecError};
use crate::spec::Specification;

/// Deferred body of a given-block
pub type Action = Box<dyn FnOnce() -> anyhow::Result<()> + Send>;

/// Where an example was declared
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExampleId {
    pub subject: String,
    pub description: String,
    /// Position of the specification in the suite
    pub spec_index: usize,
    /// Position of the given-block within its specification
    pub example_index: usize,
}

impl fmt::Display for ExampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Example of {} {}", self.subject, self.description)
    }
}

/// One given-block, ready to run exactly once
pub struct Example {
    id: ExampleId,
    spec: Arc<Specification>,
    action: Action,
}

impl Example {
    pub fn id(&self) -> &ExampleId {
        &self.id
    }

    pub fn spec(&self) -> &Arc<Specification> {
        &self.spec
    }

    pub fn description(&self) -> &str {
        &self.id.description
    }

    pub(crate) fn into_parts(self) -> (ExampleId, Action) {
        (self.id, self.action)
    }
}

impl fmt::Debug for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Example")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct CollectionScope {
    current: Option<(usize, Arc<Specification>)>,
    next_example: usize,
    examples: Vec<Example>,
}

thread_local! {
    static COLLECTION: RefCell<Option<CollectionScope>> = RefCell::new(None);
}

/// Owns the thread's collection scope; dropping it clears the scope
struct CollectionGuard;

impl CollectionGuard {
    fn enter() -> Result<Self> {
        COLLECTION.with(|scope| {
            let mut scope = scope.borrow_mut();
            if scope.is_some() {
                return Err(SpecError::illegal_usage(
                    "collect",
                    "cannot run inside another collection",
                ));
            }
            *scope = Some(CollectionScope::default());
            Ok(CollectionGuard)
        })
    }

    fn begin_spec(&self, index: usize, spec: &Arc<Specification>) {
        with_scope(|scope| {
            scope.current = Some((index, Arc::clone(spec)));
            scope.next_example = 0;
        });
    }

    fn finish(self) -> Vec<Example> {
        with_scope(|scope| std::mem::take(&mut scope.examples)).unwrap_or_default()
    }
}

impl Drop for CollectionGuard {
    fn drop(&mut self) {
        let _ = COLLECTION.try_with(|scope| scope.borrow_mut().take());
    }
}

fn with_scope<R>(f: impl FnOnce(&mut CollectionScope) -> R) -> Option<R> {
    COLLECTION.with(|scope| scope.borrow_mut().as_mut().map(f))
}

/// Walk `specs` in order and return their examples in declaration order.
///
/// Definition procedures run here, once each. An error or panic from one of
/// them aborts collection; so does any [`SpecError`] they pass through.
pub fn collect(specs: &[Arc<Specification>]) -> Result<Vec<Example>> {
    let guard = CollectionGuard::enter()?;

    for (index, spec) in specs.iter().enumerate() {
        guard.begin_spec(index, spec);
        debug!(subject = %spec.subject(), "collecting specification");

        let defined = panic::catch_unwind(AssertUnwindSafe(|| spec.define(Behavior::new())));
        match defined {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                return Err(match error.downcast::<SpecError>() {
                    Ok(spec_error) => spec_error,
                    Err(error) => SpecError::definition(spec.subject().name(), &error),
                });
            }
            Err(payload) => {
                return Err(SpecError::Definition {
                    subject: spec.subject().name().to_string(),
                    message: panic_message(payload.as_ref()),
                });
            }
        }
    }

    let examples = guard.finish();
    debug!(specs = specs.len(), examples = examples.len(), "collection finished");
    Ok(examples)
}

/// Register a given-block of the specification being collected
pub fn given<F>(description: impl Into<String>, action: F) -> Result<()>
where
    F: FnOnce() -> anyhow::Result<()> + Send + 'static,
{
    let description = description.into();
    with_scope(|scope| {
        let (spec_index, spec) = scope.current.clone()?;
        let id = ExampleId {
            subject: spec.subject().name().to_string(),
            description,
            spec_index,
            example_index: scope.next_example,
        };
        trace!(example = %id, "registered");
        scope.next_example += 1;
        scope.examples.push(Example {
            id,
            spec,
            action: Box::new(action),
        });
        Some(())
    })
    .flatten()
    .ok_or_else(|| SpecError::illegal_usage("given", "should be called inside a describe() block"))
}
