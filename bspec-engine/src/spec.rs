//! Specifications and the suite that registers them

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::behavior::Behavior;
use crate::collector::{self, Example};
use crate::error::Result;

/// The thing a specification describes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Subject(String);

impl Subject {
    pub fn new(name: impl Into<String>) -> Self {
        Subject(name.into())
    }

    /// Named after a type, without module paths: `Vec<String>`
    pub fn of<T: ?Sized>() -> Self {
        Subject(short_type_name(std::any::type_name::<T>()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Subject {
    fn from(name: &str) -> Self {
        Subject::new(name)
    }
}

impl From<String> for Subject {
    fn from(name: String) -> Self {
        Subject::new(name)
    }
}

fn short_type_name(full: &str) -> String {
    let mut short = String::with_capacity(full.len());
    let mut segment_start = 0;
    for (i, c) in full.char_indices() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            continue;
        }
        short.push_str(last_segment(&full[segment_start..i]));
        short.push(c);
        segment_start = i + c.len_utf8();
    }
    short.push_str(last_segment(&full[segment_start..]));
    short
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Declares the given-blocks of one specification
pub type Definition = Box<dyn Fn(Behavior) -> anyhow::Result<()> + Send + Sync>;

/// A subject plus the procedure declaring its examples
pub struct Specification {
    subject: Subject,
    definition: Definition,
}

impl Specification {
    pub fn new<F>(subject: impl Into<Subject>, definition: F) -> Self
    where
        F: Fn(Behavior) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Specification {
            subject: subject.into(),
            definition: Box::new(definition),
        }
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub(crate) fn define(&self, behavior: Behavior) -> anyhow::Result<()> {
        (self.definition)(behavior)
    }
}

impl fmt::Debug for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Spec of {}", self.subject)
    }
}

/// Registration surface: specifications in the order they were described
#[derive(Debug, Default)]
pub struct SpecSuite {
    specs: Vec<Arc<Specification>>,
}

impl SpecSuite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn describe<F>(&mut self, subject: impl Into<Subject>, definition: F) -> &mut Self
    where
        F: Fn(Behavior) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.specs
            .push(Arc::new(Specification::new(subject, definition)));
        self
    }

    pub fn specifications(&self) -> &[Arc<Specification>] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Run every definition procedure and flatten the given-blocks
    pub fn collect(&self) -> Result<Vec<Example>> {
        collector::collect(&self.specs)
    }
}
