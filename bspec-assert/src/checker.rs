//! Checker callback protocol
//!
//! Every assertion funnels through [`Checker::check`]: the checker receives
//! the actual value, a predicate over it and a lazily built failure template.
//! What happens on failure (panic, collect, delegate upward) is the checker's
//! business; the assertion nodes never report anything themselves.

use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::rc::Rc;

use serde::Serialize;
use tracing::trace;

/// Stand-in for the rendered actual value inside a failure template
pub const PLACEHOLDER: &str = "%s";

pub trait Checker {
    fn check(&self, actual: &dyn Debug, predicate: &dyn Fn() -> bool, template: &dyn Fn() -> String);
}

impl<F> Checker for F
where
    F: Fn(&dyn Debug, &dyn Fn() -> bool, &dyn Fn() -> String),
{
    fn check(&self, actual: &dyn Debug, predicate: &dyn Fn() -> bool, template: &dyn Fn() -> String) {
        self(actual, predicate, template)
    }
}

pub type CheckerRef<'a> = Rc<dyn Checker + 'a>;

/// Substitute the first placeholder in `template` with `actual`.
///
/// Text embedded from user values is escaped with [`escape`], so a `%s`
/// inside a label or an expected value is never taken for the placeholder.
pub fn render(template: &str, actual: &dyn Debug) -> String {
    match placeholder_position(template) {
        Some(at) => format!(
            "{}{:?}{}",
            unescape(&template[..at]),
            actual,
            unescape(&template[at + PLACEHOLDER.len()..])
        ),
        None => unescape(template),
    }
}

/// Make arbitrary text safe to embed in a template
pub fn escape(text: &str) -> String {
    text.replace('%', "%%")
}

fn unescape(text: &str) -> String {
    text.replace("%%", "%")
}

/// `Debug` text of a value, escaped for a template
pub(crate) fn quote<T: Debug + ?Sized>(value: &T) -> String {
    escape(&format!("{:?}", value))
}

/// Byte offset of the first placeholder not preceded by an escape
pub(crate) fn placeholder_position(template: &str) -> Option<usize> {
    let bytes = template.as_bytes();
    let mut at = 0;
    while at + 1 < bytes.len() {
        match (bytes[at], bytes[at + 1]) {
            (b'%', b'%') => at += 2,
            (b'%', b's') => return Some(at),
            _ => at += 1,
        }
    }
    None
}

/// A predicate that evaluated to false
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionFailure {
    pub message: String,
}

impl AssertionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        AssertionFailure {
            message: message.into(),
        }
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid assertion, {}", self.message)
    }
}

impl std::error::Error for AssertionFailure {}

/// Raises immediately; used outside the engine
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingChecker;

impl Checker for PanickingChecker {
    fn check(&self, actual: &dyn Debug, predicate: &dyn Fn() -> bool, template: &dyn Fn() -> String) {
        if !predicate() {
            let failure = AssertionFailure::new(render(&template(), actual));
            panic!("{}", failure);
        }
    }
}

/// Records failures so sibling assertions keep running
#[derive(Debug, Default)]
pub struct CollectingChecker {
    failures: RefCell<Vec<AssertionFailure>>,
}

impl CollectingChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything recorded so far
    pub fn take_failures(&self) -> Vec<AssertionFailure> {
        self.failures.take()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.borrow().len()
    }
}

impl Checker for CollectingChecker {
    fn check(&self, actual: &dyn Debug, predicate: &dyn Fn() -> bool, template: &dyn Fn() -> String) {
        if !predicate() {
            let failure = AssertionFailure::new(render(&template(), actual));
            trace!(message = %failure.message, "assertion failed");
            self.failures.borrow_mut().push(failure);
        }
    }
}

/// Reports a derived node's checks against the node it was derived from.
///
/// The template gets the prefix applied and the parent's subject replaces the
/// derived value, so `size of %s == 3` renders with the collection itself.
struct DelegateChecker<'a> {
    parent: CheckerRef<'a>,
    subject: &'a dyn Debug,
    prefix: Box<dyn Fn(String) -> String + 'a>,
}

impl<'a> Checker for DelegateChecker<'a> {
    fn check(&self, _actual: &dyn Debug, predicate: &dyn Fn() -> bool, template: &dyn Fn() -> String) {
        self.parent
            .check(self.subject, predicate, &|| (self.prefix)(template()));
    }
}

pub(crate) fn derive<'a>(
    parent: CheckerRef<'a>,
    subject: &'a dyn Debug,
    prefix: impl Fn(String) -> String + 'a,
) -> CheckerRef<'a> {
    Rc::new(DelegateChecker {
        parent,
        subject,
        prefix: Box::new(prefix),
    })
}

/// Prefix a template with fixed text; `label` must already be escaped
pub(crate) fn prefixed(label: String) -> impl Fn(String) -> String {
    move |template| format!("{}{}", label, template)
}
