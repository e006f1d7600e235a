//! Entry point of every assertion chain

use std::fmt::Debug;
use std::rc::Rc;

use tracing::trace;

use crate::category::Assertable;
use crate::checker::{Checker, CheckerRef, PanickingChecker};
use crate::node::{ComparableNode, ObjectNode};

/// Hands out assertion nodes bound to one checker.
///
/// The engine gives each should-block a verifier over a collecting checker;
/// the default verifier panics on the first failed check.
#[derive(Clone)]
pub struct Verifier {
    checker: CheckerRef<'static>,
}

impl Verifier {
    pub fn new(checker: CheckerRef<'static>) -> Self {
        Verifier { checker }
    }

    pub fn with_checker(checker: impl Checker + 'static) -> Self {
        Verifier::new(Rc::new(checker))
    }

    pub fn checker(&self) -> &CheckerRef<'static> {
        &self.checker
    }

    /// Wrap a value in the node of its category
    pub fn that<'a, T: Assertable<'a>>(&self, actual: T) -> T::Node {
        let category = T::CATEGORY;
        trace!(%category, "assertion");
        actual.into_node(self.checker.clone())
    }

    /// Wrap any value as a plain object
    pub fn object<'a, T: ?Sized + Debug>(&self, actual: &'a T) -> ObjectNode<'a, T> {
        ObjectNode::borrowed(actual, self.checker.clone())
    }

    /// Wrap a value with a natural ordering
    pub fn comparable<'a, T: ?Sized + Debug + PartialOrd>(
        &self,
        actual: &'a T,
    ) -> ComparableNode<'a, T> {
        ComparableNode::borrowed(actual, self.checker.clone())
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Verifier::with_checker(PanickingChecker)
    }
}

impl Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::checker::{render, CollectingChecker};

    #[test]
    fn test_default_verifier_passes_quietly() {
        let verify = Verifier::default();
        verify.that(2i32).is_equal_to(2);
        verify.that("a").is_less_than("b");
    }

    #[test]
    #[should_panic(expected = "Invalid assertion, size of [1, 2] == 3")]
    fn test_default_verifier_panics() {
        Verifier::default().that(&vec![1i32, 2]).size().is_equal_to(3);
    }

    #[test]
    fn test_custom_checker_closure() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let verify = Verifier::with_checker(
            move |actual: &dyn Debug, predicate: &dyn Fn() -> bool, template: &dyn Fn() -> String| {
                if !predicate() {
                    sink.borrow_mut().push(render(&template(), actual));
                }
            },
        );

        verify.that(false).is_true();
        verify.that(3u8).is_in_range(4, 5);
        assert_eq!(*log.borrow(), vec!["false == true", "3 in [4..5]"]);
    }

    #[test]
    fn test_clones_share_the_checker() {
        let checker = Rc::new(CollectingChecker::new());
        let verify = Verifier::new(checker.clone());
        let copy = verify.clone();

        verify.that(1i32).is_equal_to(2);
        copy.that(1i32).is_equal_to(3);
        assert_eq!(checker.failure_count(), 2);
    }
}
