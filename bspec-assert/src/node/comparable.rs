use std::borrow::Borrow;
use std::fmt::Debug;

use super::{check, Held, Node};
use crate::checker::{quote, CheckerRef};

/// Values with a natural ordering: strings, chars, and anything passed to
/// [`Verifier::comparable`](crate::Verifier::comparable).
///
/// Expected values are given by reference and may be any type the actual
/// borrows as, so a `String` compares against `&str` directly.
pub struct ComparableNode<'a, T: ?Sized> {
    actual: Held<'a, T>,
    checker: CheckerRef<'a>,
}

impl<'a, T: ?Sized + Debug> ComparableNode<'a, T> {
    pub(crate) fn borrowed(actual: &'a T, checker: CheckerRef<'a>) -> Self {
        ComparableNode {
            actual: Held::Borrowed(actual),
            checker,
        }
    }

    pub(crate) fn owned(actual: T, checker: CheckerRef<'a>) -> Self
    where
        T: Sized,
    {
        ComparableNode {
            actual: Held::Owned(Box::new(actual)),
            checker,
        }
    }

    pub fn is_equal_to<Q>(&self, expected: &Q)
    where
        T: Borrow<Q>,
        Q: ?Sized + PartialEq + Debug,
    {
        self.compare(|a: &Q| a == expected, || format!("%s == {}", quote(&expected)));
    }

    pub fn is_not_equal_to<Q>(&self, expected: &Q)
    where
        T: Borrow<Q>,
        Q: ?Sized + PartialEq + Debug,
    {
        self.compare(|a: &Q| a != expected, || format!("%s != {}", quote(&expected)));
    }

    pub fn is_less_than<Q>(&self, bound: &Q)
    where
        T: Borrow<Q>,
        Q: ?Sized + PartialOrd + Debug,
    {
        self.compare(|a: &Q| a < bound, || format!("%s < {}", quote(&bound)));
    }

    pub fn is_less_or_equal_to<Q>(&self, bound: &Q)
    where
        T: Borrow<Q>,
        Q: ?Sized + PartialOrd + Debug,
    {
        self.compare(|a: &Q| a <= bound, || format!("%s <= {}", quote(&bound)));
    }

    pub fn is_greater_than<Q>(&self, bound: &Q)
    where
        T: Borrow<Q>,
        Q: ?Sized + PartialOrd + Debug,
    {
        self.compare(|a: &Q| a > bound, || format!("%s > {}", quote(&bound)));
    }

    pub fn is_greater_or_equal_to<Q>(&self, bound: &Q)
    where
        T: Borrow<Q>,
        Q: ?Sized + PartialOrd + Debug,
    {
        self.compare(|a: &Q| a >= bound, || format!("%s >= {}", quote(&bound)));
    }

    /// Both bounds inclusive
    pub fn is_in_range<Q>(&self, first: &Q, last: &Q)
    where
        T: Borrow<Q>,
        Q: ?Sized + PartialOrd + Debug,
    {
        self.compare(
            |a: &Q| first <= a && a <= last,
            || format!("%s in [{}..{}]", quote(&first), quote(&last)),
        );
    }

    fn compare<Q>(&self, predicate: impl Fn(&Q) -> bool, template: impl Fn() -> String)
    where
        T: Borrow<Q>,
        Q: ?Sized,
    {
        check(
            &self.checker,
            &self.actual,
            || predicate(<T as Borrow<Q>>::borrow(&self.actual)),
            template,
        );
    }
}

impl<'a, T: ?Sized + Debug> Node<'a> for ComparableNode<'a, T> {
    type Actual = T;

    fn actual(&self) -> &T {
        &self.actual
    }

    fn checker(&self) -> &CheckerRef<'a> {
        &self.checker
    }

    fn subject(&self) -> &dyn Debug {
        &self.actual
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::checker::{AssertionFailure, CollectingChecker};
    use crate::node::Node;
    use crate::verifier::Verifier;

    fn collecting() -> (Rc<CollectingChecker>, Verifier) {
        let checker = Rc::new(CollectingChecker::new());
        (checker.clone(), Verifier::new(checker))
    }

    #[test]
    fn test_strings() {
        let (checker, verify) = collecting();
        let owned = String::from("hello");

        verify.that("hello").is_equal_to("hello");
        verify.that(&owned).is_equal_to("hello");
        verify.that(owned.clone()).is_not_equal_to("world");
        verify.that("hello").is_less_than("zzzzz");
        verify.that("hello").is_greater_or_equal_to("hello");
        verify.that(&owned).is_in_range("a", "i");
        assert_eq!(checker.failure_count(), 0);

        verify.that("hello").is_greater_than("zzzzz");
        assert_eq!(
            checker.take_failures(),
            vec![AssertionFailure::new("\"hello\" > \"zzzzz\"")]
        );
    }

    #[test]
    fn test_chars() {
        let (checker, verify) = collecting();
        verify.that('b').is_in_range(&'a', &'c');
        verify.that(&'b').is_less_or_equal_to(&'a');
        assert_eq!(
            checker.take_failures(),
            vec![AssertionFailure::new("'b' <= 'a'")]
        );
    }

    #[test]
    fn test_any_ordered_type() {
        #[derive(Debug, PartialEq, PartialOrd)]
        struct Version(u32, u32);

        let (checker, verify) = collecting();
        let current = Version(1, 4);
        verify.comparable(&current).is_greater_than(&Version(1, 3));
        verify.comparable(&current).is_less_than(&Version(1, 3));
        assert_eq!(
            checker.take_failures(),
            vec![AssertionFailure::new("Version(1, 4) < Version(1, 3)")]
        );
    }

    #[test]
    fn test_extract_from_string() {
        let (checker, verify) = collecting();
        verify.that("hello").extract("len", str::len).is_equal_to(4);
        assert_eq!(
            checker.take_failures(),
            vec![AssertionFailure::new("\"hello\".len() == 4")]
        );
    }
}
