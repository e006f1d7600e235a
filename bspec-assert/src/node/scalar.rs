use std::fmt::Debug;

use super::{check, Node};
use crate::checker::{quote, CheckerRef};

pub struct BooleanNode<'a> {
    actual: bool,
    checker: CheckerRef<'a>,
}

impl<'a> BooleanNode<'a> {
    pub(crate) fn new(actual: bool, checker: CheckerRef<'a>) -> Self {
        BooleanNode { actual, checker }
    }

    pub fn is_true(&self) {
        self.is_equal_to(true);
    }

    pub fn is_false(&self) {
        self.is_equal_to(false);
    }

    pub fn is_equal_to(&self, expected: bool) {
        check(
            &self.checker,
            &self.actual,
            || self.actual == expected,
            || format!("%s == {}", expected),
        );
    }

    pub fn is_not_equal_to(&self, expected: bool) {
        check(
            &self.checker,
            &self.actual,
            || self.actual != expected,
            || format!("%s != {}", expected),
        );
    }
}

impl<'a> Node<'a> for BooleanNode<'a> {
    type Actual = bool;

    fn actual(&self) -> &bool {
        &self.actual
    }

    fn checker(&self) -> &CheckerRef<'a> {
        &self.checker
    }

    fn subject(&self) -> &dyn Debug {
        &self.actual
    }
}

/// Integers and floats, compared by value
pub struct NumberNode<'a, N> {
    actual: N,
    checker: CheckerRef<'a>,
}

impl<'a, N> NumberNode<'a, N>
where
    N: Copy + PartialOrd + Debug,
{
    pub(crate) fn new(actual: N, checker: CheckerRef<'a>) -> Self {
        NumberNode { actual, checker }
    }

    pub fn is_equal_to(&self, expected: N) {
        self.compare(|a| a == expected, || format!("%s == {}", quote(&expected)));
    }

    pub fn is_not_equal_to(&self, expected: N) {
        self.compare(|a| a != expected, || format!("%s != {}", quote(&expected)));
    }

    pub fn is_less_than(&self, bound: N) {
        self.compare(|a| a < bound, || format!("%s < {}", quote(&bound)));
    }

    pub fn is_less_or_equal_to(&self, bound: N) {
        self.compare(|a| a <= bound, || format!("%s <= {}", quote(&bound)));
    }

    pub fn is_greater_than(&self, bound: N) {
        self.compare(|a| a > bound, || format!("%s > {}", quote(&bound)));
    }

    pub fn is_greater_or_equal_to(&self, bound: N) {
        self.compare(|a| a >= bound, || format!("%s >= {}", quote(&bound)));
    }

    /// Both bounds inclusive
    pub fn is_in_range(&self, first: N, last: N) {
        self.compare(
            |a| first <= a && a <= last,
            || format!("%s in [{}..{}]", quote(&first), quote(&last)),
        );
    }

    fn compare(&self, predicate: impl Fn(N) -> bool, template: impl Fn() -> String) {
        check(&self.checker, &self.actual, || predicate(self.actual), template);
    }
}

impl<'a, N: Debug> Node<'a> for NumberNode<'a, N> {
    type Actual = N;

    fn actual(&self) -> &N {
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
    use crate::verifier::Verifier;

    fn collecting() -> (Rc<CollectingChecker>, Verifier) {
        let checker = Rc::new(CollectingChecker::new());
        (checker.clone(), Verifier::new(checker))
    }

    #[test]
    fn test_booleans() {
        let (checker, verify) = collecting();
        verify.that(true).is_true();
        verify.that(false).is_false();
        verify.that(&true).is_not_equal_to(false);
        assert_eq!(checker.failure_count(), 0);

        verify.that(1 > 2).is_true();
        assert_eq!(
            checker.take_failures(),
            vec![AssertionFailure::new("false == true")]
        );
    }

    #[test]
    fn test_integer_comparisons() {
        let (checker, verify) = collecting();
        verify.that(3i32).is_equal_to(3);
        verify.that(3i32).is_not_equal_to(4);
        verify.that(3i32).is_less_than(4);
        verify.that(3i32).is_less_or_equal_to(3);
        verify.that(3u8).is_greater_than(2);
        verify.that(&-3i64).is_greater_or_equal_to(-3);
        assert_eq!(checker.failure_count(), 0);

        verify.that(3i32).is_less_than(3);
        verify.that(3i32).is_greater_than(3);
        assert_eq!(
            checker.take_failures(),
            vec![
                AssertionFailure::new("3 < 3"),
                AssertionFailure::new("3 > 3"),
            ]
        );
    }

    #[test]
    fn test_range_is_inclusive() {
        let (checker, verify) = collecting();
        verify.that(1i32).is_in_range(1, 3);
        verify.that(3i32).is_in_range(1, 3);
        verify.that(2.5f64).is_in_range(2.0, 3.0);
        assert_eq!(checker.failure_count(), 0);

        verify.that(4i32).is_in_range(1, 3);
        assert_eq!(
            checker.take_failures(),
            vec![AssertionFailure::new("4 in [1..3]")]
        );
    }

    #[test]
    fn test_floats_compare_exactly() {
        let (checker, verify) = collecting();
        verify.that(0.1f64 + 0.2).is_equal_to(0.3);
        verify.that(f64::NAN).is_equal_to(f64::NAN);
        assert_eq!(checker.failure_count(), 2);
    }
}
