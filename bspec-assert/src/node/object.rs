use std::fmt::Debug;
use std::ptr;

use super::{check, Held, Node};
use crate::checker::{quote, CheckerRef};

/// Fallback node for values of no more specific category
pub struct ObjectNode<'a, T: ?Sized> {
    actual: Held<'a, T>,
    checker: CheckerRef<'a>,
}

impl<'a, T: ?Sized + Debug> ObjectNode<'a, T> {
    pub(crate) fn borrowed(actual: &'a T, checker: CheckerRef<'a>) -> Self {
        ObjectNode {
            actual: Held::Borrowed(actual),
            checker,
        }
    }

    pub fn is_equal_to<U: Debug>(&self, expected: U)
    where
        T: PartialEq<U>,
    {
        check(
            &self.checker,
            &self.actual,
            || *self.actual == expected,
            || format!("%s equals {}", quote(&expected)),
        );
    }

    pub fn is_not_equal_to<U: Debug>(&self, expected: U)
    where
        T: PartialEq<U>,
    {
        check(
            &self.checker,
            &self.actual,
            || *self.actual != expected,
            || format!("%s not equals {}", quote(&expected)),
        );
    }

    /// Identity rather than equality
    pub fn is_same_as(&self, other: &T) {
        check(
            &self.checker,
            &self.actual,
            || ptr::eq(&*self.actual, other),
            || format!("%s is the same instance as {}", quote(&other)),
        );
    }

    pub fn is_not_same_as(&self, other: &T) {
        check(
            &self.checker,
            &self.actual,
            || !ptr::eq(&*self.actual, other),
            || format!("%s is not the same instance as {}", quote(&other)),
        );
    }
}

impl<'a, T: Debug> ObjectNode<'a, Option<T>> {
    pub fn is_none(&self) {
        check(&self.checker, &self.actual, || self.actual.is_none(), || {
            "%s is none".to_string()
        });
    }

    pub fn is_some(&self) {
        check(&self.checker, &self.actual, || self.actual.is_some(), || {
            "%s is some".to_string()
        });
    }
}

impl<'a, T: ?Sized + Debug> Node<'a> for ObjectNode<'a, T> {
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

    #[derive(Debug, PartialEq)]
    struct Person {
        name: String,
        age: u32,
    }

    fn person() -> Person {
        Person {
            name: "Ada".to_string(),
            age: 36,
        }
    }

    fn collecting() -> (Rc<CollectingChecker>, Verifier) {
        let checker = Rc::new(CollectingChecker::new());
        (checker.clone(), Verifier::new(checker))
    }

    #[test]
    fn test_equality() {
        let (checker, verify) = collecting();
        let ada = person();

        verify.object(&ada).is_equal_to(person());
        verify.object(&ada).is_not_equal_to(Person {
            name: "Grace".to_string(),
            age: 36,
        });
        assert!(checker.take_failures().is_empty());

        verify.object(&ada).is_not_equal_to(person());
        assert_eq!(
            checker.take_failures(),
            vec![AssertionFailure::new(
                "Person { name: \"Ada\", age: 36 } not equals Person { name: \"Ada\", age: 36 }"
            )]
        );
    }

    #[test]
    fn test_identity() {
        let (checker, verify) = collecting();
        let ada = person();
        let twin = person();

        verify.object(&ada).is_same_as(&ada);
        verify.object(&ada).is_not_same_as(&twin);
        assert_eq!(checker.failure_count(), 0);

        verify.object(&ada).is_same_as(&twin);
        assert_eq!(checker.failure_count(), 1);
    }

    #[test]
    fn test_option() {
        let (checker, verify) = collecting();
        verify.object(&Some(3)).is_some();
        verify.object(&None::<i32>).is_none();
        verify.object(&Some(3)).is_none();

        assert_eq!(
            checker.take_failures(),
            vec![AssertionFailure::new("Some(3) is none")]
        );
    }

    #[test]
    fn test_satisfies() {
        let (checker, verify) = collecting();
        let ada = person();
        verify.object(&ada).satisfies("is an adult", |p| p.age >= 18);
        verify.object(&ada).satisfies("is named Grace", |p| p.name == "Grace");

        assert_eq!(
            checker.take_failures(),
            vec![AssertionFailure::new(
                "Person { name: \"Ada\", age: 36 } satisfies is named Grace"
            )]
        );
    }

    #[test]
    fn test_extract_names_the_accessor() {
        let (checker, verify) = collecting();
        let ada = person();
        let node = verify.object(&ada);

        node.extract("age", |p| p.age).is_equal_to(36);
        node.extract("name", |p| p.name.as_str()).is_equal_to("Ada");
        node.extract("age", |p| p.age).is_greater_than(40);

        assert_eq!(
            checker.take_failures(),
            vec![AssertionFailure::new(
                "Person { name: \"Ada\", age: 36 }.age() > 40"
            )]
        );
    }
}
