//! Assertion nodes
//!
//! A node wraps one actual value together with the checker it reports to.
//! Nodes never mutate: a derivation (`size()`, `first()`, `key()`, ...)
//! builds a new node bound to a checker that delegates to the parent one.

mod collection;
mod comparable;
mod map;
mod object;
mod scalar;

pub use collection::{CollectionNode, ListNode, OrderedSetNode};
pub use comparable::ComparableNode;
pub use map::{EntryNode, MapNode, OrderedMapNode};
pub use object::ObjectNode;
pub use scalar::{BooleanNode, NumberNode};

use std::fmt::{self, Debug};
use std::ops::Deref;
use std::rc::Rc;

use crate::accessor::AccessorName;
use crate::category::Assertable;
use crate::checker::{derive, escape, CheckerRef};
use crate::error::Result;

/// A value a node either borrows from the caller or owns outright
pub(crate) enum Held<'a, T: ?Sized + 'a> {
    Borrowed(&'a T),
    Owned(Box<T>),
}

impl<'a, T: ?Sized> Deref for Held<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            Held::Borrowed(value) => value,
            Held::Owned(value) => value,
        }
    }
}

impl<'a, T: ?Sized + Debug> Debug for Held<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}

/// Operations every assertion node supports
pub trait Node<'a> {
    /// What predicates and projections see
    type Actual: ?Sized;

    fn actual(&self) -> &Self::Actual;

    fn checker(&self) -> &CheckerRef<'a>;

    /// What failure messages render in place of the placeholder
    fn subject(&self) -> &dyn Debug;

    fn satisfies(&self, description: &str, predicate: impl Fn(&Self::Actual) -> bool) {
        let actual = self.actual();
        self.checker().check(
            self.subject(),
            &|| predicate(actual),
            &|| format!("%s satisfies {}", escape(description)),
        );
    }

    /// Assert on a value computed from this one.
    ///
    /// Failures of the derived node name the accessor, e.g.
    /// `Person { age: 3 }.age() == 4`.
    fn extract<'s, R, F>(&'s self, name: impl Into<AccessorName>, f: F) -> R::Node
    where
        'a: 's,
        Self::Actual: 's,
        F: FnOnce(&'s Self::Actual) -> R,
        R: Assertable<'s>,
    {
        let name = name.into();
        let value = f(self.actual());
        let checker = derive(
            Rc::clone(self.checker()),
            self.subject(),
            move |template| name.apply(&template),
        );
        value.into_node(checker)
    }

    /// Like [`Node::extract`], for projections to a value of no more
    /// specific category: a user type, an `Option`, ...
    fn extract_object<'s, R, F>(&'s self, name: impl Into<AccessorName>, f: F) -> ObjectNode<'s, R>
    where
        'a: 's,
        Self::Actual: 's,
        F: FnOnce(&'s Self::Actual) -> &'s R,
        R: ?Sized + Debug + 's,
    {
        let name = name.into();
        let value = f(self.actual());
        let checker = derive(
            Rc::clone(self.checker()),
            self.subject(),
            move |template| name.apply(&template),
        );
        ObjectNode::borrowed(value, checker)
    }

    /// Like [`Node::extract`], naming the accessor from an encoded closure
    /// descriptor instead of an explicit name
    fn extract_described<'s, R, F>(&'s self, descriptor: &[u8], f: F) -> Result<R::Node>
    where
        'a: 's,
        Self::Actual: 's,
        F: FnOnce(&'s Self::Actual) -> R,
        R: Assertable<'s>,
    {
        let name = AccessorName::from_descriptor(descriptor)?;
        Ok(self.extract(name, f))
    }
}

/// Run one check against a node's checker
pub(crate) fn check<'a>(
    checker: &CheckerRef<'a>,
    subject: &dyn Debug,
    predicate: impl Fn() -> bool,
    template: impl Fn() -> String,
) {
    checker.check(subject, &predicate, &template);
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use bspec_descriptor::ClosureDescriptorBuilder;

    use super::Node;
    use crate::checker::CollectingChecker;
    use crate::error::AssertError;
    use crate::verifier::Verifier;

    #[test]
    fn test_described_accessor_names_the_failure() {
        let checker = Rc::new(CollectingChecker::new());
        let verify = Verifier::new(checker.clone());
        let descriptor = ClosureDescriptorBuilder::new("size").encode().unwrap();
        let list = vec!["a", "b"];

        verify
            .that(&list)
            .extract_described(&descriptor, |items| items.len())
            .unwrap()
            .is_equal_to(3);

        let failures = checker.take_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].message, "[\"a\", \"b\"].size() == 3");
    }

    #[test]
    fn test_malformed_descriptor_is_an_error() {
        let verify = Verifier::default();
        let list = vec![1i32];
        let error = verify
            .that(&list)
            .extract_described(&[0xAC, 0xED], |items| items.len())
            .err()
            .unwrap();
        assert!(matches!(error, AssertError::Descriptor(_)));
    }

    #[derive(Debug, PartialEq)]
    struct Address {
        city: String,
    }

    #[derive(Debug)]
    struct Customer {
        address: Address,
        nick: Option<String>,
    }

    #[test]
    fn test_extract_object_falls_back_to_object_node() {
        let checker = Rc::new(CollectingChecker::new());
        let verify = Verifier::new(checker.clone());
        let customer = Customer {
            address: Address {
                city: "Oslo".to_string(),
            },
            nick: None,
        };
        let node = verify.object(&customer);

        node.extract_object("address", |c| &c.address)
            .is_equal_to(Address {
                city: "Oslo".to_string(),
            });
        node.extract_object("nick", |c| &c.nick).is_none();
        node.extract_object("nick", |c| &c.nick).is_some();

        let failures = checker.take_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(
            failures[0].message,
            "Customer { address: Address { city: \"Oslo\" }, nick: None }.nick() is some"
        );
    }

    #[test]
    fn test_satisfies_description_may_contain_placeholder() {
        let checker = Rc::new(CollectingChecker::new());
        let verify = Verifier::new(checker.clone());
        verify.that(&3i32).satisfies("prints as %s", |n| *n > 5);

        let failures = checker.take_failures();
        assert_eq!(failures[0].message, "3 satisfies prints as %s");
    }

    #[test]
    fn test_derivations_compose() {
        let checker = Rc::new(CollectingChecker::new());
        let verify = Verifier::new(checker.clone());
        let nested = vec![vec![1i32, 2], vec![3]];

        verify
            .that(&nested)
            .first()
            .unwrap()
            .extract("len", |items| items.len())
            .is_equal_to(5);
        verify.that(&nested).last().unwrap().size().is_equal_to(5);

        let messages: Vec<_> = checker
            .take_failures()
            .into_iter()
            .map(|failure| failure.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "first of [[1, 2], [3]].len() == 5",
                "last of size of [[1, 2], [3]] == 5",
            ]
        );
    }
}
