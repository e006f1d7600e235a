//! Fluent assertion algebra for bspec
//!
//! `Verifier::that(value)` wraps a value in the node of its category
//! (boolean, numeric, comparable, collection, list, ordered set, map,
//! ordered map, entry) and every check on that node reports through a
//! single [`Checker`]. Derived nodes (`size()`, `first()`, `key()`, ...)
//! report through a checker that prefixes the failure text and renders the
//! value they were derived from.

pub mod accessor;
pub mod category;
pub mod checker;
pub mod error;
pub mod node;
pub mod verifier;

pub use accessor::AccessorName;
pub use category::{category_of, Assertable, Category};
pub use checker::{
    escape, render, AssertionFailure, Checker, CheckerRef, CollectingChecker, PanickingChecker,
    PLACEHOLDER,
};
pub use error::{AssertError, Result};
pub use node::{
    BooleanNode, CollectionNode, ComparableNode, EntryNode, ListNode, MapNode, Node, NumberNode,
    ObjectNode, OrderedMapNode, OrderedSetNode,
};
pub use verifier::Verifier;
