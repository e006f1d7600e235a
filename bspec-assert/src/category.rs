//! Value categories and the static dispatch of `that(value)`
//!
//! Each asserted type implements [`Assertable`] exactly once, naming the
//! node it is wrapped in. A type that could belong to two categories (a
//! sorted set is also a collection) only ever gets the impl of the more
//! specific one, which keeps the choice deterministic.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt::{self, Debug};

use serde::Serialize;

use crate::checker::CheckerRef;
use crate::node::{
    BooleanNode, CollectionNode, ComparableNode, EntryNode, ListNode, MapNode, NumberNode,
    OrderedMapNode, OrderedSetNode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Object,
    Boolean,
    Numeric,
    Comparable,
    Entry,
    Collection,
    List,
    OrderedSet,
    Map,
    OrderedMap,
}

impl Category {
    /// The next less specific category, `None` for `Object`
    pub fn generalization(self) -> Option<Category> {
        match self {
            Category::Object => None,
            Category::Boolean
            | Category::Comparable
            | Category::Entry
            | Category::Collection
            | Category::Map => Some(Category::Object),
            Category::Numeric => Some(Category::Comparable),
            Category::List => Some(Category::Collection),
            Category::OrderedSet => Some(Category::List),
            Category::OrderedMap => Some(Category::Map),
        }
    }

    /// Whether `self` refines `other`; a category refines itself
    pub fn refines(self, other: Category) -> bool {
        let mut current = Some(self);
        while let Some(category) = current {
            if category == other {
                return true;
            }
            current = category.generalization();
        }
        false
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Object => "object",
            Category::Boolean => "boolean",
            Category::Numeric => "numeric",
            Category::Comparable => "comparable",
            Category::Entry => "entry",
            Category::Collection => "collection",
            Category::List => "list",
            Category::OrderedSet => "ordered set",
            Category::Map => "map",
            Category::OrderedMap => "ordered map",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value `Verifier::that` knows how to wrap
pub trait Assertable<'a>: Sized {
    type Node;

    const CATEGORY: Category;

    fn into_node(self, checker: CheckerRef<'a>) -> Self::Node;
}

impl<'n> Assertable<'n> for bool {
    type Node = BooleanNode<'n>;
    const CATEGORY: Category = Category::Boolean;

    fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
        BooleanNode::new(self, checker)
    }
}

impl<'n, 'r> Assertable<'n> for &'r bool {
    type Node = BooleanNode<'n>;
    const CATEGORY: Category = Category::Boolean;

    fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
        BooleanNode::new(*self, checker)
    }
}

macro_rules! numeric {
    ($($number:ty),* $(,)?) => {$(
        impl<'n> Assertable<'n> for $number {
            type Node = NumberNode<'n, $number>;
            const CATEGORY: Category = Category::Numeric;

            fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
                NumberNode::new(self, checker)
            }
        }

        impl<'n, 'r> Assertable<'n> for &'r $number {
            type Node = NumberNode<'n, $number>;
            const CATEGORY: Category = Category::Numeric;

            fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
                NumberNode::new(*self, checker)
            }
        }
    )*};
}

numeric!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl<'n> Assertable<'n> for char {
    type Node = ComparableNode<'n, char>;
    const CATEGORY: Category = Category::Comparable;

    fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
        ComparableNode::owned(self, checker)
    }
}

impl<'n, 'r: 'n> Assertable<'n> for &'r char {
    type Node = ComparableNode<'n, char>;
    const CATEGORY: Category = Category::Comparable;

    fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
        ComparableNode::borrowed(self, checker)
    }
}

impl<'n, 'r: 'n> Assertable<'n> for &'r str {
    type Node = ComparableNode<'n, str>;
    const CATEGORY: Category = Category::Comparable;

    fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
        ComparableNode::borrowed(self, checker)
    }
}

// items of a `HashSet<&str>` or `Vec<&str>`
impl<'n, 'r: 'n, 's: 'n> Assertable<'n> for &'r &'s str {
    type Node = ComparableNode<'n, str>;
    const CATEGORY: Category = Category::Comparable;

    fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
        ComparableNode::borrowed(*self, checker)
    }
}

impl<'n> Assertable<'n> for String {
    type Node = ComparableNode<'n, String>;
    const CATEGORY: Category = Category::Comparable;

    fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
        ComparableNode::owned(self, checker)
    }
}

impl<'n, 'r: 'n> Assertable<'n> for &'r String {
    type Node = ComparableNode<'n, String>;
    const CATEGORY: Category = Category::Comparable;

    fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
        ComparableNode::borrowed(self, checker)
    }
}

impl<'n, 'r: 'n, E: Debug> Assertable<'n> for &'r Vec<E> {
    type Node = ListNode<'n, E>;
    const CATEGORY: Category = Category::List;

    fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
        ListNode::new(self.as_slice(), Some(self as &dyn Debug), checker)
    }
}

// an unsized slice renders through its item list
impl<'n, 'r: 'n, E: Debug> Assertable<'n> for &'r [E] {
    type Node = ListNode<'n, E>;
    const CATEGORY: Category = Category::List;

    fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
        ListNode::new(self, None, checker)
    }
}

impl<'n, 'r: 'n, E: Debug, const N: usize> Assertable<'n> for &'r [E; N] {
    type Node = ListNode<'n, E>;
    const CATEGORY: Category = Category::List;

    fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
        ListNode::new(self.as_slice(), Some(self as &dyn Debug), checker)
    }
}

impl<'n, 'r: 'n, E: Debug, S> Assertable<'n> for &'r HashSet<E, S> {
    type Node = CollectionNode<'n, &'n E>;
    const CATEGORY: Category = Category::Collection;

    fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
        CollectionNode::new(self.iter().collect(), Some(self as &dyn Debug), checker)
    }
}

impl<'n, 'r: 'n, E: Debug> Assertable<'n> for &'r BTreeSet<E> {
    type Node = OrderedSetNode<'n, E>;
    const CATEGORY: Category = Category::OrderedSet;

    fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
        OrderedSetNode::new(self.iter().collect(), Some(self as &dyn Debug), checker)
    }
}

impl<'n, 'r: 'n, K: Debug, V: Debug, S> Assertable<'n> for &'r HashMap<K, V, S> {
    type Node = MapNode<'n, K, V>;
    const CATEGORY: Category = Category::Map;

    fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
        MapNode::new(self.iter().collect(), self, checker)
    }
}

impl<'n, 'r: 'n, K: Debug, V: Debug> Assertable<'n> for &'r BTreeMap<K, V> {
    type Node = OrderedMapNode<'n, K, V>;
    const CATEGORY: Category = Category::OrderedMap;

    fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
        OrderedMapNode::new(self.iter().collect(), self, checker)
    }
}

impl<'n, 'r: 'n, K: Debug, V: Debug> Assertable<'n> for (&'r K, &'r V) {
    type Node = EntryNode<'n, K, V>;
    const CATEGORY: Category = Category::Entry;

    fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
        EntryNode::new(self.0, self.1, checker)
    }
}

impl<'n, 'r: 'n, K: Debug, V: Debug> Assertable<'n> for &'r (K, V) {
    type Node = EntryNode<'n, K, V>;
    const CATEGORY: Category = Category::Entry;

    fn into_node(self, checker: CheckerRef<'n>) -> Self::Node {
        EntryNode::new(&self.0, &self.1, checker)
    }
}

/// Category a value would be wrapped as
pub fn category_of<'a, T: Assertable<'a>>(_value: &T) -> Category {
    T::CATEGORY
}
