use std::fmt::Debug;
use std::ops::Deref;

use super::{check, Node, NumberNode, ObjectNode};
use crate::category::Assertable;
use crate::checker::{derive, prefixed, quote, CheckerRef};
use crate::error::{AssertError, Result};

/// Unordered group of items.
///
/// Items are references into the asserted container (or pairs of them for
/// map entries). Failure messages show the container itself when there is
/// one, otherwise the item list.
pub struct CollectionNode<'a, I> {
    items: Vec<I>,
    source: Option<&'a dyn Debug>,
    checker: CheckerRef<'a>,
}

impl<'a, I> CollectionNode<'a, I>
where
    I: Copy + Debug + 'a,
{
    pub(crate) fn new(
        items: Vec<I>,
        source: Option<&'a dyn Debug>,
        checker: CheckerRef<'a>,
    ) -> Self {
        CollectionNode {
            items,
            source,
            checker,
        }
    }

    pub fn is_empty(&self) {
        check(&self.checker, self.subject(), || self.items.is_empty(), || {
            "%s is empty".to_string()
        });
    }

    pub fn is_not_empty(&self) {
        check(&self.checker, self.subject(), || !self.items.is_empty(), || {
            "%s is not empty".to_string()
        });
    }

    pub fn size(&self) -> NumberNode<'_, usize> {
        NumberNode::new(self.items.len(), self.derived("size of "))
    }

    /// Fails with [`AssertError::EmptyContainer`] when there is no item
    pub fn first<'s>(&'s self) -> Result<I::Node>
    where
        I: Assertable<'s>,
    {
        let item = self
            .items
            .first()
            .copied()
            .ok_or_else(|| AssertError::empty("collection", "first"))?;
        Ok(item.into_node(self.derived("first of ")))
    }

    /// `label` must already be escaped
    fn derived<'s>(&'s self, label: impl Into<String>) -> CheckerRef<'s> {
        derive(self.checker.clone(), self.subject(), prefixed(label.into()))
    }

    pub(crate) fn items(&self) -> &[I] {
        &self.items
    }
}

impl<'a, E> CollectionNode<'a, &'a E>
where
    E: ?Sized + Debug,
{
    /// [`CollectionNode::first`] for items of no more specific category
    pub fn first_object(&self) -> Result<ObjectNode<'_, E>> {
        let item = self
            .items
            .first()
            .copied()
            .ok_or_else(|| AssertError::empty("collection", "first"))?;
        Ok(ObjectNode::borrowed(item, self.derived("first of ")))
    }

    pub fn contains<T: Debug>(&self, value: T) -> &Self
    where
        E: PartialEq<T>,
    {
        check(
            &self.checker,
            self.subject(),
            || self.items.iter().any(|item| **item == value),
            || format!("%s contains {}", quote(&value)),
        );
        self
    }

    pub fn contains_all<T: Debug>(&self, values: &[T]) -> &Self
    where
        E: PartialEq<T>,
    {
        check(
            &self.checker,
            self.subject(),
            || {
                values
                    .iter()
                    .all(|value| self.items.iter().any(|item| **item == *value))
            },
            || format!("%s contains all of {}", quote(&values)),
        );
        self
    }
}

impl<'a, I: Debug> Node<'a> for CollectionNode<'a, I> {
    type Actual = [I];

    fn actual(&self) -> &[I] {
        &self.items
    }

    fn checker(&self) -> &CheckerRef<'a> {
        &self.checker
    }

    fn subject(&self) -> &dyn Debug {
        match self.source {
            Some(source) => source,
            None => &self.items,
        }
    }
}

/// Sequence with positions: `Vec`, slices and arrays
pub struct ListNode<'a, E> {
    collection: CollectionNode<'a, &'a E>,
}

impl<'a, E: Debug> ListNode<'a, E> {
    pub(crate) fn new(
        items: &'a [E],
        source: Option<&'a dyn Debug>,
        checker: CheckerRef<'a>,
    ) -> Self {
        ListNode {
            collection: CollectionNode::new(items.iter().collect(), source, checker),
        }
    }

    /// Fails with [`AssertError::IndexOutOfBounds`] past the end
    pub fn get<'s>(&'s self, index: usize) -> Result<<&'a E as Assertable<'s>>::Node>
    where
        &'a E: Assertable<'s>,
    {
        let items = self.collection.items();
        let item = items
            .get(index)
            .copied()
            .ok_or_else(|| AssertError::out_of_bounds(index, items.len()))?;
        let label = format!("get object at index {} of ", index);
        Ok(item.into_node(self.collection.derived(label)))
    }

    /// [`ListNode::get`] for items of no more specific category
    pub fn get_object(&self, index: usize) -> Result<ObjectNode<'_, E>> {
        let items = self.collection.items();
        let item = items
            .get(index)
            .copied()
            .ok_or_else(|| AssertError::out_of_bounds(index, items.len()))?;
        let label = format!("get object at index {} of ", index);
        Ok(ObjectNode::borrowed(item, self.collection.derived(label)))
    }

    /// Position of the first item equal to `value`, or -1
    pub fn index_of<T: Debug>(&self, value: T) -> NumberNode<'_, i64>
    where
        E: PartialEq<T>,
    {
        let position = self.collection.items().iter().position(|item| **item == value);
        let label = format!("index of {} in ", quote(&value));
        NumberNode::new(as_index(position), self.collection.derived(label))
    }

    /// Position of the last item equal to `value`, or -1
    pub fn last_index_of<T: Debug>(&self, value: T) -> NumberNode<'_, i64>
    where
        E: PartialEq<T>,
    {
        let position = self.collection.items().iter().rposition(|item| **item == value);
        let label = format!("last index of {} in ", quote(&value));
        NumberNode::new(as_index(position), self.collection.derived(label))
    }

    /// Fails with [`AssertError::EmptyContainer`] when the list is empty
    pub fn last<'s>(&'s self) -> Result<<&'a E as Assertable<'s>>::Node>
    where
        &'a E: Assertable<'s>,
    {
        let item = self
            .collection
            .items()
            .last()
            .copied()
            .ok_or_else(|| AssertError::empty("list", "last"))?;
        Ok(item.into_node(self.collection.derived("last of ")))
    }

    pub fn last_object(&self) -> Result<ObjectNode<'_, E>> {
        let item = self
            .collection
            .items()
            .last()
            .copied()
            .ok_or_else(|| AssertError::empty("list", "last"))?;
        Ok(ObjectNode::borrowed(item, self.collection.derived("last of ")))
    }

    /// Same items in the same order
    pub fn is_equal_to<T: Debug>(&self, expected: &[T])
    where
        E: PartialEq<T>,
    {
        let items = self.collection.items();
        check(
            &self.collection.checker,
            self.collection.subject(),
            || items.len() == expected.len() && items.iter().zip(expected).all(|(a, b)| **a == *b),
            || format!("%s equals {}", quote(&expected)),
        );
    }
}

impl<'a, E> Deref for ListNode<'a, E> {
    type Target = CollectionNode<'a, &'a E>;

    fn deref(&self) -> &Self::Target {
        &self.collection
    }
}

impl<'a, E: Debug> Node<'a> for ListNode<'a, E> {
    type Actual = [&'a E];

    fn actual(&self) -> &[&'a E] {
        self.collection.actual()
    }

    fn checker(&self) -> &CheckerRef<'a> {
        self.collection.checker()
    }

    fn subject(&self) -> &dyn Debug {
        self.collection.subject()
    }
}

/// Sorted set: `first` and `last` are the smallest and greatest items
pub struct OrderedSetNode<'a, E: ?Sized> {
    collection: CollectionNode<'a, &'a E>,
}

impl<'a, E: ?Sized + Debug> OrderedSetNode<'a, E> {
    /// `items` must already be in ascending order
    pub(crate) fn new(
        items: Vec<&'a E>,
        source: Option<&'a dyn Debug>,
        checker: CheckerRef<'a>,
    ) -> Self {
        OrderedSetNode {
            collection: CollectionNode::new(items, source, checker),
        }
    }

    /// Fails with [`AssertError::EmptyContainer`] when the set is empty
    pub fn first<'s>(&'s self) -> Result<<&'a E as Assertable<'s>>::Node>
    where
        &'a E: Assertable<'s>,
    {
        let item = self
            .collection
            .items()
            .first()
            .copied()
            .ok_or_else(|| AssertError::empty("ordered set", "first"))?;
        Ok(item.into_node(self.collection.derived("first of ")))
    }

    /// Fails with [`AssertError::EmptyContainer`] when the set is empty
    pub fn last<'s>(&'s self) -> Result<<&'a E as Assertable<'s>>::Node>
    where
        &'a E: Assertable<'s>,
    {
        let item = self
            .collection
            .items()
            .last()
            .copied()
            .ok_or_else(|| AssertError::empty("ordered set", "last"))?;
        Ok(item.into_node(self.collection.derived("last of ")))
    }

    pub fn first_object(&self) -> Result<ObjectNode<'_, E>> {
        let item = self
            .collection
            .items()
            .first()
            .copied()
            .ok_or_else(|| AssertError::empty("ordered set", "first"))?;
        Ok(ObjectNode::borrowed(item, self.collection.derived("first of ")))
    }

    pub fn last_object(&self) -> Result<ObjectNode<'_, E>> {
        let item = self
            .collection
            .items()
            .last()
            .copied()
            .ok_or_else(|| AssertError::empty("ordered set", "last"))?;
        Ok(ObjectNode::borrowed(item, self.collection.derived("last of ")))
    }
}

impl<'a, E: ?Sized> Deref for OrderedSetNode<'a, E> {
    type Target = CollectionNode<'a, &'a E>;

    fn deref(&self) -> &Self::Target {
        &self.collection
    }
}

impl<'a, E: ?Sized + Debug> Node<'a> for OrderedSetNode<'a, E> {
    type Actual = [&'a E];

    fn actual(&self) -> &[&'a E] {
        self.collection.actual()
    }

    fn checker(&self) -> &CheckerRef<'a> {
        self.collection.checker()
    }

    fn subject(&self) -> &dyn Debug {
        self.collection.subject()
    }
}

fn as_index(position: Option<usize>) -> i64 {
    position.map_or(-1, |index| index as i64)
}
