use std::fmt::Debug;
use std::ops::Deref;

use super::{check, CollectionNode, Node, NumberNode, ObjectNode, OrderedSetNode};
use crate::category::Assertable;
use crate::checker::{derive, prefixed, quote, CheckerRef};
use crate::error::{AssertError, Result};

/// Keyed container, asserted through its entries
pub struct MapNode<'a, K, V> {
    entries: Vec<(&'a K, &'a V)>,
    source: &'a dyn Debug,
    checker: CheckerRef<'a>,
}

impl<'a, K: Debug, V: Debug> MapNode<'a, K, V> {
    pub(crate) fn new(
        entries: Vec<(&'a K, &'a V)>,
        source: &'a dyn Debug,
        checker: CheckerRef<'a>,
    ) -> Self {
        MapNode {
            entries,
            source,
            checker,
        }
    }

    pub fn is_empty(&self) {
        check(&self.checker, self.source, || self.entries.is_empty(), || {
            "%s is empty".to_string()
        });
    }

    pub fn is_not_empty(&self) {
        check(&self.checker, self.source, || !self.entries.is_empty(), || {
            "%s is not empty".to_string()
        });
    }

    pub fn size(&self) -> NumberNode<'_, usize> {
        NumberNode::new(self.entries.len(), self.derived("size of "))
    }

    pub fn contains_key<T: Debug>(&self, key: T) -> &Self
    where
        K: PartialEq<T>,
    {
        check(
            &self.checker,
            self.source,
            || self.entries.iter().any(|(k, _)| **k == key),
            || format!("%s contains key {}", quote(&key)),
        );
        self
    }

    pub fn contains_value<T: Debug>(&self, value: T) -> &Self
    where
        V: PartialEq<T>,
    {
        check(
            &self.checker,
            self.source,
            || self.entries.iter().any(|(_, v)| **v == value),
            || format!("%s contains value {}", quote(&value)),
        );
        self
    }

    pub fn key_set(&self) -> CollectionNode<'_, &'_ K> {
        let keys = self.entries.iter().map(|(k, _)| *k).collect();
        CollectionNode::new(keys, None, self.derived("keys of "))
    }

    pub fn values(&self) -> CollectionNode<'_, &'_ V> {
        let values = self.entries.iter().map(|(_, v)| *v).collect();
        CollectionNode::new(values, None, self.derived("values of "))
    }

    pub fn entry_set(&self) -> CollectionNode<'_, (&'_ K, &'_ V)> {
        CollectionNode::new(self.entries.clone(), None, self.derived("entries of "))
    }

    /// Fails with [`AssertError::MissingKey`] when no entry has `key`
    pub fn value_of<'s, T: Debug>(&'s self, key: T) -> Result<<&'a V as Assertable<'s>>::Node>
    where
        K: PartialEq<T>,
        &'a V: Assertable<'s>,
    {
        let value = self
            .entries
            .iter()
            .find(|(k, _)| **k == key)
            .map(|(_, v)| *v)
            .ok_or_else(|| AssertError::missing_key(&key))?;
        let label = format!("value of {} in ", quote(&key));
        Ok(value.into_node(self.derived(label)))
    }

    /// [`MapNode::value_of`] for values of no more specific category
    pub fn value_of_object<T: Debug>(&self, key: T) -> Result<ObjectNode<'_, V>>
    where
        K: PartialEq<T>,
    {
        let value = self
            .entries
            .iter()
            .find(|(k, _)| **k == key)
            .map(|(_, v)| *v)
            .ok_or_else(|| AssertError::missing_key(&key))?;
        let label = format!("value of {} in ", quote(&key));
        Ok(ObjectNode::borrowed(value, self.derived(label)))
    }

    /// `label` must already be escaped
    fn derived<'s>(&'s self, label: impl Into<String>) -> CheckerRef<'s> {
        derive(self.checker.clone(), self.source, prefixed(label.into()))
    }
}

impl<'a, K: Debug, V: Debug> Node<'a> for MapNode<'a, K, V> {
    type Actual = [(&'a K, &'a V)];

    fn actual(&self) -> &Self::Actual {
        &self.entries
    }

    fn checker(&self) -> &CheckerRef<'a> {
        &self.checker
    }

    fn subject(&self) -> &dyn Debug {
        self.source
    }
}

/// Sorted map: entries in ascending key order
pub struct OrderedMapNode<'a, K, V> {
    map: MapNode<'a, K, V>,
}

impl<'a, K: Debug, V: Debug> OrderedMapNode<'a, K, V> {
    /// `entries` must already be in ascending key order
    pub(crate) fn new(
        entries: Vec<(&'a K, &'a V)>,
        source: &'a dyn Debug,
        checker: CheckerRef<'a>,
    ) -> Self {
        OrderedMapNode {
            map: MapNode::new(entries, source, checker),
        }
    }

    /// Keys keep the map's ordering, so the set has `first` and `last`
    pub fn key_set(&self) -> OrderedSetNode<'_, K> {
        let keys = self.map.entries.iter().map(|(k, _)| *k).collect();
        OrderedSetNode::new(keys, None, self.map.derived("keys of "))
    }

    /// Fails with [`AssertError::EmptyContainer`] when the map is empty
    pub fn first_entry(&self) -> Result<EntryNode<'_, K, V>> {
        let (key, value) = self
            .map
            .entries
            .first()
            .copied()
            .ok_or_else(|| AssertError::empty("ordered map", "first_entry"))?;
        Ok(EntryNode::new(key, value, self.map.derived("first entry of ")))
    }

    /// Fails with [`AssertError::EmptyContainer`] when the map is empty
    pub fn last_entry(&self) -> Result<EntryNode<'_, K, V>> {
        let (key, value) = self
            .map
            .entries
            .last()
            .copied()
            .ok_or_else(|| AssertError::empty("ordered map", "last_entry"))?;
        Ok(EntryNode::new(key, value, self.map.derived("last entry of ")))
    }
}

impl<'a, K, V> Deref for OrderedMapNode<'a, K, V> {
    type Target = MapNode<'a, K, V>;

    fn deref(&self) -> &Self::Target {
        &self.map
    }
}

impl<'a, K: Debug, V: Debug> Node<'a> for OrderedMapNode<'a, K, V> {
    type Actual = [(&'a K, &'a V)];

    fn actual(&self) -> &Self::Actual {
        self.map.actual()
    }

    fn checker(&self) -> &CheckerRef<'a> {
        self.map.checker()
    }

    fn subject(&self) -> &dyn Debug {
        self.map.subject()
    }
}

/// One key/value pair
pub struct EntryNode<'a, K: ?Sized, V: ?Sized> {
    entry: (&'a K, &'a V),
    checker: CheckerRef<'a>,
}

impl<'a, K: ?Sized + Debug, V: ?Sized + Debug> EntryNode<'a, K, V> {
    pub(crate) fn new(key: &'a K, value: &'a V, checker: CheckerRef<'a>) -> Self {
        EntryNode {
            entry: (key, value),
            checker,
        }
    }

    pub fn is_equal_to<KQ: Debug, VQ: Debug>(&self, key: KQ, value: VQ)
    where
        K: PartialEq<KQ>,
        V: PartialEq<VQ>,
    {
        check(
            &self.checker,
            &self.entry,
            || *self.entry.0 == key && *self.entry.1 == value,
            || format!("%s == ({}, {})", quote(&key), quote(&value)),
        );
    }

    pub fn is_not_equal_to<KQ: Debug, VQ: Debug>(&self, key: KQ, value: VQ)
    where
        K: PartialEq<KQ>,
        V: PartialEq<VQ>,
    {
        check(
            &self.checker,
            &self.entry,
            || !(*self.entry.0 == key && *self.entry.1 == value),
            || format!("%s != ({}, {})", quote(&key), quote(&value)),
        );
    }

    pub fn key<'s>(&'s self) -> <&'a K as Assertable<'s>>::Node
    where
        &'a K: Assertable<'s>,
    {
        self.entry.0.into_node(self.derived("key of "))
    }

    pub fn key_object(&self) -> ObjectNode<'_, K> {
        ObjectNode::borrowed(self.entry.0, self.derived("key of "))
    }

    pub fn value<'s>(&'s self) -> <&'a V as Assertable<'s>>::Node
    where
        &'a V: Assertable<'s>,
    {
        self.entry.1.into_node(self.derived("value of "))
    }

    pub fn value_object(&self) -> ObjectNode<'_, V> {
        ObjectNode::borrowed(self.entry.1, self.derived("value of "))
    }

    fn derived<'s>(&'s self, label: &str) -> CheckerRef<'s> {
        derive(self.checker.clone(), &self.entry, prefixed(label.to_string()))
    }
}

impl<'a, K: ?Sized + Debug, V: ?Sized + Debug> Node<'a> for EntryNode<'a, K, V> {
    type Actual = (&'a K, &'a V);

    fn actual(&self) -> &Self::Actual {
        &self.entry
    }

    fn checker(&self) -> &CheckerRef<'a> {
        &self.checker
    }

    fn subject(&self) -> &dyn Debug {
        &self.entry
    }
}
