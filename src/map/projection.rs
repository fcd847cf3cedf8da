//! Live projections of a map's keys, values and entries.

use compare::Compare;
use crate::error::Result;
use super::{find, Cursor, Entry, SortedMap};

/// A live projection of the keys of a map or view.
pub struct Keys<'a, M> where M: SortedMap {
    map: &'a M,
}

impl<'a, M> Keys<'a, M> where M: SortedMap {
    pub(crate) fn new(map: &'a M) -> Self { Keys { map } }

    /// Returns the number of keys.
    pub fn len(&self) -> Result<usize> { self.map.len() }

    /// Checks if there are no keys.
    pub fn is_empty(&self) -> Result<bool> { self.map.is_empty() }

    /// Checks if the given key is present.
    pub fn contains<Q: ?Sized>(&self, key: &Q) -> Result<bool> where M::Cmp: Compare<Q, M::Key> {
        self.map.contains_key(key)
    }

    /// Removes the given key and its value, returning whether it was present.
    pub fn remove<Q: ?Sized>(&self, key: &Q) -> Result<bool> where M::Cmp: Compare<Q, M::Key> {
        Ok(self.map.remove(key)?.is_some())
    }

    /// Returns an iterator over the keys, in order.
    pub fn iter(&self) -> Result<KeysIter<'a, M>> { self.map.cursor().map(KeysIter) }
}

/// An iterator over the keys of a map or view.
pub struct KeysIter<'a, M>(Cursor<'a, M>) where M: SortedMap;

impl<'a, M> KeysIter<'a, M> where M: SortedMap {
    /// Removes the entry whose key was returned last.
    pub fn remove(&mut self) -> Result<()> { self.0.remove().map(drop) }
}

impl<'a, M> Iterator for KeysIter<'a, M> where M: SortedMap, M::Key: Clone {
    type Item = Result<M::Key>;

    fn next(&mut self) -> Option<Result<M::Key>> {
        self.0.step(true, |_, node| node.key().clone()).transpose()
    }
}

/// A live projection of the values of a map or view.
pub struct Values<'a, M> where M: SortedMap {
    map: &'a M,
}

impl<'a, M> Values<'a, M> where M: SortedMap {
    pub(crate) fn new(map: &'a M) -> Self { Values { map } }

    /// Returns the number of values.
    pub fn len(&self) -> Result<usize> { self.map.len() }

    /// Checks if there are no values.
    pub fn is_empty(&self) -> Result<bool> { self.map.is_empty() }

    /// Checks if any entry has the given value.
    ///
    /// This takes linear time.
    pub fn contains(&self, value: &M::Value) -> Result<bool> where M::Value: PartialEq {
        let mut cursor = self.map.cursor()?;

        while let Some(found) = cursor.step(true, |_, node| node.value() == value)? {
            if found { return Ok(true); }
        }

        Ok(false)
    }

    /// Removes the first entry with the given value, returning whether there was one.
    pub fn remove(&self, value: &M::Value) -> Result<bool> where M::Value: PartialEq {
        let mut cursor = self.map.cursor()?;

        while let Some(found) = cursor.step(true, |_, node| node.value() == value)? {
            if found {
                cursor.remove()?;
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Returns an iterator over the values, in key order.
    pub fn iter(&self) -> Result<ValuesIter<'a, M>> { self.map.cursor().map(ValuesIter) }
}

/// An iterator over the values of a map or view.
pub struct ValuesIter<'a, M>(Cursor<'a, M>) where M: SortedMap;

impl<'a, M> ValuesIter<'a, M> where M: SortedMap {
    /// Removes the entry whose value was returned last.
    pub fn remove(&mut self) -> Result<()> { self.0.remove().map(drop) }
}

impl<'a, M> Iterator for ValuesIter<'a, M> where M: SortedMap, M::Value: Clone {
    type Item = Result<M::Value>;

    fn next(&mut self) -> Option<Result<M::Value>> {
        self.0.step(true, |_, node| node.value().clone()).transpose()
    }
}

/// A live projection of the entries of a map or view.
pub struct Entries<'a, M> where M: SortedMap {
    map: &'a M,
}

impl<'a, M> Entries<'a, M> where M: SortedMap {
    pub(crate) fn new(map: &'a M) -> Self { Entries { map } }

    /// Returns the number of entries.
    pub fn len(&self) -> Result<usize> { self.map.len() }

    /// Checks if there are no entries.
    pub fn is_empty(&self) -> Result<bool> { self.map.is_empty() }

    /// Checks if the given key is present with the given value.
    pub fn contains(&self, key: &M::Key, value: &M::Value) -> Result<bool> where M::Value: PartialEq {
        find(self.map, key, |_, node| node.value() == value).map(|found| found == Some(true))
    }

    /// Removes the given key if it is present with the given value, returning whether it was.
    pub fn remove(&self, key: &M::Key, value: &M::Value) -> Result<bool> where M::Value: PartialEq {
        Ok(self.contains(key, value)? && self.map.remove(key)?.is_some())
    }

    /// Returns an iterator over handles to the entries, in key order.
    pub fn iter(&self) -> Result<EntriesIter<'a, M>> { self.map.cursor().map(EntriesIter) }
}

/// An iterator over handles to the entries of a map or view.
pub struct EntriesIter<'a, M>(Cursor<'a, M>) where M: SortedMap;

impl<'a, M> EntriesIter<'a, M> where M: SortedMap {
    /// Removes the entry whose handle was returned last.
    pub fn remove(&mut self) -> Result<()> { self.0.remove().map(drop) }
}

impl<'a, M> Iterator for EntriesIter<'a, M> where M: SortedMap, M::Key: Clone {
    type Item = Result<Entry<'a, M::Key, M::Value, M::Cmp>>;

    fn next(&mut self) -> Option<Self::Item> {
        let map = self.0.scope().map();
        let found = self.0.step(true, |ptr, node| (node.key().clone(), ptr)).transpose()?;
        let (revision, writes) = self.0.stamp();

        Some(found.map(|(key, ptr)| Entry::new(map, key, ptr, revision, writes)))
    }
}
