//! An ordered map with positional access, based on a weight-balanced binary search tree.

mod cursor;
mod entry;
mod projection;
mod view;

#[cfg(test)]
mod test;

use compare::{Compare, Natural};
use std::cell::RefCell;
use std::cmp::Ordering::*;
use std::fmt::{self, Debug};
use std::iter::FromIterator;
use std::ops::Bound::{self, *};
use tracing::debug;
use crate::error::{Error, Result};
use crate::node::{self, Dir, Left, Link, Node, Right};
use self::scope::{Scope, Span};

pub use self::cursor::Cursor;
pub use self::entry::Entry;
pub use self::projection::{Entries, EntriesIter, Keys, KeysIter, Values, ValuesIter};
pub use self::view::{IndexRange, KeyRange};

/// The tree behind a map, together with its revision counter.
///
/// `revision` advances on every structural change. `writes` advances whenever the nodes are
/// borrowed mutably, structurally or not; raw pointers into the tree taken before that point must
/// be taken again.
pub(crate) struct Tree<K, V> {
    pub(crate) root: Link<K, V>,
    pub(crate) len: usize,
    pub(crate) revision: u64,
    pub(crate) writes: u64,
}

impl<K, V> Tree<K, V> {
    fn new() -> Self { Tree { root: None, len: 0, revision: 0, writes: 0 } }

    fn touch(&mut self) { self.revision = self.revision.wrapping_add(1); }

    pub(crate) fn root_mut(&mut self) -> &mut Link<K, V> {
        self.writes = self.writes.wrapping_add(1);
        &mut self.root
    }

    pub(crate) fn insert<C>(&mut self, cmp: &C, key: K, value: V) -> Option<V> where C: Compare<K> {
        let old_value = node::insert(self.root_mut(), cmp, key, value);

        if old_value.is_none() {
            self.len += 1;
            self.touch();
        }

        old_value
    }

    pub(crate) fn remove<C, Q: ?Sized>(&mut self, cmp: &C, key: &Q, span: Span) -> Option<(K, V)>
        where C: Compare<K> + Compare<Q, K> {

        let removed = node::remove(self.root_mut(), cmp, key, span.start..span.end);

        if removed.is_some() {
            self.len -= 1;
            self.touch();
        }

        removed
    }

    pub(crate) fn remove_at<C>(&mut self, cmp: &C, index: usize) -> Option<(K, V)> where C: Compare<K> {
        let removed = node::remove_at(self.root_mut(), cmp, index);

        if removed.is_some() {
            self.len -= 1;
            self.touch();
        }

        removed
    }

    fn clear(&mut self) {
        *self.root_mut() = None;
        self.len = 0;
        self.touch();
    }

    // `entries` must be strictly ascending and the tree empty.
    fn assign_sorted(&mut self, entries: Vec<(K, V)>) {
        let len = entries.len();
        debug!(len, "building balanced tree from sorted entries");
        *self.root_mut() = node::build(&mut entries.into_iter(), len);
        self.len = len;
        self.touch();
    }

    fn iter(&self) -> node::Iter<&Node<K, V>> { node::Iter::new(self.root.as_deref(), self.len) }
}

fn is_ascending<K, V, C>(cmp: &C, entries: &[(K, V)]) -> bool where C: Compare<K> {
    entries.windows(2).all(|pair| cmp.compare(&pair[0].0, &pair[1].0) == Less)
}

mod scope {
    use compare::Compare;
    use crate::error::Result;
    use super::Map;

    /// A contiguous run of ranks in the backing tree.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Span {
        pub start: usize,
        pub end: usize,
    }

    impl Span {
        pub fn len(&self) -> usize { self.end - self.start }

        pub fn is_empty(&self) -> bool { self.start == self.end }

        pub fn contains(&self, rank: usize) -> bool { self.start <= rank && rank < self.end }

        pub fn intersect(self, other: Span) -> Span {
            let start = self.start.max(other.start);
            Span { start, end: self.end.min(other.end).max(start) }
        }
    }

    /// The coordinate primitives shared by a map and its views.
    pub trait Scope {
        /// The key type.
        type Key;
        /// The value type.
        type Value;
        /// The comparator ordering the keys.
        type Cmp: Compare<Self::Key>;

        /// Returns the map whose tree this scope observes.
        fn map(&self) -> &Map<Self::Key, Self::Value, Self::Cmp>;

        /// Fails if this scope or one of its ancestors has gone stale.
        fn check(&self) -> Result<()>;

        /// Returns the ranks of the backing tree covered by this scope.
        fn span(&self) -> Result<Span>;

        /// Checks whether `key` may be inserted through this scope.
        fn admits(&self, key: &Self::Key) -> bool;

        /// Checks whether `key` may bound a key range nested in this scope.
        fn encloses(&self, key: &Self::Key) -> bool;

        /// Records `count` entries inserted through this scope.
        fn grew(&self, count: usize);

        /// Records `count` entries removed through this scope.
        fn shrank(&self, count: usize);
    }
}

// Looks up `key` within the scope, handing its index relative to the scope and its node to `f`.
fn find<M, Q: ?Sized, T, F>(scope: &M, key: &Q, f: F) -> Result<Option<T>>
    where M: Scope, M::Cmp: Compare<Q, M::Key>, F: FnOnce(usize, &Node<M::Key, M::Value>) -> T {

    let span = scope.span()?;
    let map = scope.map();
    let tree = map.tree.borrow();

    Ok(match node::locate(&tree.root, &map.cmp, key) {
        Ok((rank, node)) if span.contains(rank) => Some(f(rank - span.start, node)),
        _ => None,
    })
}

fn at<M, T, F>(scope: &M, rank: usize, f: F) -> Option<T>
    where M: Scope, F: FnOnce(&Node<M::Key, M::Value>) -> T {

    node::select(&scope.map().tree.borrow().root, rank).map(f)
}

// Finds the rank of the nearest entry of the scope on the `D` side of `key`.
fn neighbor<M, D, Q: ?Sized, T, F>(scope: &M, key: &Q, inclusive: bool, f: F) -> Result<Option<T>>
    where M: Scope, D: Dir, M::Cmp: Compare<Q, M::Key>, F: FnOnce(&Node<M::Key, M::Value>) -> T {

    let span = scope.span()?;
    if span.is_empty() { return Ok(None); }

    let map = scope.map();
    let tree = map.tree.borrow();
    let closest = D::closest(&tree.root, &map.cmp, key, inclusive);

    let rank = closest.map(|(rank, _)| rank).and_then(|rank| {
        if D::left() {
            Some(rank.min(span.end - 1)).filter(|&rank| rank >= span.start)
        } else {
            Some(rank.max(span.start)).filter(|&rank| rank < span.end)
        }
    });

    Ok(rank.and_then(|rank| match closest {
        Some((closest, node)) if closest == rank => Some(node),
        _ => node::select(&tree.root, rank),
    }).map(f))
}

fn clone_entry<K, V>(node: &Node<K, V>) -> (K, V) where K: Clone, V: Clone {
    (node.key().clone(), node.value().clone())
}

fn bound<K>(key: K, inclusive: bool) -> Bound<K> {
    if inclusive { Included(key) } else { Excluded(key) }
}

/// An ordered map based on a weight-balanced binary search tree.
///
/// Besides lookup by key, the map supports lookup by position: `get_index` returns the entry
/// with a given number of smaller keys, and `index_of` the position of a key. Live views of a
/// key range or an index range are obtained through [`SortedMap`], which also carries every
/// other operation of the map.
///
/// All operations take `&self`, so cursors, views and entry handles may coexist with direct
/// use of the map. Each of them notices structural changes made through another handle and
/// fails with [`Error::ConcurrentModification`](crate::Error::ConcurrentModification) rather
/// than observe a rearranged tree.
///
/// The behavior of this map is undefined if a key's ordering relative to any other key changes
/// while the key is in the map.
pub struct Map<K, V, C = Natural<K>> where C: Compare<K> {
    pub(crate) tree: RefCell<Tree<K, V>>,
    pub(crate) cmp: C,
}

impl<K, V> Map<K, V> where K: Ord {
    /// Creates an empty map ordered according to the natural order of its keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_tree::{Map, SortedMap};
    ///
    /// let map = Map::new();
    ///
    /// map.insert(2, "b")?;
    /// map.insert(1, "a")?;
    /// map.insert(3, "c")?;
    ///
    /// assert_eq!(map.to_vec()?, [(1, "a"), (2, "b"), (3, "c")]);
    /// # Ok::<(), indexed_tree::Error>(())
    /// ```
    pub fn new() -> Self { Map::with_cmp(compare::natural()) }
}

impl<K, V, C> Map<K, V, C> where C: Compare<K> {
    /// Creates an empty map ordered according to the given comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// use compare::{Compare, natural};
    /// use indexed_tree::{Map, SortedMap};
    ///
    /// let map = Map::with_cmp(natural().rev());
    ///
    /// map.insert(2, "b")?;
    /// map.insert(1, "a")?;
    /// map.insert(3, "c")?;
    ///
    /// assert_eq!(map.first_key()?, 3);
    /// assert_eq!(map.get_index(2)?, (1, "a"));
    /// # Ok::<(), indexed_tree::Error>(())
    /// ```
    pub fn with_cmp(cmp: C) -> Self {
        Map { tree: RefCell::new(Tree::new()), cmp }
    }

    pub(crate) fn revision(&self) -> u64 { self.tree.borrow().revision }
}

impl<K, V, C> Scope for Map<K, V, C> where C: Compare<K> {
    type Key = K;
    type Value = V;
    type Cmp = C;

    fn map(&self) -> &Self { self }

    fn check(&self) -> Result<()> { Ok(()) }

    fn span(&self) -> Result<Span> { Ok(Span { start: 0, end: self.tree.borrow().len }) }

    fn admits(&self, _: &K) -> bool { true }

    fn encloses(&self, _: &K) -> bool { true }

    fn grew(&self, _: usize) {}

    fn shrank(&self, _: usize) {}
}

impl<K, V, C> SortedMap for Map<K, V, C> where C: Compare<K> {}

/// The operations shared by [`Map`] and its [`KeyRange`] and [`IndexRange`] views.
///
/// A view forwards every operation to the map it was created from, restricted to its range:
/// lookups outside the range find nothing, indices count from the start of the range, and
/// insertions outside the range fail with [`Error::KeyOutOfRange`]. Views of views nest to any
/// depth.
///
/// This trait is sealed; it cannot be implemented outside this crate.
pub trait SortedMap: Scope + Sized {
    /// Returns the number of entries.
    ///
    /// This is constant time for maps and index ranges. Key ranges cache their extent until the
    /// map next changes structurally.
    fn len(&self) -> Result<usize> { self.span().map(|span| span.len()) }

    /// Checks if there are no entries.
    fn is_empty(&self) -> Result<bool> { self.span().map(|span| span.is_empty()) }

    /// Returns the comparator ordering the keys.
    fn comparator(&self) -> &Self::Cmp { &self.map().cmp }

    /// Returns a copy of the value associated with the given key.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_tree::{Map, SortedMap};
    ///
    /// let map = Map::new();
    /// assert_eq!(map.get(&1)?, None);
    /// map.insert(1, "a")?;
    /// assert_eq!(map.get(&1)?, Some("a"));
    /// # Ok::<(), indexed_tree::Error>(())
    /// ```
    fn get<Q: ?Sized>(&self, key: &Q) -> Result<Option<Self::Value>>
        where Self::Cmp: Compare<Q, Self::Key>, Self::Value: Clone {

        find(self, key, |_, node| node.value().clone())
    }

    /// Checks if the given key is present.
    fn contains_key<Q: ?Sized>(&self, key: &Q) -> Result<bool> where Self::Cmp: Compare<Q, Self::Key> {
        find(self, key, |_, _| ()).map(|found| found.is_some())
    }

    /// Inserts an entry, returning the previous value associated with the key, if any.
    ///
    /// Replacing the value of a present key is not a structural change: it leaves cursors and
    /// views valid.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::KeyOutOfRange`] if the key lies outside a view's range.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_tree::{Error, Map, SortedMap};
    ///
    /// let map = Map::new();
    /// assert_eq!(map.insert(1, "a")?, None);
    /// assert_eq!(map.insert(1, "b")?, Some("a"));
    ///
    /// let tail = map.tail_map(5, true)?;
    /// assert_eq!(tail.insert(3, "c"), Err(Error::KeyOutOfRange));
    /// # Ok::<(), indexed_tree::Error>(())
    /// ```
    fn insert(&self, key: Self::Key, value: Self::Value) -> Result<Option<Self::Value>> {
        self.check()?;
        if !self.admits(&key) { return Err(Error::KeyOutOfRange); }

        let map = self.map();
        let old_value = map.tree.borrow_mut().insert(&map.cmp, key, value);
        if old_value.is_none() { self.grew(1); }
        Ok(old_value)
    }

    /// Removes the entry with the given key, returning its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_tree::{Map, SortedMap};
    ///
    /// let map: Map<_, _> = (0..5).map(|i| (i, i * 10)).collect();
    /// assert_eq!(map.remove(&3)?, Some(30));
    /// assert_eq!(map.remove(&3)?, None);
    /// assert_eq!(map.len()?, 4);
    /// # Ok::<(), indexed_tree::Error>(())
    /// ```
    fn remove<Q: ?Sized>(&self, key: &Q) -> Result<Option<Self::Value>> where Self::Cmp: Compare<Q, Self::Key> {
        let span = self.span()?;
        let map = self.map();
        let removed = map.tree.borrow_mut().remove(&map.cmp, key, span);
        if removed.is_some() { self.shrank(1); }
        Ok(removed.map(|(_, value)| value))
    }

    /// Inserts copies of all entries of `other`.
    ///
    /// When the backing map is empty and `other` is ordered the same way, the tree is built
    /// directly in linear time.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::KeyOutOfRange`], inserting nothing, if any key lies outside a view's
    /// range.
    fn put_all<M>(&self, other: &M) -> Result<()>
        where M: SortedMap<Key = Self::Key, Value = Self::Value>, Self::Key: Clone, Self::Value: Clone {

        let entries = other.to_vec()?;
        self.check()?;
        if entries.is_empty() { return Ok(()); }
        if !entries.iter().all(|entry| self.admits(&entry.0)) { return Err(Error::KeyOutOfRange); }

        let map = self.map();
        let mut tree = map.tree.borrow_mut();

        let added = if tree.len == 0 && is_ascending(&map.cmp, &entries) {
            let len = entries.len();
            tree.assign_sorted(entries);
            len
        } else {
            let mut added = 0;

            for (key, value) in entries {
                if tree.insert(&map.cmp, key, value).is_none() { added += 1; }
            }

            added
        };

        drop(tree);
        if added > 0 { self.grew(added); }
        Ok(())
    }

    /// Removes all entries.
    fn clear(&self) -> Result<()> {
        let span = self.span()?;
        if span.is_empty() { return Ok(()); }

        let map = self.map();

        {
            let mut tree = map.tree.borrow_mut();

            if span.len() == tree.len {
                tree.clear();
            } else {
                for _ in 0..span.len() { tree.remove_at(&map.cmp, span.start); }
            }
        }

        self.shrank(span.len());
        Ok(())
    }

    /// Returns copies of all entries, in order.
    fn to_vec(&self) -> Result<Vec<(Self::Key, Self::Value)>> where Self::Key: Clone, Self::Value: Clone {
        let span = self.span()?;
        let tree = self.map().tree.borrow();
        Ok(tree.iter().skip(span.start).take(span.len()).map(|(key, value)| (key.clone(), value.clone())).collect())
    }

    /// Returns the smallest key.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotFound`] if there are no entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_tree::{Error, Map, SortedMap};
    ///
    /// let map = Map::new();
    /// assert_eq!(map.first_key(), Err(Error::NotFound));
    /// map.insert("m", 1)?;
    /// assert_eq!(map.first_key()?, "m");
    /// # Ok::<(), indexed_tree::Error>(())
    /// ```
    fn first_key(&self) -> Result<Self::Key> where Self::Key: Clone {
        let span = self.span()?;
        if span.is_empty() { return Err(Error::NotFound); }
        at(self, span.start, |node| node.key().clone()).ok_or(Error::NotFound)
    }

    /// Returns the largest key.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotFound`] if there are no entries.
    fn last_key(&self) -> Result<Self::Key> where Self::Key: Clone {
        let span = self.span()?;
        if span.is_empty() { return Err(Error::NotFound); }
        at(self, span.end - 1, |node| node.key().clone()).ok_or(Error::NotFound)
    }

    /// Returns the entry with the smallest key.
    fn first_entry(&self) -> Result<Option<(Self::Key, Self::Value)>> where Self::Key: Clone, Self::Value: Clone {
        let span = self.span()?;
        Ok(if span.is_empty() { None } else { at(self, span.start, clone_entry) })
    }

    /// Returns the entry with the largest key.
    fn last_entry(&self) -> Result<Option<(Self::Key, Self::Value)>> where Self::Key: Clone, Self::Value: Clone {
        let span = self.span()?;
        Ok(if span.is_empty() { None } else { at(self, span.end - 1, clone_entry) })
    }

    /// Removes and returns the entry with the smallest key.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_tree::{Map, SortedMap};
    ///
    /// let map: Map<_, _> = vec![(2, 'b'), (1, 'a')].into_iter().collect();
    /// assert_eq!(map.poll_first()?, Some((1, 'a')));
    /// assert_eq!(map.poll_first()?, Some((2, 'b')));
    /// assert_eq!(map.poll_first()?, None);
    /// # Ok::<(), indexed_tree::Error>(())
    /// ```
    fn poll_first(&self) -> Result<Option<(Self::Key, Self::Value)>> {
        if self.is_empty()? { Ok(None) } else { self.remove_index(0).map(Some) }
    }

    /// Removes and returns the entry with the largest key.
    fn poll_last(&self) -> Result<Option<(Self::Key, Self::Value)>> {
        let len = self.len()?;
        if len == 0 { Ok(None) } else { self.remove_index(len - 1).map(Some) }
    }

    /// Returns the entry with the greatest key strictly less than the given key.
    ///
    /// The given key need not itself be present.
    fn lower_entry<Q: ?Sized>(&self, key: &Q) -> Result<Option<(Self::Key, Self::Value)>>
        where Self::Cmp: Compare<Q, Self::Key>, Self::Key: Clone, Self::Value: Clone {

        neighbor::<_, Left, _, _, _>(self, key, false, clone_entry)
    }

    /// Returns the entry with the greatest key less than or equal to the given key.
    fn floor_entry<Q: ?Sized>(&self, key: &Q) -> Result<Option<(Self::Key, Self::Value)>>
        where Self::Cmp: Compare<Q, Self::Key>, Self::Key: Clone, Self::Value: Clone {

        neighbor::<_, Left, _, _, _>(self, key, true, clone_entry)
    }

    /// Returns the entry with the least key greater than or equal to the given key.
    fn ceiling_entry<Q: ?Sized>(&self, key: &Q) -> Result<Option<(Self::Key, Self::Value)>>
        where Self::Cmp: Compare<Q, Self::Key>, Self::Key: Clone, Self::Value: Clone {

        neighbor::<_, Right, _, _, _>(self, key, true, clone_entry)
    }

    /// Returns the entry with the least key strictly greater than the given key.
    fn higher_entry<Q: ?Sized>(&self, key: &Q) -> Result<Option<(Self::Key, Self::Value)>>
        where Self::Cmp: Compare<Q, Self::Key>, Self::Key: Clone, Self::Value: Clone {

        neighbor::<_, Right, _, _, _>(self, key, false, clone_entry)
    }

    /// Returns the greatest key strictly less than the given key.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_tree::{Map, SortedMap};
    ///
    /// let map: Map<_, _> = vec![("abc", 1), ("def", 2), ("ghi", 3)].into_iter().collect();
    ///
    /// assert_eq!(map.lower_key(&"def")?, Some("abc"));
    /// assert_eq!(map.floor_key(&"ddd")?, Some("abc"));
    /// assert_eq!(map.ceiling_key(&"ddd")?, Some("def"));
    /// assert_eq!(map.higher_key(&"def")?, Some("ghi"));
    /// assert_eq!(map.higher_key(&"ghi")?, None);
    /// # Ok::<(), indexed_tree::Error>(())
    /// ```
    fn lower_key<Q: ?Sized>(&self, key: &Q) -> Result<Option<Self::Key>>
        where Self::Cmp: Compare<Q, Self::Key>, Self::Key: Clone {

        neighbor::<_, Left, _, _, _>(self, key, false, |node| node.key().clone())
    }

    /// Returns the greatest key less than or equal to the given key.
    fn floor_key<Q: ?Sized>(&self, key: &Q) -> Result<Option<Self::Key>>
        where Self::Cmp: Compare<Q, Self::Key>, Self::Key: Clone {

        neighbor::<_, Left, _, _, _>(self, key, true, |node| node.key().clone())
    }

    /// Returns the least key greater than or equal to the given key.
    fn ceiling_key<Q: ?Sized>(&self, key: &Q) -> Result<Option<Self::Key>>
        where Self::Cmp: Compare<Q, Self::Key>, Self::Key: Clone {

        neighbor::<_, Right, _, _, _>(self, key, true, |node| node.key().clone())
    }

    /// Returns the least key strictly greater than the given key.
    fn higher_key<Q: ?Sized>(&self, key: &Q) -> Result<Option<Self::Key>>
        where Self::Cmp: Compare<Q, Self::Key>, Self::Key: Clone {

        neighbor::<_, Right, _, _, _>(self, key, false, |node| node.key().clone())
    }

    /// Returns the entry at the given position in key order.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::IndexOutOfRange`] unless `index < len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_tree::{Error, Map, SortedMap};
    ///
    /// let map: Map<_, _> = "gfedcba".chars().map(|c| (c, c as u32)).collect();
    /// assert_eq!(map.get_index(3)?.0, 'd');
    /// assert_eq!(map.get_index(7), Err(Error::IndexOutOfRange { index: 7, len: 7 }));
    /// # Ok::<(), indexed_tree::Error>(())
    /// ```
    fn get_index(&self, index: usize) -> Result<(Self::Key, Self::Value)> where Self::Key: Clone, Self::Value: Clone {
        let span = self.span()?;
        let out_of_range = Error::IndexOutOfRange { index, len: span.len() };
        if index >= span.len() { return Err(out_of_range); }
        at(self, span.start + index, clone_entry).ok_or(out_of_range)
    }

    /// Removes and returns the entry at the given position in key order.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::IndexOutOfRange`] unless `index < len`.
    fn remove_index(&self, index: usize) -> Result<(Self::Key, Self::Value)> {
        let span = self.span()?;
        let out_of_range = Error::IndexOutOfRange { index, len: span.len() };
        if index >= span.len() { return Err(out_of_range); }

        let map = self.map();
        let removed = map.tree.borrow_mut().remove_at(&map.cmp, span.start + index).ok_or(out_of_range)?;
        self.shrank(1);
        Ok(removed)
    }

    /// Returns the position of the given key in key order, or `None` if it is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_tree::{Map, SortedMap};
    ///
    /// let map: Map<_, _> = "abcdefg".chars().map(|c| (c, ())).collect();
    /// map.remove(&'d')?;
    ///
    /// assert_eq!(map.index_of(&'e')?, Some(3));
    /// assert_eq!(map.index_of(&'d')?, None);
    /// # Ok::<(), indexed_tree::Error>(())
    /// ```
    fn index_of<Q: ?Sized>(&self, key: &Q) -> Result<Option<usize>> where Self::Cmp: Compare<Q, Self::Key> {
        find(self, key, |index, _| index)
    }

    /// Returns a live view of the entries whose keys lie between the given bounds.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidKeyRange`] if `min` is greater than `max`, and with
    /// [`Error::KeyOutOfRange`] if either bound lies outside this view's range.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::ops::Bound::*;
    /// use indexed_tree::{Map, SortedMap};
    ///
    /// let map: Map<_, _> = (0..10).map(|i| (i, ())).collect();
    /// let range = map.range(Excluded(2), Included(5))?;
    ///
    /// assert_eq!(range.len()?, 3);
    /// assert_eq!(range.first_key()?, 3);
    /// assert_eq!(range.get_index(2)?.0, 5);
    /// # Ok::<(), indexed_tree::Error>(())
    /// ```
    fn range(&self, min: Bound<Self::Key>, max: Bound<Self::Key>) -> Result<KeyRange<'_, Self>> {
        KeyRange::new(self, min, max)
    }

    /// Returns a live view of the entries with keys from `from` to `to`.
    fn sub_map(&self, from: Self::Key, from_inclusive: bool, to: Self::Key, to_inclusive: bool)
        -> Result<KeyRange<'_, Self>> {

        self.range(bound(from, from_inclusive), bound(to, to_inclusive))
    }

    /// Returns a live view of the entries with keys less than (or equal to) `to`.
    fn head_map(&self, to: Self::Key, inclusive: bool) -> Result<KeyRange<'_, Self>> {
        self.range(Unbounded, bound(to, inclusive))
    }

    /// Returns a live view of the entries with keys greater than (or equal to) `from`.
    fn tail_map(&self, from: Self::Key, inclusive: bool) -> Result<KeyRange<'_, Self>> {
        self.range(bound(from, inclusive), Unbounded)
    }

    /// Returns a live view of the entries at positions `start..end`.
    ///
    /// The view tracks insertions and removals made through it, or through views nested in it.
    /// Any other structural change to the map makes it fail with
    /// [`Error::ConcurrentModification`].
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidIndexRange`] unless `start <= end <= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_tree::{Map, SortedMap};
    ///
    /// let map: Map<_, _> = "abcdefg".chars().map(|c| (c, ())).collect();
    /// let view = map.sub_map_by_indices(2, 5)?;
    /// assert_eq!(view.keys().iter()?.collect::<Result<String, _>>()?, "cde");
    ///
    /// view.poll_first()?;
    /// assert_eq!(view.keys().iter()?.collect::<Result<String, _>>()?, "de");
    /// assert_eq!(map.len()?, 6);
    /// # Ok::<(), indexed_tree::Error>(())
    /// ```
    fn sub_map_by_indices(&self, start: usize, end: usize) -> Result<IndexRange<'_, Self>> {
        IndexRange::new(self, start, end)
    }

    /// Returns a live projection of the keys.
    fn keys(&self) -> Keys<'_, Self> { Keys::new(self) }

    /// Returns a live projection of the values.
    fn values(&self) -> Values<'_, Self> { Values::new(self) }

    /// Returns a live projection of the entries.
    fn entries(&self) -> Entries<'_, Self> { Entries::new(self) }

    /// Returns a cursor positioned before the first entry.
    fn cursor(&self) -> Result<Cursor<'_, Self>> { Cursor::new(self, 0) }

    /// Returns a cursor positioned before the entry at the given position.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::IndexOutOfRange`] unless `index <= len`.
    fn cursor_at(&self, index: usize) -> Result<Cursor<'_, Self>> { Cursor::new(self, index) }
}

impl<K, V, C> Clone for Map<K, V, C> where K: Clone, V: Clone, C: Compare<K> + Clone {
    fn clone(&self) -> Self {
        let tree = self.tree.borrow();

        Map {
            tree: RefCell::new(Tree { root: tree.root.clone(), len: tree.len, revision: 0, writes: 0 }),
            cmp: self.cmp.clone(),
        }
    }
}

impl<K, V, C> Debug for Map<K, V, C> where K: Debug, V: Debug, C: Compare<K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.tree.borrow().iter()).finish()
    }
}

impl<K, V, C> Default for Map<K, V, C> where C: Compare<K> + Default {
    fn default() -> Self { Map::with_cmp(C::default()) }
}

impl<K, V, C> Extend<(K, V)> for Map<K, V, C> where C: Compare<K> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let entries: Vec<(K, V)> = iter.into_iter().collect();
        if entries.is_empty() { return; }

        let tree = self.tree.get_mut();

        if tree.len == 0 && is_ascending(&self.cmp, &entries) {
            tree.assign_sorted(entries);
        } else {
            for (key, value) in entries { tree.insert(&self.cmp, key, value); }
        }
    }
}

impl<K, V, C> FromIterator<(K, V)> for Map<K, V, C> where C: Compare<K> + Default {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Map::default();
        map.extend(iter);
        map
    }
}

impl<K, V, C> PartialEq for Map<K, V, C> where V: PartialEq, C: Compare<K> {
    fn eq(&self, other: &Self) -> bool {
        let (this, that) = (self.tree.borrow(), other.tree.borrow());

        this.len == that.len &&
        this.iter().zip(that.iter()).all(|(l, r)| self.cmp.compare(l.0, r.0) == Equal && l.1 == r.1)
    }
}

impl<K, V, C> Eq for Map<K, V, C> where V: Eq, C: Compare<K> {}

impl<K, V, C> IntoIterator for Map<K, V, C> where C: Compare<K> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Returns an iterator that consumes the map, in ascending key order.
    fn into_iter(self) -> IntoIter<K, V> {
        let tree = self.tree.into_inner();
        IntoIter(node::Iter::new(tree.root, tree.len))
    }
}

/// An iterator that consumes a map.
///
/// See [`Map::into_iter`](struct.Map.html#method.into_iter) for an example.
pub struct IntoIter<K, V>(node::Iter<Box<Node<K, V>>>);

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    fn next(&mut self) -> Option<(K, V)> { self.0.next() }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> { self.0.next_back() }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
