use compare::Compare;
use std::cell::Cell;
use std::cmp::Ordering::*;
use std::fmt::{self, Debug};
use std::ops::Bound::{self, *};
use tracing::debug;
use crate::error::{Error, Result};
use crate::node;
use super::{Map, SortedMap, Tree};
use super::scope::{Scope, Span};

/// A live view of the entries of a map whose keys lie within a key range.
///
/// The view sees every change to the underlying map, however it was made: its extent is derived
/// from its bounds, so it never goes stale.
///
/// Created by [`SortedMap::range`] and its variants.
pub struct KeyRange<'a, M> where M: SortedMap {
    parent: &'a M,
    min: Bound<M::Key>,
    max: Bound<M::Key>,
    span: Cell<Option<(u64, Span)>>,
}

impl<'a, M> KeyRange<'a, M> where M: SortedMap {
    pub(crate) fn new(parent: &'a M, min: Bound<M::Key>, max: Bound<M::Key>) -> Result<Self> {
        parent.check()?;

        if let (Included(lo) | Excluded(lo), Included(hi) | Excluded(hi)) = (&min, &max) {
            if parent.comparator().compare(lo, hi) == Greater { return Err(Error::InvalidKeyRange); }
        }

        for bound in [&min, &max] {
            if let Included(key) | Excluded(key) = bound {
                if !parent.encloses(key) { return Err(Error::KeyOutOfRange); }
            }
        }

        Ok(KeyRange { parent, min, max, span: Cell::new(None) })
    }

    // With `closed`, an excluded bound admits the key it excludes.
    fn within(&self, key: &M::Key, closed: bool) -> bool {
        let cmp = self.parent.comparator();

        let above = match self.min {
            Unbounded => true,
            Included(ref min) => cmp.compare(key, min) != Less,
            Excluded(ref min) => match cmp.compare(key, min) {
                Greater => true,
                Equal => closed,
                Less => false,
            },
        };

        let below = match self.max {
            Unbounded => true,
            Included(ref max) => cmp.compare(key, max) != Greater,
            Excluded(ref max) => match cmp.compare(key, max) {
                Less => true,
                Equal => closed,
                Greater => false,
            },
        };

        above && below
    }

    fn own_span(&self, tree: &Tree<M::Key, M::Value>) -> Span {
        let cmp = self.parent.comparator();

        let start = match self.min {
            Unbounded => 0,
            Included(ref key) => node::rank(&tree.root, cmp, key).unwrap_or_else(|rank| rank),
            Excluded(ref key) => node::rank(&tree.root, cmp, key).map_or_else(|rank| rank, |rank| rank + 1),
        };

        let end = match self.max {
            Unbounded => tree.len,
            Included(ref key) => node::rank(&tree.root, cmp, key).map_or_else(|rank| rank, |rank| rank + 1),
            Excluded(ref key) => node::rank(&tree.root, cmp, key).unwrap_or_else(|rank| rank),
        };

        Span { start, end: end.max(start) }
    }
}

impl<'a, M> Scope for KeyRange<'a, M> where M: SortedMap {
    type Key = M::Key;
    type Value = M::Value;
    type Cmp = M::Cmp;

    fn map(&self) -> &Map<M::Key, M::Value, M::Cmp> { self.parent.map() }

    fn check(&self) -> Result<()> { self.parent.check() }

    fn span(&self) -> Result<Span> {
        let outer = self.parent.span()?;
        let map = self.map();
        let revision = map.revision();

        let own = match self.span.get() {
            Some((stamp, span)) if stamp == revision => span,
            _ => {
                let span = self.own_span(&map.tree.borrow());
                self.span.set(Some((revision, span)));
                span
            }
        };

        Ok(own.intersect(outer))
    }

    fn admits(&self, key: &M::Key) -> bool { self.within(key, false) && self.parent.admits(key) }

    fn encloses(&self, key: &M::Key) -> bool { self.within(key, true) && self.parent.encloses(key) }

    fn grew(&self, count: usize) { self.parent.grew(count) }

    fn shrank(&self, count: usize) { self.parent.shrank(count) }
}

impl<'a, M> SortedMap for KeyRange<'a, M> where M: SortedMap {}

impl<'a, M> Debug for KeyRange<'a, M> where M: SortedMap, M::Key: Debug {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("KeyRange").field("min", &self.min).field("max", &self.max).finish()
    }
}

/// A live view of the entries of a map at a range of positions.
///
/// The view follows insertions and removals made through itself and through views nested in
/// it, growing and shrinking accordingly. Any other structural change to the map makes every
/// operation on the view fail with [`Error::ConcurrentModification`].
///
/// Created by [`SortedMap::sub_map_by_indices`].
pub struct IndexRange<'a, M> where M: SortedMap {
    parent: &'a M,
    start: usize,
    end: Cell<usize>,
    revision: Cell<u64>,
}

impl<'a, M> IndexRange<'a, M> where M: SortedMap {
    pub(crate) fn new(parent: &'a M, start: usize, end: usize) -> Result<Self> {
        let span = parent.span()?;
        let len = span.len();
        if start > end || end > len { return Err(Error::InvalidIndexRange { start, end, len }); }

        Ok(IndexRange {
            parent,
            start: span.start + start,
            end: Cell::new(span.start + end),
            revision: Cell::new(parent.map().revision()),
        })
    }

    fn sync(&self) { self.revision.set(self.map().revision()); }

    // An entry with this key would land at a rank between the view's first and last entries,
    // inclusive of the gap at either end.
    fn fits(&self, key: &M::Key, closed: bool) -> bool {
        let map = self.map();
        let (start, end) = (self.start, self.end.get());

        match node::rank(&map.tree.borrow().root, &map.cmp, key) {
            Ok(rank) if closed => start <= rank + 1 && rank <= end,
            Ok(rank) => start <= rank && rank < end,
            Err(rank) => start <= rank && rank <= end,
        }
    }
}

impl<'a, M> Scope for IndexRange<'a, M> where M: SortedMap {
    type Key = M::Key;
    type Value = M::Value;
    type Cmp = M::Cmp;

    fn map(&self) -> &Map<M::Key, M::Value, M::Cmp> { self.parent.map() }

    fn check(&self) -> Result<()> {
        let expected = self.revision.get();
        let found = self.map().revision();

        if expected != found {
            debug!(expected, found, "index range observed a foreign structural change");
            return Err(Error::ConcurrentModification);
        }

        self.parent.check()
    }

    fn span(&self) -> Result<Span> {
        self.check()?;
        Ok(Span { start: self.start, end: self.end.get() })
    }

    fn admits(&self, key: &M::Key) -> bool { self.fits(key, false) && self.parent.admits(key) }

    fn encloses(&self, key: &M::Key) -> bool { self.fits(key, true) && self.parent.encloses(key) }

    fn grew(&self, count: usize) {
        self.end.set(self.end.get() + count);
        self.sync();
        self.parent.grew(count);
    }

    fn shrank(&self, count: usize) {
        self.end.set(self.end.get() - count);
        self.sync();
        self.parent.shrank(count);
    }
}

impl<'a, M> SortedMap for IndexRange<'a, M> where M: SortedMap {}

impl<'a, M> Debug for IndexRange<'a, M> where M: SortedMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("IndexRange").field("start", &self.start).field("end", &self.end.get()).finish()
    }
}
