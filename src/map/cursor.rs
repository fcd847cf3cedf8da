use std::ptr::NonNull;
use tracing::debug;
use crate::error::{Error, Result};
use crate::node::{Node, Path};
use super::SortedMap;
use super::scope::Span;

/// A bidirectional cursor over a map or view, in key order.
///
/// A cursor sits in the gap between two entries. [`next`](Iterator::next) returns the entry after
/// the gap and [`previous`](Cursor::previous) the entry before it, moving the gap past the
/// returned entry. [`remove`](Cursor::remove) deletes whichever entry was returned last.
///
/// The cursor fails with [`Error::ConcurrentModification`] once the map has been structurally
/// modified by anything other than the cursor itself. After reaching either end, a cursor keeps
/// returning `None` from that end but can still move the other way.
///
/// # Examples
///
/// ```
/// use indexed_tree::{Map, SortedMap};
///
/// let map: Map<_, _> = (1..=4).map(|i| (i, i * i)).collect();
/// let mut cursor = map.cursor()?;
///
/// assert_eq!(cursor.next().transpose()?, Some((1, 1)));
/// assert_eq!(cursor.next().transpose()?, Some((2, 4)));
/// assert_eq!(cursor.previous().transpose()?, Some((2, 4)));
///
/// cursor.remove()?;
/// assert_eq!(map.to_vec()?, [(1, 1), (3, 9), (4, 16)]);
/// assert_eq!(cursor.next().transpose()?, Some((3, 9)));
/// # Ok::<(), indexed_tree::Error>(())
/// ```
pub struct Cursor<'a, M> where M: SortedMap {
    scope: &'a M,
    path: Path<M::Key, M::Value>,
    span: Span,
    index: usize,
    last: Option<usize>,
    revision: u64,
    writes: u64,
}

impl<'a, M> Cursor<'a, M> where M: SortedMap {
    pub(crate) fn new(scope: &'a M, index: usize) -> Result<Self> {
        let span = scope.span()?;
        if index > span.len() { return Err(Error::IndexOutOfRange { index, len: span.len() }); }

        let tree = scope.map().tree.borrow();
        let index = span.start + index;

        Ok(Cursor {
            scope,
            path: Path::seek(&tree.root, index),
            span,
            index,
            last: None,
            revision: tree.revision,
            writes: tree.writes,
        })
    }

    pub(crate) fn scope(&self) -> &'a M { self.scope }

    /// Returns the revision and write count the cursor's path was taken at.
    pub(crate) fn stamp(&self) -> (u64, u64) { (self.revision, self.writes) }

    fn check(&self) -> Result<()> {
        let found = self.scope.map().revision();

        if found != self.revision {
            debug!(expected = self.revision, found, "cursor observed a foreign structural change");
            return Err(Error::ConcurrentModification);
        }

        Ok(())
    }

    /// Moves across one entry, handing it to `f` while the tree is borrowed.
    pub(crate) fn step<T, F>(&mut self, forward: bool, f: F) -> Result<Option<T>>
        where F: FnOnce(NonNull<Node<M::Key, M::Value>>, &Node<M::Key, M::Value>) -> T {

        self.check()?;
        if forward && !self.has_next() || !forward && !self.has_previous() { return Ok(None); }

        let scope = self.scope;
        let tree = scope.map().tree.borrow();

        // Values replaced since the path was taken leave its shape intact but its pointers
        // unusable.
        if tree.writes != self.writes {
            self.path = Path::seek(&tree.root, self.index);
            self.writes = tree.writes;
        }

        // The revision check guarantees that the path still describes `tree`.
        if !forward { unsafe { self.path.retreat(&tree.root) } }

        let ptr = match self.path.peek() {
            None => return Ok(None),
            Some(ptr) => ptr,
        };

        let item = f(ptr, unsafe { ptr.as_ref() });

        if forward {
            unsafe { self.path.advance() }
            self.last = Some(self.index);
            self.index += 1;
        } else {
            self.index -= 1;
            self.last = Some(self.index);
        }

        Ok(Some(item))
    }

    /// Checks if a call to `next` would return an entry.
    pub fn has_next(&self) -> bool { self.index < self.span.end }

    /// Checks if a call to `previous` would return an entry.
    pub fn has_previous(&self) -> bool { self.index > self.span.start }

    /// Returns the position of the entry a call to `next` would return.
    pub fn next_index(&self) -> usize { self.index - self.span.start }

    /// Returns the position of the entry a call to `previous` would return, or `None` at the
    /// start.
    pub fn previous_index(&self) -> Option<usize> { self.next_index().checked_sub(1) }

    /// Moves backward, returning the entry before the cursor.
    pub fn previous(&mut self) -> Option<Result<(M::Key, M::Value)>> where M::Key: Clone, M::Value: Clone {
        self.step(false, |_, node| super::clone_entry(node)).transpose()
    }

    /// Removes the entry most recently returned by `next` or `previous`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::IllegalState`] if no entry has been returned since the cursor was
    /// created or last removed an entry.
    pub fn remove(&mut self) -> Result<(M::Key, M::Value)> {
        self.check()?;
        let rank = self.last.take().ok_or(Error::IllegalState("no entry to remove"))?;

        let map = self.scope.map();
        let removed = map.tree.borrow_mut().remove_at(&map.cmp, rank).ok_or(Error::ConcurrentModification)?;
        self.scope.shrank(1);

        if rank < self.index { self.index -= 1; }
        self.span.end -= 1;

        let tree = map.tree.borrow();
        self.revision = tree.revision;
        self.writes = tree.writes;
        self.path = Path::seek(&tree.root, self.index);
        Ok(removed)
    }

    /// Always fails: insertion position is determined by the key.
    pub fn add(&mut self, _key: M::Key, _value: M::Value) -> Result<()> {
        Err(Error::Unsupported("inserting through a cursor"))
    }

    /// Always fails: values are replaced through entry handles.
    pub fn set(&mut self, _value: M::Value) -> Result<()> {
        Err(Error::Unsupported("replacing through a cursor"))
    }
}

impl<'a, M> Iterator for Cursor<'a, M> where M: SortedMap, M::Key: Clone, M::Value: Clone {
    type Item = Result<(M::Key, M::Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.step(true, |_, node| super::clone_entry(node)).transpose()
    }
}
