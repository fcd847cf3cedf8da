use compare::Compare;
use std::cell::Cell;
use std::fmt::{self, Debug};
use std::mem;
use std::ptr::NonNull;
use tracing::trace;
use crate::error::{Error, Result};
use crate::node::{self, Node};
use super::{Map, Tree};

/// A handle to a single entry of a map, obtained from an [`Entries`](super::Entries) iterator.
///
/// The handle outlives structural changes to the map: once the map has changed, it looks its
/// key up again, failing with [`Error::ConcurrentModification`] if the key has been removed.
pub struct Entry<'a, K, V, C> where C: Compare<K> {
    map: &'a Map<K, V, C>,
    key: K,
    node: Cell<NonNull<Node<K, V>>>,
    revision: Cell<u64>,
    writes: Cell<u64>,
}

impl<'a, K, V, C> Entry<'a, K, V, C> where C: Compare<K> {
    pub(crate) fn new(map: &'a Map<K, V, C>, key: K, node: NonNull<Node<K, V>>, revision: u64, writes: u64)
        -> Self {

        Entry { map, key, node: Cell::new(node), revision: Cell::new(revision), writes: Cell::new(writes) }
    }

    fn resolve(&self, tree: &Tree<K, V>) -> Result<NonNull<Node<K, V>>> {
        if tree.writes == self.writes.get() { return Ok(self.node.get()); }

        if tree.revision != self.revision.get() {
            trace!(from = self.revision.get(), to = tree.revision, "re-resolving entry");
        }

        match node::locate(&tree.root, &self.map.cmp, &self.key) {
            Ok((_, node)) => {
                let node = NonNull::from(node);
                self.node.set(node);
                self.revision.set(tree.revision);
                self.writes.set(tree.writes);
                Ok(node)
            }
            Err(_) => Err(Error::ConcurrentModification),
        }
    }

    /// Returns the entry's key.
    pub fn key(&self) -> &K { &self.key }

    /// Returns a copy of the entry's current value.
    pub fn value(&self) -> Result<V> where V: Clone {
        let tree = self.map.tree.borrow();
        let node = self.resolve(&tree)?;
        Ok(unsafe { node.as_ref() }.value().clone())
    }

    /// Replaces the entry's value, returning the previous one.
    ///
    /// This is not a structural change: cursors and views over the map stay valid.
    pub fn set_value(&self, value: V) -> Result<V> {
        let mut tree = self.map.tree.borrow_mut();
        let tree = &mut *tree;

        let node = node::get_mut(tree.root_mut(), &self.map.cmp, &self.key).ok_or(Error::ConcurrentModification)?;
        let old_value = mem::replace(node.value_mut(), value);
        self.node.set(NonNull::from(&*node));
        self.revision.set(tree.revision);
        self.writes.set(tree.writes);
        Ok(old_value)
    }
}

impl<'a, K, V, C> Debug for Entry<'a, K, V, C> where K: Debug, C: Compare<K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Entry").field("key", &self.key).finish()
    }
}
