//! Weight-balanced tree storage.
//!
//! Every node records the size of its subtree, and for every node the sizes of its two
//! subtrees differ by at most one. Balance is restored by *shifting*: the entry nearest to an
//! unbalanced node is removed from its heavier subtree, swapped into the node, and the node's
//! previous entry is reinserted into the lighter subtree.

mod iter;


use compare::Compare;
use std::cmp::Ordering::{self, *};
use std::mem;
use std::ops::Range;
use tracing::trace;

pub use self::iter::{Iter, Path};

pub type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Clone)]
pub struct Node<K, V> {
    left: Link<K, V>,
    right: Link<K, V>,
    size: usize,
    key: K,
    value: V,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        Node { left: None, right: None, size: 1, key, value }
    }

    pub fn key(&self) -> &K { &self.key }

    pub fn value(&self) -> &V { &self.value }

    pub fn value_mut(&mut self) -> &mut V { &mut self.value }
}

fn into_entry<K, V>(node: Box<Node<K, V>>) -> (K, V) {
    let node = *node;
    (node.key, node.value)
}

/// Returns the number of entries in the subtree at `link`.
pub fn size<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |node| node.size)
}

/// Inserts an entry, returning the previous value if the key was already present.
pub fn insert<K, V, C>(link: &mut Link<K, V>, cmp: &C, key: K, value: V) -> Option<V>
    where C: Compare<K> {

    insert_node(link, cmp, Box::new(Node::new(key, value)))
}

fn insert_node<K, V, C>(link: &mut Link<K, V>, cmp: &C, leaf: Box<Node<K, V>>) -> Option<V>
    where C: Compare<K> {

    let node = match *link {
        None => {
            *link = Some(leaf);
            return None;
        }
        Some(ref mut node) => node,
    };

    let old_value = match cmp.compare(&leaf.key, &node.key) {
        Equal => {
            let Node { value, .. } = *leaf;
            return Some(mem::replace(&mut node.value, value));
        }
        Less => insert_node(&mut node.left, cmp, leaf),
        Greater => insert_node(&mut node.right, cmp, leaf),
    };

    if old_value.is_none() {
        node.size += 1;
        rebalance(node, cmp);
    }

    old_value
}

fn rebalance<K, V, C>(node: &mut Node<K, V>, cmp: &C) where C: Compare<K> {
    let left = size(&node.left);
    let right = size(&node.right);

    if right > left + 1 {
        shift::<Left, _, _, _>(node, cmp);
    } else if left > right + 1 {
        shift::<Right, _, _, _>(node, cmp);
    }
}

// Moves one entry from the `D::Opposite` subtree into the `D` subtree, through `node`.
fn shift<D, K, V, C>(node: &mut Node<K, V>, cmp: &C) where D: Dir, C: Compare<K> {
    trace!(size = node.size, toward_left = D::left(), "shift");

    let mut moved = match D::remove_extremum(D::Opposite::forward_mut(node), cmp) {
        None => return,
        Some(moved) => moved,
    };

    mem::swap(&mut node.key, &mut moved.key);
    mem::swap(&mut node.value, &mut moved.value);
    insert_node(D::forward_mut(node), cmp, moved);
}

// `step` steers the descent: `Less`/`Greater` go left/right, `Equal` removes the node and
// `None` abandons the removal.
fn remove_by<K, V, C, F>(link: &mut Link<K, V>, cmp: &C, step: &mut F) -> Option<Box<Node<K, V>>>
    where C: Compare<K>, F: FnMut(&Node<K, V>) -> Option<Ordering> {

    let node = link.as_mut()?;

    let removed = match step(&**node)? {
        Less => remove_by(&mut node.left, cmp, step)?,
        Greater => remove_by(&mut node.right, cmp, step)?,
        Equal => return unlink(link, cmp),
    };

    node.size -= 1;
    rebalance(node, cmp);
    Some(removed)
}

// A node with two children trades places with its predecessor, which is then unlinked from the
// left subtree instead, so the detached node never has more than one child.
fn unlink<K, V, C>(link: &mut Link<K, V>, cmp: &C) -> Option<Box<Node<K, V>>>
    where C: Compare<K> {

    let node = link.as_mut()?;

    if node.left.is_some() && node.right.is_some() {
        let mut pred = Right::remove_extremum(&mut node.left, cmp)?;
        mem::swap(&mut node.key, &mut pred.key);
        mem::swap(&mut node.value, &mut pred.value);
        node.size -= 1;
        rebalance(node, cmp);
        return Some(pred);
    }

    let mut node = link.take()?;
    *link = node.left.take().or_else(|| node.right.take());
    node.size = 1;
    Some(node)
}

/// Removes the entry with the given key, provided its rank lies in `ranks`.
pub fn remove<K, V, C, Q: ?Sized>(link: &mut Link<K, V>, cmp: &C, key: &Q, ranks: Range<usize>)
    -> Option<(K, V)> where C: Compare<K> + Compare<Q, K> {

    let mut rank = 0;

    remove_by(link, cmp, &mut |node: &Node<K, V>| {
        match Compare::<Q, K>::compare(cmp, key, &node.key) {
            Less => Some(Less),
            Equal if ranks.contains(&(rank + size(&node.left))) => Some(Equal),
            Equal => None,
            Greater => {
                rank += size(&node.left) + 1;
                Some(Greater)
            }
        }
    }).map(into_entry)
}

/// Removes the entry of the given rank.
pub fn remove_at<K, V, C>(link: &mut Link<K, V>, cmp: &C, mut index: usize) -> Option<(K, V)>
    where C: Compare<K> {

    remove_by(link, cmp, &mut |node: &Node<K, V>| {
        let left = size(&node.left);

        Some(match index.cmp(&left) {
            Less => Less,
            Equal => Equal,
            Greater => {
                index -= left + 1;
                Greater
            }
        })
    }).map(into_entry)
}

/// Returns the node of the given rank.
pub fn select<K, V>(mut link: &Link<K, V>, mut index: usize) -> Option<&Node<K, V>> {
    while let Some(ref node) = *link {
        let left = size(&node.left);

        match index.cmp(&left) {
            Less => link = &node.left,
            Equal => return Some(&**node),
            Greater => {
                index -= left + 1;
                link = &node.right;
            }
        }
    }

    None
}

/// Returns the node with the given key, mutably.
pub fn get_mut<'a, K, V, C, Q: ?Sized>(link: &'a mut Link<K, V>, cmp: &C, key: &Q)
    -> Option<&'a mut Node<K, V>> where C: Compare<Q, K> {

    let node = link.as_deref_mut()?;

    match cmp.compare(key, &node.key) {
        Less => get_mut(&mut node.left, cmp, key),
        Equal => Some(node),
        Greater => get_mut(&mut node.right, cmp, key),
    }
}

/// Finds the node with the given key and its rank, or the rank at which the key would be
/// inserted.
pub fn locate<'a, K, V, C, Q: ?Sized>(mut link: &'a Link<K, V>, cmp: &C, key: &Q)
    -> Result<(usize, &'a Node<K, V>), usize> where C: Compare<Q, K> {

    let mut rank = 0;

    while let Some(ref node) = *link {
        match cmp.compare(key, &node.key) {
            Less => link = &node.left,
            Equal => return Ok((rank + size(&node.left), &**node)),
            Greater => {
                rank += size(&node.left) + 1;
                link = &node.right;
            }
        }
    }

    Err(rank)
}

/// Returns the rank of the given key, or the rank at which it would be inserted.
pub fn rank<K, V, C, Q: ?Sized>(link: &Link<K, V>, cmp: &C, key: &Q) -> Result<usize, usize>
    where C: Compare<Q, K> {

    locate(link, cmp, key).map(|(rank, _)| rank)
}

/// Builds a perfectly balanced tree from `len` entries yielded in ascending order.
pub fn build<K, V, I>(entries: &mut I, len: usize) -> Link<K, V> where I: Iterator<Item = (K, V)> {
    if len == 0 { return None; }

    let left_len = (len - 1) / 2;
    let left = build(entries, left_len);
    let (key, value) = entries.next()?;
    let right = build(entries, len - 1 - left_len);

    Some(Box::new(Node { left, right, size: len, key, value }))
}

pub trait Dir: Sized {
    type Opposite: Dir<Opposite = Self>;

    fn left() -> bool;

    fn forward<K, V>(node: &Node<K, V>) -> &Link<K, V>;
    fn forward_mut<K, V>(node: &mut Node<K, V>) -> &mut Link<K, V>;

    /// Detaches the extreme node of the subtree at `link` as a fresh leaf.
    fn remove_extremum<K, V, C>(link: &mut Link<K, V>, cmp: &C) -> Option<Box<Node<K, V>>>
        where C: Compare<K> {

        let node = link.as_mut()?;

        if Self::forward(node).is_none() {
            let mut node = link.take()?;
            *link = Self::Opposite::forward_mut(&mut node).take();
            node.size = 1;
            return Some(node);
        }

        let removed = Self::remove_extremum(Self::forward_mut(node), cmp);
        node.size -= 1;
        rebalance(node, cmp);
        removed
    }

    /// Finds the nearest node on the `Self` side of `key`, together with its rank: the
    /// predecessor for `Left`, the successor for `Right`. `inclusive` admits `key` itself.
    fn closest<'a, K, V, C, Q: ?Sized>(mut link: &'a Link<K, V>, cmp: &C, key: &Q, inclusive: bool)
        -> Option<(usize, &'a Node<K, V>)> where C: Compare<Q, K> {

        let mut base = 0;
        let mut closest = None;

        while let Some(ref node) = *link {
            let rank = base + size(&node.left);

            let go_right = match cmp.compare(key, &node.key) {
                Equal if inclusive => return Some((rank, &**node)),
                Equal => !Self::left(),
                Greater => {
                    if Self::left() { closest = Some((rank, &**node)); }
                    true
                }
                Less => {
                    if !Self::left() { closest = Some((rank, &**node)); }
                    false
                }
            };

            if go_right {
                base = rank + 1;
                link = &node.right;
            } else {
                link = &node.left;
            }
        }

        closest
    }
}

pub enum Left {}

impl Dir for Left {
    type Opposite = Right;

    fn left() -> bool { true }

    fn forward<K, V>(node: &Node<K, V>) -> &Link<K, V> { &node.left }
    fn forward_mut<K, V>(node: &mut Node<K, V>) -> &mut Link<K, V> { &mut node.left }
}

pub enum Right {}

impl Dir for Right {
    type Opposite = Left;

    fn left() -> bool { false }

    fn forward<K, V>(node: &Node<K, V>) -> &Link<K, V> { &node.right }
    fn forward_mut<K, V>(node: &mut Node<K, V>) -> &mut Link<K, V> { &mut node.right }
}
