use std::collections::VecDeque;
use std::ptr::{self, NonNull};
use self::visit::{Seen, Visit};
use super::{Dir, Left, Link, Node, Right};

pub trait NodeRef: Sized {
    type Item;
    fn item(self) -> Self::Item;
    fn left(&mut self) -> Option<Self>;
    fn right(&mut self) -> Option<Self>;
}

impl<'a, K, V> NodeRef for &'a Node<K, V> {
    type Item = (&'a K, &'a V);
    fn item(self) -> (&'a K, &'a V) { (&self.key, &self.value) }
    fn left(&mut self) -> Option<&'a Node<K, V>> { self.left.as_deref() }
    fn right(&mut self) -> Option<&'a Node<K, V>> { self.right.as_deref() }
}

impl<K, V> NodeRef for Box<Node<K, V>> {
    type Item = (K, V);
    fn item(self) -> (K, V) { super::into_entry(self) }
    fn left(&mut self) -> Link<K, V> { self.left.take() }
    fn right(&mut self) -> Link<K, V> { self.right.take() }
}

/// A double-ended in-order traversal, either borrowing or consuming the nodes.
///
/// Forward iteration works at the back of the deque and backward iteration at the front, so
/// both ends can be advanced independently.
pub struct Iter<N> where N: NodeRef {
    visits: VecDeque<Visit<N>>,
    size: usize,
}

impl<N> Iter<N> where N: NodeRef {
    pub fn new(root: Option<N>, size: usize) -> Self {
        Iter { visits: root.into_iter().map(Visit::new).collect(), size }
    }
}

enum Op<T> {
    Push(Option<T>),
    PopPush(Option<T>),
    Pop,
}

impl<N> Iterator for Iter<N> where N: NodeRef {
    type Item = N::Item;

    fn next(&mut self) -> Option<N::Item> {
        loop {
            let visit = self.visits.back_mut()?;

            let op = match visit.seen() {
                Seen::N | Seen::R => Op::Push(visit.left()),
                Seen::L => Op::PopPush(visit.right()),
                Seen::B => Op::Pop,
            };

            match op {
                Op::Push(node) => self.visits.extend(node.map(Visit::new)),
                Op::PopPush(node) => {
                    let visit = self.visits.pop_back()?;
                    self.visits.extend(node.map(Visit::new));
                    self.size -= 1;
                    return Some(visit.item());
                }
                Op::Pop => {
                    let visit = self.visits.pop_back()?;
                    self.size -= 1;
                    return Some(visit.item());
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (self.size, Some(self.size)) }
}

impl<N> DoubleEndedIterator for Iter<N> where N: NodeRef {
    fn next_back(&mut self) -> Option<N::Item> {
        loop {
            let visit = self.visits.front_mut()?;

            let op = match visit.seen() {
                Seen::N | Seen::L => Op::Push(visit.right()),
                Seen::R => Op::PopPush(visit.left()),
                Seen::B => Op::Pop,
            };

            match op {
                Op::Push(node) => if let Some(node) = node { self.visits.push_front(Visit::new(node)); },
                Op::PopPush(node) => {
                    let visit = self.visits.pop_front()?;
                    if let Some(node) = node { self.visits.push_front(Visit::new(node)); }
                    self.size -= 1;
                    return Some(visit.item());
                }
                Op::Pop => {
                    let visit = self.visits.pop_front()?;
                    self.size -= 1;
                    return Some(visit.item());
                }
            }
        }
    }
}

impl<N> ExactSizeIterator for Iter<N> where N: NodeRef {}

mod visit {
    pub struct Visit<N> {
        node: N,
        seen: Seen,
    }

    impl<N> Visit<N> where N: super::NodeRef {
        pub fn new(node: N) -> Self { Visit { node, seen: Seen::N } }

        pub fn left(&mut self) -> Option<N> {
            match self.seen {
                Seen::N => { self.seen = Seen::L; self.node.left() }
                Seen::R => { self.seen = Seen::B; self.node.left() }
                Seen::L | Seen::B => None,
            }
        }

        pub fn right(&mut self) -> Option<N> {
            match self.seen {
                Seen::N => { self.seen = Seen::R; self.node.right() }
                Seen::L => { self.seen = Seen::B; self.node.right() }
                Seen::R | Seen::B => None,
            }
        }

        pub fn item(self) -> N::Item { self.node.item() }

        pub fn seen(&self) -> Seen { self.seen }
    }

    /// Which of a node's children have been handed out.
    #[derive(Clone, Copy)]
    pub enum Seen {
        N,
        L,
        R,
        B,
    }
}

/// The chain of nodes from the root down to a cursor's next node.
///
/// An empty path stands for the position after the last entry. Paths hold raw pointers and are
/// only meaningful while the tree they were taken from is structurally unchanged.
pub struct Path<K, V> {
    stack: Vec<NonNull<Node<K, V>>>,
}

impl<K, V> Path<K, V> {
    /// Returns the path to the node of the given rank.
    pub fn seek(root: &Link<K, V>, mut index: usize) -> Self {
        let mut stack = vec![];
        let mut link = root;

        while let Some(ref node) = *link {
            stack.push(NonNull::from(&**node));
            let left = super::size(&node.left);

            if index < left {
                link = &node.left;
            } else if index == left {
                return Path { stack };
            } else {
                index -= left + 1;
                link = &node.right;
            }
        }

        stack.clear();
        Path { stack }
    }

    pub fn peek(&self) -> Option<NonNull<Node<K, V>>> { self.stack.last().copied() }

    /// Moves to the in-order successor.
    ///
    /// # Safety
    ///
    /// The tree must not have been structurally modified since the path was taken.
    pub unsafe fn advance(&mut self) { self.step::<Right>() }

    /// Moves to the in-order predecessor, or to the last node if the path is empty.
    ///
    /// # Safety
    ///
    /// `root` must be the root of the tree the path was taken from, and the tree must not have
    /// been structurally modified since.
    pub unsafe fn retreat(&mut self, root: &Link<K, V>) {
        if self.stack.is_empty() {
            if let Some(root) = root.as_deref() { self.push_extremum::<Right>(root); }
        } else {
            self.step::<Left>();
        }
    }

    unsafe fn step<D>(&mut self) where D: Dir {
        let top = match self.stack.last() {
            None => return,
            Some(&top) => top.as_ref(),
        };

        if let Some(child) = D::forward(top).as_deref() {
            self.push_extremum::<D::Opposite>(child);
            return;
        }

        while let Some(child) = self.stack.pop() {
            match self.stack.last() {
                Some(parent) if is_child::<D::Opposite, _, _>(parent.as_ref(), child) => return,
                Some(_) => {}
                None => return,
            }
        }
    }

    fn push_extremum<D>(&mut self, mut node: &Node<K, V>) where D: Dir {
        loop {
            self.stack.push(NonNull::from(node));

            match D::forward(node).as_deref() {
                None => return,
                Some(child) => node = child,
            }
        }
    }
}

fn is_child<D, K, V>(parent: &Node<K, V>, child: NonNull<Node<K, V>>) -> bool where D: Dir {
    D::forward(parent).as_deref().map_or(false, |node| ptr::eq(node, child.as_ptr()))
}
