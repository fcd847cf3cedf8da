//! An ordered map with positional access, based on a weight-balanced binary search tree.
//!
//! Every node of the tree records the size of its subtree, which gives logarithmic-time access
//! by position alongside the usual access by key: the map can return its `i`th smallest entry,
//! tell the position of a key, or remove the entry at a position.
//!
//! Views restrict the map to a range of keys or a range of positions. A view is live: it reads
//! and writes the map it was created from, and views can be nested.
//!
//! # Examples
//!
//! ```
//! use indexed_tree::{Map, SortedMap};
//!
//! let map: Map<_, _> = "abcdefg".chars().zip(1..).collect();
//!
//! assert_eq!(map.get_index(2)?, ('c', 3));
//! assert_eq!(map.index_of(&'e')?, Some(4));
//!
//! let middle = map.sub_map_by_indices(2, 5)?;
//! assert_eq!(middle.to_vec()?, [('c', 3), ('d', 4), ('e', 5)]);
//!
//! middle.remove(&'c')?;
//! assert_eq!(middle.len()?, 2);
//! assert_eq!(map.len()?, 6);
//!
//! let tail = map.tail_map('f', true)?;
//! assert_eq!(tail.first_key()?, 'f');
//! # Ok::<(), indexed_tree::Error>(())
//! ```

#![warn(missing_docs)]

mod error;
pub mod map;
mod node;

#[cfg(feature = "ordered_iter")]
mod ordered_iter;
#[cfg(feature = "quickcheck")]
mod quickcheck;

pub use crate::error::{Error, Result};
pub use crate::map::{Cursor, Entry, IndexRange, KeyRange, Map, SortedMap};
