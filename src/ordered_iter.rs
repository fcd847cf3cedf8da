use ::ordered_iter::OrderedMapIterator;
use crate::map::IntoIter;

impl<K, V> OrderedMapIterator for IntoIter<K, V> where K: Ord {
    type Key = K;
    type Val = V;
}
