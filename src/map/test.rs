use compare::{natural, Compare};
use std::ops::Bound::*;
use crate::error::{Error, Result};
use super::{Map, SortedMap};

fn letters() -> Map<&'static str, usize> {
    let map = Map::new();
    for (i, key) in ["a", "b", "c", "d", "e", "f", "g"].iter().enumerate() { map.insert(*key, i).unwrap(); }
    map
}

fn numbers(len: u32) -> Map<u32, u32> {
    (0..len).map(|key| (key, key * 10)).collect()
}

fn keys<M>(map: &M) -> Vec<M::Key> where M: SortedMap, M::Key: Clone {
    map.keys().iter().unwrap().collect::<Result<_>>().unwrap()
}

#[test]
fn basic() {
    let map = Map::new();
    assert_eq!(map.insert("m", 1), Ok(None));

    assert_eq!(map.len(), Ok(1));
    assert_eq!(map.first_key(), Ok("m"));
    assert_eq!(map.index_of(&"m"), Ok(Some(0)));
}

#[test]
fn rank_after_delete() {
    let map = letters();
    assert_eq!(map.get_index(3), Ok(("d", 3)));

    assert_eq!(map.remove(&"d"), Ok(Some(3)));
    assert_eq!(map.get_index(3), Ok(("e", 4)));
    assert_eq!(map.index_of(&"e"), Ok(Some(3)));
    assert_eq!(map.index_of(&"d"), Ok(None));
    assert_eq!(map.len(), Ok(6));
}

#[test]
fn rank_consistency() {
    let map = numbers(40);
    for i in (0..40).step_by(3) { map.remove(&i).unwrap(); }

    let len = map.len().unwrap();
    for i in 0..len {
        let (key, _) = map.get_index(i).unwrap();
        assert_eq!(map.index_of(&key), Ok(Some(i)));
    }
}

#[test]
fn navigation() {
    let map = Map::new();
    for (i, key) in ["abc", "def", "ghi"].iter().enumerate() { map.insert(*key, i).unwrap(); }

    assert_eq!(map.floor_key(&"ddd"), Ok(Some("abc")));
    assert_eq!(map.ceiling_key(&"ddd"), Ok(Some("def")));
    assert_eq!(map.lower_key(&"def"), Ok(Some("abc")));
    assert_eq!(map.higher_key(&"def"), Ok(Some("ghi")));

    assert_eq!(map.floor_entry(&"def"), Ok(Some(("def", 1))));
    assert_eq!(map.lower_entry(&"abc"), Ok(None));
    assert_eq!(map.higher_entry(&"ghi"), Ok(None));
    assert_eq!(map.ceiling_entry(&"a"), Ok(Some(("abc", 0))));
}

#[test]
fn extrema() {
    let map = numbers(5);

    assert_eq!(map.first_entry(), Ok(Some((0, 0))));
    assert_eq!(map.last_entry(), Ok(Some((4, 40))));
    assert_eq!(map.last_key(), Ok(4));
    assert_eq!(map.poll_last(), Ok(Some((4, 40))));
    assert_eq!(map.poll_first(), Ok(Some((0, 0))));
    assert_eq!(keys(&map), [1, 2, 3]);

    map.clear().unwrap();
    assert_eq!(map.is_empty(), Ok(true));
    assert_eq!(map.first_key(), Err(Error::NotFound));
    assert_eq!(map.last_key(), Err(Error::NotFound));
    assert_eq!(map.first_entry(), Ok(None));
    assert_eq!(map.poll_first(), Ok(None));
}

#[test]
fn fail_fast() {
    let map = letters();
    let mut cursor = map.cursor().unwrap();
    assert_eq!(cursor.next(), Some(Ok(("a", 0))));

    map.insert("h", 7).unwrap();
    assert_eq!(cursor.next(), Some(Err(Error::ConcurrentModification)));
    assert_eq!(cursor.remove(), Err(Error::ConcurrentModification));
}

#[test]
fn replacing_a_value_is_not_structural() {
    let map = letters();
    let mut cursor = map.cursor().unwrap();
    assert_eq!(cursor.next(), Some(Ok(("a", 0))));

    assert_eq!(map.insert("b", 10), Ok(Some(1)));
    assert_eq!(cursor.next(), Some(Ok(("b", 10))));
}

#[test]
fn replaced_values_are_seen_through_cached_positions() {
    let map = numbers(8);
    let handles: Vec<_> = map.entries().iter().unwrap().collect::<Result<_>>().unwrap();
    let mut cursor = map.cursor_at(3).unwrap();
    assert_eq!(cursor.next(), Some(Ok((3, 30))));

    let (revision, writes) = (map.revision(), map.tree.borrow().writes);
    assert_eq!(handles[4].set_value(41), Ok(40));
    assert_eq!(map.insert(2, 21), Ok(Some(20)));
    assert_eq!(map.revision(), revision);
    assert!(map.tree.borrow().writes != writes);

    assert_eq!(cursor.next(), Some(Ok((4, 41))));
    assert_eq!(cursor.previous(), Some(Ok((4, 41))));
    assert_eq!(cursor.previous(), Some(Ok((3, 30))));
    assert_eq!(cursor.previous(), Some(Ok((2, 21))));
    assert_eq!(handles[2].value(), Ok(21));
    assert_eq!(handles[4].set_value(42), Ok(41));
    assert_eq!(handles[4].value(), Ok(42));
}

#[test]
fn cursor_walks_both_ways() {
    let map = numbers(20);
    let mut cursor = map.cursor().unwrap();
    assert!(!cursor.has_previous());
    assert_eq!(cursor.previous_index(), None);

    let forward: Vec<u32> = cursor.by_ref().map(|e| e.unwrap().0).collect();
    assert_eq!(forward, (0..20).collect::<Vec<_>>());
    assert!(!cursor.has_next());
    assert_eq!(cursor.next_index(), 20);

    let mut backward = vec![];
    while let Some(entry) = cursor.previous() { backward.push(entry.unwrap().0); }
    assert_eq!(backward, (0..20).rev().collect::<Vec<_>>());
    assert_eq!(cursor.next(), Some(Ok((0, 0))));
}

#[test]
fn cursor_starts_anywhere() {
    let map = numbers(10);

    let mut cursor = map.cursor_at(4).unwrap();
    assert_eq!(cursor.next_index(), 4);
    assert_eq!(cursor.previous_index(), Some(3));
    assert_eq!(cursor.next(), Some(Ok((4, 40))));

    let mut cursor = map.cursor_at(10).unwrap();
    assert_eq!(cursor.next(), None);
    assert_eq!(cursor.previous(), Some(Ok((9, 90))));

    assert_eq!(map.cursor_at(11).err(), Some(Error::IndexOutOfRange { index: 11, len: 10 }));
}

#[test]
fn cursor_remove() {
    let map = numbers(10);
    let mut cursor = map.cursor().unwrap();
    assert_eq!(cursor.remove(), Err(Error::IllegalState("no entry to remove")));

    while let Some(entry) = cursor.next() {
        if entry.unwrap().0 % 2 == 0 { cursor.remove().unwrap(); }
    }

    assert_eq!(keys(&map), [1, 3, 5, 7, 9]);

    assert_eq!(cursor.previous(), Some(Ok((9, 90))));
    assert_eq!(cursor.remove(), Ok((9, 90)));
    assert_eq!(cursor.remove(), Err(Error::IllegalState("no entry to remove")));
    assert_eq!(cursor.previous(), Some(Ok((7, 70))));
    assert_eq!(cursor.next(), Some(Ok((7, 70))));
    assert_eq!(cursor.next(), None);
}

#[test]
fn cursor_rejects_insertion_and_replacement() {
    let map = numbers(3);
    let mut cursor = map.cursor().unwrap();
    cursor.next();

    assert!(matches!(cursor.add(7, 70), Err(Error::Unsupported(_))));
    assert!(matches!(cursor.set(70), Err(Error::Unsupported(_))));
    assert_eq!(map.len(), Ok(3));
}

#[test]
fn index_range_coherence() {
    let map = letters();
    let view = map.sub_map_by_indices(2, 5).unwrap();
    assert_eq!(keys(&view), ["c", "d", "e"]);

    assert_eq!(view.poll_first(), Ok(Some(("c", 2))));
    assert_eq!(keys(&view), ["d", "e"]);
    assert_eq!(view.len(), Ok(2));
    assert_eq!(map.len(), Ok(6));
}

#[test]
fn index_range_reads_are_relative() {
    let map: Map<u32, u32> = (0..10).map(|key| (key * 2, key)).collect();
    let view = map.sub_map_by_indices(2, 5).unwrap();

    assert_eq!(view.get_index(0), Ok((4, 2)));
    assert_eq!(view.get_index(3), Err(Error::IndexOutOfRange { index: 3, len: 3 }));
    assert_eq!(view.index_of(&8), Ok(Some(2)));
    assert_eq!(view.get(&10), Ok(None));
    assert_eq!(view.contains_key(&2), Ok(false));

    assert_eq!(view.floor_key(&100), Ok(Some(8)));
    assert_eq!(view.ceiling_key(&1), Ok(Some(4)));
    assert_eq!(view.lower_key(&4), Ok(None));
    assert_eq!(view.higher_key(&8), Ok(None));
    assert_eq!(view.higher_key(&5), Ok(Some(6)));
}

#[test]
fn index_range_admits_keys_between_its_neighbors() {
    let map: Map<u32, u32> = (0..10).map(|key| (key * 2, key)).collect();
    let view = map.sub_map_by_indices(2, 5).unwrap();

    assert_eq!(view.insert(3, 0), Ok(None));
    assert_eq!(view.insert(9, 0), Ok(None));
    assert_eq!(view.insert(1, 0), Err(Error::KeyOutOfRange));
    assert_eq!(view.insert(10, 0), Err(Error::KeyOutOfRange));

    assert_eq!(keys(&view), [3, 4, 6, 8, 9]);
    assert_eq!(map.len(), Ok(12));
}

#[test]
fn nested_index_ranges_propagate() {
    let map = numbers(10);
    let outer = map.sub_map_by_indices(2, 8).unwrap();
    let inner = outer.sub_map_by_indices(1, 4).unwrap();
    assert_eq!(keys(&inner), [3, 4, 5]);

    assert_eq!(inner.remove(&4), Ok(Some(40)));
    assert_eq!(inner.len(), Ok(2));
    assert_eq!(outer.len(), Ok(5));
    assert_eq!(map.len(), Ok(9));

    assert_eq!(inner.insert(4, 44), Ok(None));
    assert_eq!(keys(&inner), [3, 4, 5]);
    assert_eq!(keys(&outer), [2, 3, 4, 5, 6, 7]);

    assert_eq!(outer.remove(&7), Ok(Some(70)));
    assert_eq!(inner.len(), Err(Error::ConcurrentModification));
    assert_eq!(keys(&outer), [2, 3, 4, 5, 6]);

    map.insert(100, 0).unwrap();
    assert_eq!(outer.len(), Err(Error::ConcurrentModification));
    assert_eq!(outer.get(&3), Err(Error::ConcurrentModification));
    assert_eq!(outer.insert(3, 0), Err(Error::ConcurrentModification));
}

#[test]
fn key_range_follows_the_map() {
    let map = numbers(10);
    let head = map.head_map(5, false).unwrap();
    assert_eq!(keys(&head), [0, 1, 2, 3, 4]);

    map.remove(&2).unwrap();
    map.insert(20, 0).unwrap();
    assert_eq!(keys(&head), [0, 1, 3, 4]);

    assert_eq!(head.insert(2, 2), Ok(None));
    assert_eq!(head.insert(5, 5), Err(Error::KeyOutOfRange));
    assert_eq!(map.get(&2), Ok(Some(2)));
    assert_eq!(head.len(), Ok(5));
}

#[test]
fn key_range_bounds() {
    let map = numbers(10);

    let range = map.range(Included(3), Excluded(7)).unwrap();
    assert_eq!(keys(&range), [3, 4, 5, 6]);
    assert_eq!(range.lower_key(&3), Ok(None));
    assert_eq!(range.floor_key(&100), Ok(Some(6)));
    assert_eq!(range.ceiling_key(&0), Ok(Some(3)));
    assert_eq!(range.higher_key(&6), Ok(None));
    assert_eq!(range.get(&8), Ok(None));
    assert_eq!(range.index_of(&5), Ok(Some(2)));
    assert_eq!(range.get_index(1), Ok((4, 40)));

    assert_eq!(keys(&map.sub_map(3, false, 7, true).unwrap()), [4, 5, 6, 7]);
    assert_eq!(keys(&map.tail_map(8, true).unwrap()), [8, 9]);
    assert_eq!(keys(&map.head_map(0, true).unwrap()), [0]);
    assert_eq!(keys(&map.sub_map(4, false, 4, false).unwrap()), Vec::<u32>::new());
}

#[test]
fn nested_key_ranges() {
    let map = numbers(20);
    let outer = map.range(Included(5), Included(15)).unwrap();
    let inner = outer.range(Excluded(8), Unbounded).unwrap();
    assert_eq!(inner.first_key(), Ok(9));
    assert_eq!(inner.last_key(), Ok(15));

    assert_eq!(outer.tail_map(16, true).err(), Some(Error::KeyOutOfRange));
    assert_eq!(outer.head_map(4, true).err(), Some(Error::KeyOutOfRange));
    assert_eq!(inner.insert(16, 0), Err(Error::KeyOutOfRange));
    assert_eq!(inner.insert(8, 0), Err(Error::KeyOutOfRange));
}

#[test]
fn key_range_over_index_range() {
    let map = letters();
    let view = map.sub_map_by_indices(1, 6).unwrap();
    let head = view.head_map("d", true).unwrap();
    assert_eq!(keys(&head), ["b", "c", "d"]);

    assert_eq!(head.remove(&"c"), Ok(Some(2)));
    assert_eq!(view.len(), Ok(4));

    assert_eq!(head.insert("a", 0), Err(Error::KeyOutOfRange));
    assert_eq!(head.insert("c", 22), Ok(None));
    assert_eq!(keys(&view), ["b", "c", "d", "e", "f"]);
}

#[test]
fn invalid_ranges() {
    let map = numbers(5);

    assert_eq!(map.get_index(5), Err(Error::IndexOutOfRange { index: 5, len: 5 }));
    assert_eq!(map.remove_index(7), Err(Error::IndexOutOfRange { index: 7, len: 5 }));
    assert_eq!(map.sub_map_by_indices(3, 2).err(), Some(Error::InvalidIndexRange { start: 3, end: 2, len: 5 }));
    assert_eq!(map.sub_map_by_indices(0, 6).err(), Some(Error::InvalidIndexRange { start: 0, end: 6, len: 5 }));
    assert_eq!(map.sub_map(4, true, 2, true).err(), Some(Error::InvalidKeyRange));

    let view = map.sub_map_by_indices(1, 3).unwrap();
    assert!(view.sub_map_by_indices(0, 3).is_err());
    assert!(view.sub_map_by_indices(0, 2).is_ok());
}

#[test]
fn clearing_a_view() {
    let map = numbers(10);

    map.range(Included(3), Excluded(7)).unwrap().clear().unwrap();
    assert_eq!(keys(&map), [0, 1, 2, 7, 8, 9]);

    let view = map.sub_map_by_indices(1, 4).unwrap();
    view.clear().unwrap();
    assert_eq!(view.len(), Ok(0));
    assert_eq!(keys(&map), [0, 8, 9]);

    assert_eq!(view.insert(5, 50), Ok(None));
    assert_eq!(keys(&view), [5]);
}

#[test]
fn cursor_over_views() {
    let map = numbers(10);
    let view = map.sub_map_by_indices(2, 8).unwrap();
    let range = view.range(Included(4), Unbounded).unwrap();

    let mut cursor = range.cursor().unwrap();
    assert_eq!(cursor.next(), Some(Ok((4, 40))));
    cursor.remove().unwrap();
    assert_eq!(cursor.next(), Some(Ok((5, 50))));
    assert_eq!(cursor.next_index(), 1);

    let rest: Vec<u32> = cursor.map(|e| e.unwrap().0).collect();
    assert_eq!(rest, [6, 7]);
    assert_eq!(keys(&view), [2, 3, 5, 6, 7]);
    assert_eq!(map.len(), Ok(9));
}

#[test]
fn put_all() {
    let source = numbers(50);

    let target: Map<u32, u32> = Map::new();
    target.put_all(&source).unwrap();
    assert_eq!(target, source);

    let partial: Map<u32, u32> = Map::new();
    partial.put_all(&source.range(Included(10), Excluded(20)).unwrap()).unwrap();
    partial.put_all(&source.sub_map_by_indices(15, 25).unwrap()).unwrap();
    assert_eq!(keys(&partial), (10..25).collect::<Vec<_>>());

    let view = partial.sub_map_by_indices(0, 2).unwrap();
    assert_eq!(view.put_all(&source), Err(Error::KeyOutOfRange));
    assert_eq!(partial.len(), Ok(15));
}

#[test]
fn putting_nothing_is_not_structural() {
    let nothing: Map<u32, u32> = Map::new();

    let empty: Map<u32, u32> = Map::new();
    let view = empty.sub_map_by_indices(0, 0).unwrap();
    let mut cursor = empty.cursor().unwrap();
    let revision = empty.revision();

    assert_eq!(view.put_all(&nothing), Ok(()));
    assert_eq!(empty.put_all(&nothing), Ok(()));
    assert_eq!(empty.revision(), revision);
    assert_eq!(view.len(), Ok(0));
    assert_eq!(cursor.next(), None);

    let mut map = numbers(5);
    let mut cursor = map.cursor().unwrap();
    assert_eq!(map.put_all(&nothing), Ok(()));
    assert_eq!(cursor.next(), Some(Ok((0, 0))));

    let revision = map.revision();
    map.extend(Vec::new());
    assert_eq!(map.revision(), revision);

    let mut fresh: Map<u32, u32> = Map::new();
    fresh.extend(Vec::new());
    assert_eq!(fresh.revision(), 0);
}

#[test]
fn entries_write_through() {
    let map: Map<u32, char> = vec![(1, 'a'), (2, 'b'), (3, 'c')].into_iter().collect();
    let handles: Vec<_> = map.entries().iter().unwrap().collect::<Result<_>>().unwrap();

    assert_eq!(*handles[1].key(), 2);
    assert_eq!(handles[1].set_value('x'), Ok('b'));
    assert_eq!(map.get(&2), Ok(Some('x')));

    map.insert(10, 'z').unwrap();
    assert_eq!(handles[0].value(), Ok('a'));
    assert_eq!(handles[2].set_value('y'), Ok('c'));

    map.remove(&3).unwrap();
    assert_eq!(handles[2].value(), Err(Error::ConcurrentModification));
    assert_eq!(handles[2].set_value('w'), Err(Error::ConcurrentModification));
}

#[test]
fn projections() {
    let map = numbers(6);

    assert_eq!(map.keys().len(), Ok(6));
    assert_eq!(map.keys().contains(&3), Ok(true));
    assert_eq!(map.keys().remove(&3), Ok(true));
    assert_eq!(map.keys().remove(&3), Ok(false));

    assert_eq!(map.values().contains(&40), Ok(true));
    assert_eq!(map.values().contains(&30), Ok(false));
    assert_eq!(map.values().remove(&40), Ok(true));
    assert_eq!(map.values().iter().unwrap().collect::<Result<Vec<_>>>(), Ok(vec![0, 10, 20, 50]));

    assert_eq!(map.entries().contains(&5, &50), Ok(true));
    assert_eq!(map.entries().contains(&5, &51), Ok(false));
    assert_eq!(map.entries().remove(&5, &51), Ok(false));
    assert_eq!(map.entries().remove(&5, &50), Ok(true));
    assert_eq!(keys(&map), [0, 1, 2]);

    let mut values = map.values().iter().unwrap();
    assert_eq!(values.next(), Some(Ok(0)));
    values.remove().unwrap();
    assert_eq!(values.next(), Some(Ok(10)));
    assert_eq!(keys(&map), [1, 2]);

    let view = map.head_map(1, true).unwrap();
    assert_eq!(view.keys().len(), Ok(1));
    assert_eq!(view.values().contains(&20), Ok(false));
    assert_eq!(view.entries().is_empty(), Ok(false));
}

#[test]
fn custom_ordering() {
    let map = Map::with_cmp(natural().rev());
    for key in 0..5u32 { map.insert(key, ()).unwrap(); }

    assert_eq!(map.first_key(), Ok(4));
    assert_eq!(keys(&map), [4, 3, 2, 1, 0]);
    assert_eq!(map.higher_key(&3), Ok(Some(2)));
    assert_eq!(map.comparator().compare(&1, &2), std::cmp::Ordering::Greater);
}

#[test]
fn map_traits() {
    let map: Map<u32, char> = vec![(2, 'x'), (1, 'a'), (2, 'b')].into_iter().collect();
    assert_eq!(format!("{:?}", map), "{1: 'a', 2: 'b'}");

    let copy = map.clone();
    copy.insert(3, 'c').unwrap();
    assert_eq!(map.len(), Ok(2));
    assert!(map != copy);

    let mut extended = map.clone();
    extended.extend(vec![(3, 'c')]);
    assert_eq!(extended, copy);

    assert_eq!(copy.into_iter().rev().map(|e| e.1).collect::<String>(), "cba");
    assert_eq!(Map::<u32, char>::default().len(), Ok(0));
}
