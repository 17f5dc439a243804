// ChainedHashMap integration suite.
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Replace semantics: putting an existing key swaps the value in place,
//   returns the old one, and leaves `len` alone.
// - Collisions: keys sharing a root slot are stored and found
//   independently, whichever of them is removed.
// - Growth: crossing the load-factor threshold multiplies capacity and
//   keeps every entry; explicit growth does the same.
// - Clear: empties every bucket and keeps capacity.
use chained_hashmap::{ChainedHashMap, Entry, GrowthPolicy, MapError, Natural};
use std::cmp::Ordering;
use std::rc::Rc;

type IntMap = ChainedHashMap<u64, u64, fn(&u64) -> u64, fn(&u64, &u64) -> Ordering>;

fn identity(k: &u64) -> u64 {
    *k
}

fn int_compare(a: &u64, b: &u64) -> Ordering {
    a.cmp(b)
}

fn int_map(capacity: usize) -> IntMap {
    IntMap::with_functions(identity, int_compare, capacity).expect("valid capacity")
}

// Test: construction.
// Verifies: a new map is empty and reports the requested capacity.
#[test]
fn new_map_has_requested_capacity() {
    let m = int_map(11);
    assert_eq!(m.len(), 0);
    assert_eq!(m.capacity(), 11);
}

// Test: single put.
// Verifies: a fresh key bumps `len` to one.
#[test]
fn put_counts_new_key() {
    let mut m = int_map(11);
    assert_eq!(m.put(50, 92).unwrap(), None);
    assert_eq!(m.len(), 1);
}

// Test: growth triggered by put.
// Assumes: default policy (0.9 threshold, factor 2).
// Verifies: with capacity 1 the second put sees load 1/1 and doubles the
// table before inserting; both keys remain reachable.
#[test]
fn put_ensures_capacity() {
    let mut m = int_map(1);
    m.put(50, 92).unwrap();
    m.put(51, 92).unwrap();
    assert_eq!(m.len(), 2);
    assert_eq!(m.capacity(), 2);
    assert_eq!(m.get(&50), Some(&92));
    assert_eq!(m.get(&51), Some(&92));
}

// Test: collision on put and get.
// Assumes: identity hash, capacity 4, so 1 and 5 share slot 1.
// Verifies: both keys are stored and looked up independently.
#[test]
fn put_handles_collision() {
    let mut m = int_map(4);
    m.put(1, 92).unwrap();
    m.put(5, 93).unwrap();
    assert_eq!(m.len(), 2);
    assert_eq!(m.get(&5), Some(&93));
    assert_eq!(m.get(&1), Some(&92));
}

// Test: lookup of a key in the same slot that was never stored.
// Verifies: the chain walk ends with `None`.
#[test]
fn get_misses_after_walking_chain() {
    let mut m = int_map(4);
    m.put(1, 92).unwrap();
    m.put(5, 93).unwrap();
    assert_eq!(m.get(&9), None);
    assert!(!m.contains_key(&9));
}

// Test: remove on a missing key, then on a present one.
// Verifies: a miss returns `None` and changes nothing; a hit returns the
// value and decrements `len`.
#[test]
fn remove_returns_none_if_missing() {
    let mut m = int_map(4);
    m.put(1, 92).unwrap();
    assert_eq!(m.remove(&5), None);
    assert_eq!(m.len(), 1);
    assert_eq!(m.remove(&1), Some(92));
    assert_eq!(m.len(), 0);
}

// Test: the three-way collision scenario.
// Assumes: identity hash, capacity 4; 1, 5 and 9 all land in slot 1.
// Verifies: removing the middle key keeps the others; removing the root
// key promotes its successor.
#[test]
fn remove_handles_collision() {
    let mut m = int_map(4);
    m.put(1, 92).unwrap();
    m.put(5, 93).unwrap();
    m.put(9, 94).unwrap();
    assert_eq!(m.len(), 3);
    assert_eq!(m.get(&5), Some(&93));

    assert_eq!(m.remove(&5), Some(93));
    assert_eq!(m.len(), 2);
    assert_eq!(m.get(&1), Some(&92));
    assert_eq!(m.get(&9), Some(&94));

    assert_eq!(m.remove(&1), Some(92));
    assert_eq!(m.len(), 1);
    assert_eq!(m.get(&9), Some(&94));
}

// Test: every removal shape in one bucket.
// Verifies: root with chain, chain head, chain middle, chain tail and lone
// root removals each leave the remaining keys reachable.
#[test]
fn remove_every_position_in_chain() {
    let keys = [1, 5, 9, 13, 17];
    for victim in keys {
        let mut m = int_map(4);
        for k in keys {
            m.put(k, k * 10).unwrap();
        }
        let entry = m.remove_entry(&victim).expect("present");
        assert_eq!(entry, Entry::new(victim, victim * 10));
        assert_eq!(m.len(), keys.len() - 1);
        for k in keys.iter().filter(|&&k| k != victim) {
            assert_eq!(m.get(k), Some(&(k * 10)), "lost {k} after removing {victim}");
        }
        assert_eq!(m.remove_entry(&victim), None);
    }
}

#[test]
fn put_entry_inserts() {
    let mut m = int_map(11);
    assert_eq!(m.put_entry(Entry::new(50, 92)).unwrap(), None);
    assert_eq!(m.len(), 1);
    assert_eq!(m.put_entry((50, 93).into()).unwrap(), Some(92));
    assert_eq!(m.get(&50), Some(&93));
}

#[test]
fn contains_key_after_put() {
    let mut m = int_map(11);
    m.put(50, 92).unwrap();
    assert!(m.contains_key(&50));
    assert!(!m.contains_key(&51));
}

// Test: replace semantics.
// Verifies: the second put returns the first value, `len` stays 1, and the
// new value is observed.
#[test]
fn double_put_replaces() {
    let mut m = int_map(11);
    assert_eq!(m.put(50, 92).unwrap(), None);
    assert_eq!(m.put(50, 23).unwrap(), Some(92));
    assert_eq!(m.get(&50), Some(&23));
    assert_eq!(m.len(), 1);
}

#[test]
fn get_among_many() {
    let mut m = int_map(11);
    for (k, v) in [(50, 92), (49, 91), (48, 90), (47, 89), (46, 88), (45, 87)] {
        m.put(k, v).unwrap();
    }
    assert_eq!(m.get(&48), Some(&90));
}

// Test: explicit growth.
// Verifies: doubling keeps `len` and every entry, including ones that were
// chained before the rehash.
#[test]
fn increase_capacity_does_not_break_map() {
    let mut m = int_map(4);
    m.put(1, 90).unwrap();
    m.put(5, 91).unwrap();
    m.put(2, 92).unwrap();
    m.increase_capacity(2).unwrap();
    assert_eq!(m.capacity(), 8);
    assert_eq!(m.len(), 3);
    assert_eq!(m.get(&1), Some(&90));
    assert_eq!(m.get(&5), Some(&91));
    assert_eq!(m.get(&2), Some(&92));
}

// Test: many entries through repeated automatic growth.
// Verifies: the load factor never exceeds 1 right after a put, and
// nothing is lost.
#[test]
fn repeated_growth_keeps_everything() {
    let mut m = int_map(1);
    for k in 0..1000 {
        m.put(k, k + 1).unwrap();
        assert!(m.load_factor() <= 1.0);
    }
    assert_eq!(m.len(), 1000);
    assert!(m.capacity() >= 1000);
    assert!((0..1000).all(|k| m.get(&k) == Some(&(k + 1))));
}

#[test]
fn remove_only_entry() {
    let mut m = int_map(11);
    m.put(50, 92).unwrap();
    assert_eq!(m.remove(&50), Some(92));
    assert_eq!(m.len(), 0);
    assert!(m.is_empty());
}

// Test: clear.
// Verifies: `len` drops to zero, lookups miss, capacity is kept, and the
// map is usable afterwards.
#[test]
fn clear_removes_all() {
    let mut m = int_map(11);
    m.put(1, 92).unwrap();
    m.put(2, 102).unwrap();
    m.clear();
    assert_eq!(m.get(&1), None);
    assert_eq!(m.len(), 0);
    assert_eq!(m.capacity(), 11);

    m.put(1, 7).unwrap();
    assert_eq!(m.get(&1), Some(&7));
}

// Test: clear on a bucket with a chain, twice.
// Verifies: the whole chain is released and a second clear is a no-op.
#[test]
fn clear_handles_collision() {
    let mut m = int_map(4);
    m.put(1, 50).unwrap();
    m.put(5, 51).unwrap();
    m.put(9, 52).unwrap();
    m.clear();
    assert_eq!(m.len(), 0);
    m.clear();
    assert_eq!(m.len(), 0);
    for k in [1, 5, 9] {
        assert!(!m.contains_key(&k));
    }
}

// Test: values are owned by the map and released on removal, clear and drop.
// Assumes: values are `Rc`s so their strong counts are observable.
#[test]
fn values_released_on_remove_clear_and_drop() {
    let payload = Rc::new(());
    let mut m = int_map_rc(4);
    for k in 0..6 {
        m.put(k, payload.clone()).unwrap();
    }
    assert_eq!(Rc::strong_count(&payload), 7);
    drop(m.remove(&0));
    assert_eq!(Rc::strong_count(&payload), 6);
    m.clear();
    assert_eq!(Rc::strong_count(&payload), 1);

    for k in 0..6 {
        m.put(k, payload.clone()).unwrap();
    }
    drop(m);
    assert_eq!(Rc::strong_count(&payload), 1);
}

fn int_map_rc(
    capacity: usize,
) -> ChainedHashMap<u64, Rc<()>, fn(&u64) -> u64, fn(&u64, &u64) -> Ordering> {
    ChainedHashMap::with_functions(
        identity as fn(&u64) -> u64,
        int_compare as fn(&u64, &u64) -> Ordering,
        capacity,
    )
    .expect("valid capacity")
}

// Test: default construction over `Hash + Eq` keys.
#[test]
fn default_functions_with_string_keys() {
    let mut m: ChainedHashMap<String, usize> = ChainedHashMap::default();
    for (i, w) in ["alpha", "beta", "gamma", "delta"].iter().enumerate() {
        m.put((*w).to_string(), i).unwrap();
    }
    assert_eq!(m.get(&"gamma".to_string()), Some(&2));
    assert_eq!(m.remove(&"alpha".to_string()), Some(0));
    assert_eq!(m.len(), 3);
}

// Test: closures as functions, with an `Ord`-based comparator.
// Verifies: a hash that only looks at the first byte forces collisions that
// the comparator resolves.
#[test]
fn closure_hash_with_natural_compare() {
    let first_byte = |s: &String| s.as_bytes().first().copied().unwrap_or(0) as u64;
    let mut m = ChainedHashMap::with_functions(first_byte, Natural, 3).unwrap();
    m.put("apple".to_string(), 1).unwrap();
    m.put("avocado".to_string(), 2).unwrap();
    m.put("banana".to_string(), 3).unwrap();
    assert_eq!(m.get(&"avocado".to_string()), Some(&2));
    assert_eq!(m.remove(&"apple".to_string()), Some(1));
    assert_eq!(m.get(&"avocado".to_string()), Some(&2));
    assert_eq!(m.get(&"banana".to_string()), Some(&3));
}

// Test: growth failure modes.
// Verifies: bad factors and overflowing capacities are reported and leave
// the map unchanged.
#[test]
fn growth_errors_leave_map_unchanged() {
    let mut m = int_map(4);
    m.put(1, 1).unwrap();
    assert!(matches!(
        m.increase_capacity(1),
        Err(MapError::InvalidArgument(_))
    ));
    assert!(matches!(
        m.increase_capacity(usize::MAX),
        Err(MapError::CapacityOverflow { capacity: 4, .. })
    ));
    assert_eq!(m.capacity(), 4);
    assert_eq!(m.get(&1), Some(&1));

    assert!(matches!(
        IntMap::with_functions(identity, int_compare, 0),
        Err(MapError::InvalidArgument(_))
    ));
}

// Test: a low-threshold policy grows early.
#[test]
fn low_threshold_policy() {
    let policy = GrowthPolicy::new(0.1, 2).unwrap();
    let mut m = IntMap::with_policy(identity, int_compare, 11, policy).unwrap();
    m.put(1, 1).unwrap();
    m.put(2, 2).unwrap();
    assert_eq!(m.capacity(), 11);
    m.put(3, 3).unwrap();
    assert_eq!(m.capacity(), 22);
    m.put(4, 4).unwrap();
    assert_eq!(m.capacity(), 44);
}

// Test: a hash function that panics partway through growth.
// Assumes: identity hash armed to panic on its 3rd call; a load-factor
// threshold high enough that 7 keys stay in 4 slots until grown by hand.
// Verifies: after unwinding, capacity, len, lookups and every iterator
// still agree on all 7 entries.
#[test]
fn panicking_hash_during_growth_leaves_map_intact() {
    use std::cell::Cell;

    let calls_left: Rc<Cell<Option<u32>>> = Rc::new(Cell::new(None));
    let armed = calls_left.clone();
    let hash = move |k: &u64| {
        if let Some(n) = armed.get() {
            if n == 0 {
                panic!("hash failure");
            }
            armed.set(Some(n - 1));
        }
        *k
    };
    let policy = GrowthPolicy::new(4.0, 2).unwrap();
    let mut m = ChainedHashMap::with_policy(hash, int_compare, 4, policy).unwrap();
    let keys = [1, 5, 9, 2, 6, 3, 7];
    for k in keys {
        m.put(k, k * 10).unwrap();
    }

    calls_left.set(Some(2));
    let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| m.increase_capacity(2)));
    assert!(res.is_err());
    calls_left.set(None);

    assert_eq!(m.capacity(), 4);
    assert_eq!(m.len(), keys.len());
    for k in keys {
        assert_eq!(m.get(&k), Some(&(k * 10)));
    }
    assert_eq!(m.iter().count(), keys.len());
    assert_eq!(m.iter_mut().count(), keys.len());

    // Still usable for growth once the hash behaves.
    m.increase_capacity(2).unwrap();
    assert_eq!(m.capacity(), 8);
    assert_eq!(m.into_iter().count(), keys.len());
}

fn assert_send<T: Send>() {}

// Test: the map can move to another thread.
#[test]
fn map_moves_across_threads() {
    assert_send::<ChainedHashMap<u64, u64>>();
    assert_send::<IntMap>();
    let mut m: ChainedHashMap<String, u64> = ChainedHashMap::new();
    m.put("a".to_string(), 1).unwrap();
    let handle = std::thread::spawn(move || m.remove(&"a".to_string()));
    assert_eq!(handle.join().unwrap(), Some(1));
}
