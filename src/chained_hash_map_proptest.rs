#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can check
// table-level invariants alongside the public behavior.

use crate::chained_hash_map::ChainedHashMap;
use crate::functions::{KeyCompare, KeyHasher};
use crate::table::Entry;
use core::cmp::Ordering;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    PutEntry(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(u64),
    GetMut(usize, i32),
    Grow(usize),
    Clear,
    Iterate,
    // Walk a cursor, removing each yielded key whose bit `n` is set.
    CursorRemove(u32),
}

fn arb_scenario(key_space: u64) -> impl Strategy<Value = (Vec<u64>, Vec<OpI>)> {
    proptest::collection::vec(0..key_space, 1..=12).prop_flat_map(move |pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::PutEntry(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => (0..key_space).prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::GetMut(i, d)),
            1 => (2usize..=3).prop_map(OpI::Grow),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
            1 => (0u32..3).prop_map(OpI::CursorRemove),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `put` returns the replaced value and only a fresh key bumps `len`.
// - `get`/`contains_key`/`remove` agree with the model.
// - Growth multiplies capacity and keeps every entry.
// - `clear` empties the map without touching capacity.
// - `iter` and a removing cursor both visit each live key exactly once.
fn run_ops<H, C>(
    mut sut: ChainedHashMap<u64, i32, H, C>,
    pool: &[u64],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    H: KeyHasher<u64>,
    C: KeyCompare<u64>,
{
    let mut model: HashMap<u64, i32> = HashMap::new();
    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k = pool[i];
                let prev = sut.put(k, v).expect("growth must succeed");
                prop_assert_eq!(prev, model.insert(k, v));
            }
            OpI::PutEntry(i, v) => {
                let k = pool[i];
                let prev = sut.put_entry(Entry::new(k, v)).expect("growth must succeed");
                prop_assert_eq!(prev, model.insert(k, v));
            }
            OpI::Remove(i) => {
                let k = pool[i];
                let removed = sut.remove_entry(&k).map(Entry::into_pair);
                prop_assert_eq!(removed, model.remove(&k).map(|v| (k, v)));
                prop_assert!(sut.get(&k).is_none());
            }
            OpI::Get(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
            OpI::Contains(k) => {
                prop_assert_eq!(sut.contains_key(&k), model.contains_key(&k));
            }
            OpI::GetMut(i, d) => {
                let k = pool[i];
                match (sut.get_mut(&k), model.get_mut(&k)) {
                    (Some(s), Some(m)) => {
                        *s = s.wrapping_add(d);
                        *m = m.wrapping_add(d);
                    }
                    (None, None) => {}
                    (s, m) => prop_assert!(false, "get_mut disagrees: {:?} vs {:?}", s, m),
                }
            }
            // Keep the root array small across long op sequences.
            OpI::Grow(factor) if sut.capacity() <= 4096 => {
                let before = sut.capacity();
                sut.increase_capacity(factor).expect("growth must succeed");
                prop_assert_eq!(sut.capacity(), before * factor);
                for (k, v) in &model {
                    prop_assert_eq!(sut.get(k), Some(v));
                }
            }
            OpI::Grow(_) => {}
            OpI::Clear => {
                let before = sut.capacity();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), before);
                prop_assert!(sut.iter().next().is_none());
            }
            OpI::Iterate => {
                let mut seen = BTreeSet::new();
                for (k, v) in sut.iter() {
                    prop_assert!(seen.insert(*k), "iter repeated {}", k);
                    prop_assert_eq!(Some(v), model.get(k));
                }
                let m_keys: BTreeSet<_> = model.keys().copied().collect();
                prop_assert_eq!(seen, m_keys);
            }
            OpI::CursorRemove(bit) => {
                let expected: BTreeSet<_> = model.keys().copied().collect();
                let mut seen = BTreeSet::new();
                let mut cursor = sut.cursor();
                while let Some(&k) = cursor.next_key(&sut) {
                    prop_assert!(seen.insert(k), "cursor repeated {}", k);
                    if (k >> bit) & 1 == 1 {
                        prop_assert_eq!(sut.remove(&k), model.remove(&k));
                    }
                }
                prop_assert!(!cursor.has_next(&sut));
                prop_assert_eq!(seen, expected);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.capacity() > 0);
        prop_assert_eq!(sut.iter().len(), model.len());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(u64::MAX), capacity in 1usize..16) {
        let sut: ChainedHashMap<u64, i32> =
            ChainedHashMap::with_capacity(capacity).unwrap();
        run_ops(sut, &pool, ops)?;
    }
}

fn identity(k: &u64) -> u64 {
    *k
}

fn natural(a: &u64, b: &u64) -> Ordering {
    a.cmp(b)
}

// Property: Same state-machine invariants under heavy collisions. Keys are
// drawn from a small space and hashed by identity into a tiny table, so
// most buckets carry chains and every removal shape is exercised.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario(64), capacity in 1usize..4) {
        let sut = ChainedHashMap::with_functions(
            identity as fn(&u64) -> u64,
            natural as fn(&u64, &u64) -> Ordering,
            capacity,
        )
        .unwrap();
        run_ops(sut, &pool, ops)?;
    }

    // A constant hash puts everything in one chain.
    #[test]
    fn prop_state_machine_single_chain((pool, ops) in arb_scenario(32)) {
        let sut = ChainedHashMap::with_functions(|_: &u64| 0u64, natural, 8).unwrap();
        run_ops(sut, &pool, ops)?;
    }
}
