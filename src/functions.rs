//! Hash and compare capabilities supplied by the caller.
//!
//! The map never looks at keys except through a `KeyHasher` (to pick a root
//! slot) and a `KeyCompare` (to tell keys apart inside a chain). Both traits
//! are implemented for closures and `fn` pointers with the matching
//! signature, so `|k: &u64| *k` is a valid hasher.
//!
//! Both functions must be pure: changing a stored key's hash or comparison
//! result while it sits in the map leaves it unreachable.

use core::cmp::Ordering;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Maps a key to an unsigned hash. The map reduces it modulo its capacity.
pub trait KeyHasher<K: ?Sized> {
    fn hash_key(&self, key: &K) -> u64;
}

impl<K: ?Sized, F> KeyHasher<K> for F
where
    F: Fn(&K) -> u64,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self(key)
    }
}

/// Three-way key comparison. Only `Ordering::Equal` is meaningful to the
/// map: two keys are the same key iff they compare `Equal`.
pub trait KeyCompare<K: ?Sized> {
    fn compare(&self, a: &K, b: &K) -> Ordering;

    #[inline]
    fn matches(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

impl<K: ?Sized, F> KeyCompare<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

/// Hashes keys through their `Hash` impl with a `BuildHasher`.
#[derive(Clone, Debug, Default)]
pub struct Hashed<S = DefaultHashBuilder> {
    build: S,
}

impl<S> Hashed<S> {
    pub fn new(build: S) -> Self {
        Self { build }
    }
}

impl<K, S> KeyHasher<K> for Hashed<S>
where
    K: ?Sized + Hash,
    S: BuildHasher,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self.build.hash_one(key)
    }
}

/// Compares keys with `Eq`. Unequal keys report `Ordering::Less`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByEq;

impl<K: ?Sized + Eq> KeyCompare<K> for ByEq {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        if a == b {
            Ordering::Equal
        } else {
            Ordering::Less
        }
    }

    #[inline]
    fn matches(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Compares keys with their `Ord` impl.
#[derive(Clone, Copy, Debug, Default)]
pub struct Natural;

impl<K: ?Sized + Ord> KeyCompare<K> for Natural {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}
