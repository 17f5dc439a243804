//! ChainedHashMap: public separate-chaining map over caller-supplied hash
//! and compare functions.

use crate::error::MapError;
use crate::functions::{ByEq, Hashed, KeyCompare, KeyHasher};
use crate::iter::{Cursor, IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use crate::policy::{validate_factor, GrowthPolicy};
use crate::reentrancy::DebugReentrancy;
use crate::table::{Entry, Table};
use crate::trace::trace;
use core::fmt;
use core::hash::Hash;

/// Root-slot count used by `new()` and `Default`.
pub const DEFAULT_CAPACITY: usize = 11;

/// A hash map that resolves collisions by chaining.
///
/// `K` is located through `H: KeyHasher<K>` (root slot = hash mod capacity)
/// and told apart from its bucket neighbours by `C: KeyCompare<K>`. The
/// defaults hash with the key's `Hash` impl and compare with `Eq`; any
/// `Fn(&K) -> u64` and `Fn(&K, &K) -> Ordering` can stand in instead.
///
/// The map is single-threaded: it is never `Sync`, and growth rehashes every
/// entry in one pass that needs exclusive access for its whole duration.
/// Share it across threads by putting the whole map behind one lock.
///
/// ```compile_fail
/// fn assert_sync<T: Sync>() {}
/// assert_sync::<chained_hashmap::ChainedHashMap<u64, u64>>();
/// ```
pub struct ChainedHashMap<K, V, H = Hashed, C = ByEq> {
    table: Table<K, V>,
    hasher: H,
    compare: C,
    policy: GrowthPolicy,
    reentrancy: DebugReentrancy,
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Hash + Eq,
{
    /// An empty map with `DEFAULT_CAPACITY` root slots.
    pub fn new() -> Self {
        Self::from_table(
            Table::new(DEFAULT_CAPACITY),
            Hashed::default(),
            ByEq,
            GrowthPolicy::default(),
        )
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, MapError> {
        Self::with_functions(Hashed::default(), ByEq, capacity)
    }
}

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H, C> ChainedHashMap<K, V, H, C> {
    fn from_table(table: Table<K, V>, hasher: H, compare: C, policy: GrowthPolicy) -> Self {
        Self {
            table,
            hasher,
            compare,
            policy,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub(crate) fn table(&self) -> &Table<K, V> {
        &self.table
    }

    /// Number of live entries.
    #[doc(alias = "count")]
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Number of root slots. Always non-zero.
    #[doc(alias = "size")]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        self.table.len() as f64 / self.table.capacity() as f64
    }

    pub fn growth_policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// Takes effect from the next `put`.
    pub fn set_growth_policy(&mut self, policy: GrowthPolicy) {
        self.policy = policy;
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    pub fn comparator(&self) -> &C {
        &self.compare
    }

    /// Drop every entry. Capacity is unchanged; calling it again is a no-op.
    #[doc(alias = "free")]
    pub fn clear(&mut self) {
        trace!(
            released = self.table.len(),
            capacity = self.table.capacity(),
            "clearing map"
        );
        self.table.clear();
    }

    /// A cursor positioned before the first entry.
    #[doc(alias = "iterator")]
    pub fn cursor(&self) -> Cursor {
        Cursor::new()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.table)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Unlike `iter`, visits root entries first and chained entries after.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.table)
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }
}

impl<K, V, H, C> ChainedHashMap<K, V, H, C>
where
    H: KeyHasher<K>,
    C: KeyCompare<K>,
{
    /// An empty map with `capacity` root slots and the default growth policy.
    pub fn with_functions(hasher: H, compare: C, capacity: usize) -> Result<Self, MapError> {
        Self::with_policy(hasher, compare, capacity, GrowthPolicy::default())
    }

    pub fn with_policy(
        hasher: H,
        compare: C,
        capacity: usize,
        policy: GrowthPolicy,
    ) -> Result<Self, MapError> {
        let table = Table::try_new(capacity)?;
        Ok(Self::from_table(table, hasher, compare, policy))
    }

    #[inline]
    fn index_of(&self, key: &K) -> usize {
        self.table.slot_index(self.hasher.hash_key(key))
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let _g = self.reentrancy.enter("get");
        if self.table.len() == 0 {
            return None;
        }
        let index = self.index_of(key);
        let compare = &self.compare;
        self.table
            .get(index, |stored| compare.matches(key, stored))
            .map(|e| (&e.key, &e.value))
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let _g = self.reentrancy.enter("get_mut");
        if self.table.len() == 0 {
            return None;
        }
        let index = self.index_of(key);
        let compare = &self.compare;
        self.table
            .get_mut(index, |stored| compare.matches(key, stored))
            .map(|e| &mut e.value)
    }

    /// Whether an entry for `key` exists, whatever its value.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get_key_value(key).is_some()
    }

    /// Associate `value` with `key`, returning the value it replaced.
    ///
    /// Runs `ensure_capacity` first, so this fails only if growth does.
    /// A replaced value is swapped in place and `len` is unchanged.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, MapError> {
        self.ensure_capacity()?;
        let _g = self.reentrancy.enter("put");
        let index = self.index_of(&key);
        let compare = &self.compare;
        Ok(self
            .table
            .insert(index, Entry { key, value }, |new, stored| {
                compare.matches(new, stored)
            }))
    }

    pub fn put_entry(&mut self, entry: Entry<K, V>) -> Result<Option<V>, MapError> {
        self.put(entry.key, entry.value)
    }

    /// Remove `key`, returning the stored key and value.
    pub fn remove_entry(&mut self, key: &K) -> Option<Entry<K, V>> {
        let _g = self.reentrancy.enter("remove");
        if self.table.len() == 0 {
            return None;
        }
        let index = self.index_of(key);
        let compare = &self.compare;
        self.table
            .remove(index, |stored| compare.matches(key, stored))
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|e| e.value)
    }

    /// Grow by the policy's factor if the load factor has reached its
    /// threshold.
    pub fn ensure_capacity(&mut self) -> Result<(), MapError> {
        if !self
            .policy
            .should_grow(self.table.len(), self.table.capacity())
        {
            return Ok(());
        }
        let _g = self.reentrancy.enter("ensure_capacity");
        let factor = self.policy.growth_factor();
        Self::grow(&mut self.table, &self.hasher, factor)
    }

    /// Multiply the root-slot count by `factor` (at least 2) and rehash
    /// every entry. On error, or if the hasher panics, the map is unchanged.
    pub fn increase_capacity(&mut self, factor: usize) -> Result<(), MapError> {
        validate_factor(factor)?;
        let _g = self.reentrancy.enter("increase_capacity");
        Self::grow(&mut self.table, &self.hasher, factor)
    }

    fn grow(table: &mut Table<K, V>, hasher: &H, factor: usize) -> Result<(), MapError> {
        let capacity = table.capacity();
        let new_capacity = capacity
            .checked_mul(factor)
            .ok_or(MapError::CapacityOverflow { capacity, factor })?;
        trace!(
            len = table.len(),
            from = capacity,
            to = new_capacity,
            "growing map"
        );
        table.rehash(new_capacity, |k| hasher.hash_key(k))
    }
}

impl<K, V, H, C> fmt::Debug for ChainedHashMap<K, V, H, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, H, C> IntoIterator for &'a ChainedHashMap<K, V, H, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, H, C> IntoIterator for &'a mut ChainedHashMap<K, V, H, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Consumes the map; this is the only way to take entries back out in bulk.
impl<K, V, H, C> IntoIterator for ChainedHashMap<K, V, H, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.table)
    }
}
