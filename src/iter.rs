//! Iteration over `ChainedHashMap`.
//!
//! All iterators visit root slots in index order and, inside a bucket, the
//! root entry first and then its chain. That order has nothing to do with
//! insertion order and changes completely when the map grows.
//!
//! `Cursor` is the detached variant: it borrows the map only for the
//! duration of each step, so the caller may remove the key it was just
//! handed before asking for the next one.

use crate::chained_hash_map::ChainedHashMap;
use crate::table::{Entry, Node, NodeKey, Slot, Table};
use core::iter::FusedIterator;

/// Detached iteration state over one map.
///
/// Between steps the caller may remove the key returned by the previous
/// step; no other key is skipped or repeated because of it. Removing any
/// other key, or inserting, while a cursor is in flight is unsupported: the
/// cursor stays memory-safe but may skip or repeat entries. A cursor must
/// only be used with the map that created it.
#[derive(Clone, Debug, Default)]
pub struct Cursor {
    pub(crate) root: usize,
    pub(crate) chain: Option<NodeKey>,
}

impl Cursor {
    /// A cursor positioned before the first root slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether another entry remains. Skips empty root slots without
    /// consuming anything.
    pub fn has_next<K, V, H, C>(&mut self, map: &ChainedHashMap<K, V, H, C>) -> bool {
        map.table().settle(self)
    }

    /// The next key, or `None` at the end.
    pub fn next_key<'a, K, V, H, C>(&mut self, map: &'a ChainedHashMap<K, V, H, C>) -> Option<&'a K> {
        map.table().advance(self).map(|e| &e.key)
    }

    /// The next key and its value, or `None` at the end.
    pub fn next_entry<'a, K, V, H, C>(
        &mut self,
        map: &'a ChainedHashMap<K, V, H, C>,
    ) -> Option<(&'a K, &'a V)> {
        map.table().advance(self).map(|e| (&e.key, &e.value))
    }
}

/// Borrowing iterator over `(&K, &V)`.
pub struct Iter<'a, K, V> {
    table: &'a Table<K, V>,
    cursor: Cursor,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(table: &'a Table<K, V>) -> Self {
        Self {
            table,
            cursor: Cursor::new(),
            remaining: table.len(),
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            cursor: self.cursor.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let e = self.table.advance(&mut self.cursor)?;
        self.remaining -= 1;
        Some((&e.key, &e.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

/// Iterator over `(&K, &mut V)`.
///
/// Visits root entries in slot order, then chained entries in arena order.
pub struct IterMut<'a, K, V> {
    roots: core::slice::IterMut<'a, Slot<K, V>>,
    chained: slotmap::basic::ValuesMut<'a, NodeKey, Node<K, V>>,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(table: &'a mut Table<K, V>) -> Self {
        let (roots, chained) = table.parts_mut();
        Self { roots, chained }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.roots.by_ref() {
            if let Some(e) = slot.entry.as_mut() {
                return Some((&e.key, &mut e.value));
            }
        }
        self.chained
            .next()
            .map(|n| (&n.entry.key, &mut n.entry.value))
    }
}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

pub struct ValuesMut<'a, K, V> {
    pub(crate) inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// Owning iterator returned by `ChainedHashMap::into_iter`.
pub struct IntoIter<K, V> {
    roots: std::vec::IntoIter<Slot<K, V>>,
    chained: slotmap::basic::IntoIter<NodeKey, Node<K, V>>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(table: Table<K, V>) -> Self {
        let remaining = table.len();
        let (roots, chained) = table.into_parts();
        Self {
            roots,
            chained,
            remaining,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self
            .roots
            .by_ref()
            .find_map(|slot| slot.entry)
            .or_else(|| self.chained.next().map(|(_, n)| n.entry));
        entry.map(|e: Entry<K, V>| {
            self.remaining -= 1;
            e.into_pair()
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}
