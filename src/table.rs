//! Table: the structural layer of `ChainedHashMap`.
//!
//! A fixed-length array of root slots. Each occupied slot holds one entry
//! inline and may head an overflow chain whose nodes live in a `SlotMap`
//! arena and link to each other by generational `NodeKey`s. Freed nodes go
//! back on the arena's free list and are reused by later insertions.
//!
//! The table never hashes. Callers pass the root index and a key-matching
//! closure, which keeps the user-code boundary in one place
//! (`ChainedHashMap`).
//!
//! Invariants
//! - A root slot without an entry has no chain.
//! - Every arena node is reachable from exactly one root slot.
//! - `count` equals the number of root entries plus arena nodes.

use crate::error::MapError;
use crate::iter::Cursor;
use core::mem;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Generational handle of a chain node.
    pub(crate) struct NodeKey;
}

/// A key and its value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Entry<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V> From<(K, V)> for Entry<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Self { key, value }
    }
}

#[derive(Debug)]
pub(crate) struct Slot<K, V> {
    pub(crate) entry: Option<Entry<K, V>>,
    chain: Option<NodeKey>,
}

impl<K, V> Slot<K, V> {
    fn vacant() -> Self {
        Self {
            entry: None,
            chain: None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) entry: Entry<K, V>,
    next: Option<NodeKey>,
}

/// Where a matching entry sits inside its bucket.
#[derive(Clone, Copy, Debug)]
enum Location {
    Root,
    // `prev == None` means the node is the chain head.
    Chain { prev: Option<NodeKey>, node: NodeKey },
}

#[derive(Debug)]
pub(crate) struct Table<K, V> {
    slots: Vec<Slot<K, V>>,
    nodes: SlotMap<NodeKey, Node<K, V>>,
    count: usize,
}

impl<K, V> Table<K, V> {
    /// Infallible constructor for small, known-good capacities.
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            slots: (0..capacity).map(|_| Slot::vacant()).collect(),
            nodes: SlotMap::with_key(),
            count: 0,
        }
    }

    pub(crate) fn try_new(capacity: usize) -> Result<Self, MapError> {
        Ok(Self {
            slots: alloc_slots(capacity)?,
            nodes: SlotMap::with_key(),
            count: 0,
        })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn slot_index(&self, hash: u64) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    fn locate<F>(&self, index: usize, mut matches: F) -> Option<Location>
    where
        F: FnMut(&K) -> bool,
    {
        let slot = &self.slots[index];
        // An empty root guarantees an empty bucket.
        let root = slot.entry.as_ref()?;
        if matches(&root.key) {
            return Some(Location::Root);
        }
        let mut prev = None;
        let mut cur = slot.chain;
        while let Some(node) = cur {
            let n = &self.nodes[node];
            if matches(&n.entry.key) {
                return Some(Location::Chain { prev, node });
            }
            prev = Some(node);
            cur = n.next;
        }
        None
    }

    pub(crate) fn get<F>(&self, index: usize, matches: F) -> Option<&Entry<K, V>>
    where
        F: FnMut(&K) -> bool,
    {
        match self.locate(index, matches)? {
            Location::Root => self.slots[index].entry.as_ref(),
            Location::Chain { node, .. } => self.nodes.get(node).map(|n| &n.entry),
        }
    }

    pub(crate) fn get_mut<F>(&mut self, index: usize, matches: F) -> Option<&mut Entry<K, V>>
    where
        F: FnMut(&K) -> bool,
    {
        match self.locate(index, matches)? {
            Location::Root => self.slots[index].entry.as_mut(),
            Location::Chain { node, .. } => self.nodes.get_mut(node).map(|n| &mut n.entry),
        }
    }

    /// Insert into bucket `index`, replacing the value of an equal key in
    /// place. `eq(new_key, stored_key)` decides equality. A new key goes into
    /// the root slot if it is empty, otherwise onto the tail of the chain.
    pub(crate) fn insert<F>(&mut self, index: usize, entry: Entry<K, V>, mut eq: F) -> Option<V>
    where
        F: FnMut(&K, &K) -> bool,
    {
        let slot = &mut self.slots[index];
        let head = slot.chain;
        match slot.entry.as_mut() {
            None => {
                debug_assert!(head.is_none());
                slot.entry = Some(entry);
                self.count += 1;
                return None;
            }
            Some(root) => {
                if eq(&entry.key, &root.key) {
                    return Some(mem::replace(&mut root.value, entry.value));
                }
            }
        }

        let mut tail = None;
        let mut cur = head;
        while let Some(node) = cur {
            let n = &mut self.nodes[node];
            if eq(&entry.key, &n.entry.key) {
                return Some(mem::replace(&mut n.entry.value, entry.value));
            }
            tail = Some(node);
            cur = n.next;
        }

        self.link_after(index, tail, entry);
        None
    }

    /// Place an entry whose key is known to be absent, skipping key
    /// comparison.
    fn append(&mut self, index: usize, entry: Entry<K, V>) {
        let slot = &mut self.slots[index];
        if slot.entry.is_none() {
            slot.entry = Some(entry);
            self.count += 1;
            return;
        }
        let mut tail = None;
        let mut cur = slot.chain;
        while let Some(node) = cur {
            tail = Some(node);
            cur = self.nodes[node].next;
        }
        self.link_after(index, tail, entry);
    }

    // `tail == None` makes the new node the chain head of `index`.
    fn link_after(&mut self, index: usize, tail: Option<NodeKey>, entry: Entry<K, V>) {
        let fresh = self.nodes.insert(Node { entry, next: None });
        match tail {
            None => self.slots[index].chain = Some(fresh),
            Some(t) => self.nodes[t].next = Some(fresh),
        }
        self.count += 1;
    }

    /// Unlink the matching entry from bucket `index`. A removed root entry
    /// is replaced by the chain head so that occupied buckets always have
    /// an occupied root.
    pub(crate) fn remove<F>(&mut self, index: usize, matches: F) -> Option<Entry<K, V>>
    where
        F: FnMut(&K) -> bool,
    {
        let location = self.locate(index, matches)?;
        let slot = &mut self.slots[index];
        let removed = match location {
            Location::Root => match slot.chain {
                Some(head) => {
                    let promoted = self.nodes.remove(head).expect("chain head is live");
                    slot.chain = promoted.next;
                    slot.entry
                        .replace(promoted.entry)
                        .expect("located root entry is present")
                }
                None => slot.entry.take().expect("located root entry is present"),
            },
            Location::Chain { prev, node } => {
                let spliced = self.nodes.remove(node).expect("located chain node is live");
                match prev {
                    None => slot.chain = spliced.next,
                    Some(p) => self.nodes[p].next = spliced.next,
                }
                spliced.entry
            }
        };
        self.count -= 1;
        Some(removed)
    }

    /// Empty every bucket, walking each chain iteratively.
    pub(crate) fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.entry.take().is_none() {
                continue;
            }
            self.count -= 1;
            let mut cur = slot.chain.take();
            while let Some(node) = cur {
                let n = self.nodes.remove(node).expect("chained node is live");
                self.count -= 1;
                cur = n.next;
            }
        }
        debug_assert_eq!(self.count, 0);
        debug_assert!(self.nodes.is_empty());
    }

    /// Swap in a fresh root array of `new_capacity` slots and move every
    /// entry to `hash mod new_capacity`.
    ///
    /// `hash` runs for every entry before anything is touched, and the new
    /// array is reserved up front, so a panicking hasher or a failed
    /// allocation leaves the table unchanged. Entries move without key
    /// comparison since their keys are already distinct.
    pub(crate) fn rehash<H>(&mut self, new_capacity: usize, mut hash: H) -> Result<(), MapError>
    where
        H: FnMut(&K) -> u64,
    {
        let fresh = alloc_slots(new_capacity)?;
        let mut hashes = Vec::new();
        hashes
            .try_reserve_exact(self.count)
            .map_err(|source| MapError::AllocationFailed {
                buckets: new_capacity,
                source,
            })?;
        for slot in &self.slots {
            let Some(root) = slot.entry.as_ref() else {
                continue;
            };
            hashes.push(hash(&root.key));
            let mut cur = slot.chain;
            while let Some(node) = cur {
                let n = &self.nodes[node];
                hashes.push(hash(&n.entry.key));
                cur = n.next;
            }
        }
        debug_assert_eq!(hashes.len(), self.count);

        // No caller code runs past this point.
        let old = mem::replace(&mut self.slots, fresh);
        let expected = self.count;
        self.count = 0;
        let mut hashes = hashes.into_iter();
        let mut next_index = || {
            let h = hashes.next().expect("one hash per entry");
            (h % new_capacity as u64) as usize
        };

        for slot in old {
            let Some(root) = slot.entry else {
                continue;
            };
            self.append(next_index(), root);
            let mut cur = slot.chain;
            while let Some(node) = cur {
                // Release the old node before its entry is placed again.
                let n = self.nodes.remove(node).expect("chained node is live");
                cur = n.next;
                self.append(next_index(), n.entry);
            }
        }
        debug_assert_eq!(self.count, expected);
        Ok(())
    }

    /// Move `cursor` onto the next unvisited entry without consuming it.
    /// Returns whether one exists.
    pub(crate) fn settle(&self, cursor: &mut Cursor) -> bool {
        if let Some(node) = cursor.chain {
            if self.nodes.contains_key(node) {
                return true;
            }
            // The pending node is gone: the root just yielded was removed
            // and this node was promoted into it. Revisit that root.
            cursor.chain = None;
            cursor.root = cursor.root.saturating_sub(1);
        }
        while cursor.root < self.slots.len() && self.slots[cursor.root].entry.is_none() {
            cursor.root += 1;
        }
        cursor.root < self.slots.len()
    }

    pub(crate) fn advance(&self, cursor: &mut Cursor) -> Option<&Entry<K, V>> {
        if !self.settle(cursor) {
            return None;
        }
        if let Some(node) = cursor.chain {
            let n = self.nodes.get(node)?;
            cursor.chain = n.next;
            return Some(&n.entry);
        }
        let slot = &self.slots[cursor.root];
        let entry = slot.entry.as_ref()?;
        cursor.chain = slot.chain;
        cursor.root += 1;
        Some(entry)
    }

    pub(crate) fn parts_mut(
        &mut self,
    ) -> (
        core::slice::IterMut<'_, Slot<K, V>>,
        slotmap::basic::ValuesMut<'_, NodeKey, Node<K, V>>,
    ) {
        (self.slots.iter_mut(), self.nodes.values_mut())
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        std::vec::IntoIter<Slot<K, V>>,
        slotmap::basic::IntoIter<NodeKey, Node<K, V>>,
    ) {
        (self.slots.into_iter(), self.nodes.into_iter())
    }

    /// Entries per bucket, root included.
    #[cfg(test)]
    pub(crate) fn chain_len(&self, index: usize) -> usize {
        let slot = &self.slots[index];
        if slot.entry.is_none() {
            return 0;
        }
        let mut len = 1;
        let mut cur = slot.chain;
        while let Some(node) = cur {
            len += 1;
            cur = self.nodes[node].next;
        }
        len
    }

    #[cfg(test)]
    pub(crate) fn arena_len(&self) -> usize {
        self.nodes.len()
    }
}

fn alloc_slots<K, V>(capacity: usize) -> Result<Vec<Slot<K, V>>, MapError> {
    if capacity == 0 {
        return Err(MapError::InvalidArgument("capacity must be non-zero"));
    }
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|source| MapError::AllocationFailed {
            buckets: capacity,
            source,
        })?;
    slots.resize_with(capacity, Slot::vacant);
    Ok(slots)
}
