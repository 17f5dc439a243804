//! chained-hashmap: a single-threaded separate-chaining hash map driven by
//! caller-supplied hash and compare functions.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a classic bucket-array-plus-overflow-chain hash table with
//!   predictable growth and an iteration protocol that tolerates removing
//!   the entry just visited.
//! - Layers:
//!   - Table<K, V>: structural layer. A `Vec` of root slots, each holding
//!     one entry inline, plus a `SlotMap` arena of chain nodes linked by
//!     generational handles. Takes slot indices and matching closures;
//!     never hashes.
//!   - ChainedHashMap<K, V, H, C>: public API. Owns the table, the
//!     `KeyHasher`/`KeyCompare` capabilities and the `GrowthPolicy`;
//!     derives `hash mod capacity` and decides when to grow.
//!
//! Constraints
//! - Single-threaded: the map is never `Sync`. Growth is a stop-the-world
//!   rehash; share the map behind one exclusive lock if at all.
//! - Unique keys under `KeyCompare`; `put` on an existing key replaces the
//!   value in place and returns the old one.
//! - An occupied bucket always has an occupied root slot. Removing a root
//!   entry promotes its chain head, so `get` can stop at an empty root.
//! - Capacity is never zero.
//!
//! Growth
//! - Before each `put`, once `len / capacity >= max_load_factor` (0.9 by
//!   default) the root array is multiplied by the growth factor (2 by
//!   default) and every entry is re-inserted. The new array is reserved
//!   and every key hashed before the table changes, so an allocation
//!   failure or a panicking hasher leaves the map untouched. Re-placement
//!   never calls user code.
//!
//! Iteration
//! - Root slots in index order, then each chain in link order. The order
//!   is unrelated to insertion order and changes on growth.
//! - `Cursor` holds no borrow; removing the key it just returned is
//!   supported, including a root entry whose chain head gets promoted.
//!
//! Reentrancy policy
//! - Operations that call the hash/compare functions run under a
//!   debug-only reentrancy check; a callback that re-enters the same map
//!   panics in debug builds.
//!
//! Logging
//! - With the `tracing` feature, growth and clear emit `trace` events.

mod chained_hash_map;
mod chained_hash_map_proptest;
mod error;
mod functions;
mod iter;
mod policy;
mod reentrancy;
mod table;
mod trace;

// Public surface
pub use chained_hash_map::{ChainedHashMap, DEFAULT_CAPACITY};
pub use error::MapError;
pub use functions::{ByEq, Hashed, KeyCompare, KeyHasher, Natural};
pub use iter::{Cursor, IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
pub use policy::GrowthPolicy;
pub use table::Entry;
