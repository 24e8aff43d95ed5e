//! probe-map: a single-threaded map from byte-string keys to values,
//! using open addressing with a bounded linear probe window.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small, predictable lookup structure for short identifiers
//!   (symbol tables and the like) whose bucket placement is fully
//!   specified and reproducible across implementations.
//! - Layers:
//!   - `hash`: CRC-32 over the Castagnoli table, Jenkins' 32-bit mix and a
//!     Knuth multiplicative step, reduced modulo capacity.
//!   - `slot`: the slot array, the `Entry` view and the `Visit` directive
//!     returned by visitors.
//!   - `ProbeMap<K, V>`: placement (`locate`), put/get/remove, slot-order
//!     traversal with in-place deletion, ownership-aware teardown.
//!   - `rehash`: doubling growth with planned placement.
//!   - `symbols`: a compiler symbol table built on the public API.
//!
//! Constraints
//! - Capacity is always a non-zero power of two.
//! - Every entry sits within `MAX_PROBE` (8) slots of its home bucket.
//!   Insert refuses to place an entry further out and grows instead, so
//!   lookups scan exactly that window and removal needs no tombstones.
//! - Keys are unique by byte content; `put` on an existing key replaces
//!   both value and stored key.
//! - Single-threaded; no internal synchronization.
//!
//! Keys and values
//! - Keys are any `K: AsRef<[u8]>`. Borrowed keys (`&str`, `&[u8]`) are
//!   never copied; the lifetime on `K` is what keeps the caller's key
//!   storage alive and unchanged while the entry exists. Owned keys
//!   (`String`, `Box<[u8]>`) internalize the bytes instead.
//! - Values are opaque; the map never inspects them. Handle-like values
//!   (arena keys, indices) whose referents live elsewhere are released via
//!   `destroy_with_ownership`.
//!
//! Traversal
//! - `apply` shows each occupied slot, in index order, to a visitor that
//!   answers `Visit::Continue`, `Visit::Remove` or `Visit::Stop`. Removal
//!   during traversal is how growth migrates entries without ever holding
//!   one in two arrays at once.
//! - The visitor runs while `apply` holds `&mut self`, so it cannot call
//!   back into the same map.
//!
//! Errors
//! - Creation rejects zero and non-power-of-two capacities.
//! - Allocation failures surface as `Error::AllocationFailure` rather than
//!   aborting. Growth past the 32-bit hash range, or an insert whose full
//!   hash is already shared by `MAX_PROBE` keys, is
//!   `Error::CapacityOverflow`. A failed grow leaves the map untouched.
//! - Missing keys are `None`, never an error.

mod error;
pub mod hash;
mod probe_map;
mod probe_map_proptest;
mod rehash;
mod slot;
pub mod symbols;

// Public surface
pub use error::{Error, Result};
pub use probe_map::{Iter, IterMut, ProbeMap, MAX_PROBE};
pub use slot::{Applied, Entry, Visit};
