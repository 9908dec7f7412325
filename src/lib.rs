//! bucket-map: a single-threaded hash map with separate chaining into
//! comparator-ordered buckets, prime-sized growth, and cursor iteration.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a generic key-value map whose key identity and in-bucket order
//!   come from a caller-chosen three-way comparator, and whose bucket
//!   choice comes from a caller-chosen hasher.
//! - Layers:
//!   - OrderedBucket: one table slot; a sorted `Vec` of entry ids. Knows
//!     nothing about keys; callers pass a probe for binary search.
//!   - BucketMap<K, V, C, H>: slot array of buckets over a generational
//!     entry arena (`slotmap`). Owns growth, entry lifecycle and the
//!     release hooks.
//!   - Cursor: `Copy` traversal position tagged with the map's epoch, plus
//!     the borrowing and owning iterators built on the same order.
//!
//! Constraints
//! - Single-threaded: release hooks are `Box<dyn FnMut>` without `Send`.
//! - Lookup, insert and remove touch exactly one bucket:
//!   `hash(key) mod capacity`.
//! - Load factor never exceeds `MAX_LOAD_FACTOR` (0.5) once an insertion
//!   completes. Capacities walk `PRIME_SIZES`, then double.
//! - At most one live entry per comparator-equal key. The hasher must
//!   agree with the comparator.
//!
//! Hashing and rehashing invariants
//! - Each entry stores the `u64` hash computed at insertion. Rehashing
//!   re-buckets by the stored hash and never calls the hasher again.
//! - Rehashing only moves entry ids. The new bucket array is fully built
//!   (all allocations fallible) before it replaces the old one, so an
//!   allocation failure surfaces as `MapError::Alloc` with the map intact.
//!
//! Ownership
//! - The map owns inserted keys and values. Destroyed pairs (replacement,
//!   `remove`, `clear`, drop) go to the optional release hooks, or are
//!   dropped when no hook is installed. `replace`, `remove_entry` and
//!   `into_iter` hand pairs back instead; `IntoIter` takes the hooks along
//!   and releases whatever the caller leaves unconsumed.
//! - To share payloads between maps, store shared handles (`Rc<T>`,
//!   `&'a T`) as keys or values; the map then releases only its handle.
//!
//! Iteration
//! - Order: ascending bucket index, then comparator order in the bucket.
//! - Modifying the map during a cursor walk is not supported: inserting a
//!   new key, removing, clearing or rehashing bumps the epoch and `next`
//!   reports `MapError::StaleCursor` for older cursors. Replacing a value
//!   in place does not.
//! - Cursors carry their map's owner tag and are meaningless elsewhere:
//!   another map's accessors return `None` and its `next` reports
//!   `StaleCursor`.
//!
//! Notes and non-goals
//! - No concurrent access, persistence or capacity limits beyond growth.
//! - No shrinking; `clear` keeps the current capacity.

mod bucket;
pub mod bucket_map;
mod bucket_map_proptest;
pub mod compare;
pub mod cursor;
mod error;
pub mod hash;
pub mod primes;

// Public surface
pub use bucket_map::{BucketMap, Release};
pub use compare::{AddressOrder, Comparator, NaturalOrder};
pub use cursor::{Cursor, IntoIter, Iter, IterMut, Keys, Values};
pub use error::MapError;
pub use hash::{djb2, IntHash, KeyHasher, PointerHash, StdHash, StringHash};
pub use primes::{MAX_LOAD_FACTOR, PRIME_SIZES};
