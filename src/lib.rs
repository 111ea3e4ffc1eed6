//! chained-hashmap: a single-threaded hash map that resolves collisions by
//! separate chaining over an array of buckets.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a textbook separate-chaining map whose behavior is easy to
//!   predict: fixed bucket count by default, insertion-ordered chains,
//!   value equality for keys, opt-in growth.
//! - Layers:
//!   - Chains<K, V>: structural layer. Bucket heads/tails over a
//!     generational node arena; every node stores its key's `u64` hash and
//!     a link to the next node of the same bucket.
//!   - ChainedHashMap<K, V, S>: public API. Hashes keys with `S`, runs the
//!     key contract checks, applies the resize policy.
//!
//! Constraints
//! - Single-threaded: the map is `Send` but not `Sync`. Share it across
//!   threads behind a `Mutex`.
//! - Unique keys by `K: Eq`. `put` on a present key replaces the value in
//!   place and leaves the key untouched.
//! - Lookups on a missing key return `None`; `put` never fails.
//!
//! Hasher and rehashing invariants
//! - Each node stores the hash computed at insertion. Rebucketing and
//!   unlinking use the stored hash only, so `K: Hash` never runs after
//!   insertion and `K: Eq` only runs while scanning a chain in `find`.
//! - A node always lives in bucket `hash % bucket_count`.
//!
//! Resize policy
//! - `ResizePolicy::Fixed` (default): bucket count fixed at construction
//!   (`DEFAULT_CAPACITY` = 4); `DEFAULT_LOAD_FACTOR` is recorded but not
//!   acted on, so chains grow without bound.
//! - `ResizePolicy::Grow`: the bucket count doubles before an insert would
//!   push `len / bucket_count` past the threshold, up to
//!   `MAX_BUCKET_COUNT` buckets. Thresholds below `MIN_LOAD_FACTOR` are
//!   rejected at construction.
//! - `rebucket(n)` changes the bucket count explicitly under either policy.
//!
//! Key contract
//! - Keys must hash deterministically and must not re-enter the map from
//!   `Hash`/`Eq`. Both are checked in debug builds and panic on violation;
//!   release builds skip the checks.
//!
//! Notes and non-goals
//! - No internal locking or sharding.
//! - Iteration (`iter`, `iter_mut`, `into_iter`) follows storage order; use
//!   `bucket(i)` to walk a single chain in insertion order.

mod chain;
mod chain_proptest;
mod chained_hash_map;
pub mod config;
mod contract;

// Public surface
pub use chained_hash_map::{BucketIter, ChainedHashMap, IntoIter, Iter, IterMut};
pub use config::{
    ConfigError, MapConfig, ResizePolicy, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, MAX_BUCKET_COUNT,
    MIN_LOAD_FACTOR,
};
