//! Debug-only checks on the key contract.
//!
//! Keys must hash deterministically and must not call back into the map
//! from `Hash` or `Eq`. Violations are programming errors, so they panic in
//! debug builds and cost nothing in release builds.

use core::cell::Cell;

/// Tracks whether a map is in the middle of walking a chain.
///
/// `Cell` keeps the owning map `!Sync`; it stays `Send` so callers can move
/// it behind a `Mutex`.
#[derive(Debug)]
pub(crate) struct ChainWalk {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    #[cfg(not(debug_assertions))]
    _nosync: core::marker::PhantomData<Cell<()>>,
}

impl ChainWalk {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            #[cfg(not(debug_assertions))]
            _nosync: core::marker::PhantomData,
        }
    }

    /// Mark the map busy until the returned section drops. Panics in debug
    /// builds if the map is already busy.
    #[inline]
    pub(crate) fn enter(&self) -> WalkSection<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "key Hash/Eq re-entered the map while a bucket chain was being walked"
            );
            WalkSection { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            WalkSection {
                _owner: core::marker::PhantomData,
            }
        }
    }
}

pub(crate) struct WalkSection<'a> {
    #[cfg(debug_assertions)]
    owner: &'a ChainWalk,
    #[cfg(not(debug_assertions))]
    _owner: core::marker::PhantomData<&'a ChainWalk>,
}

impl Drop for WalkSection<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.busy.set(false);
    }
}

/// Asserts that rehashing a key reproduces `first`. `rehash` only runs in
/// debug builds.
#[inline]
#[track_caller]
pub(crate) fn assert_stable_hash(first: u64, rehash: impl FnOnce() -> u64) {
    debug_assert_eq!(
        first,
        rehash(),
        "key hash changed between two calls; Hash must be deterministic"
    );
}
