//! OrderedBucket: one slot of the table.
//!
//! Holds the arena ids of every entry whose hash reduces to this slot,
//! sorted by the map's comparator. The bucket never sees keys itself;
//! callers supply a probe that compares the entry behind an id with the
//! key they are looking for.

use core::cmp::Ordering;
use slotmap::DefaultKey;
use std::collections::TryReserveError;

#[derive(Debug, Default)]
pub(crate) struct OrderedBucket {
    ids: Vec<DefaultKey>,
}

impl OrderedBucket {
    pub(crate) const fn new() -> Self {
        Self { ids: Vec::new() }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Binary search. `probe(id)` orders the entry behind `id` relative to
    /// the sought key. `Ok(i)` is a match at `i`; `Err(i)` is the sorted
    /// insertion point.
    pub(crate) fn search<F>(&self, mut probe: F) -> Result<usize, usize>
    where
        F: FnMut(DefaultKey) -> Ordering,
    {
        self.ids.binary_search_by(|&id| probe(id))
    }

    /// Make room for one more id so the following `insert_at` cannot fail.
    pub(crate) fn try_reserve_one(&mut self) -> Result<(), TryReserveError> {
        self.ids.try_reserve(1)
    }

    /// Insert `id` at `at`, normally the `Err` position from `search`.
    pub(crate) fn insert_at(&mut self, at: usize, id: DefaultKey) {
        self.ids.insert(at, id);
    }

    pub(crate) fn remove_at(&mut self, at: usize) -> DefaultKey {
        self.ids.remove(at)
    }

    #[inline]
    pub(crate) fn get(&self, at: usize) -> Option<DefaultKey> {
        self.ids.get(at).copied()
    }

    /// Position of the first id, `None` when empty.
    #[inline]
    pub(crate) fn first(&self) -> Option<usize> {
        (!self.is_empty()).then_some(0)
    }

    /// Position after `at`, `None` at the end of the bucket.
    #[inline]
    pub(crate) fn next(&self, at: usize) -> Option<usize> {
        let n = at + 1;
        (n < self.len()).then_some(n)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = DefaultKey> + '_ {
        self.ids.iter().copied()
    }

    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, DefaultKey> {
        self.ids.drain(..)
    }
}
