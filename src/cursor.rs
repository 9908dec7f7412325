//! Cursor protocol and iterators.
//!
//! Traversal order is ascending bucket index, then comparator order inside
//! each bucket. Cursors are plain `Copy` positions tagged with the map's
//! epoch: inserting a new key, removing, clearing or rehashing moves
//! entries between positions, and `next` rejects a cursor taken before any
//! of those with `MapError::StaleCursor`. Key/value access through a
//! cursor uses the generational entry id, so it keeps working for an entry
//! that is still live and returns `None` once that entry is gone. Every
//! cursor also carries its map's owner tag; handing it to a different map
//! yields `None` from the accessors and `StaleCursor` from `next`.

use crate::bucket::OrderedBucket;
use crate::bucket_map::{BucketMap, Entry, Releasers};
use crate::error::MapError;
use slotmap::{DefaultKey, SlotMap};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Cursor {
    bucket: usize,
    index: usize,
    id: DefaultKey,
    epoch: u64,
    owner: u64,
}

impl Cursor {
    pub(crate) fn new(bucket: usize, index: usize, id: DefaultKey, epoch: u64, owner: u64) -> Self {
        Cursor {
            bucket,
            index,
            id,
            epoch,
            owner,
        }
    }

    /// Bucket this cursor points into.
    pub fn bucket(&self) -> usize {
        self.bucket
    }

    fn entry<'a, K, V, C, H>(&self, map: &'a BucketMap<K, V, C, H>) -> Option<&'a Entry<K, V>> {
        if self.owner != map.owner {
            return None;
        }
        map.entries.get(self.id)
    }

    pub fn key<'a, K, V, C, H>(&self, map: &'a BucketMap<K, V, C, H>) -> Option<&'a K> {
        self.entry(map).map(|e| &e.key)
    }

    pub fn value<'a, K, V, C, H>(&self, map: &'a BucketMap<K, V, C, H>) -> Option<&'a V> {
        self.entry(map).map(|e| &e.value)
    }

    pub fn value_mut<'a, K, V, C, H>(
        &self,
        map: &'a mut BucketMap<K, V, C, H>,
    ) -> Option<&'a mut V> {
        if self.owner != map.owner {
            return None;
        }
        map.entries.get_mut(self.id).map(|e| &mut e.value)
    }
}

/// First position in the first non-empty bucket at or after `from`.
fn first_from(buckets: &[OrderedBucket], from: usize) -> Option<(usize, usize)> {
    buckets
        .iter()
        .enumerate()
        .skip(from)
        .find_map(|(b, bucket)| bucket.first().map(|i| (b, i)))
}

/// Position following `(bucket, index)` in traversal order.
fn advance(buckets: &[OrderedBucket], bucket: usize, index: usize) -> Option<(usize, usize)> {
    match buckets[bucket].next(index) {
        Some(i) => Some((bucket, i)),
        None => first_from(buckets, bucket + 1),
    }
}

impl<K, V, C, H> BucketMap<K, V, C, H> {
    fn cursor_at(&self, (bucket, index): (usize, usize)) -> Option<Cursor> {
        let id = self.buckets[bucket].get(index)?;
        Some(Cursor::new(bucket, index, id, self.epoch, self.owner))
    }

    /// Cursor at the first entry, `None` for an empty map.
    pub fn first(&self) -> Option<Cursor> {
        self.cursor_at(first_from(&self.buckets, 0)?)
    }

    /// Cursor after `cursor`, `Ok(None)` at the end.
    ///
    /// Fails with `StaleCursor` if the map changed structurally since the
    /// cursor was produced, or if the cursor does not point into this map.
    pub fn next(&self, cursor: Cursor) -> Result<Option<Cursor>, MapError> {
        let here = self.buckets.get(cursor.bucket).and_then(|b| b.get(cursor.index));
        if cursor.owner != self.owner || cursor.epoch != self.epoch || here != Some(cursor.id) {
            return Err(MapError::StaleCursor);
        }
        Ok(advance(&self.buckets, cursor.bucket, cursor.index).and_then(|p| self.cursor_at(p)))
    }

    /// Entries in traversal order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: &self.buckets,
            entries: &self.entries,
            pos: first_from(&self.buckets, 0),
            remaining: self.entries.len(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Mutable access to every value, in storage order rather than
    /// traversal order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.entries.iter_mut(),
        }
    }
}

/// Iterator over `(&K, &V)` in traversal order.
pub struct Iter<'a, K, V> {
    buckets: &'a [OrderedBucket],
    entries: &'a SlotMap<DefaultKey, Entry<K, V>>,
    pos: Option<(usize, usize)>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (bucket, index) = self.pos?;
        let id = self.buckets[bucket].get(index)?;
        self.pos = advance(self.buckets, bucket, index);
        self.remaining -= 1;
        let e = &self.entries[id];
        Some((&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Iterator over `(&K, &mut V)` in storage order.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &mut e.value))
    }
}

/// Owning iterator in traversal order. Pairs handed out belong to the
/// caller and skip the release hooks; pairs still left when the iterator
/// is dropped go through the hooks the map had installed.
pub struct IntoIter<K, V> {
    order: std::vec::IntoIter<DefaultKey>,
    entries: SlotMap<DefaultKey, Entry<K, V>>,
    releasers: Releasers<K, V>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.order.next()?;
        let e = self.entries.remove(id)?;
        Some((e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> Drop for IntoIter<K, V> {
    fn drop(&mut self) {
        if !self.releasers.is_set() {
            return;
        }
        for id in self.order.by_ref() {
            if let Some(e) = self.entries.remove(id) {
                self.releasers.release(e.key, e.value);
            }
        }
    }
}

impl<K, V, C, H> IntoIterator for BucketMap<K, V, C, H> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> Self::IntoIter {
        let storage = self.take_storage();
        let order: Vec<DefaultKey> = storage
            .buckets
            .iter()
            .flat_map(OrderedBucket::iter)
            .collect();
        IntoIter {
            order: order.into_iter(),
            entries: storage.entries,
            releasers: storage.releasers,
        }
    }
}

impl<'a, K, V, C, H> IntoIterator for &'a BucketMap<K, V, C, H> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
