//! BucketMap: chained hash table over comparator-ordered buckets.

use crate::bucket::OrderedBucket;
use crate::compare::{Comparator, NaturalOrder};
use crate::cursor::Cursor;
use crate::error::MapError;
use crate::hash::{KeyHasher, StdHash};
use crate::primes::{self, PRIME_SIZES};
use core::borrow::Borrow;
use core::fmt;
use core::hash::Hash;
use core::mem;
use core::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use slotmap::{DefaultKey, SlotMap};

/// Callback receiving ownership of a key or value the map destroys.
pub type Release<T> = Box<dyn FnMut(T)>;

#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// Computed once on insert; rehashing reuses it instead of calling the
    /// hasher again.
    pub(crate) hash: u64,
}

/// Optional release hooks. An unset hook means plain `drop`.
pub(crate) struct Releasers<K, V> {
    key: Option<Release<K>>,
    value: Option<Release<V>>,
}

impl<K, V> Releasers<K, V> {
    pub(crate) const fn none() -> Self {
        Releasers {
            key: None,
            value: None,
        }
    }

    pub(crate) fn is_set(&self) -> bool {
        self.key.is_some() || self.value.is_some()
    }

    pub(crate) fn release(&mut self, key: K, value: V) {
        match self.key.as_mut() {
            Some(f) => f(key),
            None => drop(key),
        }
        match self.value.as_mut() {
            Some(f) => f(value),
            None => drop(value),
        }
    }
}

/// Source of the owner tag each map stamps on its cursors.
static NEXT_OWNER: AtomicU64 = AtomicU64::new(0);

/// Hash map with separate chaining into comparator-ordered buckets.
///
/// `C` decides key identity and the order inside a bucket; `H` must hash
/// comparator-equal keys equally. Capacities follow `PRIME_SIZES`, and the
/// table grows before any insertion that would push the load factor above
/// `MAX_LOAD_FACTOR`.
///
/// Lookups accept any borrowed form `Q` of the key, as long as the
/// comparator and hasher treat `Q` the way they treat `K`: for
/// `K: Borrow<Q>` the two must compare and hash identically.
pub struct BucketMap<K, V, C = NaturalOrder, H = StdHash> {
    pub(crate) buckets: Vec<OrderedBucket>,
    pub(crate) entries: SlotMap<DefaultKey, Entry<K, V>>,
    comparator: C,
    hasher: H,
    releasers: Releasers<K, V>,
    /// Bumped on every structural change; cursors carry the value they saw.
    pub(crate) epoch: u64,
    /// Unique per map; cursors from another map are rejected.
    pub(crate) owner: u64,
}

impl<K, V> BucketMap<K, V>
where
    K: Ord + Hash,
{
    pub fn new() -> Self {
        Self::with_comparator_and_hasher(NaturalOrder, StdHash::default())
    }

    /// # Panics
    /// If no capacity on the growth path holding `len` entries fits in
    /// `usize`.
    pub fn with_capacity(len: usize) -> Self {
        Self::with_capacity_and_strategies(len, NaturalOrder, StdHash::default())
    }
}

impl<K, V> Default for BucketMap<K, V>
where
    K: Ord + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Bucket index for `hash` in a table of `capacity` buckets.
#[inline]
pub(crate) fn bucket_index(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

/// Search `bucket` for `key`. Free function so callers can hold a mutable
/// borrow of another map field at the same time.
fn locate<K, V, C, Q>(
    bucket: &OrderedBucket,
    entries: &SlotMap<DefaultKey, Entry<K, V>>,
    comparator: &C,
    key: &Q,
) -> Result<usize, usize>
where
    K: Borrow<Q>,
    Q: ?Sized,
    C: Comparator<Q>,
{
    bucket.search(|id| {
        let stored: &Q = entries[id].key.borrow();
        comparator.compare(stored, key)
    })
}

impl<K, V, C, H> BucketMap<K, V, C, H>
where
    C: Comparator<K>,
    H: KeyHasher<K>,
{
    pub fn with_comparator_and_hasher(comparator: C, hasher: H) -> Self {
        Self::with_bucket_count(PRIME_SIZES[0], comparator, hasher)
    }

    /// # Panics
    /// If no capacity on the growth path holding `len` entries fits in
    /// `usize`.
    pub fn with_capacity_and_strategies(len: usize, comparator: C, hasher: H) -> Self {
        let capacity = match primes::capacity_for(len) {
            Some(c) => c,
            None => panic!("capacity overflow"),
        };
        Self::with_bucket_count(capacity, comparator, hasher)
    }

    fn with_bucket_count(capacity: usize, comparator: C, hasher: H) -> Self {
        let mut buckets = Vec::with_capacity(capacity);
        buckets.resize_with(capacity, OrderedBucket::new);
        Self {
            buckets,
            entries: SlotMap::with_key(),
            comparator,
            hasher,
            releasers: Releasers::none(),
            epoch: 0,
            owner: NEXT_OWNER.fetch_add(1, AtomicOrdering::Relaxed),
        }
    }

    /// Insert `key -> value`. A comparator-equal key already present is
    /// replaced in place together with its value, and the old pair goes to
    /// the release hooks. May grow the table first.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), MapError> {
        if let Some((old_key, old_value)) = self.replace(key, value)? {
            self.releasers.release(old_key, old_value);
        }
        Ok(())
    }

    /// Like `insert`, but a displaced pair is returned to the caller
    /// instead of being released.
    pub fn replace(&mut self, key: K, value: V) -> Result<Option<(K, V)>, MapError> {
        while primes::exceeds_load(self.len() + 1, self.capacity()) {
            self.grow()?;
        }

        let hash = <H as KeyHasher<K>>::hash_key(&self.hasher, &key);
        let pos = bucket_index(hash, self.buckets.len());
        let bucket = &mut self.buckets[pos];
        match locate(bucket, &self.entries, &self.comparator, &key) {
            Ok(at) => {
                // In place: the bucket order is unchanged, cursors stay valid.
                let id = bucket.get(at).expect("search hit is in bounds");
                let entry = &mut self.entries[id];
                let old_key = mem::replace(&mut entry.key, key);
                let old_value = mem::replace(&mut entry.value, value);
                Ok(Some((old_key, old_value)))
            }
            Err(at) => {
                bucket.try_reserve_one()?;
                let id = self.entries.insert(Entry { key, value, hash });
                bucket.insert_at(at, id);
                self.epoch = self.epoch.wrapping_add(1);
                Ok(None)
            }
        }
    }

    fn slot_of<Q>(&self, key: &Q) -> Option<(usize, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        H: KeyHasher<Q>,
    {
        let hash = <H as KeyHasher<Q>>::hash_key(&self.hasher, key);
        let pos = bucket_index(hash, self.buckets.len());
        let at = locate(&self.buckets[pos], &self.entries, &self.comparator, key).ok()?;
        Some((pos, at))
    }

    /// Value bound to `key`. Only the key's own bucket is searched.
    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        H: KeyHasher<Q>,
    {
        let (pos, at) = self.slot_of(key)?;
        let id = self.buckets[pos].get(at)?;
        self.entries.get(id).map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        H: KeyHasher<Q>,
    {
        let (pos, at) = self.slot_of(key)?;
        let id = self.buckets[pos].get(at)?;
        self.entries.get_mut(id).map(|e| &mut e.value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        H: KeyHasher<Q>,
    {
        self.slot_of(key).is_some()
    }

    /// Cursor at the entry for `key`, usable for key/value access and as a
    /// starting point for `next`.
    pub fn find_node<Q>(&self, key: &Q) -> Option<Cursor>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        H: KeyHasher<Q>,
    {
        let (pos, at) = self.slot_of(key)?;
        let id = self.buckets[pos].get(at)?;
        Some(Cursor::new(pos, at, id, self.epoch, self.owner))
    }

    /// Remove `key`, handing its pair to the release hooks. Returns whether
    /// the key was present; an absent key is a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        H: KeyHasher<Q>,
    {
        match self.remove_entry(key) {
            Some((k, v)) => {
                self.releasers.release(k, v);
                true
            }
            None => false,
        }
    }

    /// Remove `key` and return its pair without calling the release hooks.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
        H: KeyHasher<Q>,
    {
        let (pos, at) = self.slot_of(key)?;
        let id = self.buckets[pos].remove_at(at);
        self.epoch = self.epoch.wrapping_add(1);
        let entry = self.entries.remove(id)?;
        Some((entry.key, entry.value))
    }

    /// Move every entry into a table of the next capacity.
    ///
    /// The new bucket array is fully built before it replaces the old one,
    /// so an allocation failure leaves the map untouched.
    fn grow(&mut self) -> Result<(), MapError> {
        let old_capacity = self.buckets.len();
        let new_capacity =
            primes::next_capacity(old_capacity).ok_or(MapError::CapacityOverflow)?;

        let fresh = self.redistribute(new_capacity).map_err(|e| {
            tracing::warn!(old_capacity, new_capacity, error = %e, "rehash failed");
            e
        })?;
        self.buckets = fresh;
        self.epoch = self.epoch.wrapping_add(1);
        tracing::debug!(old_capacity, new_capacity, len = self.len(), "rehash");
        Ok(())
    }

    fn redistribute(&self, new_capacity: usize) -> Result<Vec<OrderedBucket>, MapError> {
        let mut fresh: Vec<OrderedBucket> = Vec::new();
        fresh.try_reserve_exact(new_capacity)?;
        fresh.resize_with(new_capacity, OrderedBucket::new);

        let mut moved = 0usize;
        for bucket in &self.buckets {
            for id in bucket.iter() {
                let entry = &self.entries[id];
                let target = &mut fresh[bucket_index(entry.hash, new_capacity)];
                let at = match locate(target, &self.entries, &self.comparator, &entry.key) {
                    Ok(at) | Err(at) => at,
                };
                target.try_reserve_one()?;
                target.insert_at(at, id);
                moved += 1;
            }
        }
        debug_assert_eq!(moved, self.entries.len(), "every live entry is re-bucketed");
        Ok(fresh)
    }
}

impl<K, V, C, H> BucketMap<K, V, C, H> {
    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current bucket count.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Install the hook receiving destroyed keys, returning the previous
    /// one. Affects only destructions after the call.
    pub fn set_key_release(&mut self, release: Option<Release<K>>) -> Option<Release<K>> {
        mem::replace(&mut self.releasers.key, release)
    }

    /// Install the hook receiving destroyed values, returning the previous
    /// one. Affects only destructions after the call.
    pub fn set_value_release(&mut self, release: Option<Release<V>>) -> Option<Release<V>> {
        mem::replace(&mut self.releasers.value, release)
    }

    /// Destroy every entry through the release hooks, keeping the current
    /// capacity.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            for id in bucket.drain() {
                if let Some(e) = self.entries.remove(id) {
                    self.releasers.release(e.key, e.value);
                }
            }
        }
        debug_assert!(self.entries.is_empty());
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Take the bucket array, arena and release hooks out, leaving an empty
    /// shell whose Drop has nothing to do.
    pub(crate) fn take_storage(&mut self) -> Storage<K, V> {
        self.epoch = self.epoch.wrapping_add(1);
        Storage {
            buckets: mem::take(&mut self.buckets),
            entries: mem::take(&mut self.entries),
            releasers: mem::replace(&mut self.releasers, Releasers::none()),
        }
    }
}

/// Everything `take_storage` moves out of a map.
pub(crate) struct Storage<K, V> {
    pub(crate) buckets: Vec<OrderedBucket>,
    pub(crate) entries: SlotMap<DefaultKey, Entry<K, V>>,
    pub(crate) releasers: Releasers<K, V>,
}

impl<K, V, C, H> Drop for BucketMap<K, V, C, H> {
    fn drop(&mut self) {
        // Without hooks the fields drop on their own.
        if self.releasers.is_set() {
            self.clear();
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C, H> fmt::Debug for BucketMap<K, V, C, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
