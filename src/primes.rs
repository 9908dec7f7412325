//! Bucket-count growth table.
//!
//! Capacities are primes with good distribution properties. Once the table
//! is exhausted every growth step doubles the capacity instead.

/// Ascending bucket counts used for growth. `PRIME_SIZES[0]` is the
/// capacity of a freshly created map.
pub const PRIME_SIZES: [usize; 26] = [
    53, 97, 193, 389, 769, 1543, 3079, 6151, 12289, 24593, 49157, 98317, 196613, 393241, 786433,
    1572869, 3145739, 6291469, 12582917, 25165843, 50331653, 100663319, 201326611, 402653189,
    805306457, 1610612741,
];

/// Highest allowed `len / capacity` once an insertion completes.
pub const MAX_LOAD_FACTOR: f64 = 0.5;

/// Returns true when `len` entries would overload `capacity` buckets.
#[inline]
pub(crate) fn exceeds_load(len: usize, capacity: usize) -> bool {
    len as f64 > capacity as f64 * MAX_LOAD_FACTOR
}

/// Capacity after `current`: the smallest table prime strictly above it,
/// or `2 * current` past the end of the table. `None` on overflow.
pub fn next_capacity(current: usize) -> Option<usize> {
    match PRIME_SIZES.iter().find(|&&p| p > current) {
        Some(&p) => Some(p),
        None => current.checked_mul(2),
    }
}

/// Smallest capacity on the growth path that holds `len` entries without
/// exceeding the load factor. `None` on overflow.
pub fn capacity_for(len: usize) -> Option<usize> {
    let mut capacity = PRIME_SIZES[0];
    while exceeds_load(len, capacity) {
        capacity = next_capacity(capacity)?;
    }
    Some(capacity)
}
