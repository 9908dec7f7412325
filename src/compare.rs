//! Three-way key comparators used to order entries inside a bucket.

use core::cmp::Ordering;
use core::ops::Deref;

/// Total three-way order over keys. Two keys are the same binding iff
/// `compare` returns `Ordering::Equal`.
pub trait Comparator<K: ?Sized> {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

/// Orders keys by their `Ord` implementation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Orders pointer-like keys by the address they point to, so two handles
/// are equal only when they refer to the same object. Pair with
/// `PointerHash`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressOrder;

impl<P: Deref> Comparator<P> for AddressOrder {
    #[inline]
    fn compare(&self, a: &P, b: &P) -> Ordering {
        let a = (&**a as *const P::Target).cast::<()>();
        let b = (&**b as *const P::Target).cast::<()>();
        a.cmp(&b)
    }
}
