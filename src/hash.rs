//! Key hashers.
//!
//! A `KeyHasher` must be a pure function of whatever the map's comparator
//! treats as key identity: comparator-equal keys must hash equal. Value
//! hashers (`StringHash`, `IntHash`, `StdHash`) suit value comparators;
//! `PointerHash` suits `AddressOrder` only.

use core::hash::{BuildHasher, Hash};
use core::ops::Deref;
use hashbrown::hash_map::DefaultHashBuilder;

/// Hash function over keys.
pub trait KeyHasher<K: ?Sized> {
    fn hash_key(&self, key: &K) -> u64;
}

impl<K: ?Sized, F> KeyHasher<K> for F
where
    F: Fn(&K) -> u64,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self(key)
    }
}

/// Seed of the djb2 string hash.
pub const DJB2_SEED: u32 = 5381;

/// djb2: `hash = hash * 33 + byte`, starting from 5381, wrapping at 32 bits.
pub fn djb2(bytes: &[u8]) -> u32 {
    bytes.iter().fold(DJB2_SEED, |hash, &b| {
        (hash << 5).wrapping_add(hash).wrapping_add(u32::from(b))
    })
}

/// djb2 over the key's bytes. Works for `String`, `&str`, `Vec<u8>` and
/// anything else exposing its bytes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StringHash;

impl<K: AsRef<[u8]> + ?Sized> KeyHasher<K> for StringHash {
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        u64::from(djb2(key.as_ref()))
    }
}

/// Primitive integers whose value is their own hash.
pub trait IntegerKey: Copy {
    fn identity_hash(self) -> u64;
}

macro_rules! integer_key {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntegerKey for $t {
                #[inline]
                fn identity_hash(self) -> u64 {
                    self as u64
                }
            }
        )*
    };
}

integer_key!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

/// Identity hash of an integer key: the value cast to `u64`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IntHash;

impl<K: IntegerKey> KeyHasher<K> for IntHash {
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        key.identity_hash()
    }
}

/// Identity hash of the address a pointer-like key refers to.
///
/// Only correct together with `AddressOrder`: two handles to equal but
/// distinct objects hash differently.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PointerHash;

impl<P: Deref> KeyHasher<P> for PointerHash {
    #[inline]
    fn hash_key(&self, key: &P) -> u64 {
        (&**key as *const P::Target).cast::<()>() as usize as u64
    }
}

/// Adapter running any `BuildHasher` over `K: Hash`. The default map
/// hasher, backed by hashbrown's `DefaultHashBuilder`.
#[derive(Clone, Debug, Default)]
pub struct StdHash<S = DefaultHashBuilder> {
    build: S,
}

impl<S> StdHash<S> {
    pub fn with_build_hasher(build: S) -> Self {
        Self { build }
    }
}

impl<K: Hash + ?Sized, S: BuildHasher> KeyHasher<K> for StdHash<S> {
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self.build.hash_one(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn djb2_known_values() {
        assert_eq!(djb2(b""), 5381);
        assert_eq!(djb2(b"a"), 5381 * 33 + 97);
        assert_eq!(djb2(b"ab"), (5381 * 33 + 97) * 33 + 98);
    }

    #[test]
    fn djb2_wraps_instead_of_overflowing() {
        let long = [0xffu8; 64];
        let expected = long
            .iter()
            .fold(5381u64, |h, &b| (h * 33 + u64::from(b)) & u64::from(u32::MAX));
        assert_eq!(u64::from(djb2(&long)), expected);
    }

    #[test]
    fn string_hash_is_by_value() {
        let owned = String::from("bucket");
        assert_eq!(StringHash.hash_key(&owned), StringHash.hash_key("bucket"));
        assert_eq!(StringHash.hash_key("bucket"), u64::from(djb2(b"bucket")));
    }

    #[test]
    fn int_hash_is_identity() {
        assert_eq!(IntHash.hash_key(&42i32), 42);
        assert_eq!(IntHash.hash_key(&7u8), 7);
        assert_eq!(IntHash.hash_key(&-1i64), u64::MAX);
    }

    #[test]
    fn pointer_hash_follows_identity() {
        let a = Rc::new(String::from("x"));
        let b = Rc::new(String::from("x"));
        assert_eq!(PointerHash.hash_key(&a), PointerHash.hash_key(&Rc::clone(&a)));
        assert_ne!(PointerHash.hash_key(&a), PointerHash.hash_key(&b));
    }

    #[test]
    fn std_hash_agrees_for_equal_keys() {
        let h: StdHash = StdHash::default();
        assert_eq!(h.hash_key("k"), h.hash_key(&String::from("k")));
        let fixed = StdHash::with_build_hasher(std::hash::BuildHasherDefault::<
            std::collections::hash_map::DefaultHasher,
        >::default());
        assert_eq!(fixed.hash_key(&1u32), fixed.hash_key(&1u32));
    }

    #[test]
    fn closures_are_hashers() {
        let len_hash = |s: &String| s.len() as u64;
        assert_eq!(len_hash.hash_key(&String::from("abc")), 3);
    }
}
