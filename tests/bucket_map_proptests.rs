// Property tests for BucketMap's public API.
//
// Invariants covered:
// - Round-trip: after inserting distinct keys, find(k) returns the latest
//   value for every k.
// - Rehash correctness: across any insert that grows the table, every
//   previously reachable pair stays reachable and capacity strictly grows.
// - Iteration completeness and order: a cursor walk visits each live key
//   exactly once, by ascending bucket and ascending key within a bucket.
use bucket_map::{BucketMap, IntHash, NaturalOrder};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

type IntMap = BucketMap<u64, u64, NaturalOrder, IntHash>;

fn int_map() -> IntMap {
    BucketMap::with_comparator_and_hasher(NaturalOrder, IntHash)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    // Property: latest value wins for every key, including repeated keys.
    #[test]
    fn prop_round_trip(pairs in proptest::collection::vec((0u64..500, any::<u64>()), 0..400)) {
        let mut m = int_map();
        let mut model = HashMap::new();
        for &(k, v) in &pairs {
            m.insert(k, v).unwrap();
            model.insert(k, v);
        }
        prop_assert_eq!(m.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(m.find(k), Some(v));
        }
    }

    // Property: a growing insert keeps every earlier pair and raises capacity.
    #[test]
    fn prop_rehash_preserves_pairs(keys in proptest::collection::hash_set(any::<u64>(), 1..300)) {
        let mut m = int_map();
        let mut inserted: Vec<u64> = Vec::new();
        for k in keys {
            let before = m.capacity();
            m.insert(k, k.wrapping_mul(3)).unwrap();
            inserted.push(k);
            if m.capacity() != before {
                prop_assert!(m.capacity() > before);
                for &old in &inserted {
                    prop_assert_eq!(m.find(&old), Some(&old.wrapping_mul(3)));
                }
            }
            prop_assert!(m.len() * 2 <= m.capacity());
        }
    }

    // Property: walk order is (bucket, key) ascending and covers the live set.
    #[test]
    fn prop_walk_order_and_completeness(
        inserts in proptest::collection::vec(any::<u64>(), 0..300),
        removes in proptest::collection::vec(any::<prop::sample::Index>(), 0..100),
    ) {
        let mut m = int_map();
        let mut model = BTreeMap::new();
        for &k in &inserts {
            m.insert(k, !k).unwrap();
            model.insert(k, !k);
        }
        if !inserts.is_empty() {
            for ix in removes {
                let k = *ix.get(&inserts);
                prop_assert_eq!(m.remove(&k), model.remove(&k).is_some());
            }
        }

        let cap = m.capacity() as u64;
        let mut walked = Vec::new();
        let mut cur = m.first();
        while let Some(c) = cur {
            let k = *c.key(&m).unwrap();
            prop_assert_eq!(c.bucket() as u64, k % cap);
            prop_assert_eq!(c.value(&m), Some(&!k));
            walked.push(k);
            cur = m.next(c).unwrap();
        }

        let mut expected: Vec<u64> = model.keys().copied().collect();
        expected.sort_by_key(|&k| (k % cap, k));
        prop_assert_eq!(&walked, &expected);

        let iterated: Vec<u64> = m.keys().copied().collect();
        prop_assert_eq!(&iterated, &expected);
        let owned: Vec<u64> = m.into_iter().map(|(k, _)| k).collect();
        prop_assert_eq!(owned, expected);
    }
}
