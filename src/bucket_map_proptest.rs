#![cfg(test)]

// Property tests for BucketMap kept inside the crate so they can inspect
// bucket layout directly.

use crate::bucket_map::{bucket_index, BucketMap};
use crate::compare::{Comparator, NaturalOrder};
use crate::hash::{KeyHasher, StringHash};
use crate::primes::PRIME_SIZES;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

// Pool-indexed operations so shrinking moves toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Replace(usize, i32),
    Remove(usize),
    RemoveEntry(usize),
    Find(usize),
    Mutate(usize, i32),
    Walk,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=40).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            8 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Replace(i, v)),
            3 => idx.clone().prop_map(Op::Remove),
            1 => idx.clone().prop_map(Op::RemoveEntry),
            3 => idx.clone().prop_map(Op::Find),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => Just(Op::Walk),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run<C, H>(
    sut: &mut BucketMap<String, i32, C, H>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    C: Comparator<String>,
    H: KeyHasher<String>,
{
    let mut model: HashMap<String, i32> = HashMap::new();
    let released = Rc::new(Cell::new(0usize));
    let mut expected_released = 0usize;
    let counter = released.clone();
    sut.set_value_release(Some(Box::new(move |_: i32| counter.set(counter.get() + 1))));

    for op in ops {
        match op {
            Op::Insert(i, v) => {
                let k = pool[i].clone();
                let before = sut.capacity();
                sut.insert(k.clone(), v).expect("small maps never fail to allocate");
                prop_assert!(sut.capacity() >= before);
                if model.insert(k, v).is_some() {
                    expected_released += 1;
                }
            }
            Op::Replace(i, v) => {
                let k = pool[i].clone();
                let old = sut.replace(k.clone(), v).expect("small maps never fail to allocate");
                let model_old = model.insert(k.clone(), v);
                prop_assert_eq!(old, model_old.map(|mv| (k, mv)));
            }
            Op::Remove(i) => {
                let k = &pool[i];
                let present = model.remove(k).is_some();
                prop_assert_eq!(sut.remove(k), present);
                if present {
                    expected_released += 1;
                }
                prop_assert!(sut.find(k).is_none());
            }
            Op::RemoveEntry(i) => {
                let k = &pool[i];
                let got = sut.remove_entry(k);
                prop_assert_eq!(got, model.remove(k).map(|v| (k.clone(), v)));
            }
            Op::Find(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.find(k), model.get(k));
                prop_assert_eq!(sut.contains_key(k), model.contains_key(k));
                let node = sut.find_node(k);
                prop_assert_eq!(node.is_some(), model.contains_key(k));
                if let Some(c) = node {
                    prop_assert_eq!(c.key(&*sut), Some(k));
                }
            }
            Op::Mutate(i, d) => {
                let k = &pool[i];
                if let Some(v) = sut.get_mut(k) {
                    *v = v.wrapping_add(d);
                }
                if let Some(v) = model.get_mut(k) {
                    *v = v.wrapping_add(d);
                }
            }
            Op::Walk => {
                let mut seen = BTreeSet::new();
                let mut last: Option<usize> = None;
                let mut cur = sut.first();
                while let Some(c) = cur {
                    // Bucket index never decreases along a walk.
                    prop_assert!(last.map_or(true, |b| b <= c.bucket()));
                    last = Some(c.bucket());
                    let k = c.key(&*sut).expect("walk cursor resolves").clone();
                    prop_assert!(seen.insert(k), "entry visited twice");
                    cur = sut.next(c).expect("no modification during walk");
                }
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(seen, m_keys);
            }
            Op::Clear => {
                expected_released += model.len();
                model.clear();
                sut.clear();
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.load_factor() <= 0.5);
        prop_assert!(PRIME_SIZES.contains(&sut.capacity()));
        prop_assert_eq!(released.get(), expected_released);
    }

    // Every entry sits in the bucket its stored hash selects.
    for (b, bucket) in sut.buckets.iter().enumerate() {
        for id in bucket.iter() {
            let e = &sut.entries[id];
            prop_assert_eq!(bucket_index(e.hash, sut.capacity()), b);
        }
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - insert replaces in place; the old value is released exactly once.
// - replace/remove_entry hand back exactly the model's displaced pair.
// - find/contains_key/find_node parity for present and absent keys.
// - a cursor walk visits each live key once with non-decreasing buckets.
// - len parity, load factor <= 0.5, capacity from the prime table.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: BucketMap<String, i32> = BucketMap::new();
        run(&mut sut, &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_djb2((pool, ops) in arb_scenario()) {
        let mut sut: BucketMap<String, i32, NaturalOrder, StringHash> =
            BucketMap::with_comparator_and_hasher(NaturalOrder, StringHash);
        run(&mut sut, &pool, ops)?;
    }
}

fn constant_hash(_: &String) -> u64 {
    0
}

// Property: same invariants with every key in bucket 0, so all lookups
// rely on the comparator alone.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut: BucketMap<String, i32, NaturalOrder, fn(&String) -> u64> =
            BucketMap::with_comparator_and_hasher(NaturalOrder, constant_hash);
        run(&mut sut, &pool, ops)?;
        prop_assert!(sut.buckets.iter().skip(1).all(|b| b.is_empty()));
    }
}
