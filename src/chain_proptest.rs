#![cfg(test)]

// Property tests for Chains kept inside the crate so they can reach the
// structural layer and its invariant checker directly.

use crate::chain::Chains;
use proptest::prelude::*;
use slotmap::DefaultKey;
use std::collections::HashMap;

#[derive(Clone, Debug)]
enum Op {
    Push(usize, i32),
    Unlink(usize),
    Find(usize),
    Rebucket(usize),
    Clear,
}

// Keys come from a small pool; each pool entry gets a small hash so that
// chains collide often and several keys can share a hash.
fn arb_scenario() -> impl Strategy<Value = (Vec<(String, u64)>, Vec<Op>)> {
    proptest::collection::btree_set("[a-z]{1,4}", 1..=10).prop_flat_map(|names| {
        let n = names.len();
        let hashes = proptest::collection::vec(0u64..8, n);
        let op = prop_oneof![
            4 => (0..n, any::<i32>()).prop_map(|(i, v)| Op::Push(i, v)),
            2 => (0..n).prop_map(Op::Unlink),
            2 => (0..n).prop_map(Op::Find),
            1 => (1usize..=16).prop_map(Op::Rebucket),
            1 => Just(Op::Clear),
        ];
        let names: Vec<String> = names.into_iter().collect();
        (hashes, proptest::collection::vec(op, 1..80))
            .prop_map(move |(hs, ops)| (names.iter().cloned().zip(hs).collect(), ops))
    })
}

// Property: Chains behaves like a map from key to (slot, value) as long as
// callers only push absent keys, and every structural invariant holds after
// each operation:
// - each node sits in bucket `hash % bucket_count`;
// - chains cover every node exactly once and tails point at the last node;
// - `find` resolves by stored hash plus key equality;
// - `unlink` returns the owned node and its slot never resolves again.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_chains_state_machine((pool, ops) in arb_scenario(), buckets in 1usize..=6) {
        let mut sut: Chains<String, i32> = Chains::with_buckets(buckets);
        let mut model: HashMap<String, (DefaultKey, i32)> = HashMap::new();

        for op in ops {
            match op {
                Op::Push(i, v) => {
                    let (k, h) = &pool[i];
                    if !model.contains_key(k) {
                        let slot = sut.push_back(k.clone(), v, *h);
                        model.insert(k.clone(), (slot, v));
                    }
                }
                Op::Unlink(i) => {
                    let (k, h) = &pool[i];
                    match model.remove(k) {
                        Some((slot, v)) => {
                            let node = sut.unlink(slot).expect("live slot unlinks");
                            prop_assert_eq!(&node.key, k);
                            prop_assert_eq!(node.value, v);
                            prop_assert_eq!(node.hash, *h);
                            prop_assert!(sut.unlink(slot).is_none());
                        }
                        None => prop_assert!(sut.find(*h, k.as_str()).is_none()),
                    }
                }
                Op::Find(i) => {
                    let (k, h) = &pool[i];
                    let found = sut.find(*h, k.as_str());
                    prop_assert_eq!(found, model.get(k).map(|(slot, _)| *slot));
                }
                Op::Rebucket(n) => {
                    sut.rebucket(n);
                    prop_assert_eq!(sut.bucket_count(), n);
                }
                Op::Clear => {
                    sut.clear();
                    model.clear();
                }
            }

            sut.check_invariants();
            prop_assert_eq!(sut.len(), model.len());
            for (k, h) in &pool {
                if let Some((slot, v)) = model.get(k) {
                    prop_assert_eq!(sut.find(*h, k.as_str()), Some(*slot));
                    prop_assert_eq!(sut.node(*slot).value, *v);
                }
            }
        }
    }
}
