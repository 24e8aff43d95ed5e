#![cfg(test)]

// Property tests for ProbeMap kept inside the crate so they can check the
// slot layout directly.

use crate::hash;
use crate::probe_map::ProbeMap;
use crate::slot::Visit;
use crate::MAX_PROBE;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Get(usize),
    Remove(usize),
    Lookup(String),
    Mutate(usize, i32),
    RemoveOdd,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            2 => idx.clone().prop_map(OpI::Get),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => "[a-z]{0,5}".prop_map(OpI::Lookup),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::RemoveOdd),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn capacity_strategy() -> impl Strategy<Value = usize> {
    (0u32..=5).prop_map(|shift| 1usize << shift)
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants checked after every step:
// - len parity with the model; get parity for every pool key.
// - capacity is a power of two and never shrinks.
// - len equals the number of occupied slots; keys are unique.
// - every occupied slot is within MAX_PROBE of its home bucket.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(capacity in capacity_strategy(), (pool, ops) in arb_scenario()) {
        let mut sut: ProbeMap<&str, i32> = ProbeMap::with_capacity(capacity).unwrap();
        let mut model: HashMap<String, i32> = HashMap::new();
        let mut last_capacity = sut.capacity();

        for op in ops {
            match op {
                OpI::Put(i, v) => {
                    let k = pool[i].as_str();
                    let prev = sut.put(k, v).unwrap();
                    prop_assert_eq!(prev, model.insert(k.to_string(), v));
                }
                OpI::Get(i) => {
                    let k = pool[i].as_str();
                    prop_assert_eq!(sut.get(k), model.get(k));
                }
                OpI::Remove(i) => {
                    let k = pool[i].as_str();
                    let before = sut.len();
                    match (sut.remove(k), model.remove(k)) {
                        (Some((kk, vv)), Some(mv)) => {
                            prop_assert_eq!(kk, k);
                            prop_assert_eq!(vv, mv);
                            prop_assert_eq!(sut.len(), before - 1);
                        }
                        (None, None) => prop_assert_eq!(sut.len(), before),
                        (s, m) => prop_assert!(false, "remove mismatch: {:?} vs {:?}", s, m),
                    }
                    prop_assert!(sut.remove(k).is_none());
                }
                OpI::Lookup(s) => {
                    prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
                }
                OpI::Mutate(i, d) => {
                    let k = pool[i].as_str();
                    if let Some(v) = sut.get_mut(k) {
                        *v = v.wrapping_add(d);
                    }
                    if let Some(v) = model.get_mut(k) {
                        *v = v.wrapping_add(d);
                    }
                }
                OpI::RemoveOdd => {
                    let outcome = sut.apply(|e| {
                        if e.value() % 2 != 0 { Visit::Remove } else { Visit::Continue }
                    });
                    prop_assert!(outcome.is_completed());
                    model.retain(|_, v| *v % 2 == 0);
                }
                OpI::Iterate => {
                    let s_keys: BTreeSet<String> = sut.iter().map(|(k, _)| k.to_string()).collect();
                    let m_keys: BTreeSet<String> = model.keys().cloned().collect();
                    prop_assert_eq!(s_keys, m_keys);
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            prop_assert!(sut.capacity() >= last_capacity);
            last_capacity = sut.capacity();
            sut.assert_invariants();
        }

        for k in &pool {
            prop_assert_eq!(sut.get(k.as_str()), model.get(k.as_str()));
        }
    }
}

// Property: the probe bound holds for every occupied slot, stated directly
// on the slot array rather than through the shared invariant check.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_probe_bound(keys in proptest::collection::vec("[a-zA-Z_][a-zA-Z0-9_]{0,7}", 1..200)) {
        let mut sut: ProbeMap<&str, usize> = ProbeMap::with_capacity(2).unwrap();
        for (i, k) in keys.iter().enumerate() {
            sut.put(k.as_str(), i).unwrap();
        }
        let distinct: BTreeSet<&str> = keys.iter().map(String::as_str).collect();
        prop_assert_eq!(sut.len(), distinct.len());
        prop_assert!(sut.len() <= sut.capacity());

        let capacity = sut.capacity();
        for (i, slot) in sut.slots().iter().enumerate() {
            if let Some(e) = slot {
                let home = hash::bucket(e.key_bytes(), capacity);
                prop_assert!((i + capacity - home) % capacity < MAX_PROBE);
            }
        }
    }
}
