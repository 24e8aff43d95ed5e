// ProbeMap end-to-end suite.
//
// Each test documents the behavior being verified. The core invariants
// exercised:
// - Round-trip: get(k) returns the last value put for k until removed.
// - Overwrite: a second put on the same key keeps len unchanged.
// - Removal: removed keys are absent; a second remove is absent too.
// - Growth: capacity stays a power of two and contents survive doubling.
// - Teardown: destroy_with_ownership shows every entry exactly once.
use probe_map::{hash, Applied, Error, ProbeMap, Visit, MAX_PROBE};

fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

// Builds the table from the first three scenarios: three keys into a
// two-slot table.
fn life_test_test2<'v>(
    life: &'v i32,
    test: &'v i32,
    test2: &'v i32,
) -> ProbeMap<&'static str, &'v i32> {
    let mut m = ProbeMap::with_capacity(2).expect("capacity 2 is valid");
    m.put("life", life).expect("put life");
    m.put("test", test).expect("put test");
    m.put("test2", test2).expect("put test2");
    m
}

// Test: creation discipline.
// Verifies: only non-zero powers of two are accepted.
#[test]
fn create_accepts_only_powers_of_two() {
    for n in 0usize..=64 {
        let res = ProbeMap::<&str, ()>::with_capacity(n);
        if n.is_power_of_two() {
            assert_eq!(res.expect("valid capacity").capacity(), n);
        } else {
            assert_eq!(res.unwrap_err(), Error::InvalidCapacity(n));
        }
    }
}

// Test: three inserts into capacity 2 force at least one grow.
// Verifies: every value is retrievable afterwards.
#[test]
fn three_keys_into_two_slots_grow() {
    init_tracing();
    let (life, test, test2) = (42, 69, 420);
    let m = life_test_test2(&life, &test, &test2);

    assert!(m.capacity() > 2);
    assert!(m.capacity().is_power_of_two());
    assert_eq!(m.len(), 3);
    assert_eq!(m.get("life"), Some(&&42));
    assert_eq!(m.get("test"), Some(&&69));
    assert_eq!(m.get("test2"), Some(&&420));
}

// Test: overwrite an existing key.
// Verifies: new value is observed, count is unchanged.
#[test]
fn overwrite_keeps_count() {
    let (life, test, test2) = (42, 69, 420);
    let mut m = life_test_test2(&life, &test, &test2);

    let prev = m.put("life", &test).expect("overwrite");
    assert_eq!(prev, Some(&42));
    assert_eq!(m.get("life"), Some(&&69));
    assert_eq!(m.len(), 3);
}

// Test: remove after overwrite.
// Verifies: the removed key is absent, count drops by one, and removing
// it again reports absence.
#[test]
fn remove_then_lookup_is_absent() {
    let (life, test, test2) = (42, 69, 420);
    let mut m = life_test_test2(&life, &test, &test2);
    m.put("life", &test).expect("overwrite");

    let (k, v) = m.remove("test").expect("test present");
    assert_eq!((k, *v), ("test", 69));
    assert!(m.get("test").is_none());
    assert_eq!(m.len(), 2);
    assert!(m.remove("test").is_none());
    assert_eq!(m.len(), 2);
    assert_eq!(m.get("life"), Some(&&69));
    assert_eq!(m.get("test2"), Some(&&420));
}

// Test: ownership-aware teardown of heap values.
// Verifies: the callback runs exactly once, on the stored entry.
#[test]
fn teardown_with_ownership_visits_once() {
    init_tracing();
    let mut m: ProbeMap<&str, Box<String>> = ProbeMap::with_capacity(2).unwrap();
    m.put("a", Box::new("hello".to_string())).unwrap();
    assert_eq!(m.get("a").map(|s| s.as_str()), Some("hello"));

    let mut seen = Vec::new();
    let outcome = m.destroy_with_ownership(|e| {
        seen.push((*e.key(), e.value().to_string()));
        Visit::Remove
    });
    assert_eq!(outcome, Applied::Completed);
    assert_eq!(seen, vec![("a", "hello".to_string())]);
}

// Test: one hundred distinct keys from capacity 2.
// Verifies: every intermediate get returns the latest put, and the final
// capacity is a power of two of at least 128.
#[test]
fn hundred_keys_from_capacity_two() {
    init_tracing();
    let keys: Vec<String> = (0..100).map(|i| format!("key{i}")).collect();
    let mut m: ProbeMap<&str, usize> = ProbeMap::with_capacity(2).unwrap();

    for (i, k) in keys.iter().enumerate() {
        m.put(k.as_str(), i).unwrap();
        for (j, earlier) in keys.iter().enumerate().take(i + 1) {
            assert_eq!(m.get(earlier.as_str()), Some(&j), "after inserting {k}");
        }
    }
    assert_eq!(m.len(), 100);
    assert!(m.capacity() >= 128);
    assert!(m.capacity().is_power_of_two());
}

// Test: removal leaves no tombstone that hides a colliding key.
// Assumes: "x" and "y" share a home bucket at capacity 16.
// Verifies: after inserting and deleting "x", "y" placed in the same
// window is found.
#[test]
fn colliding_key_after_delete_is_found() {
    assert_eq!(hash::bucket(b"x", 16), hash::bucket(b"y", 16));

    let mut m: ProbeMap<&str, i32> = ProbeMap::with_capacity(16).unwrap();
    m.put("x", 1).unwrap();
    m.remove("x").unwrap();
    m.put("y", 2).unwrap();
    assert_eq!(m.get("y"), Some(&2));
    assert!(m.get("x").is_none());

    // And the other way round: "y" behind a re-inserted "x".
    m.put("x", 3).unwrap();
    m.remove("y").unwrap();
    m.put("y", 4).unwrap();
    assert_eq!(m.get("x"), Some(&3));
    assert_eq!(m.get("y"), Some(&4));
    assert_eq!(m.len(), 2);
}

// Test: an insert that no capacity can place.
// Assumes: runs of NUL bytes all hash to 0, so they share a home bucket at
// every capacity.
// Verifies: the ninth such key fails with CapacityOverflow and leaves len,
// capacity and every stored value as they were; the map stays usable.
#[test]
fn failed_put_leaves_map_unchanged() {
    init_tracing();
    let keys: Vec<Vec<u8>> = (0..=MAX_PROBE).map(|n| vec![0u8; n]).collect();
    let mut m: ProbeMap<&[u8], usize> = ProbeMap::with_capacity(16).unwrap();
    for (i, k) in keys[..MAX_PROBE].iter().enumerate() {
        m.put(k.as_slice(), i).unwrap();
    }
    assert_eq!((m.len(), m.capacity()), (MAX_PROBE, 16));

    let err = m.put(keys[MAX_PROBE].as_slice(), 99).unwrap_err();
    assert_eq!(err, Error::CapacityOverflow);
    assert_eq!((m.len(), m.capacity()), (MAX_PROBE, 16));
    for (i, k) in keys[..MAX_PROBE].iter().enumerate() {
        assert_eq!(m.get(k.as_slice()), Some(&i));
    }
    assert!(m.get(keys[MAX_PROBE].as_slice()).is_none());

    m.put(b"life".as_slice(), 42).unwrap();
    assert_eq!(m.get("life"), Some(&42));
    assert_eq!(m.len(), MAX_PROBE + 1);
}

// Test: byte-slice keys that are prefixes of each other.
// Verifies: keys compare by length as well as content.
#[test]
fn prefix_keys_are_distinct() {
    let buf = b"intVarfloatVar";
    let mut m: ProbeMap<&[u8], u8> = ProbeMap::with_capacity(4).unwrap();
    m.put(&buf[..3], 1).unwrap();
    m.put(&buf[..6], 2).unwrap();
    m.put(&buf[6..], 3).unwrap();
    assert_eq!(m.len(), 3);
    assert_eq!(m.get(b"int"), Some(&1));
    assert_eq!(m.get(b"intVar"), Some(&2));
    assert_eq!(m.get(b"floatVar"), Some(&3));
    assert!(m.get(b"intV").is_none());
}

// Test: traversal directives through the legacy integer convention.
// Verifies: -1 removes, 0 keeps, anything else stops.
#[test]
fn apply_with_integer_codes() {
    let mut m: ProbeMap<String, i32> = ProbeMap::with_capacity(8).unwrap();
    for i in 0..5 {
        m.put(format!("n{i}"), i).unwrap();
    }

    let outcome = m.apply(|e| Visit::from_code(if *e.value() < 2 { -1 } else { 0 }));
    assert!(outcome.is_completed());
    assert_eq!(m.len(), 3);
    assert!(m.get("n0").is_none() && m.get("n1").is_none());

    let outcome = m.apply(|_| Visit::from_code(42));
    assert_eq!(outcome, Applied::EarlyExit);
    assert_eq!(m.len(), 3);
}

// Test: heavy growth from a single slot.
// Verifies: every key stays reachable through its bounded probe window,
// and iteration sees each entry once.
#[test]
fn growth_from_one_slot_keeps_every_key() {
    let keys: Vec<String> = (0..2000).map(|i| format!("ident_{i:04}")).collect();
    let mut m: ProbeMap<&str, usize> = ProbeMap::with_capacity(1).unwrap();
    for (i, k) in keys.iter().enumerate() {
        m.put(k.as_str(), i).unwrap();
    }
    assert!(m.capacity() >= 2048);
    assert!(m.capacity().is_power_of_two());
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(m.get(k.as_str()), Some(&i));
    }
    assert_eq!(m.iter().count(), keys.len());
    assert!(m.len() <= m.capacity());
    assert!(MAX_PROBE <= m.capacity());
}
