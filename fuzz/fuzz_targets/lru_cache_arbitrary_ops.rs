#![no_main]

use libfuzzer_sys::fuzz_target;
use recency::{ExistingKeyPolicy, LruCache};

// Fuzz arbitrary lookup/insert sequences through the contract wrapper
//
// Every call runs the wrapper's size/capacity checks; any violation surfaces
// as an Err and fails the target. The core's own bijection check runs after
// each step as well.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let capacity = usize::from(data[0] % 16) + 1;
    let policy = if data[1] & 1 == 0 {
        ExistingKeyPolicy::Retain
    } else {
        ExistingKeyPolicy::Overwrite
    };
    let mut cache: LruCache<u8, u8> = LruCache::with_policy(capacity, policy).unwrap();

    for pair in data[2..].chunks_exact(2) {
        let key = pair[1] % 32;
        if pair[0] & 1 == 0 {
            let hit = cache.lookup(&key).unwrap();
            assert_eq!(hit.is_some(), cache.contains(&key));
            if hit.is_some() {
                assert_eq!(cache.iter().next().map(|(k, _)| *k), Some(key));
            }
        } else {
            let held = cache.contains(&key);
            let evicted = cache.insert(key, pair[0]).unwrap();
            assert!(!(held && evicted));
            assert!(cache.contains(&key));
            if policy == ExistingKeyPolicy::Overwrite || !held {
                assert_eq!(cache.peek(&key), Some(&pair[0]));
            }
        }

        assert!(cache.len() <= capacity);
        cache.storage().check_invariants().unwrap();
    }
});
