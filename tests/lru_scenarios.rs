// ==============================================
// LRU CACHE SCENARIOS (integration)
// ==============================================
//
// End-to-end behaviour of the public API: the contract wrapper over the LRU
// core over the intrusive list.

use recency::builder::CacheBuilder;
use recency::ds::IntrusiveList;
use recency::{CacheError, ExistingKeyPolicy, LruCache};

fn init_test_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

mod cache_scenarios {
    use super::*;

    #[test]
    fn simple_default_capacity() {
        init_test_logger();
        let mut cache: LruCache<i32, i32> = LruCache::default();
        cache.insert(1, 2).unwrap();
        let value = cache.lookup(&1).unwrap();
        assert_eq!(value.as_deref(), Some(&2));
    }

    #[test]
    fn illegal_capacity_zero() {
        let err = LruCache::<i32, i32>::new(0).unwrap_err();
        assert!(matches!(err, CacheError::InvalidArgument(_)));
    }

    #[test]
    fn max_capacity_builds_and_accepts_inserts() {
        let mut cache = LruCache::<u64, u64>::new(usize::MAX).unwrap();
        assert!(!cache.insert(1, 1).unwrap());
        assert_eq!(cache.lookup(&1).unwrap().as_deref(), Some(&1));

        let built = CacheBuilder::new(usize::MAX).try_build::<u64, u64>().unwrap();
        assert_eq!(built.capacity(), usize::MAX);
    }

    #[test]
    fn min_capacity() {
        init_test_logger();
        let mut cache = LruCache::new(1).unwrap();

        cache.insert(1, 2).unwrap();
        assert_eq!(cache.lookup(&1).unwrap().as_deref(), Some(&2));

        cache.insert(2, 3).unwrap();
        assert_eq!(cache.lookup(&2).unwrap().as_deref(), Some(&3));

        assert_eq!(cache.lookup(&5).unwrap(), None);
    }

    #[test]
    fn lru_kick_out() {
        init_test_logger();
        let mut cache = LruCache::new(5).unwrap();
        for (k, v) in [("a", "A"), ("b", "B"), ("c", "C"), ("d", "D"), ("e", "E")] {
            assert!(!cache.insert(k.to_string(), v.to_string()).unwrap());
        }

        assert_eq!(cache.lookup(&"f".to_string()).unwrap(), None);

        let value = cache.lookup(&"c".to_string()).unwrap();
        assert_eq!(value.as_deref().map(String::as_str), Some("C"));

        assert_eq!(cache.peek_lru().map(|(k, _)| k.as_str()), Some("a"));
        assert!(cache.insert("f".to_string(), "F".to_string()).unwrap());

        assert_eq!(cache.lookup(&"a".to_string()).unwrap(), None);
        for key in ["b", "c", "d", "e", "f"] {
            assert!(cache.contains(&key.to_string()), "missing {key}");
        }
    }

    #[test]
    fn stress_keeps_only_last_n_keys() {
        let n = 64usize;
        let mut cache = LruCache::new(n).unwrap();
        for i in 0..n * 10 {
            cache.insert(i, i * 2).unwrap();
        }

        assert_eq!(cache.len(), n);
        for i in 0..n * 9 {
            assert_eq!(cache.lookup(&i).unwrap(), None, "key {i} should be evicted");
        }
        for i in n * 9..n * 10 {
            assert_eq!(cache.lookup(&i).unwrap().as_deref(), Some(&(i * 2)));
        }
        cache.storage().check_invariants().unwrap();
    }

    #[test]
    fn key_is_never_evicted_by_its_own_insert() {
        let mut cache = LruCache::new(3).unwrap();
        for k in 0..3 {
            cache.insert(k, k).unwrap();
        }
        // 0 is the LRU entry; re-inserting it must refresh, not evict it.
        assert!(!cache.insert(0, 100).unwrap());
        assert!(cache.contains(&0));
        assert_eq!(cache.peek_lru().map(|(k, _)| *k), Some(1));
    }

    #[test]
    fn repeated_insert_retains_original_value_by_default() {
        let mut cache = LruCache::new(4).unwrap();
        cache.insert("k", 1).unwrap();
        cache.insert("k", 2).unwrap();
        assert_eq!(cache.lookup(&"k").unwrap().as_deref(), Some(&1));
        assert_eq!(cache.existing_key_policy(), ExistingKeyPolicy::Retain);
    }

    #[test]
    fn overwrite_policy_updates_value() {
        let mut cache = CacheBuilder::new(4)
            .existing_key_policy(ExistingKeyPolicy::Overwrite)
            .try_build::<&str, i32>()
            .unwrap();
        cache.insert("k", 1).unwrap();
        assert!(!cache.insert("k", 2).unwrap());
        assert_eq!(cache.lookup(&"k").unwrap().as_deref(), Some(&2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn none_value_fails_and_leaves_state_unchanged() {
        let mut cache = LruCache::new(2).unwrap();
        cache.insert(1, "one").unwrap();
        cache.insert(2, "two").unwrap();
        let before: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();

        let err = cache.insert_nullable(3, None).unwrap_err();
        assert!(err.is_invalid_argument());

        let after: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn iter_rebuild_round_trip() {
        let mut cache = LruCache::new(4).unwrap();
        for k in 0..6 {
            cache.insert(k, k * 10).unwrap();
        }
        cache.lookup(&3).unwrap();

        let snapshot: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
        let mut rebuilt = LruCache::new(4).unwrap();
        for (k, v) in snapshot.iter().rev() {
            rebuilt.insert(*k, *v).unwrap();
        }
        let again: Vec<_> = rebuilt.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(snapshot, again);
    }
}

mod list_scenarios {
    use super::*;

    #[test]
    fn empty_list_size_and_remove_back() {
        let mut list: IntrusiveList<u32> = IntrusiveList::new();
        assert_eq!(list.len(), 0);
        assert_eq!(list.remove_back(), Err(CacheError::EmptyCollection));

        let node = list.create_node(7);
        list.add_front(node).unwrap();
        assert_eq!(list.len(), 1);
        list.remove_back().unwrap();
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn cross_list_and_double_link_misuse() {
        let mut a: IntrusiveList<u32> = IntrusiveList::new();
        let mut b: IntrusiveList<u32> = IntrusiveList::new();

        let node = a.create_node(1);
        assert!(matches!(
            b.add_front(node),
            Err(CacheError::InvalidArgument(_))
        ));

        a.add_front(node).unwrap();
        assert!(matches!(
            a.add_front(node),
            Err(CacheError::InvalidArgument(_))
        ));
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 0);
    }
}

#[cfg(feature = "metrics")]
mod metrics_scenarios {
    use super::*;

    #[test]
    fn hit_rate_reflects_lookups() {
        let mut cache = LruCache::new(2).unwrap();
        cache.insert(1, 1).unwrap();
        cache.lookup(&1).unwrap();
        cache.lookup(&1).unwrap();
        cache.lookup(&2).unwrap();
        cache.lookup(&3).unwrap();

        let snap = cache.metrics_snapshot();
        assert_eq!(snap.get_calls, 4);
        assert!((snap.hit_rate() - 0.5).abs() < f64::EPSILON);
    }
}
