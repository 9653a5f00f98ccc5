#![no_main]

use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use recency::CacheError;
use recency::ds::{IntrusiveList, NodeHandle};

// Fuzz arbitrary operation sequences on IntrusiveList
//
// Drives create_node, add_front, link_after, unlink, remove_back,
// move_to_front and discard against a VecDeque of handles (front = head).
fuzz_target!(|data: &[u8]| {
    let mut list: IntrusiveList<u32> = IntrusiveList::new();
    let mut linked: VecDeque<NodeHandle> = VecDeque::new();
    let mut loose: Vec<NodeHandle> = Vec::new();
    let mut discarded: Vec<NodeHandle> = Vec::new();

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 8;
        let arg = usize::from(pair[1]);

        match op {
            0 => {
                // create_node
                let node = list.create_node(arg as u32);
                assert!(list.contains(node));
                assert!(!list.is_linked(node));
                loose.push(node);
            },
            1 => {
                // add_front
                if !loose.is_empty() {
                    let node = loose.swap_remove(arg % loose.len());
                    list.add_front(node).unwrap();
                    linked.push_front(node);
                    assert_eq!(list.front(), Some(node));
                }
            },
            2 => {
                // link_after
                if !loose.is_empty() && !linked.is_empty() {
                    let at = arg % linked.len();
                    let node = loose.pop().unwrap();
                    list.link_after(linked[at], node).unwrap();
                    linked.insert(at + 1, node);
                }
            },
            3 => {
                // unlink
                if linked.is_empty() {
                    if let Some(&node) = loose.first() {
                        assert_eq!(list.unlink(node), Err(CacheError::EmptyCollection));
                    }
                } else {
                    let node = linked.remove(arg % linked.len()).unwrap();
                    list.unlink(node).unwrap();
                    loose.push(node);
                }
            },
            4 => {
                // remove_back
                match linked.pop_back() {
                    Some(expected) => {
                        assert_eq!(list.remove_back().unwrap(), expected);
                        loose.push(expected);
                    },
                    None => assert_eq!(list.remove_back(), Err(CacheError::EmptyCollection)),
                }
            },
            5 => {
                // move_to_front
                if !linked.is_empty() {
                    let node = linked.remove(arg % linked.len()).unwrap();
                    list.move_to_front(node).unwrap();
                    linked.push_front(node);
                }
            },
            6 => {
                // discard
                if !loose.is_empty() {
                    let node = loose.swap_remove(arg % loose.len());
                    let value = *list.value(node).unwrap();
                    assert_eq!(list.discard(node).unwrap(), value);
                    discarded.push(node);
                }
            },
            7 => {
                // misuse: linked node re-linked, stale handle reused
                if let Some(&node) = linked.front() {
                    assert!(matches!(list.add_front(node), Err(CacheError::InvalidArgument(_))));
                }
                if let Some(&node) = discarded.last() {
                    assert!(!list.contains(node));
                    assert!(matches!(list.add_front(node), Err(CacheError::InvalidArgument(_))));
                }
            },
            _ => unreachable!(),
        }

        assert_eq!(list.len(), linked.len());
        assert_eq!(list.is_empty(), linked.is_empty());
        assert_eq!(list.front(), linked.front().copied());
        assert_eq!(list.back(), linked.back().copied());
    }

    let order: Vec<NodeHandle> = list.iter_entries().map(|(node, _)| node).collect();
    assert_eq!(order, Vec::from(linked));
});
