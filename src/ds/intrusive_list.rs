//! Intrusive doubly linked list backed by `SlotArena`.
//!
//! Nodes live in a `SlotArena` and link to each other by `SlotId`, so callers
//! hold stable [`NodeHandle`]s and every splice is O(1) without aliased
//! mutable pointers. Two sentinel nodes bracket the real ones; every real
//! node therefore has two neighbours and `unlink`/`link_after` never branch on
//! position.
//!
//! ## Architecture
//!
//! ```text
//!   arena (SlotArena<Node<T>>)
//!   ┌────────┬──────────────────────────────────────────────────┐
//!   │ SlotId │ Node { value, prev, next }                       │
//!   ├────────┼──────────────────────────────────────────────────┤
//!   │ head   │ { value: None,    prev: None,     next: id_a }   │
//!   │ tail   │ { value: None,    prev: id_b,     next: None }   │
//!   │ id_a   │ { value: Some(A), prev: head,     next: id_b }   │
//!   │ id_b   │ { value: Some(B), prev: id_a,     next: tail }   │
//!   │ id_c   │ { value: Some(C), prev: None,     next: None }   │  free-standing
//!   └────────┴──────────────────────────────────────────────────┘
//!
//!   [head] ◄──► [A] ◄──► [B] ◄──► [tail]
//!           MRU            LRU
//! ```
//!
//! ## Ownership
//!
//! Every list gets a process-unique [`ListId`] and every handle carries the
//! id of the list that created it. All operations compare the two, so a
//! handle from another list is rejected instead of corrupting this one.
//! Nodes are created unlinked by [`create_node`](IntrusiveList::create_node),
//! linked by [`add_front`](IntrusiveList::add_front) /
//! [`link_after`](IntrusiveList::link_after), and released from the arena by
//! [`discard`](IntrusiveList::discard) once unlinked.
//!
//! ## Operations
//! - `unlink(node)`: detach, node stays in the arena
//! - `link_after(anchor, node)`: splice an unlinked node after `anchor`
//! - `add_front(node)`: `link_after(head, node)`
//! - `remove_back()`: `unlink(tail.prev)`
//! - `move_to_front(node)`: `add_front(unlink(node))`
//!
//! All of the above are O(1). `iter` is O(n).
//!
//! `debug_validate_invariants()` is available in debug/test builds.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::{CacheError, Result};

static NEXT_LIST_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of one [`IntrusiveList`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListId(u64);

impl ListId {
    fn next() -> Self {
        Self(NEXT_LIST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Opaque, copyable reference to a node of a specific list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    list: ListId,
    slot: SlotId,
}

impl NodeHandle {
    /// Id of the list that created this node.
    pub fn list_id(self) -> ListId {
        self.list
    }
}

#[derive(Debug)]
struct Node<T> {
    value: Option<T>,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

impl<T> Node<T> {
    fn sentinel() -> Self {
        Self {
            value: None,
            prev: None,
            next: None,
        }
    }

    fn is_linked(&self) -> bool {
        self.prev.is_some() && self.next.is_some()
    }
}

#[derive(Debug)]
/// Sentinel-bracketed intrusive list storing nodes in a `SlotArena`.
pub struct IntrusiveList<T> {
    id: ListId,
    arena: SlotArena<Node<T>>,
    head: SlotId,
    tail: SlotId,
    len: usize,
}

impl<T> IntrusiveList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::from_arena(SlotArena::new())
    }

    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_arena(SlotArena::with_capacity(capacity.saturating_add(2)))
    }

    fn from_arena(mut arena: SlotArena<Node<T>>) -> Self {
        let (head, tail) = Self::install_sentinels(&mut arena);
        Self {
            id: ListId::next(),
            arena,
            head,
            tail,
            len: 0,
        }
    }

    fn install_sentinels(arena: &mut SlotArena<Node<T>>) -> (SlotId, SlotId) {
        let head = arena.insert(Node::sentinel());
        let tail = arena.insert(Node::sentinel());
        if let Some(node) = arena.get_mut(head) {
            node.next = Some(tail);
        }
        if let Some(node) = arena.get_mut(tail) {
            node.prev = Some(head);
        }
        (head, tail)
    }

    /// Identity of this list; matches [`NodeHandle::list_id`] of its nodes.
    pub fn id(&self) -> ListId {
        self.id
    }

    /// Returns the number of linked nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no node is linked.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `node` was created by this list and not discarded.
    pub fn contains(&self, node: NodeHandle) -> bool {
        self.check_node(node).is_ok()
    }

    /// Returns `true` if `node` is currently linked into this list.
    pub fn is_linked(&self, node: NodeHandle) -> bool {
        node.list == self.id
            && self
                .arena
                .get(node.slot)
                .is_some_and(|n| n.value.is_some() && n.is_linked())
    }

    /// Returns the value held by `node`, linked or not.
    pub fn value(&self, node: NodeHandle) -> Option<&T> {
        if node.list != self.id {
            return None;
        }
        self.arena.get(node.slot).and_then(|n| n.value.as_ref())
    }

    /// Handle of the most recently used node.
    pub fn front(&self) -> Option<NodeHandle> {
        let first = self.arena.get(self.head)?.next?;
        (first != self.tail).then(|| self.handle(first))
    }

    /// Handle of the least recently used node.
    pub fn back(&self) -> Option<NodeHandle> {
        let last = self.arena.get(self.tail)?.prev?;
        (last != self.head).then(|| self.handle(last))
    }

    /// Returns an iterator over values from front (MRU) to back (LRU).
    pub fn iter(&self) -> IntrusiveListIter<'_, T> {
        IntrusiveListIter {
            entries: self.iter_entries(),
        }
    }

    /// Returns an iterator of `(NodeHandle, &T)` from front to back.
    pub fn iter_entries(&self) -> IntrusiveListEntryIter<'_, T> {
        IntrusiveListEntryIter {
            list: self,
            current: self.arena.get(self.head).and_then(|n| n.next),
        }
    }

    /// Creates a new node owned by this list. The node is not linked and the
    /// list size is unchanged.
    pub fn create_node(&mut self, value: T) -> NodeHandle {
        let slot = self.arena.insert(Node {
            value: Some(value),
            prev: None,
            next: None,
        });
        self.handle(slot)
    }

    /// Detaches `node` from the list and returns it, now unlinked.
    ///
    /// # Errors
    ///
    /// - [`CacheError::InvalidArgument`] if `node` belongs to another list,
    ///   was discarded, or is not linked.
    /// - [`CacheError::EmptyCollection`] if the list holds no nodes.
    pub fn unlink(&mut self, node: NodeHandle) -> Result<NodeHandle> {
        self.check_node(node)?;
        self.check_not_empty()?;

        let (prev, next) = self
            .arena
            .get(node.slot)
            .and_then(|n| n.prev.zip(n.next))
            .ok_or_else(|| CacheError::invalid("node is not linked"))?;

        if let Some(prev_node) = self.arena.get_mut(prev) {
            prev_node.next = Some(next);
        }
        if let Some(next_node) = self.arena.get_mut(next) {
            next_node.prev = Some(prev);
        }
        if let Some(n) = self.arena.get_mut(node.slot) {
            n.prev = None;
            n.next = None;
        }
        self.len -= 1;
        Ok(node)
    }

    /// Links `new_node` immediately after `anchor` and returns it.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`] if either node belongs to another list
    /// or was discarded, if `anchor` is not linked, or if `new_node` is
    /// already linked.
    pub fn link_after(&mut self, anchor: NodeHandle, new_node: NodeHandle) -> Result<NodeHandle> {
        self.check_node(anchor)?;
        self.check_node(new_node)?;
        if !self.is_linked(anchor) {
            return Err(CacheError::invalid("anchor node is not linked"));
        }
        self.check_unlinked(new_node)?;
        self.splice_after(anchor.slot, new_node.slot);
        Ok(new_node)
    }

    /// Links `node` at the front (MRU position) and returns it.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`] if `node` belongs to another list, was
    /// discarded, or is already linked.
    pub fn add_front(&mut self, node: NodeHandle) -> Result<NodeHandle> {
        self.check_node(node)?;
        self.check_unlinked(node)?;
        self.splice_after(self.head, node.slot);
        Ok(node)
    }

    /// Unlinks and returns the back (LRU) node.
    ///
    /// # Errors
    ///
    /// [`CacheError::EmptyCollection`] if the list holds no nodes.
    pub fn remove_back(&mut self) -> Result<NodeHandle> {
        self.check_not_empty()?;
        let last = self
            .arena
            .get(self.tail)
            .and_then(|n| n.prev)
            .ok_or(CacheError::EmptyCollection)?;
        self.unlink(self.handle(last))
    }

    /// Moves a linked node to the front. Fails under the same conditions as
    /// [`unlink`](Self::unlink).
    pub fn move_to_front(&mut self, node: NodeHandle) -> Result<NodeHandle> {
        let node = self.unlink(node)?;
        self.add_front(node)
    }

    /// Releases an unlinked node and returns its value. The handle no longer
    /// resolves afterwards.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`] if `node` belongs to another list, was
    /// already discarded, or is still linked.
    pub fn discard(&mut self, node: NodeHandle) -> Result<T> {
        self.check_node(node)?;
        self.check_unlinked(node)?;
        self.arena
            .remove(node.slot)
            .and_then(|n| n.value)
            .ok_or_else(|| CacheError::invalid("node handle does not resolve"))
    }

    fn handle(&self, slot: SlotId) -> NodeHandle {
        NodeHandle {
            list: self.id,
            slot,
        }
    }

    fn splice_after(&mut self, anchor: SlotId, slot: SlotId) {
        let Some(next) = self.arena.get(anchor).and_then(|n| n.next) else {
            return;
        };
        if let Some(next_node) = self.arena.get_mut(next) {
            next_node.prev = Some(slot);
        }
        if let Some(node) = self.arena.get_mut(slot) {
            node.prev = Some(anchor);
            node.next = Some(next);
        }
        if let Some(anchor_node) = self.arena.get_mut(anchor) {
            anchor_node.next = Some(slot);
        }
        self.len += 1;
    }

    fn check_node(&self, node: NodeHandle) -> Result<()> {
        if node.list != self.id {
            return Err(CacheError::invalid(
                "list can only operate on nodes it created",
            ));
        }
        match self.arena.get(node.slot) {
            Some(n) if n.value.is_some() => Ok(()),
            _ => Err(CacheError::invalid("node handle does not resolve")),
        }
    }

    fn check_unlinked(&self, node: NodeHandle) -> Result<()> {
        if self.is_linked(node) {
            return Err(CacheError::invalid("node is already linked"));
        }
        Ok(())
    }

    fn check_not_empty(&self) -> Result<()> {
        if self.len == 0 {
            return Err(CacheError::EmptyCollection);
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let head = self.arena.get(self.head).expect("head sentinel missing");
        let tail = self.arena.get(self.tail).expect("tail sentinel missing");
        assert!(head.prev.is_none());
        assert!(tail.next.is_none());
        assert_eq!(
            self.len == 0,
            head.next == Some(self.tail) && tail.prev == Some(self.head)
        );

        let mut seen = std::collections::HashSet::new();
        let mut count = 0usize;
        let mut prev = self.head;
        let mut current = head.next.expect("head sentinel unlinked");

        while current != self.tail {
            assert!(seen.insert(current));
            let node = self.arena.get(current).expect("node missing");
            assert!(node.value.is_some());
            assert_eq!(node.prev, Some(prev));
            prev = current;
            current = node.next.expect("linked node without next");
            count += 1;
            assert!(count <= self.len);
        }

        assert_eq!(tail.prev, Some(prev));
        assert_eq!(count, self.len);
    }
}

/// Iterator over values from front to back.
pub struct IntrusiveListIter<'a, T> {
    entries: IntrusiveListEntryIter<'a, T>,
}

impl<'a, T> Iterator for IntrusiveListIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(|(_, value)| value)
    }
}

/// Iterator over `(NodeHandle, &T)` pairs from front to back.
pub struct IntrusiveListEntryIter<'a, T> {
    list: &'a IntrusiveList<T>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for IntrusiveListEntryIter<'a, T> {
    type Item = (NodeHandle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.list.arena.get(id)?;
        let value = node.value.as_ref()?;
        self.current = node.next;
        Some((self.list.handle(id), value))
    }
}

impl<T> Default for IntrusiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<T: Copy>(list: &IntrusiveList<T>) -> Vec<T> {
        list.iter().copied().collect()
    }

    #[test]
    fn create_node_is_unlinked_and_keeps_value() {
        let mut list = IntrusiveList::new();
        let node = list.create_node(1);
        assert_eq!(list.value(node), Some(&1));
        assert!(!list.is_linked(node));
        assert!(list.contains(node));
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn size_tracks_add_and_remove() {
        let mut list = IntrusiveList::new();
        assert_eq!(list.len(), 0);

        let node = list.create_node(5);
        assert_eq!(list.len(), 0);

        list.add_front(node).unwrap();
        assert_eq!(list.len(), 1);

        list.remove_back().unwrap();
        assert_eq!(list.len(), 0);

        let n = 1000;
        for i in 0..n {
            assert_eq!(list.len(), i);
            let node = list.create_node(i);
            list.add_front(node).unwrap();
            assert_eq!(list.len(), i + 1);
        }
        for i in (0..n).rev() {
            assert_eq!(list.len(), i + 1);
            list.remove_back().unwrap();
            assert_eq!(list.len(), i);
        }
        list.debug_validate_invariants();
    }

    #[test]
    fn remove_back_follows_recency() {
        let mut list = IntrusiveList::new();
        for v in ["A", "B"] {
            let node = list.create_node(v);
            list.add_front(node).unwrap();
        }
        let c = list.create_node("C");
        let c = list.add_front(c).unwrap();
        let d = list.create_node("D");
        list.add_front(d).unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(values(&list), vec!["D", "C", "B", "A"]);

        let node = list.remove_back().unwrap();
        assert_eq!(list.value(node), Some(&"A"));

        list.move_to_front(c).unwrap();
        let node = list.remove_back().unwrap();
        assert_eq!(list.value(node), Some(&"B"));
        let node = list.remove_back().unwrap();
        assert_eq!(list.value(node), Some(&"D"));
        assert_eq!(list.len(), 1);

        let node = list.remove_back().unwrap();
        assert_eq!(list.value(node), Some(&"C"));
        assert_eq!(list.len(), 0);
        list.debug_validate_invariants();
    }

    #[test]
    fn remove_back_on_empty_fails() {
        let mut list: IntrusiveList<&str> = IntrusiveList::new();
        assert_eq!(list.remove_back(), Err(CacheError::EmptyCollection));
    }

    #[test]
    fn unlink_on_empty_reports_empty_collection() {
        let mut list = IntrusiveList::new();
        let node = list.create_node(1);
        assert_eq!(list.unlink(node), Err(CacheError::EmptyCollection));
    }

    #[test]
    fn move_to_front_on_empty_reports_empty_collection() {
        let mut list = IntrusiveList::new();
        let node = list.create_node(1);
        assert_eq!(list.move_to_front(node), Err(CacheError::EmptyCollection));
        assert!(!list.is_linked(node));
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn move_to_front_free_standing_node_is_invalid() {
        let mut list = IntrusiveList::new();
        let linked = list.create_node(1);
        list.add_front(linked).unwrap();
        let loose = list.create_node(2);
        assert!(list.move_to_front(loose).unwrap_err().is_invalid_argument());
        assert_eq!(list.front(), Some(linked));
    }

    #[test]
    fn unlink_free_standing_node_is_invalid() {
        let mut list = IntrusiveList::new();
        let linked = list.create_node(1);
        list.add_front(linked).unwrap();
        let loose = list.create_node(2);
        assert!(list.unlink(loose).unwrap_err().is_invalid_argument());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn node_from_another_list_is_rejected() {
        let mut list1 = IntrusiveList::new();
        let mut list2 = IntrusiveList::new();
        let node = list1.create_node(1);

        assert!(list2.add_front(node).unwrap_err().is_invalid_argument());
        assert_eq!(list2.value(node), None);
        assert!(!list2.contains(node));
        assert_ne!(list1.id(), list2.id());
        assert_eq!(node.list_id(), list1.id());

        list1.add_front(node).unwrap();
        let other = list2.create_node(2);
        list2.add_front(other).unwrap();
        assert!(list2.unlink(node).unwrap_err().is_invalid_argument());
        assert!(list2.move_to_front(node).unwrap_err().is_invalid_argument());
        assert!(list1.link_after(node, other).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn adding_same_node_twice_is_rejected() {
        let mut list = IntrusiveList::new();
        let node = list.create_node(5);
        list.add_front(node).unwrap();
        assert!(list.add_front(node).unwrap_err().is_invalid_argument());
        assert_eq!(list.len(), 1);
        list.debug_validate_invariants();
    }

    #[test]
    fn link_after_places_node_behind_anchor() {
        let mut list = IntrusiveList::new();
        let a = list.create_node('a');
        let c = list.create_node('c');
        list.add_front(c).unwrap();
        list.add_front(a).unwrap();

        let b = list.create_node('b');
        list.link_after(a, b).unwrap();
        assert_eq!(values(&list), vec!['a', 'b', 'c']);

        let d = list.create_node('d');
        list.link_after(c, d).unwrap();
        assert_eq!(values(&list), vec!['a', 'b', 'c', 'd']);
        assert_eq!(list.back(), Some(d));
        list.debug_validate_invariants();
    }

    #[test]
    fn link_after_unlinked_anchor_is_rejected() {
        let mut list = IntrusiveList::new();
        let anchor = list.create_node(1);
        let node = list.create_node(2);
        assert!(list.link_after(anchor, node).unwrap_err().is_invalid_argument());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn move_to_front_edges() {
        let mut list = IntrusiveList::new();
        let mut handles = Vec::new();
        for v in ["c", "b", "a"] {
            let node = list.create_node(v);
            handles.push(list.add_front(node).unwrap());
        }
        let (c, _b, a) = (handles[0], handles[1], handles[2]);

        list.move_to_front(a).unwrap();
        assert_eq!(values(&list), vec!["a", "b", "c"]);

        list.move_to_front(c).unwrap();
        assert_eq!(values(&list), vec!["c", "a", "b"]);
        assert_eq!(list.front(), Some(c));
        assert_eq!(list.len(), 3);
        list.debug_validate_invariants();
    }

    #[test]
    fn discard_releases_unlinked_node_only() {
        let mut list = IntrusiveList::new();
        let node = list.create_node(String::from("x"));
        list.add_front(node).unwrap();
        assert!(list.discard(node).unwrap_err().is_invalid_argument());

        let node = list.remove_back().unwrap();
        assert_eq!(list.discard(node), Ok(String::from("x")));
        assert!(!list.contains(node));
        assert_eq!(list.value(node), None);
        assert!(list.add_front(node).unwrap_err().is_invalid_argument());
        assert!(list.discard(node).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn front_and_back_skip_sentinels() {
        let mut list = IntrusiveList::new();
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);

        let only = list.create_node(1);
        list.add_front(only).unwrap();
        assert_eq!(list.front(), Some(only));
        assert_eq!(list.back(), Some(only));
    }

    #[test]
    fn iter_entries_yields_handles_in_order() {
        let mut list = IntrusiveList::new();
        let a = list.create_node("a");
        let b = list.create_node("b");
        list.add_front(b).unwrap();
        list.add_front(a).unwrap();

        let entries: Vec<_> = list.iter_entries().map(|(h, v)| (h, *v)).collect();
        assert_eq!(entries, vec![(a, "a"), (b, "b")]);
    }
}
