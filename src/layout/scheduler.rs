//! Pending-layout list.
//!
//! Elements with stale geometry are queued in insertion order. Each queued
//! element carries its own link node (kept in a secondary map keyed by the
//! element handle), so membership tests, removal and re-queueing are O(1)
//! without searching the list.

use slotmap::SecondaryMap;

use crate::dom::node::ElementId;

#[derive(Debug, Clone, Copy, Default)]
struct Link {
    prev: Option<ElementId>,
    next: Option<ElementId>,
}

/// Intrusive FIFO of elements awaiting validation.
#[derive(Debug, Default)]
pub struct PendingList {
    links: SecondaryMap<ElementId, Link>,
    head: Option<ElementId>,
    tail: Option<ElementId>,
}

impl PendingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `id` unless it is already queued. Returns whether it was added.
    pub fn push_back(&mut self, id: ElementId) -> bool {
        if self.links.contains_key(id) {
            return false;
        }
        let link = Link { prev: self.tail, next: None };
        match self.tail {
            Some(tail) => {
                if let Some(l) = self.links.get_mut(tail) {
                    l.next = Some(id);
                }
            }
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.links.insert(id, link);
        true
    }

    /// Unlink `id`. Returns whether it was queued.
    pub fn remove(&mut self, id: ElementId) -> bool {
        let Some(link) = self.links.remove(id) else {
            return false;
        };
        match link.prev {
            Some(p) => {
                if let Some(l) = self.links.get_mut(p) {
                    l.next = link.next;
                }
            }
            None => self.head = link.next,
        }
        match link.next {
            Some(n) => {
                if let Some(l) = self.links.get_mut(n) {
                    l.prev = link.prev;
                }
            }
            None => self.tail = link.prev,
        }
        true
    }

    pub fn pop_front(&mut self) -> Option<ElementId> {
        let head = self.head?;
        self.remove(head);
        Some(head)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.links.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Queued elements, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.head, move |&id| self.links.get(id).and_then(|l| l.next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<ElementId> {
        let mut sm: SlotMap<ElementId, ()> = SlotMap::with_key();
        (0..n).map(|_| sm.insert(())).collect()
    }

    #[test]
    fn fifo_order_without_duplicates() {
        let e = ids(3);
        let mut list = PendingList::new();
        assert!(list.push_back(e[0]));
        assert!(list.push_back(e[1]));
        assert!(!list.push_back(e[0]));
        assert!(list.push_back(e[2]));
        assert_eq!(list.len(), 3);
        assert_eq!(list.iter().collect::<Vec<_>>(), e);
        assert_eq!(list.pop_front(), Some(e[0]));
        assert_eq!(list.pop_front(), Some(e[1]));
        assert_eq!(list.pop_front(), Some(e[2]));
        assert_eq!(list.pop_front(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn remove_from_middle_and_ends() {
        let e = ids(4);
        let mut list = PendingList::new();
        for &id in &e {
            list.push_back(id);
        }
        assert!(list.remove(e[1]));
        assert!(!list.remove(e[1]));
        assert!(list.remove(e[3]));
        assert!(list.remove(e[0]));
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![e[2]]);
        assert!(!list.contains(e[0]));
        // Re-queueing after removal appends at the back.
        list.push_back(e[0]);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![e[2], e[0]]);
    }
}
