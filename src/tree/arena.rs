//! Node storage.
//!
//! Nodes live in one growable slot vector; a [`NodeId`] is a slot index
//! offset by one, because id `0` names the header, which is kept inline.
//! Released slots are threaded onto a free list through their `right`
//! link, so releasing a node never allocates.

use super::link::{LinkNode, LinkStore, NodeId};
use crate::alloc::Allocator;
use crate::construct::TryClone;
use crate::error::Error;
use std::alloc::Layout;

/// A node: links plus the inline value. Vacant slots hold `None`.
pub(crate) struct Slot<T> {
    link: LinkNode,
    value: Option<T>,
}

pub(crate) struct NodeArena<T, A: Allocator> {
    header: LinkNode,
    slots: Vec<Slot<T>>,
    free_head: Option<NodeId>,
    allocator: A,
}

impl<T, A: Allocator> NodeArena<T, A> {
    pub(crate) const fn new_in(allocator: A) -> Self {
        Self {
            header: LinkNode::header(),
            slots: Vec::new(),
            free_head: None,
            allocator,
        }
    }

    #[inline]
    pub(crate) const fn node_layout() -> Layout {
        Layout::new::<Slot<T>>()
    }

    #[inline]
    fn slot_index(id: NodeId) -> usize {
        debug_assert!(!id.is_header());
        id.index() - 1
    }

    pub(crate) const fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Upper bound on simultaneously live nodes.
    pub(crate) fn max_nodes(&self) -> usize {
        let addressable = NodeId::MAX.index();
        addressable.min(self.allocator.max_count(Self::node_layout()))
    }

    /// The value stored at `id`; `None` for the header and vacant slots.
    #[inline]
    pub(crate) fn value(&self, id: NodeId) -> Option<&T> {
        if id.is_header() {
            return None;
        }
        self.slots.get(Self::slot_index(id))?.value.as_ref()
    }

    /// The value of a node reached through tree links.
    #[inline]
    pub(crate) fn element(&self, id: NodeId) -> &T {
        match self.value(id) {
            Some(value) => value,
            None => unreachable!("tree link leads to vacant slot {id:?}"),
        }
    }

    /// Reserves a slot for one node.
    ///
    /// The slot is released again unless the returned guard is filled.
    pub(crate) fn allocate(&mut self) -> Result<VacantNode<'_, T, A>, Error> {
        let layout = Self::node_layout();
        if self.free_head.is_none() && self.slots.len() >= NodeId::MAX.index() {
            crate::warn_log!(live = self.slots.len(), "node handle space exhausted");
            return Err(Error::ValueTooLarge);
        }
        if let Err(error) = self.allocator.allocate(layout) {
            crate::warn_log!(size = layout.size(), "allocator refused a node");
            return Err(error.into());
        }

        let id = if let Some(id) = self.free_head {
            let slot = &mut self.slots[Self::slot_index(id)];
            self.free_head = slot.link.right;
            slot.link = LinkNode::new();
            id
        } else {
            let id = NodeId::from_index(self.slots.len() + 1).ok_or(Error::ValueTooLarge);
            let reserved = self.slots.try_reserve(1).map_err(Error::from);
            match id.and_then(|id| reserved.map(|()| id)) {
                Ok(id) => {
                    self.slots.push(Slot {
                        link: LinkNode::new(),
                        value: None,
                    });
                    id
                }
                Err(error) => {
                    self.allocator.deallocate(layout);
                    crate::warn_log!(%error, "node storage could not grow");
                    return Err(error);
                }
            }
        };

        Ok(VacantNode {
            arena: self,
            id,
            armed: true,
        })
    }

    /// Moves the value out of a node, leaving the slot allocated but empty.
    pub(crate) fn take_value(&mut self, id: NodeId) -> Option<T> {
        if id.is_header() {
            return None;
        }
        self.slots.get_mut(Self::slot_index(id))?.value.take()
    }

    /// Returns a detached node's slot to the free list and the allocator.
    ///
    /// Any value still stored is dropped first.
    pub(crate) fn release(&mut self, id: NodeId) {
        let slot = &mut self.slots[Self::slot_index(id)];
        drop(slot.value.take());
        slot.link = LinkNode::new();
        slot.link.right = self.free_head;
        self.free_head = Some(id);
        self.allocator.deallocate(Self::node_layout());
    }

    /// Drops every value, frees every node and resets the header.
    pub(crate) fn clear(&mut self) {
        let live = self.live_nodes();
        self.slots.clear();
        self.free_head = None;
        self.header = LinkNode::header();
        for _ in 0..live {
            self.allocator.deallocate(Self::node_layout());
        }
    }

    fn live_nodes(&self) -> usize {
        self.slots.iter().filter(|slot| slot.value.is_some()).count()
    }

    /// Copies the storage slot for slot, so handles stay meaningful in the copy.
    pub(crate) fn try_clone_in(&self, allocator: A) -> Result<Self, Error>
    where
        T: TryClone,
    {
        let layout = Self::node_layout();
        let mut copy = Self {
            header: self.header,
            slots: Vec::new(),
            free_head: self.free_head,
            allocator,
        };
        copy.slots.try_reserve_exact(self.slots.len())?;

        for slot in &self.slots {
            let value = match &slot.value {
                Some(value) => {
                    copy.allocator.allocate(layout)?;
                    match value.try_clone() {
                        Ok(value) => Some(value),
                        Err(error) => {
                            copy.allocator.deallocate(layout);
                            crate::debug_log!(%error, "value copy failed during tree clone");
                            return Err(error);
                        }
                    }
                }
                None => None,
            };
            copy.slots.push(Slot {
                link: slot.link,
                value,
            });
        }
        Ok(copy)
    }
}

impl<T, A: Allocator> LinkStore for NodeArena<T, A> {
    #[inline]
    fn link(&self, id: NodeId) -> &LinkNode {
        if id.is_header() {
            &self.header
        } else {
            &self.slots[Self::slot_index(id)].link
        }
    }

    #[inline]
    fn link_mut(&mut self, id: NodeId) -> &mut LinkNode {
        if id.is_header() {
            &mut self.header
        } else {
            &mut self.slots[Self::slot_index(id)].link
        }
    }
}

impl<T, A: Allocator> Drop for NodeArena<T, A> {
    fn drop(&mut self) {
        for _ in 0..self.live_nodes() {
            self.allocator.deallocate(Self::node_layout());
        }
    }
}

/// A freshly allocated, not yet constructed node.
///
/// Dropping it without calling [`fill`](Self::fill) hands the slot back,
/// which is how a failed value construction avoids leaking the node.
pub(crate) struct VacantNode<'a, T, A: Allocator> {
    arena: &'a mut NodeArena<T, A>,
    id: NodeId,
    armed: bool,
}

impl<T, A: Allocator> VacantNode<'_, T, A> {
    /// Stores `value` in the node and disarms the guard.
    pub(crate) fn fill(mut self, value: T) -> NodeId {
        let index = NodeArena::<T, A>::slot_index(self.id);
        self.arena.slots[index].value = Some(value);
        self.armed = false;
        self.id
    }
}

impl<T, A: Allocator> Drop for VacantNode<'_, T, A> {
    fn drop(&mut self) {
        if self.armed {
            crate::debug_log!(node = ?self.id, "releasing node after failed construction");
            self.arena.release(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::{Bounded, Global};
    use rstest::rstest;

    #[rstest]
    fn test_allocate_fill_and_read() {
        let mut arena: NodeArena<i32, Global> = NodeArena::new_in(Global);
        let id = arena.allocate().unwrap().fill(7);
        assert_eq!(arena.value(id), Some(&7));
        assert_eq!(*arena.element(id), 7);
        assert_eq!(arena.value(NodeId::HEADER), None);
    }

    #[rstest]
    fn test_unfilled_node_is_released() {
        let allocator = Bounded::new(usize::MAX);
        let mut arena: NodeArena<i32, &Bounded> = NodeArena::new_in(&allocator);
        {
            let _vacant = arena.allocate().unwrap();
        }
        assert_eq!(allocator.in_use(), 0);
        // The released slot is reused.
        let id = arena.allocate().unwrap().fill(1);
        assert_eq!(id, NodeId::from_index(1).unwrap());
        assert_eq!(arena.slots.len(), 1);
    }

    #[rstest]
    fn test_release_recycles_slots_lifo() {
        let mut arena: NodeArena<i32, Global> = NodeArena::new_in(Global);
        let first = arena.allocate().unwrap().fill(1);
        let second = arena.allocate().unwrap().fill(2);
        arena.release(first);
        arena.release(second);
        assert_eq!(arena.allocate().unwrap().fill(3), second);
        assert_eq!(arena.allocate().unwrap().fill(4), first);
    }

    #[rstest]
    fn test_allocator_refusal_surfaces_as_not_enough_memory() {
        let layout = NodeArena::<u64, Global>::node_layout();
        let allocator = Bounded::for_blocks(layout, 1).unwrap();
        let mut arena: NodeArena<u64, &Bounded> = NodeArena::new_in(&allocator);
        arena.allocate().unwrap().fill(1);
        assert_eq!(arena.allocate().err(), Some(Error::NotEnoughMemory));
        assert_eq!(arena.slots.len(), 1);
    }

    #[rstest]
    fn test_clear_and_drop_return_all_memory() {
        let allocator = Bounded::new(usize::MAX);
        {
            let mut arena: NodeArena<String, &Bounded> = NodeArena::new_in(&allocator);
            for index in 0..5 {
                arena.allocate().unwrap().fill(index.to_string());
            }
            assert!(allocator.in_use() > 0);
            arena.clear();
            assert_eq!(allocator.in_use(), 0);
            for index in 0..3 {
                arena.allocate().unwrap().fill(index.to_string());
            }
        }
        assert_eq!(allocator.in_use(), 0);
    }

    #[rstest]
    fn test_try_clone_preserves_handles() {
        let mut arena: NodeArena<i32, Global> = NodeArena::new_in(Global);
        let first = arena.allocate().unwrap().fill(10);
        let second = arena.allocate().unwrap().fill(20);
        arena.release(first);
        let copy = arena.try_clone_in(Global).unwrap();
        assert_eq!(copy.value(second), Some(&20));
        assert_eq!(copy.value(first), None);
        assert_eq!(copy.free_head, Some(first));
    }
}
