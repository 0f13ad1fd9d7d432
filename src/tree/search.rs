//! Position search.
//!
//! Every descent uses a single comparator call per visited node. The
//! insertion searches report where a new node attaches (parent plus side)
//! without touching the tree; the bound searches report positions.
//!
//! Equal-mode insertion places a key after every element that compares
//! equal to it, i.e. immediately before `upper_bound(key)`. Hinted searches
//! accept the hint only when it names exactly the slot the unhinted search
//! would pick, so a hint never changes the resulting order.

use super::arena::NodeArena;
use super::link::{LinkStore, NodeId};
use super::rebalance::{decrement, increment};
use crate::alloc::Allocator;
use crate::compare::Compare;
use std::cmp::Ordering;

/// Where a new key belongs.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum InsertPos {
    /// Attach as the `left` (or right) child of `parent`.
    Attach { parent: NodeId, left: bool },
    /// Unique mode only: an equal key already lives at this node.
    Occupied(NodeId),
}

/// Read-only view used by every search.
pub(crate) struct Search<'a, T, C, A: Allocator> {
    pub(crate) arena: &'a NodeArena<T, A>,
    pub(crate) comparator: &'a C,
}

impl<T, C, A: Allocator> Search<'_, T, C, A> {
    #[inline]
    fn root(&self) -> Option<NodeId> {
        self.arena.link(NodeId::HEADER).parent
    }

    #[inline]
    fn leftmost(&self) -> NodeId {
        self.arena.link(NodeId::HEADER).left.unwrap_or(NodeId::HEADER)
    }

    #[inline]
    fn rightmost(&self) -> NodeId {
        self.arena.link(NodeId::HEADER).right.unwrap_or(NodeId::HEADER)
    }

    /// Attachment point for a key that sorts strictly between two adjacent nodes.
    fn between(&self, previous: NodeId, next: NodeId) -> InsertPos {
        if self.arena.link(previous).right.is_none() {
            InsertPos::Attach {
                parent: previous,
                left: false,
            }
        } else {
            InsertPos::Attach {
                parent: next,
                left: true,
            }
        }
    }

    /// Shared hint logic.
    ///
    /// `before(node)` holds when the key belongs somewhere before `node`,
    /// `after(node)` when it belongs somewhere after it. In unique mode a
    /// node satisfying neither is an equal key.
    fn hinted(
        &self,
        hint: NodeId,
        before: impl Fn(NodeId) -> bool,
        after: impl Fn(NodeId) -> bool,
        fallback: impl FnOnce() -> InsertPos,
    ) -> InsertPos {
        let leftmost = self.leftmost();
        let rightmost = self.rightmost();

        if hint.is_header() {
            if self.root().is_some() && after(rightmost) {
                return InsertPos::Attach {
                    parent: rightmost,
                    left: false,
                };
            }
            return fallback();
        }

        if before(hint) {
            if hint == leftmost {
                return InsertPos::Attach {
                    parent: hint,
                    left: true,
                };
            }
            let previous = decrement(self.arena, hint);
            if after(previous) {
                return self.between(previous, hint);
            }
            return fallback();
        }

        if after(hint) {
            if hint == rightmost {
                return InsertPos::Attach {
                    parent: hint,
                    left: false,
                };
            }
            let next = increment(self.arena, hint);
            if before(next) {
                return self.between(hint, next);
            }
            return fallback();
        }

        InsertPos::Occupied(hint)
    }
}

impl<T, C: Compare<T>, A: Allocator> Search<'_, T, C, A> {
    #[inline]
    fn key_less_than_node(&self, key: &T, node: NodeId) -> bool {
        self.comparator.compare(self.arena.element(node), key) == Ordering::Greater
    }

    #[inline]
    fn node_less_than_key(&self, node: NodeId, key: &T) -> bool {
        self.comparator.compare(self.arena.element(node), key) == Ordering::Less
    }

    /// Descends to a null slot, going right on ties.
    fn descend(&self, key: &T) -> (NodeId, bool) {
        let mut cursor = self.root();
        let mut parent = NodeId::HEADER;
        let mut went_left = true;
        while let Some(node) = cursor {
            parent = node;
            went_left = self.key_less_than_node(key, node);
            let link = self.arena.link(node);
            cursor = if went_left { link.left } else { link.right };
        }
        (parent, went_left)
    }

    pub(crate) fn insert_unique_pos(&self, key: &T) -> InsertPos {
        let (parent, went_left) = self.descend(key);
        let attach = InsertPos::Attach {
            parent,
            left: went_left || parent.is_header(),
        };

        let mut candidate = parent;
        if went_left {
            if parent == self.leftmost() {
                return attach;
            }
            candidate = decrement(self.arena, candidate);
        }
        if self.node_less_than_key(candidate, key) {
            attach
        } else {
            InsertPos::Occupied(candidate)
        }
    }

    pub(crate) fn insert_equal_pos(&self, key: &T) -> InsertPos {
        let (parent, went_left) = self.descend(key);
        InsertPos::Attach {
            parent,
            left: went_left || parent.is_header(),
        }
    }

    pub(crate) fn insert_hint_unique_pos(&self, hint: NodeId, key: &T) -> InsertPos {
        self.hinted(
            hint,
            |node| self.key_less_than_node(key, node),
            |node| self.node_less_than_key(node, key),
            || self.insert_unique_pos(key),
        )
    }

    pub(crate) fn insert_hint_equal_pos(&self, hint: NodeId, key: &T) -> InsertPos {
        self.hinted(
            hint,
            |node| self.key_less_than_node(key, node),
            |node| !self.key_less_than_node(key, node),
            || self.insert_equal_pos(key),
        )
    }
}

impl<T, C, A: Allocator> Search<'_, T, C, A> {
    fn lower_bound_from<Q>(&self, mut cursor: Option<NodeId>, mut bound: NodeId, key: &Q) -> NodeId
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        while let Some(node) = cursor {
            let link = self.arena.link(node);
            if self.comparator.compare(self.arena.element(node), key) == Ordering::Less {
                cursor = link.right;
            } else {
                bound = node;
                cursor = link.left;
            }
        }
        bound
    }

    fn upper_bound_from<Q>(&self, mut cursor: Option<NodeId>, mut bound: NodeId, key: &Q) -> NodeId
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        while let Some(node) = cursor {
            let link = self.arena.link(node);
            if self.comparator.compare(self.arena.element(node), key) == Ordering::Greater {
                bound = node;
                cursor = link.left;
            } else {
                cursor = link.right;
            }
        }
        bound
    }

    /// First node not less than `key`.
    pub(crate) fn lower_bound<Q>(&self, key: &Q) -> NodeId
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        self.lower_bound_from(self.root(), NodeId::HEADER, key)
    }

    /// First node greater than `key`.
    pub(crate) fn upper_bound<Q>(&self, key: &Q) -> NodeId
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        self.upper_bound_from(self.root(), NodeId::HEADER, key)
    }

    /// Node holding a key equal to `key`, or the header.
    pub(crate) fn find<Q>(&self, key: &Q) -> NodeId
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        let candidate = self.lower_bound(key);
        if candidate.is_header()
            || self.comparator.compare(self.arena.element(candidate), key) == Ordering::Greater
        {
            NodeId::HEADER
        } else {
            candidate
        }
    }

    /// `(lower_bound(key), upper_bound(key))` from one shared descent.
    pub(crate) fn equal_range<Q>(&self, key: &Q) -> (NodeId, NodeId)
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        let mut cursor = self.root();
        let mut bound = NodeId::HEADER;
        while let Some(node) = cursor {
            let link = self.arena.link(node);
            match self.comparator.compare(self.arena.element(node), key) {
                Ordering::Less => cursor = link.right,
                Ordering::Greater => {
                    bound = node;
                    cursor = link.left;
                }
                Ordering::Equal => {
                    let lower = self.lower_bound_from(link.left, node, key);
                    let upper = self.upper_bound_from(link.right, bound, key);
                    return (lower, upper);
                }
            }
        }
        (bound, bound)
    }
}
