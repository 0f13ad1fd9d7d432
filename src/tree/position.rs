//! Positions and iterators.
//!
//! A [`Position`] is the tree's notion of an iterator: a plain handle to a
//! node (or to the header, meaning "end"). It does not borrow the tree, so
//! it survives mutation; it stays valid until the node it names is erased.
//! Equality is node identity.

use super::arena::NodeArena;
use super::link::NodeId;
use super::rebalance::{decrement, increment};
use super::RbTree;
use crate::alloc::Allocator;
use std::fmt;
use std::iter::FusedIterator;

/// A handle to an element of an [`RbTree`], or to its end.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position(pub(crate) NodeId);

impl Position {
    /// The end position of every tree.
    pub const END: Self = Self(NodeId::HEADER);

    /// Returns `true` if this is the past-the-end position.
    #[inline]
    pub const fn is_end(self) -> bool {
        self.0.is_header()
    }

    /// The node handle this position wraps.
    #[inline]
    pub const fn node(self) -> NodeId {
        self.0
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_end() {
            formatter.write_str("Position(end)")
        } else {
            formatter.debug_tuple("Position").field(&self.0).finish()
        }
    }
}

/// In-order iterator over a tree or a sub-range of it.
///
/// Created by [`RbTree::iter`] and [`RbTree::iter_between`].
pub struct Iter<'a, T, A: Allocator> {
    pub(crate) arena: &'a NodeArena<T, A>,
    pub(crate) front: NodeId,
    pub(crate) back: NodeId,
    pub(crate) remaining: usize,
}

impl<T, A: Allocator> Clone for Iter<'_, T, A> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, T, A: Allocator> Iterator for Iter<'a, T, A> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.front;
        self.front = increment(self.arena, current);
        self.remaining -= 1;
        Some(self.arena.element(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, A: Allocator> DoubleEndedIterator for Iter<'_, T, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.back = decrement(self.arena, self.back);
        self.remaining -= 1;
        Some(self.arena.element(self.back))
    }
}

impl<T, A: Allocator> ExactSizeIterator for Iter<'_, T, A> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T, A: Allocator> FusedIterator for Iter<'_, T, A> {}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for Iter<'_, T, A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.clone()).finish()
    }
}

/// Owning in-order iterator; erases elements as it yields them.
pub struct IntoIter<T, C, A: Allocator> {
    pub(crate) tree: RbTree<T, C, A>,
}

impl<T, C, A: Allocator> Iterator for IntoIter<T, C, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.tree.pop_first()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let length = self.tree.len();
        (length, Some(length))
    }
}

impl<T, C, A: Allocator> DoubleEndedIterator for IntoIter<T, C, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.tree.pop_last()
    }
}

impl<T, C, A: Allocator> ExactSizeIterator for IntoIter<T, C, A> {}

impl<T, C, A: Allocator> FusedIterator for IntoIter<T, C, A> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::RbTree;
    use rstest::rstest;

    fn tree_of(values: &[i32]) -> RbTree<i32> {
        let mut tree = RbTree::new();
        for &value in values {
            tree.insert_unique(value).unwrap();
        }
        tree
    }

    #[rstest]
    fn test_end_position() {
        let tree: RbTree<i32> = RbTree::new();
        assert!(tree.end().is_end());
        assert_eq!(tree.begin(), tree.end());
        assert_eq!(tree.end(), Position::END);
        assert_eq!(format!("{:?}", Position::END), "Position(end)");
    }

    #[rstest]
    fn test_iter_both_directions_meet() {
        let tree = tree_of(&[1, 2, 3, 4, 5]);
        let mut iter = tree.iter();
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&5));
        assert_eq!(iter.len(), 3);
        let middle: Vec<i32> = iter.copied().collect();
        assert_eq!(middle, vec![2, 3, 4]);
    }

    #[rstest]
    fn test_iter_is_fused() {
        let tree = tree_of(&[1]);
        let mut iter = tree.iter();
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
        assert_eq!(iter.next(), None);
    }

    #[rstest]
    fn test_iter_debug_lists_elements() {
        let tree = tree_of(&[2, 1]);
        assert_eq!(format!("{:?}", tree.iter()), "[1, 2]");
    }

    #[rstest]
    fn test_into_iter_drains_in_order() {
        let tree = tree_of(&[3, 1, 2]);
        let mut into_iter = tree.into_iter();
        assert_eq!(into_iter.len(), 3);
        assert_eq!(into_iter.next_back(), Some(3));
        assert_eq!(into_iter.next(), Some(1));
        assert_eq!(into_iter.next(), Some(2));
        assert_eq!(into_iter.next(), None);
    }
}
