//! The red-black tree container shell.
//!
//! This module provides [`RbTree`], the ordered container engine that set
//! and map wrappers are built on.
//!
//! # Overview
//!
//! - O(log N) insert (unique or equal mode), erase, find and bounds
//! - O(1) amortised insert with a correct hint
//! - O(1) `begin`, `end`, `len`, `swap`
//! - O(N) `clear`
//!
//! # Internal Structure
//!
//! Nodes live in slot storage owned by the tree and are addressed by
//! [`NodeId`]. A header sentinel (id `0`) holds the root in its parent
//! link and caches the leftmost and rightmost nodes; the root's parent is
//! the header and the end position is the header. Rebalancing lives in
//! [`rebalance`], insertion-point search in `search`.
//!
//! # Examples
//!
//! ```rust
//! use rbcore::tree::RbTree;
//!
//! let mut tree = RbTree::new();
//! let (position, inserted) = tree.insert_unique(3)?;
//! assert!(inserted);
//! assert_eq!(tree.get(position), Some(&3));
//!
//! let (_, inserted) = tree.insert_unique(3)?;
//! assert!(!inserted);
//!
//! tree.insert_equal(3)?;
//! assert_eq!(tree.count(&3), 2);
//! # Ok::<(), rbcore::error::Error>(())
//! ```

mod arena;
pub mod link;
mod position;
pub mod rebalance;
mod search;
mod verify;

pub use link::{Color, NodeId};
pub use position::{IntoIter, Iter, Position};
pub use verify::Violation;

use self::arena::NodeArena;
use self::link::LinkStore;
use self::rebalance::{decrement, increment, insert_and_rebalance, rebalance_for_erase};
use self::search::{InsertPos, Search};
use crate::alloc::{Allocator, Global};
use crate::compare::{Compare, Natural};
use crate::construct::TryClone;
use crate::error::Error;
use std::fmt;
use std::hash::{Hash, Hasher};

// =============================================================================
// RbTree Definition
// =============================================================================

/// An ordered container backed by a red-black tree.
///
/// `RbTree` keeps its elements sorted by the comparator `C` and allocates
/// nodes through the allocator `A`. It supports both set semantics (at most
/// one element per key) and multiset semantics (equal keys kept adjacent,
/// in insertion order).
///
/// Every operation that allocates or constructs returns a [`Result`];
/// when it fails, the tree is left exactly as it was. Lookups, erasure and
/// iteration cannot fail.
///
/// # Time Complexity
///
/// | Operation                  | Complexity          |
/// |----------------------------|---------------------|
/// | `insert_unique`/`_equal`   | O(log N)            |
/// | hinted insert, right hint  | O(1) amortised      |
/// | `erase`                    | O(1) amortised      |
/// | `erase_key`                | O(log N + k)        |
/// | `find`/bounds/`equal_range`| O(log N)            |
/// | `count`                    | O(log N + k)        |
/// | `begin`/`end`/`len`/`swap` | O(1)                |
/// | `clear`                    | O(N)                |
///
/// # Examples
///
/// ```rust
/// use rbcore::tree::RbTree;
///
/// let mut tree = RbTree::new();
/// for key in [5, 3, 8, 1, 4, 7, 9] {
///     tree.insert_unique(key)?;
/// }
/// tree.erase_key(&5);
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 3, 4, 7, 8, 9]);
/// assert_eq!(tree.len(), 6);
/// assert!(tree.verify().is_ok());
/// # Ok::<(), rbcore::error::Error>(())
/// ```
pub struct RbTree<T, C = Natural, A: Allocator = Global> {
    arena: NodeArena<T, A>,
    comparator: C,
    length: usize,
}

impl<T> RbTree<T> {
    /// Creates an empty tree ordered by [`Ord`] using the global allocator.
    ///
    /// Does not allocate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbcore::tree::RbTree;
    ///
    /// let tree: RbTree<i32> = RbTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator_in(Natural, Global)
    }
}

impl<T, C> RbTree<T, C> {
    /// Creates an empty tree ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbcore::compare::{Natural, Reverse};
    /// use rbcore::tree::RbTree;
    ///
    /// let mut tree = RbTree::with_comparator(Reverse(Natural));
    /// tree.insert_unique(1)?;
    /// tree.insert_unique(2)?;
    /// assert_eq!(tree.first(), Some(&2));
    /// # Ok::<(), rbcore::error::Error>(())
    /// ```
    #[inline]
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self::with_comparator_in(comparator, Global)
    }
}

impl<T, A: Allocator> RbTree<T, Natural, A> {
    /// Creates an empty tree ordered by [`Ord`] that allocates through `allocator`.
    #[inline]
    #[must_use]
    pub const fn new_in(allocator: A) -> Self {
        Self::with_comparator_in(Natural, allocator)
    }
}

impl<T, C, A: Allocator> RbTree<T, C, A> {
    /// Creates an empty tree with the given comparator and allocator.
    #[inline]
    #[must_use]
    pub const fn with_comparator_in(comparator: C, allocator: A) -> Self {
        Self {
            arena: NodeArena::new_in(allocator),
            comparator,
            length: 0,
        }
    }

    /// Returns the number of elements.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the tree holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The largest number of elements the tree could ever hold.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.arena.max_nodes()
    }

    /// The comparator ordering this tree.
    #[inline]
    pub const fn comparator(&self) -> &C {
        &self.comparator
    }

    /// The allocator nodes are obtained from.
    #[inline]
    pub const fn allocator(&self) -> &A {
        self.arena.allocator()
    }

    #[inline]
    pub(crate) const fn search(&self) -> Search<'_, T, C, A> {
        Search {
            arena: &self.arena,
            comparator: &self.comparator,
        }
    }

    #[inline]
    fn is_element(&self, node: NodeId) -> bool {
        self.arena.value(node).is_some()
    }

    // =========================================================================
    // Positions
    // =========================================================================

    /// Position of the smallest element, or [`end`](Self::end) when empty.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    pub fn begin(&self) -> Position {
        Position(self.arena.link(NodeId::HEADER).left.unwrap_or(NodeId::HEADER))
    }

    /// The past-the-end position.
    #[inline]
    pub const fn end(&self) -> Position {
        Position::END
    }

    /// The element at `position`; `None` for the end position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbcore::tree::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// let (position, _) = tree.insert_unique("a")?;
    /// assert_eq!(tree.get(position), Some(&"a"));
    /// assert_eq!(tree.get(tree.end()), None);
    /// # Ok::<(), rbcore::error::Error>(())
    /// ```
    #[inline]
    pub fn get(&self, position: Position) -> Option<&T> {
        self.arena.value(position.0)
    }

    /// The in-order successor of `position`.
    ///
    /// Advancing the last element yields `end()`; advancing `end()` stays
    /// at `end()`.
    pub fn next_position(&self, position: Position) -> Position {
        if self.is_element(position.0) {
            Position(increment(&self.arena, position.0))
        } else {
            self.end()
        }
    }

    /// The in-order predecessor of `position`.
    ///
    /// Retreating from `end()` yields the last element (the reverse
    /// iteration start); retreating from the first element yields `end()`.
    pub fn prev_position(&self, position: Position) -> Position {
        if position.is_end() || self.is_element(position.0) {
            Position(decrement(&self.arena, position.0))
        } else {
            self.end()
        }
    }

    /// The smallest element.
    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.get(self.begin())
    }

    /// The largest element.
    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.get(self.prev_position(self.end()))
    }

    /// Iterates over every element in order. Reverse with `.rev()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbcore::tree::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// for key in [2, 3, 1] {
    ///     tree.insert_unique(key)?;
    /// }
    /// assert_eq!(tree.iter().rev().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
    /// # Ok::<(), rbcore::error::Error>(())
    /// ```
    pub fn iter(&self) -> Iter<'_, T, A> {
        Iter {
            arena: &self.arena,
            front: self.begin().0,
            back: NodeId::HEADER,
            remaining: self.length,
        }
    }

    /// Iterates over `[first, last)`.
    ///
    /// `last` must be reachable from `first` by advancing.
    ///
    /// # Complexity
    ///
    /// O(k) to measure the range, where k is its length.
    pub fn iter_between(&self, first: Position, last: Position) -> Iter<'_, T, A> {
        Iter {
            arena: &self.arena,
            front: first.0,
            back: last.0,
            remaining: self.distance(first, last),
        }
    }

    /// Number of steps from `first` to `last`.
    fn distance(&self, first: Position, last: Position) -> usize {
        let mut cursor = first;
        let mut steps = 0;
        while cursor != last && !cursor.is_end() {
            cursor = self.next_position(cursor);
            steps += 1;
        }
        steps
    }

    // =========================================================================
    // Erasure
    // =========================================================================

    /// Unlinks a live node and returns its value.
    fn unlink(&mut self, node: NodeId) -> Option<T> {
        let value = self.arena.take_value(node)?;
        rebalance_for_erase(&mut self.arena, node);
        self.arena.release(node);
        self.length -= 1;
        Some(value)
    }

    /// Removes the element at `position` and returns its successor.
    ///
    /// Only positions naming the erased element are invalidated. Erasing
    /// `end()` does nothing and returns `end()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbcore::tree::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// for key in 1..=3 {
    ///     tree.insert_unique(key)?;
    /// }
    /// let next = tree.erase(tree.find(&2));
    /// assert_eq!(tree.get(next), Some(&3));
    /// assert_eq!(tree.len(), 2);
    /// # Ok::<(), rbcore::error::Error>(())
    /// ```
    pub fn erase(&mut self, position: Position) -> Position {
        if !self.is_element(position.0) {
            return self.end();
        }
        let next = increment(&self.arena, position.0);
        drop(self.unlink(position.0));
        Position(next)
    }

    /// Removes every element in `[first, last)` and returns `last`.
    pub fn erase_range(&mut self, first: Position, last: Position) -> Position {
        if first == self.begin() && last.is_end() {
            self.clear();
            return self.end();
        }
        let mut cursor = first;
        while cursor != last && !cursor.is_end() {
            cursor = self.erase(cursor);
        }
        last
    }

    /// Removes the element at `position` and hands it back.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbcore::tree::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// let (position, _) = tree.insert_unique(String::from("x"))?;
    /// assert_eq!(tree.take(position), Some(String::from("x")));
    /// assert!(tree.is_empty());
    /// # Ok::<(), rbcore::error::Error>(())
    /// ```
    pub fn take(&mut self, position: Position) -> Option<T> {
        self.unlink(position.0)
    }

    /// Removes and returns the smallest element.
    pub fn pop_first(&mut self) -> Option<T> {
        self.take(self.begin())
    }

    /// Removes and returns the largest element.
    pub fn pop_last(&mut self) -> Option<T> {
        let last = self.prev_position(self.end());
        self.take(last)
    }

    /// Removes every element and frees every node.
    pub fn clear(&mut self) {
        crate::debug_log!(length = self.length, "clearing tree");
        self.arena.clear();
        self.length = 0;
    }

    /// Exchanges the contents of two trees.
    ///
    /// # Complexity
    ///
    /// O(1): no node is touched. Positions keep naming the same elements,
    /// which now live in the other tree.
    pub const fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }
}

impl<T, C: Compare<T>, A: Allocator> RbTree<T, C, A> {
    // =========================================================================
    // Insertion
    // =========================================================================

    fn splice(&mut self, node: NodeId, insert_pos: InsertPos) -> Position {
        match insert_pos {
            InsertPos::Attach { parent, left } => {
                insert_and_rebalance(&mut self.arena, left, node, parent);
                self.length += 1;
                Position(node)
            }
            InsertPos::Occupied(existing) => Position(existing),
        }
    }

    /// Allocates and constructs a node, then places it with `locate`.
    ///
    /// Returns the position and whether the node was linked; an unlinked
    /// node (duplicate key) is destroyed again.
    fn emplace_with<F, E>(
        &mut self,
        construct: F,
        locate: impl FnOnce(&Search<'_, T, C, A>, &T) -> InsertPos,
    ) -> Result<(Position, bool), E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<Error>,
    {
        let vacant = self.arena.allocate()?;
        let node = vacant.fill(construct()?);
        let insert_pos = locate(&self.search(), self.arena.element(node));
        if let InsertPos::Occupied(existing) = insert_pos {
            self.arena.release(node);
            return Ok((Position(existing), false));
        }
        Ok((self.splice(node, insert_pos), true))
    }

    /// Links an already-built value at a pre-computed position.
    fn insert_at(&mut self, insert_pos: InsertPos, value: T) -> Result<(Position, bool), Error> {
        if let InsertPos::Occupied(existing) = insert_pos {
            return Ok((Position(existing), false));
        }
        let node = self.arena.allocate()?.fill(value);
        Ok((self.splice(node, insert_pos), true))
    }

    /// A hint that no longer names a live element is treated as `end()`.
    fn sanitize_hint(&self, hint: Position) -> NodeId {
        if self.is_element(hint.0) {
            hint.0
        } else {
            NodeId::HEADER
        }
    }

    /// Inserts `value` unless an equal element exists.
    ///
    /// Returns the position of the inserted or the blocking element and
    /// whether the insertion happened. A rejected `value` is dropped and
    /// nothing is allocated for it.
    ///
    /// # Errors
    ///
    /// [`Error::NotEnoughMemory`] if the node cannot be allocated,
    /// [`Error::ValueTooLarge`] if the tree is at [`max_size`](Self::max_size).
    /// The tree is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbcore::tree::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// assert!(tree.insert_unique(1)?.1);
    /// assert!(!tree.insert_unique(1)?.1);
    /// assert_eq!(tree.len(), 1);
    /// # Ok::<(), rbcore::error::Error>(())
    /// ```
    pub fn insert_unique(&mut self, value: T) -> Result<(Position, bool), Error> {
        let insert_pos = self.search().insert_unique_pos(&value);
        self.insert_at(insert_pos, value)
    }

    /// Inserts `value` after every element equal to it.
    ///
    /// # Errors
    ///
    /// As for [`insert_unique`](Self::insert_unique).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbcore::tree::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// tree.insert_equal(1)?;
    /// tree.insert_equal(1)?;
    /// assert_eq!(tree.len(), 2);
    /// # Ok::<(), rbcore::error::Error>(())
    /// ```
    pub fn insert_equal(&mut self, value: T) -> Result<Position, Error> {
        let insert_pos = self.search().insert_equal_pos(&value);
        self.insert_at(insert_pos, value).map(|(position, _)| position)
    }

    /// Unique insertion with a position hint.
    ///
    /// When `hint` is the element `value` belongs directly before (or
    /// directly after), the search is skipped. A wrong hint costs one full
    /// search and never changes the result.
    ///
    /// # Errors
    ///
    /// As for [`insert_unique`](Self::insert_unique).
    pub fn insert_unique_hint(&mut self, hint: Position, value: T) -> Result<Position, Error> {
        self.insert_unique_hinted(hint, value)
            .map(|(position, _)| position)
    }

    fn insert_unique_hinted(&mut self, hint: Position, value: T) -> Result<(Position, bool), Error> {
        let hint = self.sanitize_hint(hint);
        let insert_pos = self.search().insert_hint_unique_pos(hint, &value);
        self.insert_at(insert_pos, value)
    }

    /// Equal-mode insertion with a position hint.
    ///
    /// The hint is taken only when it agrees with the unhinted placement
    /// (after every equal element), so duplicates always keep insertion
    /// order.
    ///
    /// # Errors
    ///
    /// As for [`insert_unique`](Self::insert_unique).
    pub fn insert_equal_hint(&mut self, hint: Position, value: T) -> Result<Position, Error> {
        let hint = self.sanitize_hint(hint);
        let insert_pos = self.search().insert_hint_equal_pos(hint, &value);
        self.insert_at(insert_pos, value).map(|(position, _)| position)
    }

    /// Builds a value with `construct` and inserts it unless an equal element exists.
    ///
    /// The node is allocated first and the value constructed in place; if
    /// construction fails the node is freed and the constructor's error is
    /// returned unchanged. A constructed duplicate is dropped.
    ///
    /// # Errors
    ///
    /// Any error of `construct`, or an allocation error converted into `E`.
    /// The tree is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbcore::error::Error;
    /// use rbcore::tree::RbTree;
    ///
    /// let mut tree: RbTree<u8> = RbTree::new();
    /// let parsed = tree.emplace_unique(|| "42".parse::<u8>().map_err(|_| Error::InvalidArgument));
    /// assert!(parsed.is_ok());
    /// let rejected = tree.emplace_unique(|| "x".parse::<u8>().map_err(|_| Error::InvalidArgument));
    /// assert_eq!(rejected, Err(Error::InvalidArgument));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn emplace_unique<F, E>(&mut self, construct: F) -> Result<(Position, bool), E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<Error>,
    {
        self.emplace_with(construct, |search, value| search.insert_unique_pos(value))
    }

    /// Builds a value with `construct` and inserts it after all equal elements.
    ///
    /// # Errors
    ///
    /// As for [`emplace_unique`](Self::emplace_unique).
    pub fn emplace_equal<F, E>(&mut self, construct: F) -> Result<Position, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<Error>,
    {
        self.emplace_with(construct, |search, value| search.insert_equal_pos(value))
            .map(|(position, _)| position)
    }

    /// [`emplace_unique`](Self::emplace_unique) with a position hint.
    ///
    /// # Errors
    ///
    /// As for [`emplace_unique`](Self::emplace_unique).
    pub fn emplace_unique_hint<F, E>(&mut self, hint: Position, construct: F) -> Result<Position, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<Error>,
    {
        let hint = self.sanitize_hint(hint);
        self.emplace_with(construct, |search, value| {
            search.insert_hint_unique_pos(hint, value)
        })
        .map(|(position, _)| position)
    }

    /// [`emplace_equal`](Self::emplace_equal) with a position hint.
    ///
    /// # Errors
    ///
    /// As for [`emplace_unique`](Self::emplace_unique).
    pub fn emplace_equal_hint<F, E>(&mut self, hint: Position, construct: F) -> Result<Position, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<Error>,
    {
        let hint = self.sanitize_hint(hint);
        self.emplace_with(construct, |search, value| {
            search.insert_hint_equal_pos(hint, value)
        })
        .map(|(position, _)| position)
    }

    /// Inserts every value not already present, using the end hint.
    ///
    /// Already sorted input inserts in O(1) amortised per element. Returns
    /// how many values were inserted.
    ///
    /// # Errors
    ///
    /// Stops at the first failing insertion. Values inserted before the
    /// failure stay in the tree; the rest of `values` is dropped.
    pub fn insert_unique_iter<I>(&mut self, values: I) -> Result<usize, Error>
    where
        I: IntoIterator<Item = T>,
    {
        let mut inserted = 0;
        for value in values {
            if self.insert_unique_hinted(self.end(), value)?.1 {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    /// Inserts every value, keeping duplicates, using the end hint.
    ///
    /// # Errors
    ///
    /// As for [`insert_unique_iter`](Self::insert_unique_iter).
    pub fn insert_equal_iter<I>(&mut self, values: I) -> Result<usize, Error>
    where
        I: IntoIterator<Item = T>,
    {
        let mut inserted = 0;
        for value in values {
            self.insert_equal_hint(self.end(), value)?;
            inserted += 1;
        }
        Ok(inserted)
    }

    // =========================================================================
    // Verification
    // =========================================================================

    /// Checks every structural invariant; duplicates are allowed.
    ///
    /// Intended as a test oracle. O(N).
    ///
    /// # Errors
    ///
    /// The first [`Violation`] found.
    pub fn verify(&self) -> Result<(), Violation> {
        verify::verify(&self.arena, &self.comparator, self.length, false)
    }

    /// Like [`verify`](Self::verify), but also rejects equal neighbours.
    ///
    /// # Errors
    ///
    /// The first [`Violation`] found.
    pub fn verify_unique(&self) -> Result<(), Violation> {
        verify::verify(&self.arena, &self.comparator, self.length, true)
    }
}

impl<T, C, A: Allocator> RbTree<T, C, A> {
    // =========================================================================
    // Lookup
    // =========================================================================

    /// Position of an element equal to `key`, or `end()`.
    ///
    /// With duplicates, the first of them.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbcore::tree::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// tree.insert_unique(String::from("apple"))?;
    /// assert!(!tree.find("apple").is_end());
    /// assert!(tree.find("pear").is_end());
    /// # Ok::<(), rbcore::error::Error>(())
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Position
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        Position(self.search().find(key))
    }

    /// Returns `true` if an element equal to `key` exists.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        !self.find(key).is_end()
    }

    /// Position of the first element not less than `key`.
    pub fn lower_bound<Q>(&self, key: &Q) -> Position
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        Position(self.search().lower_bound(key))
    }

    /// Position of the first element greater than `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> Position
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        Position(self.search().upper_bound(key))
    }

    /// `(lower_bound(key), upper_bound(key))`, computed with one shared descent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbcore::tree::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// tree.insert_equal_iter([1, 2, 2, 3])?;
    /// let (lower, upper) = tree.equal_range(&2);
    /// assert_eq!(tree.iter_between(lower, upper).count(), 2);
    /// # Ok::<(), rbcore::error::Error>(())
    /// ```
    pub fn equal_range<Q>(&self, key: &Q) -> (Position, Position)
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        let (lower, upper) = self.search().equal_range(key);
        (Position(lower), Position(upper))
    }

    /// Number of elements equal to `key`.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        let (lower, upper) = self.equal_range(key);
        self.distance(lower, upper)
    }

    /// Removes every element equal to `key` and returns how many there were.
    pub fn erase_key<Q>(&mut self, key: &Q) -> usize
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        let (lower, upper) = self.equal_range(key);
        let removed = self.distance(lower, upper);
        self.erase_range(lower, upper);
        removed
    }
}

// =============================================================================
// Fallible Copy
// =============================================================================

impl<T: TryClone, C: Clone, A: Allocator> RbTree<T, C, A> {
    /// Copies the tree into a new one that allocates through `allocator`.
    ///
    /// The copy has the same shape and colours, and positions of `self`
    /// name the corresponding elements of the copy.
    ///
    /// # Errors
    ///
    /// The first allocation or [`TryClone`] failure. Nothing leaks.
    pub fn try_clone_in(&self, allocator: A) -> Result<Self, Error> {
        crate::debug_log!(length = self.length, "copying tree");
        Ok(Self {
            arena: self.arena.try_clone_in(allocator)?,
            comparator: self.comparator.clone(),
            length: self.length,
        })
    }
}

impl<T: TryClone, C: Clone, A: Allocator + Clone> RbTree<T, C, A> {
    /// Copies the tree with a clone of its allocator.
    ///
    /// # Errors
    ///
    /// As for [`try_clone_in`](Self::try_clone_in).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rbcore::tree::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// tree.insert_unique_iter([1, 2, 3])?;
    /// let copy = tree.try_clone()?;
    /// assert_eq!(copy, tree);
    /// # Ok::<(), rbcore::error::Error>(())
    /// ```
    pub fn try_clone(&self) -> Result<Self, Error> {
        self.try_clone_in(self.allocator().clone())
    }

    /// Replaces the contents of `self` with a copy of `source`.
    ///
    /// The copy is built completely before anything is released, so on
    /// failure `self` is untouched.
    ///
    /// # Errors
    ///
    /// As for [`try_clone_in`](Self::try_clone_in).
    pub fn try_clone_from(&mut self, source: &Self) -> Result<(), Error> {
        let copy = source.try_clone_in(self.allocator().clone())?;
        *self = copy;
        Ok(())
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T, C: Default, A: Allocator + Default> Default for RbTree<T, C, A> {
    #[inline]
    fn default() -> Self {
        Self::with_comparator_in(C::default(), A::default())
    }
}

impl<T, C, A: Allocator> IntoIterator for RbTree<T, C, A> {
    type Item = T;
    type IntoIter = IntoIter<T, C, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { tree: self }
    }
}

impl<'a, T, C, A: Allocator> IntoIterator for &'a RbTree<T, C, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq, C, A: Allocator> PartialEq for RbTree<T, C, A> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C, A: Allocator> Eq for RbTree<T, C, A> {}

/// Hashes the length followed by every element in order, so equal trees
/// hash equally regardless of their shape.
impl<T: Hash, C, A: Allocator> Hash for RbTree<T, C, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for value in self {
            value.hash(state);
        }
    }
}

impl<T: fmt::Debug, C, A: Allocator> fmt::Debug for RbTree<T, C, A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display, C, A: Allocator> fmt::Display for RbTree<T, C, A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for value in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{value}")?;
        }
        write!(formatter, "}}")
    }
}

static_assertions::assert_impl_all!(RbTree<i32>: Send, Sync);
static_assertions::assert_impl_all!(RbTree<i32, Natural, crate::alloc::Bounded>: Send);
static_assertions::assert_not_impl_any!(RbTree<i32, Natural, crate::alloc::Bounded>: Sync);

// =============================================================================
// Tests
// =============================================================================
