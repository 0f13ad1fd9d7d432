//! The allocator capability consumed by the tree.
//!
//! Node memory lives in the tree's slot storage; an [`Allocator`] decides
//! whether a node may be created at all and is told when one is released.
//! Every node allocation goes through [`Allocator::allocate`] with the
//! layout of the node type, so allocators are "rebound" to whatever node
//! type the tree stores without any inheritance hierarchy.
//!
//! # Examples
//!
//! ```rust
//! use rbcore::alloc::{Allocator, Bounded};
//! use std::alloc::Layout;
//!
//! let allocator = Bounded::new(16);
//! let layout = Layout::new::<u64>();
//! assert!(allocator.allocate(layout).is_ok());
//! assert!(allocator.allocate(layout).is_ok());
//! assert!(allocator.allocate(layout).is_err());
//! allocator.deallocate(layout);
//! assert!(allocator.allocate(layout).is_ok());
//! ```

use crate::error::{AllocError, Error};
use std::alloc::Layout;
use std::cell::Cell;

/// A source of node memory.
///
/// Implementations must be balanced: every successful `allocate` is
/// eventually matched by exactly one `deallocate` with the same layout.
pub trait Allocator {
    /// Requests memory for one block of `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] when the request cannot be satisfied.
    fn allocate(&self, layout: Layout) -> Result<(), AllocError>;

    /// Returns a block previously obtained from [`allocate`](Self::allocate).
    fn deallocate(&self, layout: Layout);

    /// The largest number of `layout` blocks this allocator could ever hand out.
    fn max_count(&self, layout: Layout) -> usize {
        (isize::MAX as usize) / layout.size().max(1)
    }
}

impl<A: Allocator + ?Sized> Allocator for &A {
    fn allocate(&self, layout: Layout) -> Result<(), AllocError> {
        (**self).allocate(layout)
    }

    fn deallocate(&self, layout: Layout) {
        (**self).deallocate(layout);
    }

    fn max_count(&self, layout: Layout) -> usize {
        (**self).max_count(layout)
    }
}

/// The process allocator.
///
/// Always grants requests. Real exhaustion still surfaces as
/// [`Error::NotEnoughMemory`] because node storage grows with
/// `Vec::try_reserve`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Global;

impl Allocator for Global {
    #[inline]
    fn allocate(&self, _layout: Layout) -> Result<(), AllocError> {
        Ok(())
    }

    #[inline]
    fn deallocate(&self, _layout: Layout) {}
}

/// An allocator with a fixed byte budget.
///
/// Requests that would push the live byte count above the budget are
/// refused. Cloning a `Bounded` yields an independent allocator with the
/// same budget and nothing in use.
#[derive(Debug)]
pub struct Bounded {
    limit: usize,
    in_use: Cell<usize>,
}

impl Bounded {
    /// Creates an allocator that hands out at most `limit` live bytes.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            limit,
            in_use: Cell::new(0),
        }
    }

    /// Creates an allocator with room for exactly `count` blocks of `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueTooLarge`] if the budget overflows `usize`.
    pub fn for_blocks(layout: Layout, count: usize) -> Result<Self, Error> {
        layout
            .size()
            .checked_mul(count)
            .map(Self::new)
            .ok_or(Error::ValueTooLarge)
    }

    /// Bytes currently handed out.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.in_use.get()
    }

    /// Total byte budget.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }
}

impl Clone for Bounded {
    fn clone(&self) -> Self {
        Self::new(self.limit)
    }
}

impl Allocator for Bounded {
    fn allocate(&self, layout: Layout) -> Result<(), AllocError> {
        let requested = self
            .in_use
            .get()
            .checked_add(layout.size())
            .ok_or(AllocError)?;
        if requested > self.limit {
            return Err(AllocError);
        }
        self.in_use.set(requested);
        Ok(())
    }

    fn deallocate(&self, layout: Layout) {
        self.in_use.set(self.in_use.get().saturating_sub(layout.size()));
    }

    fn max_count(&self, layout: Layout) -> usize {
        self.limit / layout.size().max(1)
    }
}
