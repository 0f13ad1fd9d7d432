//! # rbcore
//!
//! An exception-free, allocator-aware red-black tree engine for ordered
//! associative containers.
//!
//! ## Overview
//!
//! [`RbTree`](tree::RbTree) is the shared core behind set- and map-like
//! containers:
//!
//! - **Balanced insertion and deletion**: classic red-black fixups with
//!   rotations and recolouring, O(log N) worst case.
//! - **Stable positions**: a [`Position`](tree::Position) keeps naming its
//!   element across unrelated insertions and erasures.
//! - **Unique and equal modes**: the same tree supports set semantics
//!   (`insert_unique`) and multiset semantics (`insert_equal`), with hinted
//!   variants for sorted or clustered input.
//! - **Fallible everywhere it matters**: allocation and value construction
//!   report failures through [`Result`]; a failed insertion leaves the tree
//!   exactly as it was.
//!
//! ## Feature Flags
//!
//! - `tracing`: emit `tracing` events for allocation failures and
//!   rebalancing steps
//!
//! ## Example
//!
//! ```rust
//! use rbcore::prelude::*;
//!
//! let mut tree = RbTree::new();
//! for key in [5, 3, 8, 1, 4, 7, 9] {
//!     tree.insert_unique(key)?;
//! }
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 3, 4, 5, 7, 8, 9]);
//!
//! let (lower, upper) = tree.equal_range(&5);
//! assert_eq!(tree.get(lower), Some(&5));
//! assert_eq!(tree.get(upper), Some(&7));
//! assert!(tree.find(&6).is_end());
//! # Ok::<(), rbcore::error::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use rbcore::prelude::*;
/// ```
pub mod prelude {
    pub use crate::alloc::{Allocator, Bounded, Global};
    pub use crate::compare::{Compare, CompareFn, Natural, Reverse};
    pub use crate::construct::TryClone;
    pub use crate::error::{AllocError, Error};
    pub use crate::tree::{Position, RbTree, Violation};
}

mod tracing_helpers;
pub(crate) use tracing_helpers::{debug_log, trace_log, warn_log};

pub mod alloc;
pub mod compare;
pub mod construct;
pub mod error;
pub mod tree;
