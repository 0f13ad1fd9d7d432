//! Structural self-check used as a test oracle.

use super::arena::NodeArena;
use super::link::{Color, LinkStore, NodeId, is_red};
use super::rebalance::{increment, maximum, minimum};
use crate::alloc::Allocator;
use crate::compare::Compare;
use smallvec::{SmallVec, smallvec};
use std::cmp::Ordering;
use std::fmt;

/// The first broken invariant found by [`RbTree::verify`](super::RbTree::verify).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Violation {
    /// The root is red.
    RedRoot,
    /// A red node has a red child.
    RedRed {
        /// The red parent.
        node: NodeId,
    },
    /// Two null-leaf paths cross different numbers of black nodes.
    BlackHeight {
        /// The node whose missing child exposed the mismatch.
        node: NodeId,
    },
    /// A child's parent link does not point back at its parent.
    ParentLink {
        /// The child with the broken back-link.
        node: NodeId,
    },
    /// In-order traversal is not sorted.
    Order {
        /// The node that sorts before its predecessor (or equals it in a unique check).
        node: NodeId,
    },
    /// The cached leftmost node is wrong.
    Leftmost {
        /// The actual minimum.
        expected: NodeId,
        /// The cached value.
        found: NodeId,
    },
    /// The cached rightmost node is wrong.
    Rightmost {
        /// The actual maximum.
        expected: NodeId,
        /// The cached value.
        found: NodeId,
    },
    /// The size counter disagrees with the number of reachable nodes.
    Size {
        /// Nodes reachable from the root.
        expected: usize,
        /// The stored counter.
        found: usize,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedRoot => formatter.write_str("root is red"),
            Self::RedRed { node } => write!(formatter, "red node {node:?} has a red child"),
            Self::BlackHeight { node } => {
                write!(formatter, "black height differs below {node:?}")
            }
            Self::ParentLink { node } => write!(formatter, "parent link of {node:?} is broken"),
            Self::Order { node } => write!(formatter, "{node:?} is out of order"),
            Self::Leftmost { expected, found } => {
                write!(formatter, "leftmost cache is {found:?}, expected {expected:?}")
            }
            Self::Rightmost { expected, found } => {
                write!(formatter, "rightmost cache is {found:?}, expected {expected:?}")
            }
            Self::Size { expected, found } => {
                write!(formatter, "size counter is {found}, but {expected} nodes are reachable")
            }
        }
    }
}

impl std::error::Error for Violation {}

/// Checks colours, black height, back-links, ordering, header caches and size.
pub(crate) fn verify<T, C, A>(
    arena: &NodeArena<T, A>,
    comparator: &C,
    length: usize,
    strict: bool,
) -> Result<(), Violation>
where
    C: Compare<T>,
    A: Allocator,
{
    let header = arena.link(NodeId::HEADER);
    let cached_left = header.left.unwrap_or(NodeId::HEADER);
    let cached_right = header.right.unwrap_or(NodeId::HEADER);

    let Some(root) = header.parent else {
        if cached_left != NodeId::HEADER {
            return Err(Violation::Leftmost {
                expected: NodeId::HEADER,
                found: cached_left,
            });
        }
        if cached_right != NodeId::HEADER {
            return Err(Violation::Rightmost {
                expected: NodeId::HEADER,
                found: cached_right,
            });
        }
        if length != 0 {
            return Err(Violation::Size {
                expected: 0,
                found: length,
            });
        }
        return Ok(());
    };

    if arena.link(root).color != Color::Black {
        return Err(Violation::RedRoot);
    }
    if arena.link(root).parent != Some(NodeId::HEADER) {
        return Err(Violation::ParentLink { node: root });
    }

    // (node, black nodes strictly above it)
    let mut stack: SmallVec<[(NodeId, usize); 64]> = smallvec![(root, 0)];
    let mut leaf_black_height: Option<usize> = None;
    let mut reachable = 0_usize;
    while let Some((node, above)) = stack.pop() {
        reachable += 1;
        let link = arena.link(node);
        let blacks = above + usize::from(link.color == Color::Black);
        if link.color == Color::Red && (is_red(arena, link.left) || is_red(arena, link.right)) {
            return Err(Violation::RedRed { node });
        }
        for child in [link.left, link.right] {
            match child {
                Some(child) => {
                    if arena.link(child).parent != Some(node) {
                        return Err(Violation::ParentLink { node: child });
                    }
                    stack.push((child, blacks));
                }
                None => match leaf_black_height {
                    None => leaf_black_height = Some(blacks),
                    Some(height) if height != blacks => {
                        return Err(Violation::BlackHeight { node });
                    }
                    Some(_) => {}
                },
            }
        }
    }

    if reachable != length {
        return Err(Violation::Size {
            expected: reachable,
            found: length,
        });
    }

    let expected_left = minimum(arena, root);
    if cached_left != expected_left {
        return Err(Violation::Leftmost {
            expected: expected_left,
            found: cached_left,
        });
    }
    let expected_right = maximum(arena, root);
    if cached_right != expected_right {
        return Err(Violation::Rightmost {
            expected: expected_right,
            found: cached_right,
        });
    }

    let mut previous = expected_left;
    let mut current = increment(arena, previous);
    while !current.is_header() {
        let ordering = comparator.compare(arena.element(current), arena.element(previous));
        let in_order = if strict {
            ordering == Ordering::Greater
        } else {
            ordering != Ordering::Less
        };
        if !in_order {
            return Err(Violation::Order { node: current });
        }
        previous = current;
        current = increment(arena, current);
    }

    Ok(())
}
