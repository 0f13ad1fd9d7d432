//! Link nodes: the value-independent part of every tree node.

use std::fmt;

/// The colour of a red-black tree node.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Color {
    /// A red node.
    Red,
    /// A black node.
    Black,
}

/// Handle of a node slot inside a tree's storage.
///
/// Slot `0` is reserved for the header sentinel.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The header sentinel.
    pub const HEADER: Self = Self(0);

    /// The largest representable handle.
    pub const MAX: Self = Self(u32::MAX);

    /// Converts a slot index into a handle, if it fits.
    #[inline]
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    /// The slot index this handle refers to.
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` for the header sentinel.
    #[inline]
    pub const fn is_header(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_header() {
            formatter.write_str("NodeId(header)")
        } else {
            write!(formatter, "NodeId({})", self.0)
        }
    }
}

/// Colour plus the three structural links of a node.
///
/// For the header: `parent` is the root, `left` the leftmost node and
/// `right` the rightmost node (both the header itself when empty).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LinkNode {
    pub(crate) color: Color,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

impl LinkNode {
    /// A detached red node.
    pub(crate) const fn new() -> Self {
        Self {
            color: Color::Red,
            parent: None,
            left: None,
            right: None,
        }
    }

    /// The header of an empty tree. Its colour is never inspected.
    pub(crate) const fn header() -> Self {
        Self {
            color: Color::Red,
            parent: None,
            left: Some(NodeId::HEADER),
            right: Some(NodeId::HEADER),
        }
    }

    /// The node colour.
    #[inline]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// The parent link.
    #[inline]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The left child link.
    #[inline]
    pub const fn left(&self) -> Option<NodeId> {
        self.left
    }

    /// The right child link.
    #[inline]
    pub const fn right(&self) -> Option<NodeId> {
        self.right
    }
}

/// Anything that can resolve a [`NodeId`] to its links.
///
/// The rebalancing kernel is written against this trait only and never
/// sees stored values.
pub trait LinkStore {
    /// The links of `id`.
    fn link(&self, id: NodeId) -> &LinkNode;

    /// The links of `id`, mutably.
    fn link_mut(&mut self, id: NodeId) -> &mut LinkNode;
}

/// `None` children count as black.
#[inline]
pub(crate) fn is_red<S: LinkStore + ?Sized>(store: &S, id: Option<NodeId>) -> bool {
    id.is_some_and(|id| store.link(id).color == Color::Red)
}

static_assertions::assert_eq_size!(NodeId, u32);
static_assertions::assert_impl_all!(NodeId: Send, Sync, Copy);
