//! The red-black kernel.
//!
//! Free functions over a [`LinkStore`] and the header sentinel. Nothing here
//! knows the stored value type: the container shell decides *where* a node
//! goes, these functions splice it in or out and restore the colour
//! invariants.
//!
//! # Invariants restored on exit
//!
//! 1. The root is black.
//! 2. No red node has a red child.
//! 3. Every path from a node to a null leaf crosses the same number of
//!    black nodes.
//! 4. `header.left` / `header.right` are the minimum / maximum node (the
//!    header itself when the tree is empty) and `header.parent` is the root.

use super::link::{Color, LinkStore, NodeId, is_red};

#[inline]
fn parent_of<S: LinkStore + ?Sized>(store: &S, id: NodeId) -> NodeId {
    // Every attached node has a parent: the root's parent is the header.
    store.link(id).parent.unwrap_or(NodeId::HEADER)
}

#[inline]
fn root<S: LinkStore + ?Sized>(store: &S) -> Option<NodeId> {
    store.link(NodeId::HEADER).parent
}

/// Leftmost node of the subtree rooted at `id`.
pub fn minimum<S: LinkStore + ?Sized>(store: &S, mut id: NodeId) -> NodeId {
    while let Some(left) = store.link(id).left {
        id = left;
    }
    id
}

/// Rightmost node of the subtree rooted at `id`.
pub fn maximum<S: LinkStore + ?Sized>(store: &S, mut id: NodeId) -> NodeId {
    while let Some(right) = store.link(id).right {
        id = right;
    }
    id
}

/// In-order successor.
///
/// The successor of the maximum is the header. Advancing the header
/// leaves it where it is.
pub fn increment<S: LinkStore + ?Sized>(store: &S, id: NodeId) -> NodeId {
    if id.is_header() {
        return id;
    }
    if let Some(right) = store.link(id).right {
        return minimum(store, right);
    }
    let mut node = id;
    let mut parent = parent_of(store, node);
    while store.link(parent).right == Some(node) {
        node = parent;
        parent = parent_of(store, parent);
    }
    // With a single node the climb overshoots onto the root again; the
    // header's right link tells the two situations apart.
    if store.link(node).right == Some(parent) {
        node
    } else {
        parent
    }
}

/// In-order predecessor.
///
/// The predecessor of the header is the maximum (or the header itself
/// when the tree is empty). The predecessor of the minimum is the header.
pub fn decrement<S: LinkStore + ?Sized>(store: &S, id: NodeId) -> NodeId {
    if id.is_header() {
        return store.link(NodeId::HEADER).right.unwrap_or(NodeId::HEADER);
    }
    if let Some(left) = store.link(id).left {
        return maximum(store, left);
    }
    let mut node = id;
    let mut parent = parent_of(store, node);
    while !parent.is_header() && store.link(parent).left == Some(node) {
        node = parent;
        parent = parent_of(store, parent);
    }
    parent
}

/// Replaces `old` by `new` in the child slot of `old`'s parent (or as root).
fn replace_child<S: LinkStore + ?Sized>(
    store: &mut S,
    old: NodeId,
    new: Option<NodeId>,
    parent: NodeId,
) {
    if parent.is_header() {
        store.link_mut(NodeId::HEADER).parent = new;
    } else if store.link(parent).left == Some(old) {
        store.link_mut(parent).left = new;
    } else {
        store.link_mut(parent).right = new;
    }
}

/// Rotates `x` down to the left; its right child takes its place.
pub fn rotate_left<S: LinkStore + ?Sized>(store: &mut S, x: NodeId) {
    let Some(y) = store.link(x).right else {
        return;
    };
    let y_left = store.link(y).left;
    store.link_mut(x).right = y_left;
    if let Some(y_left) = y_left {
        store.link_mut(y_left).parent = Some(x);
    }
    let x_parent = parent_of(store, x);
    store.link_mut(y).parent = Some(x_parent);
    replace_child(store, x, Some(y), x_parent);
    store.link_mut(y).left = Some(x);
    store.link_mut(x).parent = Some(y);
}

/// Rotates `x` down to the right; its left child takes its place.
pub fn rotate_right<S: LinkStore + ?Sized>(store: &mut S, x: NodeId) {
    let Some(y) = store.link(x).left else {
        return;
    };
    let y_right = store.link(y).right;
    store.link_mut(x).left = y_right;
    if let Some(y_right) = y_right {
        store.link_mut(y_right).parent = Some(x);
    }
    let x_parent = parent_of(store, x);
    store.link_mut(y).parent = Some(x_parent);
    replace_child(store, x, Some(y), x_parent);
    store.link_mut(y).right = Some(x);
    store.link_mut(x).parent = Some(y);
}

/// Splices the detached node `x` under `parent` and rebalances.
///
/// `insert_left` selects the child slot; the slot must be empty. When
/// `parent` is the header the tree must be empty and `x` becomes the root.
pub fn insert_and_rebalance<S: LinkStore + ?Sized>(
    store: &mut S,
    insert_left: bool,
    x: NodeId,
    parent: NodeId,
) {
    {
        let link = store.link_mut(x);
        link.parent = Some(parent);
        link.left = None;
        link.right = None;
        link.color = Color::Red;
    }

    if insert_left {
        if parent.is_header() {
            let header = store.link_mut(NodeId::HEADER);
            header.parent = Some(x);
            header.left = Some(x);
            header.right = Some(x);
        } else {
            store.link_mut(parent).left = Some(x);
            if store.link(NodeId::HEADER).left == Some(parent) {
                store.link_mut(NodeId::HEADER).left = Some(x);
            }
        }
    } else {
        store.link_mut(parent).right = Some(x);
        if store.link(NodeId::HEADER).right == Some(parent) {
            store.link_mut(NodeId::HEADER).right = Some(x);
        }
    }

    insert_fixup(store, x);
}

fn insert_fixup<S: LinkStore + ?Sized>(store: &mut S, mut x: NodeId) {
    while root(store) != Some(x) && is_red(store, store.link(x).parent) {
        let x_parent = parent_of(store, x);
        let grandparent = parent_of(store, x_parent);

        if store.link(grandparent).left == Some(x_parent) {
            let uncle = store.link(grandparent).right;
            if let Some(uncle) = uncle.filter(|&uncle| store.link(uncle).color == Color::Red) {
                store.link_mut(x_parent).color = Color::Black;
                store.link_mut(uncle).color = Color::Black;
                store.link_mut(grandparent).color = Color::Red;
                x = grandparent;
            } else {
                if store.link(x_parent).right == Some(x) {
                    x = x_parent;
                    crate::trace_log!(node = ?x, "rotate left (inner case)");
                    rotate_left(store, x);
                }
                let x_parent = parent_of(store, x);
                let grandparent = parent_of(store, x_parent);
                store.link_mut(x_parent).color = Color::Black;
                store.link_mut(grandparent).color = Color::Red;
                crate::trace_log!(node = ?grandparent, "rotate right (outer case)");
                rotate_right(store, grandparent);
            }
        } else {
            let uncle = store.link(grandparent).left;
            if let Some(uncle) = uncle.filter(|&uncle| store.link(uncle).color == Color::Red) {
                store.link_mut(x_parent).color = Color::Black;
                store.link_mut(uncle).color = Color::Black;
                store.link_mut(grandparent).color = Color::Red;
                x = grandparent;
            } else {
                if store.link(x_parent).left == Some(x) {
                    x = x_parent;
                    crate::trace_log!(node = ?x, "rotate right (inner case)");
                    rotate_right(store, x);
                }
                let x_parent = parent_of(store, x);
                let grandparent = parent_of(store, x_parent);
                store.link_mut(x_parent).color = Color::Black;
                store.link_mut(grandparent).color = Color::Red;
                crate::trace_log!(node = ?grandparent, "rotate left (outer case)");
                rotate_left(store, grandparent);
            }
        }
    }

    if let Some(root) = root(store) {
        store.link_mut(root).color = Color::Black;
    }
}

/// Unlinks `z` from the tree and rebalances.
///
/// A node with two children is swapped, by relinking, with its in-order
/// successor first, so every other node keeps its handle. On return `z`
/// is fully detached and may be freed; the header caches are updated.
pub fn rebalance_for_erase<S: LinkStore + ?Sized>(store: &mut S, z: NodeId) {
    let z_link = *store.link(z);
    let z_parent = z_link.parent.unwrap_or(NodeId::HEADER);

    // `x` is the child that moves up into the hole, `x_parent` its new parent.
    let x: Option<NodeId>;
    let x_parent: NodeId;
    let removed_color: Color;

    match (z_link.left, z_link.right) {
        (Some(z_left), Some(z_right)) => {
            let y = minimum(store, z_right);
            x = store.link(y).right;

            store.link_mut(z_left).parent = Some(y);
            store.link_mut(y).left = Some(z_left);
            if y == z_right {
                x_parent = y;
            } else {
                x_parent = parent_of(store, y);
                if let Some(x) = x {
                    store.link_mut(x).parent = Some(x_parent);
                }
                store.link_mut(x_parent).left = x;
                store.link_mut(y).right = Some(z_right);
                store.link_mut(z_right).parent = Some(y);
            }
            replace_child(store, z, Some(y), z_parent);
            store.link_mut(y).parent = Some(z_parent);

            // `y` inherits z's colour; the colour that leaves the tree is y's.
            removed_color = store.link(y).color;
            store.link_mut(y).color = z_link.color;
        }
        (left, right) => {
            x = left.or(right);
            x_parent = z_parent;
            if let Some(x) = x {
                store.link_mut(x).parent = Some(z_parent);
            }
            replace_child(store, z, x, z_parent);

            if store.link(NodeId::HEADER).left == Some(z) {
                let leftmost = match x {
                    Some(x) if right.is_some() => minimum(store, x),
                    _ => z_parent,
                };
                store.link_mut(NodeId::HEADER).left = Some(leftmost);
            }
            if store.link(NodeId::HEADER).right == Some(z) {
                let rightmost = match x {
                    Some(x) if left.is_some() => maximum(store, x),
                    _ => z_parent,
                };
                store.link_mut(NodeId::HEADER).right = Some(rightmost);
            }
            removed_color = z_link.color;
        }
    }

    if removed_color == Color::Black {
        erase_fixup(store, x, x_parent);
    }

    *store.link_mut(z) = super::link::LinkNode::new();
}

fn erase_fixup<S: LinkStore + ?Sized>(store: &mut S, mut x: Option<NodeId>, mut x_parent: NodeId) {
    while x != root(store) && !is_red(store, x) {
        if store.link(x_parent).left == x {
            let Some(mut sibling) = store.link(x_parent).right else {
                break;
            };
            if store.link(sibling).color == Color::Red {
                store.link_mut(sibling).color = Color::Black;
                store.link_mut(x_parent).color = Color::Red;
                crate::trace_log!(node = ?x_parent, "rotate left (red sibling)");
                rotate_left(store, x_parent);
                match store.link(x_parent).right {
                    Some(next) => sibling = next,
                    None => break,
                }
            }
            let near = store.link(sibling).left;
            let far = store.link(sibling).right;
            if !is_red(store, near) && !is_red(store, far) {
                store.link_mut(sibling).color = Color::Red;
                x = Some(x_parent);
                x_parent = parent_of(store, x_parent);
            } else {
                if !is_red(store, far) {
                    if let Some(near) = near {
                        store.link_mut(near).color = Color::Black;
                    }
                    store.link_mut(sibling).color = Color::Red;
                    crate::trace_log!(node = ?sibling, "rotate right (near red nephew)");
                    rotate_right(store, sibling);
                    match store.link(x_parent).right {
                        Some(next) => sibling = next,
                        None => break,
                    }
                }
                store.link_mut(sibling).color = store.link(x_parent).color;
                store.link_mut(x_parent).color = Color::Black;
                if let Some(far) = store.link(sibling).right {
                    store.link_mut(far).color = Color::Black;
                }
                crate::trace_log!(node = ?x_parent, "rotate left (far red nephew)");
                rotate_left(store, x_parent);
                break;
            }
        } else {
            let Some(mut sibling) = store.link(x_parent).left else {
                break;
            };
            if store.link(sibling).color == Color::Red {
                store.link_mut(sibling).color = Color::Black;
                store.link_mut(x_parent).color = Color::Red;
                crate::trace_log!(node = ?x_parent, "rotate right (red sibling)");
                rotate_right(store, x_parent);
                match store.link(x_parent).left {
                    Some(next) => sibling = next,
                    None => break,
                }
            }
            let near = store.link(sibling).right;
            let far = store.link(sibling).left;
            if !is_red(store, near) && !is_red(store, far) {
                store.link_mut(sibling).color = Color::Red;
                x = Some(x_parent);
                x_parent = parent_of(store, x_parent);
            } else {
                if !is_red(store, far) {
                    if let Some(near) = near {
                        store.link_mut(near).color = Color::Black;
                    }
                    store.link_mut(sibling).color = Color::Red;
                    crate::trace_log!(node = ?sibling, "rotate left (near red nephew)");
                    rotate_left(store, sibling);
                    match store.link(x_parent).left {
                        Some(next) => sibling = next,
                        None => break,
                    }
                }
                store.link_mut(sibling).color = store.link(x_parent).color;
                store.link_mut(x_parent).color = Color::Black;
                if let Some(far) = store.link(sibling).left {
                    store.link_mut(far).color = Color::Black;
                }
                crate::trace_log!(node = ?x_parent, "rotate right (far red nephew)");
                rotate_right(store, x_parent);
                break;
            }
        }
    }

    if let Some(x) = x {
        store.link_mut(x).color = Color::Black;
    }
}

#[cfg(test)]
mod tests {
    use super::super::link::LinkNode;
    use super::*;
    use rstest::rstest;

    /// A bare link store: slot 0 is the header.
    struct Links(Vec<LinkNode>);

    impl Links {
        fn with_nodes(count: usize) -> Self {
            let mut links = vec![LinkNode::header()];
            links.extend(std::iter::repeat_n(LinkNode::new(), count));
            Self(links)
        }
    }

    impl LinkStore for Links {
        fn link(&self, id: NodeId) -> &LinkNode {
            &self.0[id.index()]
        }

        fn link_mut(&mut self, id: NodeId) -> &mut LinkNode {
            &mut self.0[id.index()]
        }
    }

    fn id(index: usize) -> NodeId {
        NodeId::from_index(index).unwrap()
    }

    fn in_order(store: &Links) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut cursor = store.link(NodeId::HEADER).left.unwrap();
        while !cursor.is_header() {
            order.push(cursor);
            cursor = increment(store, cursor);
        }
        order
    }

    fn black_height(store: &Links, node: Option<NodeId>) -> usize {
        match node {
            None => 1,
            Some(node) => {
                let link = store.link(node);
                let left = black_height(store, link.left);
                let right = black_height(store, link.right);
                assert_eq!(left, right, "black height mismatch under {node:?}");
                if link.color == Color::Red {
                    assert!(!is_red(store, link.left) && !is_red(store, link.right));
                    left
                } else {
                    left + 1
                }
            }
        }
    }

    /// Appends nodes 1..=count as an ascending sequence (always attaching at the right end).
    fn build_ascending(count: usize) -> Links {
        let mut store = Links::with_nodes(count);
        for index in 1..=count {
            let parent = if index == 1 {
                NodeId::HEADER
            } else {
                store.link(NodeId::HEADER).right.unwrap()
            };
            insert_and_rebalance(&mut store, index == 1, id(index), parent);
        }
        store
    }

    #[rstest]
    fn test_single_insert_sets_header() {
        let store = build_ascending(1);
        let header = store.link(NodeId::HEADER);
        assert_eq!(header.parent, Some(id(1)));
        assert_eq!(header.left, Some(id(1)));
        assert_eq!(header.right, Some(id(1)));
        assert_eq!(store.link(id(1)).color, Color::Black);
        assert_eq!(store.link(id(1)).parent, Some(NodeId::HEADER));
    }

    #[rstest]
    fn test_increment_past_single_node_reaches_header() {
        let store = build_ascending(1);
        assert_eq!(increment(&store, id(1)), NodeId::HEADER);
        assert_eq!(decrement(&store, NodeId::HEADER), id(1));
        assert_eq!(decrement(&store, id(1)), NodeId::HEADER);
    }

    #[rstest]
    fn test_decrement_header_of_empty_tree_is_header() {
        let store = Links::with_nodes(0);
        assert_eq!(decrement(&store, NodeId::HEADER), NodeId::HEADER);
        assert_eq!(increment(&store, NodeId::HEADER), NodeId::HEADER);
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(10)]
    #[case(100)]
    fn test_ascending_inserts_stay_balanced(#[case] count: usize) {
        let store = build_ascending(count);
        let root = store.link(NodeId::HEADER).parent;
        assert_eq!(store.link(root.unwrap()).color, Color::Black);
        black_height(&store, root);
        let expected: Vec<NodeId> = (1..=count).map(id).collect();
        assert_eq!(in_order(&store), expected);
        assert_eq!(store.link(NodeId::HEADER).left, Some(id(1)));
        assert_eq!(store.link(NodeId::HEADER).right, Some(id(count)));
    }

    #[rstest]
    fn test_three_ascending_inserts_rotate_to_middle_root() {
        let store = build_ascending(3);
        assert_eq!(store.link(NodeId::HEADER).parent, Some(id(2)));
        assert_eq!(store.link(id(2)).left, Some(id(1)));
        assert_eq!(store.link(id(2)).right, Some(id(3)));
        assert_eq!(store.link(id(1)).color, Color::Red);
        assert_eq!(store.link(id(3)).color, Color::Red);
    }

    #[rstest]
    fn test_decrement_walks_backwards() {
        let store = build_ascending(20);
        let mut cursor = decrement(&store, NodeId::HEADER);
        let mut seen = Vec::new();
        while !cursor.is_header() {
            seen.push(cursor);
            cursor = decrement(&store, cursor);
        }
        let expected: Vec<NodeId> = (1..=20).rev().map(id).collect();
        assert_eq!(seen, expected);
    }

    #[rstest]
    fn test_rotate_left_then_right_restores_shape() {
        let mut store = build_ascending(3);
        let before = store.0.clone();
        rotate_left(&mut store, id(2));
        assert_eq!(store.link(NodeId::HEADER).parent, Some(id(3)));
        rotate_right(&mut store, id(3));
        assert_eq!(store.0, before);
    }

    #[rstest]
    #[case(vec![1])]
    #[case(vec![4, 8, 1])]
    #[case((1..=30).collect())]
    #[case((1..=30).rev().collect())]
    #[case(vec![16, 8, 24, 4, 12, 20, 28, 2, 6, 10, 14])]
    fn test_erase_keeps_invariants(#[case] erase_order: Vec<usize>) {
        let count = 30;
        let mut store = build_ascending(count);
        let mut remaining: Vec<NodeId> = (1..=count).map(id).collect();
        for index in erase_order {
            rebalance_for_erase(&mut store, id(index));
            remaining.retain(|&node| node != id(index));
            assert_eq!(in_order(&store), remaining);
            let root = store.link(NodeId::HEADER).parent;
            black_height(&store, root);
            if let Some(root) = root {
                assert_eq!(store.link(root).color, Color::Black);
                assert_eq!(store.link(root).parent, Some(NodeId::HEADER));
            }
            let expected_leftmost = remaining.first().copied().unwrap_or(NodeId::HEADER);
            let expected_rightmost = remaining.last().copied().unwrap_or(NodeId::HEADER);
            assert_eq!(store.link(NodeId::HEADER).left, Some(expected_leftmost));
            assert_eq!(store.link(NodeId::HEADER).right, Some(expected_rightmost));
        }
    }

    #[rstest]
    fn test_erase_last_node_empties_header() {
        let mut store = build_ascending(1);
        rebalance_for_erase(&mut store, id(1));
        assert_eq!(*store.link(NodeId::HEADER), LinkNode::header());
        assert_eq!(*store.link(id(1)), LinkNode::new());
    }
}
