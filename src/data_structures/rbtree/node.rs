use std::fmt::{self, Debug};

use super::RbTree;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    pub fn is_red(self) -> bool {
        self == Color::Red
    }

    pub fn is_black(self) -> bool {
        self == Color::Black
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "RED"),
            Color::Black => write!(f, "BLACK"),
        }
    }
}

/// Which child slot of a parent a node hangs from.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Handle to a node in a tree's arena.
///
/// A handle names one node for that node's whole life. Once the node is
/// removed by [`RbTree::delete_node`] the handle stays dead, even after
/// its arena slot is reused. [`NodeId::NIL`] always names the sentinel.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct NodeId {
    pub(super) index: usize,
    pub(super) generation: u64,
}

impl NodeId {
    pub const NIL: NodeId = NodeId {
        index: 0,
        generation: 0,
    };

    pub fn is_nil(self) -> bool {
        self == Self::NIL
    }
}

/// Arena slot. The sentinel is the only slot without a key.
#[derive(Debug, Clone)]
pub(super) struct Node<K> {
    pub(super) key: Option<K>,
    pub(super) generation: u64,
    pub(super) color: Color,
    pub(super) parent: NodeId,
    pub(super) left: NodeId,
    pub(super) right: NodeId,
}

impl<K> Node<K> {
    pub(super) fn sentinel() -> Self {
        Node {
            key: None,
            generation: NodeId::NIL.generation,
            color: Color::Black,
            parent: NodeId::NIL,
            left: NodeId::NIL,
            right: NodeId::NIL,
        }
    }

    pub(super) fn new(key: K, parent: NodeId, generation: u64) -> Self {
        Node {
            key: Some(key),
            generation,
            color: Color::Red,
            parent,
            left: NodeId::NIL,
            right: NodeId::NIL,
        }
    }
}

/// Read-only cursor over one node of a tree.
///
/// Walking off a leaf lands on the sentinel rather than on `None`, so a
/// cursor can always be asked for its color and children.
pub struct NodeRef<'a, K> {
    tree: &'a RbTree<K>,
    id: NodeId,
}

impl<'a, K> NodeRef<'a, K> {
    pub(super) fn new(tree: &'a RbTree<K>, id: NodeId) -> Self {
        Self { tree, id }
    }

    fn slot(&self) -> &'a Node<K> {
        &self.tree.nodes[self.id.index]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// `None` only for the sentinel.
    pub fn key(&self) -> Option<&'a K> {
        self.slot().key.as_ref()
    }

    pub fn color(&self) -> Color {
        self.slot().color
    }

    pub fn left(&self) -> NodeRef<'a, K> {
        Self::new(self.tree, self.slot().left)
    }

    pub fn right(&self) -> NodeRef<'a, K> {
        Self::new(self.tree, self.slot().right)
    }

    pub fn child(&self, side: Side) -> NodeRef<'a, K> {
        match side {
            Side::Left => self.left(),
            Side::Right => self.right(),
        }
    }

    /// The root's parent is the sentinel.
    pub fn parent(&self) -> NodeRef<'a, K> {
        Self::new(self.tree, self.slot().parent)
    }

    pub fn is_sentinel(&self) -> bool {
        self.id == NodeId::NIL
    }
}

impl<K> Clone for NodeRef<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for NodeRef<'_, K> {}

impl<K> PartialEq for NodeRef<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl<K> Eq for NodeRef<'_, K> {}

impl<K: Debug> Debug for NodeRef<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            return write!(f, "NIL");
        }
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("key", &self.key())
            .field("color", &self.color())
            .finish()
    }
}
