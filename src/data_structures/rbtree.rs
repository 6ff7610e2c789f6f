use std::collections::VecDeque;
use std::fmt::Debug;

use slab::Slab;
use tracing::{debug, trace, warn};

mod config;
mod error;
mod node;
pub mod stats;

pub use config::{DuplicatePolicy, RbTreeConfig};
pub use error::{RbTreeError, RbTreeResult};
pub use node::{Color, NodeId, NodeRef, Side};

use node::Node;

/// Red-black tree over totally ordered keys.
///
/// Nodes live in an arena owned by the tree. Slot 0 holds the sentinel,
/// which stands in for every missing child and for the root's parent.
/// Equal keys are allowed by default and always descend to the right.
#[derive(Debug, Clone)]
pub struct RbTree<K> {
    nodes: Slab<Node<K>>,
    root: NodeId,
    next_generation: u64,
    config: RbTreeConfig,
}

impl<K: Ord + Debug> Default for RbTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Debug> RbTree<K> {
    pub fn new() -> Self {
        Self::with_config(RbTreeConfig::default())
    }

    pub fn with_config(config: RbTreeConfig) -> Self {
        let mut nodes = Slab::with_capacity(config.initial_capacity + 1);
        let sentinel = nodes.insert(Node::sentinel());
        debug_assert_eq!(sentinel, NodeId::NIL.index);
        Self {
            nodes,
            root: NodeId::NIL,
            next_generation: NodeId::NIL.generation + 1,
            config,
        }
    }

    pub fn config(&self) -> &RbTreeConfig {
        &self.config
    }

    pub fn root(&self) -> NodeRef<'_, K> {
        NodeRef::new(self, self.root)
    }

    pub fn sentinel(&self) -> NodeId {
        NodeId::NIL
    }

    pub fn is_sentinel(&self, id: NodeId) -> bool {
        id == self.sentinel()
    }

    /// Cursor for a live node, or `None` if the handle's node was removed.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, K>> {
        self.nodes
            .get(id.index)
            .is_some_and(|slot| slot.generation == id.generation)
            .then(|| NodeRef::new(self, id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_nil()
    }

    /// Inserts `key`, returning the handle of the new node.
    pub fn insert(&mut self, key: K) -> RbTreeResult<NodeId> {
        if self.config.duplicates == DuplicatePolicy::Reject && self.contains(&key) {
            debug!(?key, "rejecting duplicate key");
            return Err(RbTreeError::DuplicateKey);
        }

        let mut parent = NodeId::NIL;
        let mut current = self.root;
        while !current.is_nil() {
            parent = current;
            current = if key < *self.key(current) {
                self.left(current)
            } else {
                self.right(current)
            };
        }

        let goes_left = !parent.is_nil() && key < *self.key(parent);
        let generation = self.next_generation;
        self.next_generation += 1;
        let index = self.nodes.insert(Node::new(key, parent, generation));
        let node = NodeId { index, generation };
        if parent.is_nil() {
            self.root = node;
        } else if goes_left {
            self.set_left(parent, node);
        } else {
            self.set_right(parent, node);
        }

        if parent.is_nil() {
            trace!("inserted root");
            self.set_color(node, Color::Black);
        } else if !self.parent(parent).is_nil() {
            self.insert_fixup(node);
        }

        self.after_mutation();
        Ok(node)
    }

    fn insert_fixup(&mut self, mut k: NodeId) {
        while self.color(self.parent(k)).is_red() {
            let parent = self.parent(k);
            let grandparent = self.parent(parent);
            let side = self.side_of(parent);
            let uncle = self.child(grandparent, side.opposite());

            if self.color(uncle).is_red() {
                trace!("insert case 1: red uncle");
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                k = grandparent;
            } else {
                if k == self.child(parent, side.opposite()) {
                    trace!("insert case 2: inner grandchild");
                    k = parent;
                    self.rotate(k, side);
                }
                trace!("insert case 3: outer grandchild");
                let parent = self.parent(k);
                let grandparent = self.parent(parent);
                self.set_color(parent, Color::Black);
                self.set_color(grandparent, Color::Red);
                self.rotate(grandparent, side.opposite());
            }

            if k == self.root {
                break;
            }
        }
        let root = self.root;
        self.set_color(root, Color::Black);
    }

    /// Finds a node holding `key`, stopping at the first match on the way
    /// down.
    pub fn search(&self, key: &K) -> Option<NodeRef<'_, K>> {
        let mut current = self.root;
        while !current.is_nil() {
            let current_key = self.key(current);
            if key == current_key {
                return Some(NodeRef::new(self, current));
            }
            current = if key < current_key {
                self.left(current)
            } else {
                self.right(current)
            };
        }
        None
    }

    pub fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// Removes one node holding `key` and returns its key.
    ///
    /// Among equal keys on the search path, the deepest one is removed.
    pub fn delete_node(&mut self, key: &K) -> RbTreeResult<K> {
        let z = self.locate(key);
        if z.is_nil() {
            debug!(?key, "key not found in the tree");
            return Err(RbTreeError::KeyNotFound);
        }

        let mut y_original_color = self.color(z);
        let x;
        if self.left(z).is_nil() {
            x = self.right(z);
            self.transplant(z, x);
        } else if self.right(z).is_nil() {
            x = self.left(z);
            self.transplant(z, x);
        } else {
            let y = self.subtree_minimum(self.right(z));
            y_original_color = self.color(y);
            x = self.right(y);
            if self.parent(y) == z {
                self.set_parent(x, y);
            } else {
                self.transplant(y, x);
                let z_right = self.right(z);
                self.set_right(y, z_right);
                self.set_parent(z_right, y);
            }
            self.transplant(z, y);
            let z_left = self.left(z);
            self.set_left(y, z_left);
            self.set_parent(z_left, y);
            self.set_color(y, self.color(z));
        }

        if y_original_color.is_black() {
            self.delete_fixup(x);
        }
        self.set_parent(NodeId::NIL, NodeId::NIL);

        let removed = self.nodes.remove(z.index);
        self.after_mutation();
        match removed.key {
            Some(key) => Ok(key),
            None => unreachable!("the sentinel is never removed"),
        }
    }

    fn locate(&self, key: &K) -> NodeId {
        let mut found = NodeId::NIL;
        let mut current = self.root;
        while !current.is_nil() {
            let current_key = self.key(current);
            if current_key == key {
                found = current;
            }
            current = if current_key <= key {
                self.right(current)
            } else {
                self.left(current)
            };
        }
        found
    }

    fn delete_fixup(&mut self, mut x: NodeId) {
        while x != self.root && self.color(x).is_black() {
            let parent = self.parent(x);
            let side = if x == self.left(parent) {
                Side::Left
            } else {
                Side::Right
            };
            let mut sibling = self.child(parent, side.opposite());

            if self.color(sibling).is_red() {
                trace!("delete case 1: red sibling");
                self.set_color(sibling, Color::Black);
                self.set_color(parent, Color::Red);
                self.rotate(parent, side);
                sibling = self.child(parent, side.opposite());
            }

            let near = self.child(sibling, side);
            let far = self.child(sibling, side.opposite());
            if self.color(near).is_black() && self.color(far).is_black() {
                trace!("delete case 2: black sibling with black children");
                self.set_color(sibling, Color::Red);
                x = parent;
                continue;
            }

            if self.color(far).is_black() {
                trace!("delete case 3: near nephew red");
                self.set_color(near, Color::Black);
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, side.opposite());
                sibling = self.child(parent, side.opposite());
            }

            trace!("delete case 4: far nephew red");
            self.set_color(sibling, self.color(parent));
            self.set_color(parent, Color::Black);
            let far = self.child(sibling, side.opposite());
            self.set_color(far, Color::Black);
            self.rotate(parent, side);
            x = self.root;
        }
        self.set_color(x, Color::Black);
    }

    /// Puts `v` where `u` hangs. `v`'s parent is written even when `v` is
    /// the sentinel.
    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let parent = self.parent(u);
        if parent.is_nil() {
            self.root = v;
        } else if u == self.left(parent) {
            self.set_left(parent, v);
        } else {
            self.set_right(parent, v);
        }
        self.set_parent(v, parent);
    }

    /// Rotates `x` down towards `side`.
    fn rotate(&mut self, x: NodeId, side: Side) {
        match side {
            Side::Left => self.left_rotate(x),
            Side::Right => self.right_rotate(x),
        }
    }

    fn left_rotate(&mut self, x: NodeId) {
        let y = self.right(x);
        let y_left = self.left(y);
        self.set_right(x, y_left);
        if !y_left.is_nil() {
            self.set_parent(y_left, x);
        }
        self.replace_in_parent(x, y);
        self.set_left(y, x);
        self.set_parent(x, y);
    }

    fn right_rotate(&mut self, x: NodeId) {
        let y = self.left(x);
        let y_right = self.right(y);
        self.set_left(x, y_right);
        if !y_right.is_nil() {
            self.set_parent(y_right, x);
        }
        self.replace_in_parent(x, y);
        self.set_right(y, x);
        self.set_parent(x, y);
    }

    fn replace_in_parent(&mut self, x: NodeId, y: NodeId) {
        let parent = self.parent(x);
        self.set_parent(y, parent);
        if parent.is_nil() {
            self.root = y;
        } else if x == self.left(parent) {
            self.set_left(parent, y);
        } else {
            self.set_right(parent, y);
        }
    }

    fn subtree_minimum(&self, mut node: NodeId) -> NodeId {
        while !self.left(node).is_nil() {
            node = self.left(node);
        }
        node
    }

    fn subtree_maximum(&self, mut node: NodeId) -> NodeId {
        while !self.right(node).is_nil() {
            node = self.right(node);
        }
        node
    }

    pub fn minimum(&self) -> Option<NodeRef<'_, K>> {
        (!self.is_empty()).then(|| NodeRef::new(self, self.subtree_minimum(self.root)))
    }

    pub fn maximum(&self) -> Option<NodeRef<'_, K>> {
        (!self.is_empty()).then(|| NodeRef::new(self, self.subtree_maximum(self.root)))
    }

    /// Keys in non-decreasing order.
    pub fn in_order(&self) -> InOrder<'_, K> {
        InOrder {
            tree: self,
            stack: Vec::new(),
            current: self.root,
        }
    }

    /// Non-sentinel nodes breadth first, left to right.
    pub fn level_order(&self) -> LevelOrder<'_, K> {
        let mut queue = VecDeque::new();
        if !self.is_empty() {
            queue.push_back(self.root);
        }
        LevelOrder { tree: self, queue }
    }

    pub fn clear(&mut self) {
        self.nodes.retain(|index, _| index == NodeId::NIL.index);
        self.nodes[NodeId::NIL.index] = Node::sentinel();
        self.root = NodeId::NIL;
    }

    fn after_mutation(&self) {
        if !self.config.validate_after_mutation {
            return;
        }
        let report = stats::validate(self);
        if !report.is_valid() {
            warn!(%report, "red-black invariants violated");
        }
    }

    fn key(&self, id: NodeId) -> &K {
        match &self.nodes[id.index].key {
            Some(key) => key,
            None => unreachable!("the sentinel key is never read"),
        }
    }

    fn color(&self, id: NodeId) -> Color {
        self.nodes[id.index].color
    }

    fn set_color(&mut self, id: NodeId, color: Color) {
        debug_assert!(!(id.is_nil() && color.is_red()), "sentinel must stay black");
        self.nodes[id.index].color = color;
    }

    fn parent(&self, id: NodeId) -> NodeId {
        self.nodes[id.index].parent
    }

    fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        self.nodes[id.index].parent = parent;
    }

    fn left(&self, id: NodeId) -> NodeId {
        self.nodes[id.index].left
    }

    fn set_left(&mut self, id: NodeId, left: NodeId) {
        self.nodes[id.index].left = left;
    }

    fn right(&self, id: NodeId) -> NodeId {
        self.nodes[id.index].right
    }

    fn set_right(&mut self, id: NodeId, right: NodeId) {
        self.nodes[id.index].right = right;
    }

    fn child(&self, id: NodeId, side: Side) -> NodeId {
        match side {
            Side::Left => self.left(id),
            Side::Right => self.right(id),
        }
    }

    fn side_of(&self, id: NodeId) -> Side {
        if id == self.left(self.parent(id)) {
            Side::Left
        } else {
            Side::Right
        }
    }
}

impl<K: Clone> RbTree<K> {
    /// Copies the whole structure, handles included.
    ///
    /// Mutations never snapshot on their own; callers that keep a history
    /// pay for it only when they ask.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }
}

pub struct InOrder<'a, K> {
    tree: &'a RbTree<K>,
    stack: Vec<NodeId>,
    current: NodeId,
}

impl<'a, K: Ord + Debug> Iterator for InOrder<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        while !self.current.is_nil() {
            self.stack.push(self.current);
            self.current = tree.left(self.current);
        }
        let node = self.stack.pop()?;
        self.current = tree.right(node);
        Some(tree.key(node))
    }
}

pub struct LevelOrder<'a, K> {
    tree: &'a RbTree<K>,
    queue: VecDeque<NodeId>,
}

impl<'a, K: Ord + Debug> Iterator for LevelOrder<'a, K> {
    type Item = NodeRef<'a, K>;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let node = self.queue.pop_front()?;
        for child in [tree.left(node), tree.right(node)] {
            if !child.is_nil() {
                self.queue.push_back(child);
            }
        }
        Some(NodeRef::new(tree, node))
    }
}
