//! Read-only statistics and red-black invariant checks.
//!
//! Everything here walks the tree through [`NodeRef`] cursors with an
//! explicit stack and never mutates it.

use std::fmt::{self, Debug};

use thiserror::Error;

use super::{Color, NodeRef, RbTree, Side};

/// A broken red-black or search-tree property found by [`validate`].
///
/// Keys are rendered with their `Debug` form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("root {key} is not black")]
    RedRoot { key: String },

    #[error("sentinel is not black")]
    RedSentinel,

    #[error("red node {parent} has red {side} child {child}")]
    RedChild {
        parent: String,
        child: String,
        side: Side,
    },

    #[error("path to leaf has black height {actual}, expected {expected}")]
    BlackHeight { actual: usize, expected: usize },

    #[error("node {child} does not point back to its parent {parent}")]
    ParentLink { parent: String, child: String },

    #[error("root {key} has a parent")]
    RootParent { key: String },

    #[error("key {key} is out of order under its ancestors")]
    Ordering { key: String },
}

/// Outcome of [`validate`]: every violation found, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }

    pub fn into_parts(self) -> (bool, Vec<String>) {
        (self.is_valid(), self.messages())
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "all red-black properties are satisfied");
        }
        write!(f, "violations found: {}", self.messages().join("; "))
    }
}

/// Summary bundle handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub height: usize,
    pub black_height: usize,
    pub is_valid: bool,
    pub violations: Vec<String>,
}

/// Number of non-sentinel nodes, counted by traversal.
pub fn count<K: Ord + Debug>(tree: &RbTree<K>) -> usize {
    let mut total = 0;
    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        if node.is_sentinel() {
            continue;
        }
        total += 1;
        stack.push(node.left());
        stack.push(node.right());
    }
    total
}

/// Edges on the longest downward path from the root to a real node.
///
/// Both the empty tree and a lone root have height 0.
pub fn height<K: Ord + Debug>(tree: &RbTree<K>) -> usize {
    let mut deepest = 0;
    let mut stack = vec![(tree.root(), 0)];
    while let Some((node, depth)) = stack.pop() {
        if node.is_sentinel() {
            continue;
        }
        deepest = deepest.max(depth);
        stack.push((node.left(), depth + 1));
        stack.push((node.right(), depth + 1));
    }
    deepest
}

/// Black nodes on the leftmost path, root included, sentinel excluded.
pub fn black_height<K: Ord + Debug>(tree: &RbTree<K>) -> usize {
    let mut blacks = 0;
    let mut node = tree.root();
    while !node.is_sentinel() {
        if node.color().is_black() {
            blacks += 1;
        }
        node = node.left();
    }
    blacks
}

/// Checks every red-black property plus parent links and key order.
pub fn validate<K: Ord + Debug>(tree: &RbTree<K>) -> ValidationReport {
    let mut violations = Vec::new();

    let sentinel = tree.node(tree.sentinel());
    if sentinel.is_some_and(|nil| nil.color() != Color::Black) {
        violations.push(Violation::RedSentinel);
    }

    let root = tree.root();
    if root.is_sentinel() {
        return ValidationReport { violations };
    }
    if root.color() != Color::Black {
        violations.push(Violation::RedRoot {
            key: render(root),
        });
    }
    if !root.parent().is_sentinel() {
        violations.push(Violation::RootParent {
            key: render(root),
        });
    }

    check_colors_and_links(root, &mut violations);
    check_black_heights(root, black_height(tree), &mut violations);
    check_ordering(root, &mut violations);

    ValidationReport { violations }
}

pub fn statistics<K: Ord + Debug>(tree: &RbTree<K>) -> TreeStats {
    let (is_valid, violations) = validate(tree).into_parts();
    TreeStats {
        total_nodes: count(tree),
        height: height(tree),
        black_height: black_height(tree),
        is_valid,
        violations,
    }
}

fn render<K: Debug>(node: NodeRef<'_, K>) -> String {
    match node.key() {
        Some(key) => format!("{key:?}"),
        None => "NIL".to_string(),
    }
}

fn check_colors_and_links<K: Debug>(root: NodeRef<'_, K>, violations: &mut Vec<Violation>) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        for side in [Side::Left, Side::Right] {
            let child = node.child(side);
            if child.is_sentinel() {
                continue;
            }
            if node.color().is_red() && child.color().is_red() {
                violations.push(Violation::RedChild {
                    parent: render(node),
                    child: render(child),
                    side,
                });
            }
            if child.parent() != node {
                violations.push(Violation::ParentLink {
                    parent: render(node),
                    child: render(child),
                });
            }
            stack.push(child);
        }
    }
}

fn check_black_heights<K>(root: NodeRef<'_, K>, expected: usize, violations: &mut Vec<Violation>) {
    let mut stack = vec![(root, 0)];
    while let Some((node, above)) = stack.pop() {
        if node.is_sentinel() {
            if above != expected {
                violations.push(Violation::BlackHeight {
                    actual: above,
                    expected,
                });
            }
            continue;
        }
        let blacks = above + usize::from(node.color().is_black());
        stack.push((node.right(), blacks));
        stack.push((node.left(), blacks));
    }
}

/// Every key must sit between the keys of the ancestors it hangs under.
///
/// Bounds are inclusive on both sides: rotations can lift an equal key
/// above its duplicate, so equal keys may end up in either subtree.
fn check_ordering<K: Ord + Debug>(root: NodeRef<'_, K>, violations: &mut Vec<Violation>) {
    let mut stack: Vec<(NodeRef<'_, K>, Option<&K>, Option<&K>)> = vec![(root, None, None)];
    while let Some((node, lower, upper)) = stack.pop() {
        let Some(key) = node.key() else {
            continue;
        };
        let above_lower = lower.is_none_or(|lower| key >= lower);
        let below_upper = upper.is_none_or(|upper| key <= upper);
        if !above_lower || !below_upper {
            violations.push(Violation::Ordering { key: render(node) });
        }
        stack.push((node.right(), Some(key), upper));
        stack.push((node.left(), lower, Some(key)));
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::super::node::NodeId;
    use super::super::{Color, RbTree};
    use super::{black_height, count, height, statistics, validate, Violation};

    fn tree_of(keys: &[i32]) -> RbTree<i32> {
        let mut tree = RbTree::new();
        for &key in keys {
            tree.insert(key).unwrap();
        }
        tree
    }

    fn id_of(tree: &RbTree<i32>, key: i32) -> NodeId {
        tree.search(&key).unwrap().id()
    }

    #[test]
    fn empty_tree_statistics() {
        let tree: RbTree<i32> = RbTree::new();
        assert_eq!(count(&tree), 0);
        assert_eq!(height(&tree), 0);
        assert_eq!(black_height(&tree), 0);
        let report = validate(&tree);
        assert!(report.is_valid());
        assert_eq!(report.to_string(), "all red-black properties are satisfied");
        assert_eq!(report.into_parts(), (true, Vec::new()));
    }

    #[test]
    fn single_node_statistics() {
        let tree = tree_of(&[10]);
        assert_eq!(count(&tree), 1);
        assert_eq!(height(&tree), 0);
        assert_eq!(black_height(&tree), 1);
    }

    #[test]
    fn statistics_after_recoloring() {
        let tree = tree_of(&[10, 20, 5, 15]);
        let stats = statistics(&tree);
        assert_eq!(stats.total_nodes, 4);
        assert_eq!(stats.height, 2);
        assert_eq!(stats.black_height, 2);
        assert!(stats.is_valid);
        assert!(stats.violations.is_empty());
    }

    #[test]
    fn validation_is_repeatable() {
        let tree = tree_of(&[10, 20, 5, 15, 25, 30, 1, 7]);
        assert_eq!(validate(&tree), validate(&tree));
        assert!(validate(&tree).is_valid());
    }

    #[test]
    fn detects_red_root() {
        let mut tree = tree_of(&[10, 5]);
        let root = id_of(&tree, 10);
        tree.nodes[root.index].color = Color::Red;

        let report = validate(&tree);
        assert!(!report.is_valid());
        assert!(report
            .violations()
            .contains(&Violation::RedRoot { key: "10".to_string() }));
        // 10 -> 5 is now red-red as well
        assert!(report.violations().iter().any(|v| matches!(v, Violation::RedChild { .. })));
    }

    #[test]
    fn detects_red_red_and_black_height_together() {
        let mut tree = tree_of(&[10, 5, 20, 1]);
        // 5 and 20 are black, 1 is red under 5; the expected black height
        // comes from the leftmost path 10, 5, 1
        let five = id_of(&tree, 5);
        tree.nodes[five.index].color = Color::Red;

        let (is_valid, messages) = validate(&tree).into_parts();
        assert!(!is_valid);
        assert!(messages.contains(&"red node 5 has red left child 1".to_string()));
        assert!(messages
            .iter()
            .any(|m| m == "path to leaf has black height 2, expected 1"));
        assert!(messages.len() >= 2);
    }

    #[test]
    fn reports_every_short_path() {
        let mut tree = tree_of(&[10, 5, 20]);
        let twenty = id_of(&tree, 20);
        tree.nodes[twenty.index].color = Color::Black;
        let five = id_of(&tree, 5);
        tree.nodes[five.index].color = Color::Black;
        assert!(validate(&tree).is_valid());

        tree.nodes[five.index].color = Color::Red;
        let report = validate(&tree);
        // the leftmost path now counts one black, so both leaves under 20
        // disagree with it
        let short_paths = report
            .violations()
            .iter()
            .filter(|v| matches!(v, Violation::BlackHeight { .. }))
            .count();
        assert_eq!(short_paths, 2);
    }

    #[test]
    fn detects_red_sentinel() {
        let mut tree = tree_of(&[1]);
        tree.nodes[NodeId::NIL.index].color = Color::Red;
        assert!(validate(&tree)
            .violations()
            .contains(&Violation::RedSentinel));
    }

    #[test]
    fn detects_out_of_order_keys() {
        let mut tree = tree_of(&[10, 5, 20]);
        let five = id_of(&tree, 5);
        tree.nodes[five.index].key = Some(15);

        let report = validate(&tree);
        assert_eq!(
            report.violations(),
            &[Violation::Ordering { key: "15".to_string() }]
        );
        assert_eq!(
            report.to_string(),
            "violations found: key 15 is out of order under its ancestors"
        );
    }

    #[test]
    fn detects_broken_parent_link() {
        let mut tree = tree_of(&[10, 5, 20]);
        let five = id_of(&tree, 5);
        let twenty = id_of(&tree, 20);
        tree.nodes[five.index].parent = twenty;

        let report = validate(&tree);
        assert_eq!(
            report.violations(),
            &[Violation::ParentLink {
                parent: "10".to_string(),
                child: "5".to_string(),
            }]
        );
    }

    proptest! {
        #[test]
        fn inserts_keep_every_invariant(keys in proptest::collection::vec(-500i32..500, 0..300)) {
            let tree = tree_of(&keys);
            let report = validate(&tree);
            prop_assert!(report.is_valid(), "{}", report);

            let mut sorted = keys.clone();
            sorted.sort();
            prop_assert_eq!(tree.in_order().copied().collect::<Vec<_>>(), sorted);
            prop_assert_eq!(count(&tree), keys.len());

            let bound = 2.0 * ((keys.len() + 1) as f64).log2();
            prop_assert!(height(&tree) as f64 <= bound);

            for key in &keys {
                prop_assert_eq!(tree.search(key).and_then(|node| node.key()), Some(key));
            }
        }

        #[test]
        fn deletes_keep_every_invariant(
            keys in proptest::collection::vec(0i32..100, 1..200),
            removals in proptest::collection::vec(0i32..120, 0..200),
        ) {
            let mut tree = tree_of(&keys);
            let mut expected = keys.clone();
            expected.sort();

            for key in removals {
                let result = tree.delete_node(&key);
                match expected.binary_search(&key) {
                    Ok(at) => {
                        prop_assert_eq!(result, Ok(key));
                        expected.remove(at);
                    }
                    Err(_) => prop_assert!(result.is_err()),
                }
                let report = validate(&tree);
                prop_assert!(report.is_valid(), "{}", report);
                prop_assert_eq!(tree.contains(&key), expected.binary_search(&key).is_ok());
            }
            prop_assert_eq!(tree.in_order().copied().collect::<Vec<_>>(), expected);
        }
    }
}
