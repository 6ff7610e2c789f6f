//! Arena-backed red-black tree with an invariant checker.

pub mod data_structures;

pub use data_structures::rbtree::stats::{
    black_height, count, height, statistics, validate, TreeStats, ValidationReport, Violation,
};
pub use data_structures::rbtree::{
    Color, DuplicatePolicy, NodeId, NodeRef, RbTree, RbTreeConfig, RbTreeError, RbTreeResult, Side,
};
