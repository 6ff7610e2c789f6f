//! Configuration for a red-black tree instance.

/// How `insert` treats a key equal to one already in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Multiset behavior: equal keys are placed in the right subtree.
    #[default]
    Allow,
    /// Set behavior: the second insert fails with `DuplicateKey`.
    Reject,
}

/// Configuration for an [`RbTree`](super::RbTree).
#[derive(Debug, Clone)]
pub struct RbTreeConfig {
    /// Duplicate key handling (default: allow).
    pub duplicates: DuplicatePolicy,

    /// Number of nodes to preallocate in the arena (default: 0).
    pub initial_capacity: usize,

    /// Run full validation after every successful mutation and log any
    /// violation at `warn` level (default: false).
    pub validate_after_mutation: bool,
}

impl Default for RbTreeConfig {
    fn default() -> Self {
        Self {
            duplicates: DuplicatePolicy::Allow,
            initial_capacity: 0,
            validate_after_mutation: false,
        }
    }
}

impl RbTreeConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the duplicate key policy.
    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Sets the number of nodes to preallocate.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Enables or disables validation after each mutation.
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate_after_mutation = enabled;
        self
    }

    /// Configuration for strict-set semantics.
    pub fn unique_keys() -> Self {
        Self::default().with_duplicates(DuplicatePolicy::Reject)
    }
}

#[cfg(test)]
mod test {
    use super::{DuplicatePolicy, RbTreeConfig};

    #[test]
    fn defaults_allow_duplicates_without_validation() {
        let config = RbTreeConfig::new();
        assert_eq!(config.duplicates, DuplicatePolicy::Allow);
        assert_eq!(config.initial_capacity, 0);
        assert!(!config.validate_after_mutation);
    }

    #[test]
    fn builder_methods_chain() {
        let config = RbTreeConfig::unique_keys()
            .with_initial_capacity(64)
            .with_validation(true);
        assert_eq!(config.duplicates, DuplicatePolicy::Reject);
        assert_eq!(config.initial_capacity, 64);
        assert!(config.validate_after_mutation);
    }
}
