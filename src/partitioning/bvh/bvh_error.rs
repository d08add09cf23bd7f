/// Errors that can occur while creating or filling a [`KdopBvh`](super::KdopBvh).
#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum KdopBvhError {
    /// The branching factor must be between 2 and 8 (inclusive).
    #[error("invalid tree type {0}: the branching factor must be between 2 and 8")]
    InvalidTreeType(usize),
    /// The axis count does not match any supported k-DOP configuration.
    #[error("unsupported k-DOP axis count {0}: expected one of 6, 8, 14, 18 or 26")]
    UnsupportedAxisCount(u32),
    /// The inflation margin must be a non-negative number.
    #[error("the epsilon margin must be a non-negative number")]
    InvalidEpsilon,
    /// The node arena could not be allocated.
    #[error("failed to allocate the tree nodes")]
    AllocationFailed,
    /// Leaves can no longer be inserted once the tree is balanced.
    #[error("the tree is already balanced")]
    AlreadyBalanced,
    /// The tree already contains as many leaves as it was created for.
    #[error("the tree is full (capacity: {capacity})")]
    Full {
        /// The maximum number of leaves of the tree.
        capacity: usize,
    },
    /// A leaf volume must enclose at least one point.
    #[error("cannot compute the bounding volume of an empty point set")]
    EmptyPointSet,
    /// The leaf slot does not exist.
    #[error("leaf slot {leaf} is out of bounds (leaf count: {leaf_count})")]
    LeafOutOfBounds {
        /// The requested leaf slot.
        leaf: usize,
        /// The number of leaves of the tree.
        leaf_count: usize,
    },
}
