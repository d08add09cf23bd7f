/// Errors that can occur while filling a [`KdTree`](super::KdTree).
#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum KdTreeError {
    /// The tree already contains as many points as it was created for.
    #[error("the k-d tree is full (capacity: {capacity})")]
    Full {
        /// The maximum number of points of the tree.
        capacity: usize,
    },
}
