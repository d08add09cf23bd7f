pub use kdtree::{KdTree, KdTreeNode};
pub use kdtree_error::KdTreeError;
pub use kdtree_queries::KdTreeNearest;

mod kdtree;
mod kdtree_error;
mod kdtree_queries;
