//! Spatial partitioning tools.

pub use self::bvh::{
    KdopBvh, KdopBvhError, KdopBvhNearest, KdopBvhNode, KdopBvhOverlap, KdopBvhRayHit,
    MAX_TREE_TYPE,
};
pub use self::kdtree::{KdTree, KdTreeError, KdTreeNearest, KdTreeNode};

mod bvh;
mod kdtree;
