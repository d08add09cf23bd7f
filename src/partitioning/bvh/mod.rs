pub use bvh_error::KdopBvhError;
pub use bvh_queries::{KdopBvhNearest, KdopBvhRayHit};
pub use bvh_traverse_bvtt::KdopBvhOverlap;
pub use bvh_tree::{KdopBvh, KdopBvhNode, MAX_TREE_TYPE};

mod bvh_build;
mod bvh_error;
mod bvh_queries;
mod bvh_refit;
mod bvh_traverse_bvtt;
mod bvh_tree;
mod bvh_validation;
