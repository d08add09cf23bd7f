use super::{KdTree, KdTreeNode};
use crate::math::{Point, Real, Vector};
use ordered_float::OrderedFloat;
use smallvec::SmallVec;

const STACK_SIZE: usize = 64;

/// Squared distances to points facing away from the query normal are scaled by this factor.
const NORMAL_PENALTY: Real = 10.0;

type NodeStack = SmallVec<[u32; STACK_SIZE]>;

/// A point found by a [`KdTree`] search.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct KdTreeNearest {
    /// The user-defined index of the point.
    pub index: u32,
    /// The (possibly weighted) distance between the query point and this point.
    pub dist: Real,
    /// The position of the point.
    pub co: Point<Real>,
}

/// Squared distance from `co` to `node_co`, penalized if `node_co` is behind `co` along `nor`.
#[inline]
fn weighted_distance_squared(
    node_co: &Point<Real>,
    co: &Point<Real>,
    nor: Option<&Vector<Real>>,
) -> Real {
    let d = node_co - co;
    let dist_sq = d.norm_squared();

    match nor {
        Some(nor) if d.dot(nor) < 0.0 => dist_sq * NORMAL_PENALTY,
        _ => dist_sq,
    }
}

/// Inserts `found` into the sorted `nearest`, keeping at most `n` elements.
fn add_nearest(nearest: &mut Vec<KdTreeNearest>, n: usize, found: KdTreeNearest) {
    if nearest.len() == n {
        let _ = nearest.pop();
    }

    let pos = nearest.partition_point(|e| e.dist <= found.dist);
    nearest.insert(pos, found);
}

impl KdTree {
    fn queried_root(&self) -> Option<u32> {
        debug_assert!(
            self.is_empty() || self.is_balanced(),
            "The k-d tree must be balanced before being queried."
        );
        self.root
    }

    /// Pushes the children of `node`, with the one on the side of `co` on top.
    fn push_children(node: &KdTreeNode, co: &Point<Real>, stack: &mut NodeStack) {
        let axis = node.axis as usize;
        let (near, far) = if co[axis] < node.co[axis] {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };
        stack.extend(far);
        stack.extend(near);
    }

    /// Finds the point closest to `co`.
    ///
    /// If a normal `nor` is given, the squared distance to points located behind
    /// `co` (i.e. `(point - co).dot(nor) < 0`) is multiplied by 10, which favors
    /// points in front of `co`.
    ///
    /// Returns `None` if the tree is empty.
    pub fn find_nearest(
        &self,
        co: &Point<Real>,
        nor: Option<&Vector<Real>>,
    ) -> Option<KdTreeNearest> {
        let root = &self.nodes[self.queried_root()? as usize];
        let mut min_node = root;
        let mut min_dist = weighted_distance_squared(&root.co, co, nor);
        let mut stack = NodeStack::new();
        Self::push_children(root, co, &mut stack);

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id as usize];
            let axis = node.axis as usize;
            let plane_dist = node.co[axis] - co[axis];

            // Subtrees beyond the splitting plane are only explored if that
            // plane is closer than the best point.
            let (near, far) = if plane_dist < 0.0 {
                (node.right, node.left)
            } else {
                (node.left, node.right)
            };

            if plane_dist * plane_dist < min_dist {
                let dist = weighted_distance_squared(&node.co, co, nor);
                if dist < min_dist {
                    min_dist = dist;
                    min_node = node;
                }
                stack.extend(far);
            }
            stack.extend(near);
        }

        Some(KdTreeNearest {
            index: min_node.index,
            dist: min_dist.sqrt(),
            co: min_node.co,
        })
    }

    /// Finds the `n` points closest to `co`, sorted by increasing distance.
    ///
    /// See [`KdTree::find_nearest`] for the meaning of `nor`. Fewer than `n` points
    /// are returned if the tree doesn’t contain enough points.
    pub fn find_n_nearest(
        &self,
        n: usize,
        co: &Point<Real>,
        nor: Option<&Vector<Real>>,
    ) -> Vec<KdTreeNearest> {
        let mut nearest = Vec::with_capacity(n.min(self.len()));
        let Some(root) = self.queried_root() else {
            return nearest;
        };

        if n == 0 {
            return nearest;
        }

        // Distances are squared until the end of the search.
        let found = |node: &KdTreeNode, dist_sq: Real, nearest: &mut Vec<KdTreeNearest>| {
            add_nearest(
                nearest,
                n,
                KdTreeNearest {
                    index: node.index,
                    dist: dist_sq,
                    co: node.co,
                },
            )
        };

        let root = &self.nodes[root as usize];
        found(root, weighted_distance_squared(&root.co, co, nor), &mut nearest);
        let mut stack = NodeStack::new();
        Self::push_children(root, co, &mut stack);

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id as usize];
            let axis = node.axis as usize;
            let plane_dist = node.co[axis] - co[axis];
            let (near, far) = if plane_dist < 0.0 {
                (node.right, node.left)
            } else {
                (node.left, node.right)
            };
            let worst = |nearest: &Vec<KdTreeNearest>| {
                if nearest.len() < n {
                    Real::MAX
                } else {
                    nearest[nearest.len() - 1].dist
                }
            };

            if plane_dist * plane_dist < worst(&nearest) {
                let dist_sq = weighted_distance_squared(&node.co, co, nor);
                if dist_sq < worst(&nearest) {
                    found(node, dist_sq, &mut nearest);
                }
                stack.extend(far);
            }
            stack.extend(near);
        }

        for result in &mut nearest {
            result.dist = result.dist.sqrt();
        }

        nearest
    }

    /// Finds all the points within `range` of `co`, sorted by increasing distance.
    ///
    /// See [`KdTree::find_nearest`] for the meaning of `nor`. A point is found if
    /// its weighted squared distance is smaller than or equal to `range²`.
    pub fn range_search(
        &self,
        co: &Point<Real>,
        nor: Option<&Vector<Real>>,
        range: Real,
    ) -> Vec<KdTreeNearest> {
        let mut result = Vec::new();
        let Some(root) = self.queried_root() else {
            return result;
        };

        let range_sq = range * range;
        let mut stack = NodeStack::new();
        stack.push(root);

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id as usize];
            let axis = node.axis as usize;

            if co[axis] + range < node.co[axis] {
                stack.extend(node.left);
            } else if co[axis] - range > node.co[axis] {
                stack.extend(node.right);
            } else {
                let dist_sq = weighted_distance_squared(&node.co, co, nor);
                if dist_sq <= range_sq {
                    result.push(KdTreeNearest {
                        index: node.index,
                        dist: dist_sq.sqrt(),
                        co: node.co,
                    });
                }
                stack.extend(node.left);
                stack.extend(node.right);
            }
        }

        result.sort_by_key(|found| OrderedFloat(found.dist));
        log::trace!("k-d tree range search found {} points.", result.len());
        result
    }
}
