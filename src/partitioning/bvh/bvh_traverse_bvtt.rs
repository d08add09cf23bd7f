use super::KdopBvh;
use core::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A pair of leaves with intersecting bounding volumes, found by [`KdopBvh::overlap`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct KdopBvhOverlap {
    /// The user-defined index of the leaf from the first tree.
    pub index1: u32,
    /// The user-defined index of the leaf from the second tree.
    pub index2: u32,
}

struct OverlapTraversal<'a, F> {
    tree1: &'a KdopBvh,
    tree2: &'a KdopBvh,
    axes: Range<usize>,
    same_tree: bool,
    filter: &'a F,
}

impl<F: Fn(u32, u32) -> bool> OverlapTraversal<'_, F> {
    fn traverse(&self, id1: u32, id2: u32, out: &mut Vec<KdopBvhOverlap>) {
        let bv1 = &self.tree1.bvs[id1 as usize];
        let bv2 = &self.tree2.bvs[id2 as usize];

        if !bv1.intersects_axes(bv2, self.axes.clone()) {
            return;
        }

        let node1 = &self.tree1.nodes[id1 as usize];
        let node2 = &self.tree2.nodes[id2 as usize];

        if !node1.is_leaf() {
            for child in &node1.children {
                self.traverse(*child, id2, out);
            }
        } else if !node2.is_leaf() {
            for child in &node2.children {
                self.traverse(id1, *child, out);
            }
        } else if !(self.same_tree && id1 == id2) && (self.filter)(node1.index, node2.index) {
            out.push(KdopBvhOverlap {
                index1: node1.index,
                index2: node2.index,
            });
        }
    }
}

impl KdopBvh {
    /*
     * Traversal of the Bounding Volume Test Tree of two trees.
     */
    /// Finds all the pairs of leaves of `self` and `other` with intersecting volumes.
    ///
    /// The volumes are compared along the axes both k-DOP kinds have in common.
    /// Trees with incomparable kinds (see [`KdopKind::common_axis_range`](crate::bounding_volume::KdopKind::common_axis_range))
    /// and trees that aren't balanced have no overlap.
    ///
    /// If `other` is `self`, a leaf isn't reported as overlapping itself, but every other
    /// pair is reported in both orders.
    ///
    /// With the `parallel` feature, the subtrees of the children of `self`'s root are
    /// traversed in parallel. The pairs are grouped by these subtrees, in child order.
    pub fn overlap(&self, other: &KdopBvh) -> Vec<KdopBvhOverlap> {
        self.overlap_with(other, |_, _| true)
    }

    /// Same as [`KdopBvh::overlap`] but only reports the pairs of user-defined
    /// indices for which `filter` returns `true`.
    pub fn overlap_with<F>(&self, other: &KdopBvh, filter: F) -> Vec<KdopBvhOverlap>
    where
        F: Fn(u32, u32) -> bool + Sync,
    {
        let Some(axes) = self.kind.common_axis_range(other.kind) else {
            log::debug!(
                "Cannot compute the overlap of k-DOP BVHs of kinds {:?} and {:?}.",
                self.kind,
                other.kind
            );
            return Vec::new();
        };

        let (Some(root1), Some(root2)) = (self.root(), other.root()) else {
            return Vec::new();
        };

        if !self.bvs[root1 as usize].intersects_axes(&other.bvs[root2 as usize], axes.clone()) {
            log::trace!("Disjoint k-DOP BVH roots.");
            return Vec::new();
        }

        let traversal = OverlapTraversal {
            tree1: self,
            tree2: other,
            axes,
            same_tree: core::ptr::eq(self, other),
            filter: &filter,
        };
        let buffer_len = self.leaf_count.max(other.leaf_count);
        let traverse_child = |child: &u32| {
            let mut pairs = Vec::with_capacity(buffer_len);
            traversal.traverse(*child, root2, &mut pairs);
            pairs
        };
        let children = self.nodes[root1 as usize].children.as_slice();

        #[cfg(feature = "parallel")]
        let chunks: Vec<Vec<KdopBvhOverlap>> = children.par_iter().map(traverse_child).collect();
        #[cfg(not(feature = "parallel"))]
        let chunks: Vec<Vec<KdopBvhOverlap>> = children.iter().map(traverse_child).collect();

        let result = chunks.concat();
        log::trace!("Found {} overlapping k-DOP BVH leaf pairs.", result.len());
        result
    }
}
