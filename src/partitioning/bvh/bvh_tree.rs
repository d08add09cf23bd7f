use super::KdopBvhError;
use crate::bounding_volume::{Kdop, KdopKind};
use crate::math::{Point, Real};
use arrayvec::ArrayVec;

/// The largest branching factor of a [`KdopBvh`].
pub const MAX_TREE_TYPE: usize = 8;

/// A node (leaf or branch) of a [`KdopBvh`].
///
/// Nodes reference each other through their index in the tree's node arena.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct KdopBvhNode {
    /// Arena indices of the children of this node. Empty for leaves.
    pub(super) children: ArrayVec<u32, MAX_TREE_TYPE>,
    /// Arena index of the parent of this node. `None` for the root and for
    /// leaves of a tree that isn't balanced yet.
    pub(super) parent: Option<u32>,
    /// The user-defined index of a leaf. Zero for branches.
    pub(super) index: u32,
    /// The axis (index into `KDOP_AXES`) the children of a branch were split along.
    pub(super) main_axis: u8,
}

impl KdopBvhNode {
    pub(super) fn leaf(index: u32) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    pub(super) fn branch(parent: Option<u32>) -> Self {
        Self {
            parent,
            ..Self::default()
        }
    }

    /// Is this node a leaf?
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Arena indices of the children of this node.
    #[inline]
    pub fn children(&self) -> &[u32] {
        &self.children
    }

    /// Arena index of the parent of this node.
    #[inline]
    pub fn parent(&self) -> Option<u32> {
        self.parent
    }

    /// The user-defined index associated to this leaf.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The index into [`KDOP_AXES`](crate::bounding_volume::KDOP_AXES) along
    /// which the children of this branch were split.
    #[inline]
    pub fn main_axis(&self) -> usize {
        self.main_axis as usize
    }
}

/// A bounding volume hierarchy with k-DOP bounding volumes.
///
/// The tree is filled with [`KdopBvh::insert`] then built once with
/// [`KdopBvh::balance`]. Its topology is fixed afterward: deforming geometry
/// is handled by updating leaf volumes with [`KdopBvh::update_node`] and
/// refitting their ancestors with [`KdopBvh::update_tree`].
///
/// All the nodes live in a single arena. The first [`KdopBvh::leaf_count`]
/// slots are the leaves in insertion order, the next slot is the root, and
/// the remaining slots are the other branches in creation order.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct KdopBvh {
    pub(super) nodes: Vec<KdopBvhNode>,
    pub(super) bvs: Vec<Kdop>,
    /// Number of children of each branch that reported during `update_tree`.
    #[cfg_attr(feature = "serde-serialize", serde(skip))]
    pub(super) refit_counts: Vec<u32>,
    pub(super) kind: KdopKind,
    pub(super) tree_type: usize,
    pub(super) epsilon: Real,
    pub(super) capacity: usize,
    pub(super) leaf_count: usize,
    pub(super) branch_count: usize,
}

impl KdopBvh {
    /// Creates an empty tree able to hold up to `capacity` leaves.
    ///
    /// Every leaf volume gets inflated by `epsilon` along each active axis of `kind`.
    /// The branching factor `tree_type` must be between 2 and [`MAX_TREE_TYPE`].
    /// The node arena is allocated upfront for the largest tree `capacity` leaves
    /// can produce.
    pub fn new(
        capacity: usize,
        epsilon: Real,
        tree_type: usize,
        kind: KdopKind,
    ) -> Result<Self, KdopBvhError> {
        if !(2..=MAX_TREE_TYPE).contains(&tree_type) {
            return Err(KdopBvhError::InvalidTreeType(tree_type));
        }

        if !(epsilon >= 0.0) {
            return Err(KdopBvhError::InvalidEpsilon);
        }

        // Every branch but the root has at least two children.
        let node_capacity = capacity
            .checked_add(capacity.saturating_sub(1).max(1))
            .filter(|n| *n <= u32::MAX as usize)
            .ok_or(KdopBvhError::AllocationFailed)?;

        let mut nodes = Vec::new();
        let mut bvs = Vec::new();
        nodes
            .try_reserve_exact(node_capacity)
            .map_err(|_| KdopBvhError::AllocationFailed)?;
        bvs.try_reserve_exact(node_capacity)
            .map_err(|_| KdopBvhError::AllocationFailed)?;

        log::debug!(
            "Created k-DOP BVH: kind {:?}, tree type {}, capacity {}, epsilon {}.",
            kind,
            tree_type,
            capacity,
            epsilon
        );

        Ok(Self {
            nodes,
            bvs,
            refit_counts: Vec::new(),
            kind,
            tree_type,
            epsilon,
            capacity,
            leaf_count: 0,
            branch_count: 0,
        })
    }

    /// Creates an empty tree, selecting the k-DOP kind from its axis count.
    ///
    /// `axis` must be one of 6, 8, 14, 18 or 26. See [`KdopBvh::new`] for the other arguments.
    pub fn with_axis_count(
        capacity: usize,
        epsilon: Real,
        tree_type: usize,
        axis: u32,
    ) -> Result<Self, KdopBvhError> {
        let kind =
            KdopKind::from_axis_count(axis).ok_or(KdopBvhError::UnsupportedAxisCount(axis))?;
        Self::new(capacity, epsilon, tree_type, kind)
    }

    /// Adds a leaf bounding all the given `points`, associated to the user-defined `index`.
    ///
    /// Leaves can only be inserted before the tree is balanced, and up to its capacity.
    /// The tree is left unchanged if an error is returned.
    pub fn insert(&mut self, index: u32, points: &[Point<Real>]) -> Result<(), KdopBvhError> {
        if self.branch_count > 0 {
            return Err(KdopBvhError::AlreadyBalanced);
        }

        if self.leaf_count >= self.capacity {
            return Err(KdopBvhError::Full {
                capacity: self.capacity,
            });
        }

        if points.is_empty() {
            return Err(KdopBvhError::EmptyPointSet);
        }

        let mut bv = Kdop::unbounded();
        bv.create_hull(self.kind, points, false);
        bv.loosen_axes(self.kind, self.epsilon);

        self.nodes.push(KdopBvhNode::leaf(index));
        self.bvs.push(bv);
        self.leaf_count += 1;
        Ok(())
    }

    /// The margin leaf volumes are inflated by.
    #[inline]
    pub fn epsilon(&self) -> Real {
        self.epsilon
    }

    /// The k-DOP configuration of the volumes of this tree.
    #[inline]
    pub fn kind(&self) -> KdopKind {
        self.kind
    }

    /// The maximum number of children of each branch.
    #[inline]
    pub fn tree_type(&self) -> usize {
        self.tree_type
    }

    /// The maximum number of leaves of this tree.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of leaves inserted so far.
    #[inline]
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// The number of branches (including the root) created by [`KdopBvh::balance`].
    #[inline]
    pub fn branch_count(&self) -> usize {
        self.branch_count
    }

    /// Does this tree contain no leaf?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.leaf_count == 0
    }

    /// Has [`KdopBvh::balance`] built the branches of this tree?
    #[inline]
    pub fn is_balanced(&self) -> bool {
        self.branch_count > 0
    }

    /// The arena index of the root node, if the tree is balanced.
    #[inline]
    pub fn root(&self) -> Option<u32> {
        self.is_balanced().then_some(self.leaf_count as u32)
    }

    /// The node at the given arena index.
    #[inline]
    pub fn node(&self, id: u32) -> Option<&KdopBvhNode> {
        self.nodes.get(id as usize)
    }

    /// The bounding volume of the node at the given arena index.
    #[inline]
    pub fn volume(&self, id: u32) -> Option<&Kdop> {
        self.bvs.get(id as usize)
    }

    /// The bounding volume of the leaf inserted at position `slot`.
    #[inline]
    pub fn leaf_volume(&self, slot: usize) -> Option<&Kdop> {
        self.bvs[..self.leaf_count].get(slot)
    }

    /// The bounding volume of the root, if the tree is balanced.
    #[inline]
    pub fn root_volume(&self) -> Option<&Kdop> {
        self.root().map(|root| &self.bvs[root as usize])
    }

    /// Allocates a new branch and links it to `parent`.
    pub(super) fn push_branch(&mut self, parent: Option<u32>) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(KdopBvhNode::branch(parent));
        self.bvs.push(Kdop::new_invalid(self.kind));
        self.branch_count += 1;

        if let Some(parent) = parent {
            self.nodes[parent as usize].children.push(id);
        }

        id
    }

    /// Sets the volume of the branch `id` to the union of the volumes of `nodes`.
    pub(super) fn refit_from(&mut self, id: u32, nodes: &[u32]) {
        let mut bv = Kdop::new_invalid(self.kind);
        for node in nodes {
            bv.merge_axes(self.kind, &self.bvs[*node as usize]);
        }
        self.bvs[id as usize] = bv;
    }
}
