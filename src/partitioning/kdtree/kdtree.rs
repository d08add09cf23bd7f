use super::KdTreeError;
use crate::math::{Point, Real, DIM};
use ordered_float::OrderedFloat;

/// A point stored in a [`KdTree`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct KdTreeNode {
    pub(super) co: Point<Real>,
    pub(super) index: u32,
    pub(super) left: Option<u32>,
    pub(super) right: Option<u32>,
    /// The coordinate axis this node splits its subtree along.
    pub(super) axis: u8,
}

impl KdTreeNode {
    /// The position of this point.
    #[inline]
    pub fn co(&self) -> &Point<Real> {
        &self.co
    }

    /// The user-defined index of this point.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }
}

/// A k-d tree over 3D points, for nearest-neighbor and range searches.
///
/// Points are added with [`KdTree::insert`], then the tree must be built with
/// [`KdTree::balance`] before being queried. Each node splits its subtree at the
/// median along one coordinate axis, cycling through `x`, `y` and `z` from the
/// root down.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct KdTree {
    pub(super) nodes: Vec<KdTreeNode>,
    pub(super) capacity: usize,
    pub(super) root: Option<u32>,
}

impl KdTree {
    /// Creates an empty tree able to hold up to `capacity` points.
    pub fn new(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            capacity,
            root: None,
        }
    }

    /// Adds a point at position `co` associated to the user-defined `index`.
    ///
    /// The tree must be balanced again before it can be queried.
    pub fn insert(&mut self, index: u32, co: Point<Real>) -> Result<(), KdTreeError> {
        if self.nodes.len() >= self.capacity {
            return Err(KdTreeError::Full {
                capacity: self.capacity,
            });
        }

        self.nodes.push(KdTreeNode {
            co,
            index,
            left: None,
            right: None,
            axis: 0,
        });
        self.root = None;
        Ok(())
    }

    /// Builds the tree from the inserted points.
    pub fn balance(&mut self) {
        self.root = balance_recurse(&mut self.nodes, 0, 0);
        log::trace!("Balanced k-d tree with {} points.", self.nodes.len());
    }

    /// The number of points in this tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Does this tree contain no point?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The maximum number of points of this tree.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Can this tree be queried?
    ///
    /// This is `false` for an empty tree and for a tree with points inserted after
    /// the last call to [`KdTree::balance`].
    #[inline]
    pub fn is_balanced(&self) -> bool {
        self.root.is_some()
    }

    /// The points of this tree.
    ///
    /// Their order changes every time the tree is balanced.
    #[inline]
    pub fn nodes(&self) -> &[KdTreeNode] {
        &self.nodes
    }
}

/// Makes the median of `nodes` along `axis` the root of their subtree.
///
/// `offset` is the position of `nodes` in the whole node array.
fn balance_recurse(nodes: &mut [KdTreeNode], axis: usize, offset: u32) -> Option<u32> {
    if nodes.is_empty() {
        return None;
    }

    let median = nodes.len() / 2;
    let _ = nodes.select_nth_unstable_by_key(median, |node| OrderedFloat(node.co[axis]));

    let next_axis = (axis + 1) % DIM;
    let (left, rest) = nodes.split_at_mut(median);
    let (node, right) = rest.split_first_mut()?;
    node.axis = axis as u8;
    node.left = balance_recurse(left, next_axis, offset);
    node.right = balance_recurse(right, next_axis, offset + median as u32 + 1);

    Some(offset + median as u32)
}
