use super::{KdopBvh, KdopBvhError};
use crate::bounding_volume::Kdop;
use crate::math::{Point, Real};

impl KdopBvh {
    /// Recomputes the volume of the leaf inserted at position `leaf` from new point data.
    ///
    /// If `moving` is provided, the volume also encloses these points, making it
    /// the swept volume of a motion from `points` to `moving`. The volume is inflated
    /// by [`KdopBvh::epsilon`].
    ///
    /// The ancestors of the leaf are not updated: call [`KdopBvh::update_tree`] once
    /// all the leaves are up to date.
    pub fn update_node(
        &mut self,
        leaf: usize,
        points: &[Point<Real>],
        moving: Option<&[Point<Real>]>,
    ) -> Result<(), KdopBvhError> {
        if leaf >= self.leaf_count {
            return Err(KdopBvhError::LeafOutOfBounds {
                leaf,
                leaf_count: self.leaf_count,
            });
        }

        if points.is_empty() {
            return Err(KdopBvhError::EmptyPointSet);
        }

        let bv = &mut self.bvs[leaf];
        bv.create_hull(self.kind, points, false);
        if let Some(moving) = moving {
            bv.create_hull(self.kind, moving, true);
        }
        bv.loosen_axes(self.kind, self.epsilon);
        Ok(())
    }

    /// Refits the volume of every branch to the union of the volumes of its children.
    ///
    /// This is a single bottom-up pass over all the leaves: a branch is refitted
    /// once all of its children have been reached, so each branch is refitted
    /// exactly once no matter how many leaves changed.
    ///
    /// # Example
    ///
    /// ```
    /// # #[cfg(feature = "f32")] {
    /// use kdop3d::bounding_volume::KdopKind;
    /// use kdop3d::partitioning::KdopBvh;
    /// use kdop3d::na::Point3;
    ///
    /// let mut bvh = KdopBvh::new(10, 0.0, 2, KdopKind::Aabb8).unwrap();
    /// for i in 0..10 {
    ///     bvh.insert(i, &[Point3::new(i as f32, 0.0, 0.0)]).unwrap();
    /// }
    /// bvh.balance();
    ///
    /// // Move the last leaf far away.
    /// bvh.update_node(9, &[Point3::new(100.0, 0.0, 0.0)], None).unwrap();
    /// bvh.update_tree();
    /// assert_eq!(bvh.root_volume().unwrap().max(0), 100.0);
    /// # }
    /// ```
    pub fn update_tree(&mut self) {
        if !self.is_balanced() {
            return;
        }

        self.refit_counts.clear();
        self.refit_counts.resize(self.nodes.len(), 0);

        for leaf in 0..self.leaf_count {
            let mut parent = self.nodes[leaf].parent;

            while let Some(id) = parent {
                let id = id as usize;
                self.refit_counts[id] += 1;

                if self.refit_counts[id] as usize != self.nodes[id].children.len() {
                    break;
                }

                self.refit_node(id);
                parent = self.nodes[id].parent;
            }
        }

        log::trace!("Refitted {} k-DOP BVH branches.", self.branch_count);
    }

    fn refit_node(&mut self, id: usize) {
        let mut bv = Kdop::new_invalid(self.kind);
        for child in &self.nodes[id].children {
            bv.merge_axes(self.kind, &self.bvs[*child as usize]);
        }
        self.bvs[id] = bv;
    }
}
