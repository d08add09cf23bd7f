use super::KdopBvh;
use crate::bounding_volume::kdop_axis;
use crate::math::{Point, Real, Vector};
use crate::query::Ray;
use smallvec::SmallVec;

const TRAVERSAL_STACK_SIZE: usize = 32;

/// The closest leaf hit by a ray, found by [`KdopBvh::cast_ray`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct KdopBvhRayHit {
    /// The user-defined index of the leaf.
    pub index: u32,
    /// The time of impact, in multiples of the ray direction.
    pub dist: Real,
    /// The point of the ray at the time of impact.
    pub point: Point<Real>,
}

/// The leaf closest to a point, found by [`KdopBvh::find_nearest`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct KdopBvhNearest {
    /// The user-defined index of the leaf.
    pub index: u32,
    /// The squared distance between the query point and `point`.
    pub dist_sq: Real,
    /// The closest point of the leaf.
    pub point: Point<Real>,
}

impl KdopBvh {
    /// Casts a ray (thickened by `radius`) on the leaves of this tree.
    ///
    /// The subtrees are visited depth-first, front-to-back, and skipped when their
    /// volume is hit after the best hit found so far. The `primitive_check` closure
    /// is given the index of each leaf whose volume is hit along with the best time of
    /// impact found so far, and returns the time of impact of the ray with the actual
    /// geometry of that leaf. Only hits before `max_dist` are reported.
    pub fn cast_ray(
        &self,
        ray: &Ray,
        radius: Real,
        max_dist: Real,
        mut primitive_check: impl FnMut(u32, Real) -> Option<Real>,
    ) -> Option<KdopBvhRayHit> {
        self.traverse_ray(ray, radius, max_dist, |index, _, best| {
            primitive_check(index, best)
        })
    }

    /// Casts a ray (thickened by `radius`) on the leaf volumes of this tree.
    ///
    /// Returns the leaf whose volume is hit first, if any is hit before `max_dist`.
    pub fn cast_ray_bounds(&self, ray: &Ray, radius: Real, max_dist: Real) -> Option<KdopBvhRayHit> {
        self.traverse_ray(ray, radius, max_dist, |_, entry, _| Some(entry))
    }

    /// Reports every leaf whose volume is hit by a ray (thickened by `radius`) before `max_dist`.
    ///
    /// Unlike [`KdopBvh::cast_ray`], no subtree is skipped because of a previous hit:
    /// this is meant for tests counting all the crossings of a ray, e.g. to decide
    /// if a point lies inside of a closed mesh. The `callback` is given the index of
    /// each such leaf and the time of impact of the ray with its volume, with the
    /// leaves visited front-to-back along the split axis of each branch. Returns
    /// the number of reported leaves.
    pub fn cast_ray_all(
        &self,
        ray: &Ray,
        radius: Real,
        max_dist: Real,
        mut callback: impl FnMut(u32, Real),
    ) -> usize {
        let Some(root) = self.root() else {
            return 0;
        };

        let mut hits = 0;
        let mut stack: SmallVec<[u32; TRAVERSAL_STACK_SIZE]> = SmallVec::new();
        stack.push(root);

        while let Some(id) = stack.pop() {
            let Some(entry) = self.bvs[id as usize].cast_ray(self.kind, ray, radius, max_dist)
            else {
                continue;
            };

            let node = &self.nodes[id as usize];

            if node.is_leaf() {
                callback(node.index, entry);
                hits += 1;
            } else if kdop_axis(node.main_axis()).dot(&ray.dir) > 0.0 {
                stack.extend(node.children.iter().rev().copied());
            } else {
                stack.extend(node.children.iter().copied());
            }
        }

        hits
    }

    fn traverse_ray(
        &self,
        ray: &Ray,
        radius: Real,
        max_dist: Real,
        mut leaf_check: impl FnMut(u32, Real, Real) -> Option<Real>,
    ) -> Option<KdopBvhRayHit> {
        let mut best_dist = max_dist;
        let mut best_index = None;
        let mut stack: SmallVec<[u32; TRAVERSAL_STACK_SIZE]> = SmallVec::new();
        stack.push(self.root()?);

        while let Some(id) = stack.pop() {
            let Some(entry) = self.bvs[id as usize].cast_ray(self.kind, ray, radius, best_dist)
            else {
                continue;
            };

            if entry >= best_dist {
                continue;
            }

            let node = &self.nodes[id as usize];

            if node.is_leaf() {
                if let Some(dist) = leaf_check(node.index, entry, best_dist) {
                    if dist < best_dist {
                        best_dist = dist;
                        best_index = Some(node.index);
                    }
                }
            } else if kdop_axis(node.main_axis()).dot(&ray.dir) > 0.0 {
                // The stack is LIFO: push the farthest children first.
                stack.extend(node.children.iter().rev().copied());
            } else {
                stack.extend(node.children.iter().copied());
            }
        }

        best_index.map(|index| KdopBvhRayHit {
            index,
            dist: best_dist,
            point: ray.point_at(best_dist),
        })
    }

    /// Finds the leaf closest to `point`.
    ///
    /// The subtrees are visited depth-first, starting with the children on the
    /// side of `point`, and skipped when their volume is farther than the best leaf
    /// found so far. The `primitive_check` closure is given the index of a leaf and
    /// the best squared distance found so far, and returns the squared distance
    /// between `point` and the actual geometry of that leaf, along with the closest
    /// point of that geometry. Only leaves closer than `max_dist_sq` are reported.
    pub fn find_nearest(
        &self,
        point: &Point<Real>,
        max_dist_sq: Real,
        mut primitive_check: impl FnMut(u32, Real) -> Option<(Real, Point<Real>)>,
    ) -> Option<KdopBvhNearest> {
        self.traverse_nearest(point, max_dist_sq, |index, _, best| {
            primitive_check(index, best)
        })
    }

    /// Finds the leaf whose volume is the closest to `point`.
    ///
    /// Leaf volumes are measured with [`Kdop::distance_squared_lower_bound`](crate::bounding_volume::Kdop::distance_squared_lower_bound)
    /// and their closest point is `point` clamped to their coordinate slabs.
    pub fn find_nearest_bounds(
        &self,
        point: &Point<Real>,
        max_dist_sq: Real,
    ) -> Option<KdopBvhNearest> {
        self.traverse_nearest(point, max_dist_sq, |_, id, _| {
            let bv = &self.bvs[id as usize];
            Some((
                bv.distance_squared_lower_bound(self.kind, point),
                bv.clamp_point(point),
            ))
        })
    }

    fn traverse_nearest(
        &self,
        point: &Point<Real>,
        max_dist_sq: Real,
        mut leaf_check: impl FnMut(u32, u32, Real) -> Option<(Real, Point<Real>)>,
    ) -> Option<KdopBvhNearest> {
        let mut best: Option<KdopBvhNearest> = None;
        let mut best_dist_sq = max_dist_sq;
        let mut stack: SmallVec<[u32; TRAVERSAL_STACK_SIZE]> = SmallVec::new();
        stack.push(self.root()?);

        while let Some(id) = stack.pop() {
            let bv = &self.bvs[id as usize];

            if bv.distance_squared_lower_bound(self.kind, point) >= best_dist_sq {
                continue;
            }

            let node = &self.nodes[id as usize];

            if node.is_leaf() {
                if let Some((dist_sq, closest)) = leaf_check(node.index, id, best_dist_sq) {
                    if dist_sq < best_dist_sq {
                        best_dist_sq = dist_sq;
                        best = Some(KdopBvhNearest {
                            index: node.index,
                            dist_sq,
                            point: closest,
                        });
                    }
                }
            } else {
                let axis = node.main_axis();
                let proj = kdop_axis(axis).dot(&point.coords);
                let first_max = self.bvs[node.children[0] as usize].max(axis);

                if proj <= first_max {
                    stack.extend(node.children.iter().rev().copied());
                } else {
                    stack.extend(node.children.iter().copied());
                }
            }
        }

        best
    }

    /// Reports every leaf whose volume is closer than `radius` to `point`.
    ///
    /// The `callback` is given the index of each such leaf and the squared distance
    /// between `point` and its volume. Returns the number of reported leaves.
    pub fn range_query(
        &self,
        point: &Point<Real>,
        radius: Real,
        mut callback: impl FnMut(u32, Real),
    ) -> usize {
        let Some(root) = self.root() else {
            return 0;
        };

        let radius_sq = radius * radius;
        let mut hits = 0;
        let mut stack: SmallVec<[u32; TRAVERSAL_STACK_SIZE]> = SmallVec::new();
        stack.push(root);

        while let Some(id) = stack.pop() {
            let dist_sq = self.bvs[id as usize].distance_squared_lower_bound(self.kind, point);

            if dist_sq >= radius_sq {
                continue;
            }

            let node = &self.nodes[id as usize];

            if node.is_leaf() {
                callback(node.index, dist_sq);
                hits += 1;
            } else {
                stack.extend(node.children.iter().rev().copied());
            }
        }

        hits
    }

    /// The user-defined indices of the leaves whose volume crosses the plane
    /// `{ p | normal.dot(p) == bias }`.
    ///
    /// Volumes are tested through the box delimited by their coordinate slabs
    /// (see [`Kdop::intersects_plane`](crate::bounding_volume::Kdop::intersects_plane)).
    pub fn intersect_plane(&self, normal: &Vector<Real>, bias: Real) -> Vec<u32> {
        let mut result = Vec::new();
        let Some(root) = self.root() else {
            return result;
        };

        let mut stack: SmallVec<[u32; TRAVERSAL_STACK_SIZE]> = SmallVec::new();
        stack.push(root);

        while let Some(id) = stack.pop() {
            if !self.bvs[id as usize].intersects_plane(normal, bias) {
                continue;
            }

            let node = &self.nodes[id as usize];

            if node.is_leaf() {
                result.push(node.index);
            } else {
                stack.extend(node.children.iter().rev().copied());
            }
        }

        log::trace!("{} k-DOP BVH leaves cross the plane.", result.len());
        result
    }
}
