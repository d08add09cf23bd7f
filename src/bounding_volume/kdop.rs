//! Discrete-orientation polytopes (k-DOP).

use crate::bounding_volume::BoundingVolume;
use crate::math::{Point, Real, Vector, DIM};
use crate::query::Ray;
use core::ops::Range;

/// The number of distinct projection directions a [`Kdop`] can be bounded along.
pub const KDOP_AXIS_COUNT: usize = 13;

/// The projection directions of every k-DOP.
///
/// The first three entries are the coordinate axes, followed by the four
/// cube diagonals and the six edge diagonals. The directions are not
/// normalized: projecting a point on one of them is a plain dot product.
pub const KDOP_AXES: [[Real; 3]; KDOP_AXIS_COUNT] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, -1.0, 0.0],
    [1.0, 0.0, -1.0],
    [0.0, 1.0, -1.0],
];

/// The `i`-th k-DOP projection direction as a vector.
#[inline]
pub fn kdop_axis(i: usize) -> Vector<Real> {
    let [x, y, z] = KDOP_AXES[i];
    Vector::new(x, y, z)
}

/// The supported k-DOP configurations.
///
/// Each kind activates a contiguous range of [`KDOP_AXES`]. Only the
/// bounds along the active axes are computed, stored, and tested.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum KdopKind {
    /// Bounds along the three coordinate axes (axis count 6).
    Obb6,
    /// Bounds along the coordinate axes and the first cube diagonal (axis count 8).
    Aabb8,
    /// Bounds along the coordinate axes and the four cube diagonals (axis count 14).
    Kdop14,
    /// Bounds along the six edge diagonals (axis count 18).
    Kdop18,
    /// Bounds along all 13 directions (axis count 26).
    Kdop26,
}

impl KdopKind {
    /// Maps an axis count (6, 8, 14, 18 or 26) to the corresponding kind.
    ///
    /// Returns `None` for any other value.
    pub fn from_axis_count(axis_count: u32) -> Option<Self> {
        match axis_count {
            6 => Some(Self::Obb6),
            8 => Some(Self::Aabb8),
            14 => Some(Self::Kdop14),
            18 => Some(Self::Kdop18),
            26 => Some(Self::Kdop26),
            _ => None,
        }
    }

    /// The axis count identifying this kind.
    pub fn axis_count(self) -> u32 {
        match self {
            Self::Obb6 => 6,
            Self::Aabb8 => 8,
            Self::Kdop14 => 14,
            Self::Kdop18 => 18,
            Self::Kdop26 => 26,
        }
    }

    /// Index of the first active entry of [`KDOP_AXES`].
    #[inline]
    pub fn start_axis(self) -> usize {
        match self {
            Self::Kdop18 => 7,
            _ => 0,
        }
    }

    /// Index one past the last active entry of [`KDOP_AXES`].
    #[inline]
    pub fn stop_axis(self) -> usize {
        match self {
            Self::Obb6 => 3,
            Self::Aabb8 => 4,
            Self::Kdop14 => 7,
            Self::Kdop18 | Self::Kdop26 => 13,
        }
    }

    /// The range of active entries of [`KDOP_AXES`].
    #[inline]
    pub fn axis_range(self) -> Range<usize> {
        self.start_axis()..self.stop_axis()
    }

    /// Does this kind bound its volumes along the three coordinate axes?
    #[inline]
    pub fn has_cartesian_axes(self) -> bool {
        self.start_axis() == 0
    }

    /// The axes along which volumes of `self` and `other` can be compared.
    ///
    /// This spans from the first axis active in either kind to the last axis active in
    /// both. Axes outside of the active range of a kind are unbounded, so they never
    /// separate two volumes. Returns `None` if the kinds differ while one of them is
    /// [`KdopKind::Kdop14`].
    pub fn common_axis_range(self, other: Self) -> Option<Range<usize>> {
        if self != other && (self == Self::Kdop14 || other == Self::Kdop14) {
            return None;
        }

        let start = self.start_axis().min(other.start_axis());
        let stop = self.stop_axis().min(other.stop_axis());
        Some(start..stop)
    }
}

/// A k-DOP: the intersection of slabs orthogonal to the directions of [`KDOP_AXES`].
///
/// A slab is stored as a `[min, max]` pair of projections on its direction. Slabs
/// that are not constrained (e.g. the axes a [`KdopKind`] does not use) span
/// `[-Real::MAX, Real::MAX]`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Kdop {
    bounds: [[Real; 2]; KDOP_AXIS_COUNT],
}

impl Default for Kdop {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl Kdop {
    /// A k-DOP covering the whole space.
    #[inline]
    pub fn unbounded() -> Self {
        Self {
            bounds: [[-Real::MAX, Real::MAX]; KDOP_AXIS_COUNT],
        }
    }

    /// A k-DOP with inverted bounds along the active axes of `kind`.
    ///
    /// This is the neutral element of [`Kdop::merge_axes`]: merging it with any
    /// other volume yields that volume.
    #[inline]
    pub fn new_invalid(kind: KdopKind) -> Self {
        let mut result = Self::unbounded();
        result.reset(kind);
        result
    }

    /// Computes the k-DOP of `kind` enclosing all the given points.
    pub fn from_points(kind: KdopKind, points: &[Point<Real>]) -> Self {
        let mut result = Self::unbounded();
        result.create_hull(kind, points, false);
        result
    }

    /// The `[min, max]` bounds along the `axis`-th entry of [`KDOP_AXES`].
    #[inline]
    pub fn bounds(&self, axis: usize) -> [Real; 2] {
        self.bounds[axis]
    }

    /// The smallest projection along the `axis`-th entry of [`KDOP_AXES`].
    #[inline]
    pub fn min(&self, axis: usize) -> Real {
        self.bounds[axis][0]
    }

    /// The largest projection along the `axis`-th entry of [`KDOP_AXES`].
    #[inline]
    pub fn max(&self, axis: usize) -> Real {
        self.bounds[axis][1]
    }

    /// The width of the slab along the `axis`-th entry of [`KDOP_AXES`].
    #[inline]
    pub fn extent(&self, axis: usize) -> Real {
        self.bounds[axis][1] - self.bounds[axis][0]
    }

    #[inline]
    fn reset(&mut self, kind: KdopKind) {
        for axis in kind.axis_range() {
            self.bounds[axis] = [Real::MAX, -Real::MAX];
        }
    }

    /// Grows the bounds along the active axes of `kind` to enclose `points`.
    ///
    /// If `moving` is `false`, the active bounds are reset first so the result
    /// encloses `points` only. If `moving` is `true` the current bounds are
    /// extended instead, which yields the swept volume of a motion when `self`
    /// already encloses the start positions.
    pub fn create_hull(&mut self, kind: KdopKind, points: &[Point<Real>], moving: bool) {
        if !moving {
            self.reset(kind);
        }

        for pt in points {
            for axis in kind.axis_range() {
                let proj = kdop_axis(axis).dot(&pt.coords);
                let bounds = &mut self.bounds[axis];
                bounds[0] = bounds[0].min(proj);
                bounds[1] = bounds[1].max(proj);
            }
        }
    }

    /// Enlarges every active slab of `kind` by `amount` on both sides.
    #[inline]
    pub fn loosen_axes(&mut self, kind: KdopKind, amount: Real) {
        for axis in kind.axis_range() {
            self.bounds[axis][0] -= amount;
            self.bounds[axis][1] += amount;
        }
    }

    /// Merges `other` into `self` along the active axes of `kind`.
    #[inline]
    pub fn merge_axes(&mut self, kind: KdopKind, other: &Self) {
        for axis in kind.axis_range() {
            self.bounds[axis][0] = self.bounds[axis][0].min(other.bounds[axis][0]);
            self.bounds[axis][1] = self.bounds[axis][1].max(other.bounds[axis][1]);
        }
    }

    /// Separating-axis test restricted to the given range of [`KDOP_AXES`].
    #[inline]
    pub fn intersects_axes(&self, other: &Self, axes: Range<usize>) -> bool {
        axes.into_iter().all(|axis| {
            let [min1, max1] = self.bounds[axis];
            let [min2, max2] = other.bounds[axis];
            min1 <= max2 && min2 <= max1
        })
    }

    /// Does `self` enclose `other` along the given range of [`KDOP_AXES`]?
    #[inline]
    pub fn contains_axes(&self, other: &Self, axes: Range<usize>) -> bool {
        axes.into_iter().all(|axis| {
            self.bounds[axis][0] <= other.bounds[axis][0]
                && self.bounds[axis][1] >= other.bounds[axis][1]
        })
    }

    /// Checks that `min <= max` along every active axis of `kind`.
    pub fn is_valid(&self, kind: KdopKind) -> bool {
        kind.axis_range()
            .all(|axis| self.bounds[axis][0] <= self.bounds[axis][1])
    }

    /// Index of the entry of [`KDOP_AXES`] along which this volume is the largest,
    /// among the first three active axes of `kind`.
    ///
    /// For every kind with coordinate axes this picks between `x`, `y` and `z`.
    /// [`KdopKind::Kdop18`] has no coordinate slabs, so it picks among the first
    /// three of its diagonal axes rather than between the unbounded `x`, `y` and
    /// `z` slabs. Ties are resolved towards the last candidate.
    pub fn largest_axis(&self, kind: KdopKind) -> usize {
        let start = kind.start_axis();
        let ext = [
            self.extent(start),
            self.extent(start + 1),
            self.extent(start + 2),
        ];

        if ext[0] > ext[1] {
            if ext[0] > ext[2] {
                start
            } else {
                start + 2
            }
        } else if ext[1] > ext[2] {
            start + 1
        } else {
            start + 2
        }
    }

    /// Intersects a ray (optionally thickened by `radius`) with the active slabs of `kind`.
    ///
    /// Returns the time of impact of the ray entering this volume, if it
    /// happens within `[0, max_time_of_impact]`. A ray starting inside of the
    /// volume has a time of impact of zero.
    pub fn cast_ray(
        &self,
        kind: KdopKind,
        ray: &Ray,
        radius: Real,
        max_time_of_impact: Real,
    ) -> Option<Real> {
        let mut low: Real = 0.0;
        let mut upper = max_time_of_impact;

        for axis in kind.axis_range() {
            let dir = kdop_axis(axis);
            let margin = radius * dir.norm();
            let [min, max] = self.bounds[axis];
            let min = min - margin;
            let max = max + margin;
            let origin = dir.dot(&ray.origin.coords);
            let speed = dir.dot(&ray.dir);

            if speed.abs() < Real::EPSILON {
                if origin < min || origin > max {
                    return None;
                }
            } else {
                let t_min = (min - origin) / speed;
                let t_max = (max - origin) / speed;

                if speed > 0.0 {
                    low = low.max(t_min);
                    upper = upper.min(t_max);
                } else {
                    low = low.max(t_max);
                    upper = upper.min(t_min);
                }

                if low > upper {
                    return None;
                }
            }
        }

        Some(low)
    }

    /// A lower bound of the squared distance between `point` and this volume.
    ///
    /// Along the coordinate axes this is the exact distance to the enclosing
    /// box. Diagonal slabs tighten it with their own (normalized) gap.
    /// Returns zero if `point` lies inside every active slab of `kind`.
    pub fn distance_squared_lower_bound(&self, kind: KdopKind, point: &Point<Real>) -> Real {
        let mut box_dist2 = 0.0;
        let mut slab_dist2: Real = 0.0;

        for axis in kind.axis_range() {
            let dir = kdop_axis(axis);
            let proj = dir.dot(&point.coords);
            let [min, max] = self.bounds[axis];
            let gap = if proj < min {
                min - proj
            } else if proj > max {
                proj - max
            } else {
                continue;
            };

            if axis < DIM {
                box_dist2 += gap * gap;
            } else {
                slab_dist2 = slab_dist2.max(gap * gap / dir.norm_squared());
            }
        }

        slab_dist2.max(box_dist2)
    }

    /// Does the plane `{ p | normal.dot(p) == bias }` cross the box delimited by the
    /// coordinate slabs of this volume?
    ///
    /// Unbounded coordinate slabs make this test pass whenever `normal` has a
    /// non-zero component along them.
    pub fn intersects_plane(&self, normal: &Vector<Real>, bias: Real) -> bool {
        let mut low = 0.0;
        let mut high = 0.0;

        for i in 0..DIM {
            let [min, max] = self.bounds[i];
            if normal[i] >= 0.0 {
                low += normal[i] * min;
                high += normal[i] * max;
            } else {
                low += normal[i] * max;
                high += normal[i] * min;
            }
        }

        low <= bias && bias <= high
    }

    /// Clamps `point` to the box delimited by the coordinate slabs of this volume.
    ///
    /// Axes that are not bounded leave the corresponding coordinate untouched.
    pub fn clamp_point(&self, point: &Point<Real>) -> Point<Real> {
        let mut result = *point;
        for i in 0..DIM {
            let [min, max] = self.bounds[i];
            if min <= max {
                result[i] = result[i].clamp(min, max);
            }
        }
        result
    }
}

impl BoundingVolume for Kdop {
    /// The center of the box delimited by the coordinate slabs.
    fn center(&self) -> Point<Real> {
        Point::new(
            (self.bounds[0][0] + self.bounds[0][1]) / 2.0,
            (self.bounds[1][0] + self.bounds[1][1]) / 2.0,
            (self.bounds[2][0] + self.bounds[2][1]) / 2.0,
        )
    }

    #[inline]
    fn intersects(&self, other: &Self) -> bool {
        self.intersects_axes(other, 0..KDOP_AXIS_COUNT)
    }

    #[inline]
    fn contains(&self, other: &Self) -> bool {
        self.contains_axes(other, 0..KDOP_AXIS_COUNT)
    }

    #[inline]
    fn merge(&mut self, other: &Self) {
        self.merge_axes(KdopKind::Kdop26, other)
    }

    #[inline]
    fn loosen(&mut self, amount: Real) {
        assert!(amount >= 0.0, "The loosening margin must be positive.");
        self.loosen_axes(KdopKind::Kdop26, amount)
    }

    #[inline]
    fn tighten(&mut self, amount: Real) {
        assert!(amount >= 0.0, "The tightening margin must be positive.");
        self.loosen_axes(KdopKind::Kdop26, -amount);
        assert!(
            self.is_valid(KdopKind::Kdop26),
            "The tightening margin is too large."
        );
    }
}
