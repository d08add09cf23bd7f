//! Structure needed to cast rays.

use crate::math::{Point, Real, Vector};

/// A ray for ray-casting queries.
///
/// A ray is a half-infinite line starting at an origin point and extending
/// infinitely in a direction. The direction does not need to be normalized:
/// times of impact are expressed in multiples of `dir`, i.e., they are only
/// world-space distances if `dir` has a unit length.
///
/// # Example
///
/// ```rust
/// # #[cfg(all(feature = "dim3", feature = "f32"))] {
/// use kdop3d::query::Ray;
/// use nalgebra::{Point3, Vector3};
///
/// let ray = Ray::new(Point3::origin(), Vector3::new(2.0, 0.0, 0.0));
/// assert_eq!(ray.point_at(1.5), Point3::new(3.0, 0.0, 0.0));
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(C)]
pub struct Ray {
    /// Starting point of the ray.
    pub origin: Point<Real>,
    /// Direction of the ray.
    pub dir: Vector<Real>,
}

impl Ray {
    /// Creates a new ray starting from `origin` and with the direction `dir`.
    pub fn new(origin: Point<Real>, dir: Vector<Real>) -> Ray {
        Ray { origin, dir }
    }

    /// Translates this ray by the given vector.
    #[inline]
    pub fn translate_by(&self, v: Vector<Real>) -> Self {
        Self::new(self.origin + v, self.dir)
    }

    /// Computes the point at the given parameter on this half-line.
    ///
    /// This computes `self.origin + self.dir * t`.
    #[inline]
    pub fn point_at(&self, t: Real) -> Point<Real> {
        self.origin + self.dir * t
    }
}
