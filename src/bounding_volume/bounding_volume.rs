use crate::math::{Point, Real};

/// Trait of bounding volumes that can be combined with each other.
///
/// A bounding volume is a coarse approximation of a set of points with cheap
/// intersection and inclusion tests. Two bounding volumes of the same type can
/// be merged into a bigger one enclosing both.
pub trait BoundingVolume: Clone {
    /// Returns a point inside of this bounding volume. This is ideally its center.
    fn center(&self) -> Point<Real>;

    /// Checks if this bounding volume intersects another one.
    fn intersects(&self, other: &Self) -> bool;

    /// Checks if this bounding volume contains another one.
    fn contains(&self, other: &Self) -> bool;

    /// Merges this bounding volume with another one. The merge is done in-place.
    fn merge(&mut self, other: &Self);

    /// Enlarges this bounding volume by `amount` in every direction.
    fn loosen(&mut self, amount: Real);

    /// Shrinks this bounding volume by `amount` in every direction.
    fn tighten(&mut self, amount: Real);

    /// Merges this bounding volume with another one.
    fn merged(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.merge(other);
        result
    }

    /// Creates a new, enlarged version, of this bounding volume.
    fn loosened(&self, amount: Real) -> Self {
        let mut result = self.clone();
        result.loosen(amount);
        result
    }

    /// Creates a new, tightened version, of this bounding volume.
    fn tightened(&self, amount: Real) -> Self {
        let mut result = self.clone();
        result.tighten(amount);
        result
    }
}
