//! Bounding volumes.

#[doc(inline)]
pub use crate::bounding_volume::bounding_volume::BoundingVolume;
#[doc(inline)]
pub use crate::bounding_volume::kdop::{kdop_axis, Kdop, KdopKind, KDOP_AXES, KDOP_AXIS_COUNT};

#[doc(hidden)]
pub mod bounding_volume;

#[doc(hidden)]
pub mod kdop;
