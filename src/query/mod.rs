//! Query primitives shared by the spatial partitioning structures.

pub use self::ray::Ray;

mod ray;
