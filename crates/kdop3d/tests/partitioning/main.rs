#[macro_use]
extern crate approx;

mod kdop_bvh_grid;
mod kdtree_grid;
