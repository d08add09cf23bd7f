extern crate nalgebra as na;

use kdop3d::bounding_volume::KdopKind;
use kdop3d::partitioning::KdopBvh;
use kdop3d::query::Ray;
use na::{Point3, Vector3};

/// The eight corners of a unit cube translated by `shift`.
fn cube(shift: Vector3<f32>) -> Vec<Point3<f32>> {
    (0..8)
        .map(|i| {
            let corner = Point3::new((i & 1) as f32, ((i >> 1) & 1) as f32, (i >> 2) as f32);
            corner + shift
        })
        .collect()
}

fn main() {
    let mut static_cubes = KdopBvh::new(27, 0.01, 4, KdopKind::Kdop26).unwrap();
    let mut moving_cubes = KdopBvh::with_axis_count(2, 0.01, 2, 26).unwrap();

    for i in 0..27 {
        let shift = Vector3::new((i % 3) as f32, ((i / 3) % 3) as f32, (i / 9) as f32) * 2.0;
        static_cubes.insert(i, &cube(shift)).unwrap();
    }
    static_cubes.balance();

    moving_cubes.insert(100, &cube(Vector3::new(-3.0, 0.5, 0.5))).unwrap();
    moving_cubes.insert(101, &cube(Vector3::new(10.0, 10.0, 10.0))).unwrap();
    moving_cubes.balance();

    for step in 0..4 {
        // Sweep the first moving cube along +x.
        let start = cube(Vector3::new(-3.0 + step as f32 * 2.0, 0.5, 0.5));
        let end = cube(Vector3::new(-1.0 + step as f32 * 2.0, 0.5, 0.5));
        moving_cubes.update_node(0, &start, Some(end.as_slice())).unwrap();
        moving_cubes.update_tree();

        let mut pairs = static_cubes.overlap(&moving_cubes);
        pairs.sort_by_key(|pair| (pair.index1, pair.index2));
        println!("Step {}: {} overlapping pairs.", step, pairs.len());
        for pair in pairs {
            println!("    static {} / moving {}", pair.index1, pair.index2);
        }
    }

    let ray = Ray::new(Point3::new(-10.0, 0.5, 0.5), Vector3::x());
    if let Some(hit) = static_cubes.cast_ray_bounds(&ray, 0.0, f32::MAX) {
        println!(
            "Ray hits the volume of cube {} at {} (t = {}).",
            hit.index, hit.point, hit.dist
        );
    }
}
