extern crate nalgebra as na;

use kdop3d::partitioning::KdTree;
use na::{Point3, Vector3};

fn main() {
    // Points on a unit sphere.
    let count = 500;
    let mut tree = KdTree::new(count);
    let golden_angle = std::f32::consts::PI * (3.0 - 5.0f32.sqrt());

    for i in 0..count {
        let y = 1.0 - 2.0 * (i as f32 + 0.5) / count as f32;
        let r = (1.0 - y * y).sqrt();
        let theta = golden_angle * i as f32;
        tree.insert(i as u32, Point3::new(r * theta.cos(), y, r * theta.sin()))
            .unwrap();
    }
    tree.balance();

    let query = Point3::new(0.0, 0.0, 1.2);
    if let Some(nearest) = tree.find_nearest(&query, None) {
        println!(
            "Nearest point: #{} at {} (distance {}).",
            nearest.index, nearest.co, nearest.dist
        );
    }

    // Favor the points facing the same way as the query.
    let facing = tree.find_n_nearest(5, &query, Some(&Vector3::z()));
    println!("Five nearest points in front of the query:");
    for found in &facing {
        println!("    #{} (distance {})", found.index, found.dist);
    }

    let in_range = tree.range_search(&query, None, 0.5);
    println!("{} points within 0.5 of the query.", in_range.len());
}
