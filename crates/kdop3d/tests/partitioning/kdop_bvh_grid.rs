use kdop3d::bounding_volume::KdopKind;
use kdop3d::math::{Point, Real, Vector};
use kdop3d::partitioning::KdopBvh;
use kdop3d::query::Ray;
use std::collections::HashSet;

const GRID: usize = 16;

/// Triangulates a `GRID × GRID` square of unit quads lying on the `z = height` plane.
fn grid_triangles(height: Real) -> Vec<[Point<Real>; 3]> {
    let mut triangles = Vec::with_capacity(GRID * GRID * 2);

    for i in 0..GRID {
        for j in 0..GRID {
            let (x, y) = (i as Real, j as Real);
            let a = Point::new(x, y, height);
            let b = Point::new(x + 1.0, y, height);
            let c = Point::new(x + 1.0, y + 1.0, height);
            let d = Point::new(x, y + 1.0, height);
            triangles.push([a, b, c]);
            triangles.push([a, c, d]);
        }
    }

    triangles
}

fn build(triangles: &[[Point<Real>; 3]], tree_type: usize, kind: KdopKind) -> KdopBvh {
    let mut bvh = KdopBvh::new(triangles.len(), 0.01, tree_type, kind).unwrap();
    for (i, tri) in triangles.iter().enumerate() {
        bvh.insert(i as u32, tri).unwrap();
    }
    bvh.balance();
    bvh.assert_well_formed();
    bvh
}

fn ray_triangle(ray: &Ray, tri: &[Point<Real>; 3]) -> Option<Real> {
    let edge1 = tri[1] - tri[0];
    let edge2 = tri[2] - tri[0];
    let p = ray.dir.cross(&edge2);
    let det = edge1.dot(&p);

    if det.abs() < 1.0e-7 {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - tri[0];
    let u = s.dot(&p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = ray.dir.dot(&q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(&q) * inv_det;
    (t >= 0.0).then_some(t)
}

fn quad_triangle(i: usize, j: usize) -> u32 {
    (2 * (i * GRID + j)) as u32
}

#[test]
fn grid_self_overlap_finds_neighbors() {
    let triangles = grid_triangles(0.0);

    for kind in [KdopKind::Obb6, KdopKind::Kdop18, KdopKind::Kdop26] {
        for tree_type in [2, 4, 8] {
            let bvh = build(&triangles, tree_type, kind);
            let pairs: HashSet<_> = bvh
                .overlap(&bvh)
                .into_iter()
                .map(|p| (p.index1, p.index2))
                .collect();

            assert!(pairs.iter().all(|(a, b)| a != b));
            assert!(pairs.iter().all(|(a, b)| pairs.contains(&(*b, *a))));

            // Both halves of a quad touch each other.
            assert!(pairs.contains(&(quad_triangle(3, 4), quad_triangle(3, 4) + 1)));
            // Triangles from distant quads never do.
            assert!(!pairs.contains(&(quad_triangle(0, 0), quad_triangle(5, 5))));
        }
    }
}

#[test]
fn ray_cast_on_deforming_grid() {
    let mut triangles = grid_triangles(0.0);
    let mut bvh = build(&triangles, 4, KdopKind::Kdop26);

    let ray = Ray::new(Point::new(3.3, 7.2, 10.0), -Vector::z());
    let hit = bvh
        .cast_ray(&ray, 0.0, Real::MAX, |i, _| {
            ray_triangle(&ray, &triangles[i as usize])
        })
        .unwrap();
    assert_eq!(hit.index, quad_triangle(3, 7));
    assert_relative_eq!(hit.dist, 10.0, epsilon = 1.0e-4);
    assert_relative_eq!(hit.point, Point::new(3.3, 7.2, 0.0), epsilon = 1.0e-4);

    // Lift the whole grid and refit the tree.
    let lifted = grid_triangles(2.0);
    for (slot, tri) in lifted.iter().enumerate() {
        bvh.update_node(slot, tri, None).unwrap();
    }
    bvh.update_tree();
    bvh.assert_well_formed();
    triangles = lifted;

    let hit = bvh
        .cast_ray(&ray, 0.0, Real::MAX, |i, _| {
            ray_triangle(&ray, &triangles[i as usize])
        })
        .unwrap();
    assert_eq!(hit.index, quad_triangle(3, 7));
    assert_relative_eq!(hit.dist, 8.0, epsilon = 1.0e-4);

    // Nothing is hit before the grid.
    assert!(bvh
        .cast_ray(&ray, 0.0, 7.5, |i, _| ray_triangle(&ray, &triangles[i as usize]))
        .is_none());

    // A ray pointing away from the grid misses it.
    let away = Ray::new(ray.origin, Vector::z());
    assert!(bvh.cast_ray_bounds(&away, 0.0, Real::MAX).is_none());
}

#[test]
fn swept_grid_volumes() {
    let start = grid_triangles(0.0);
    let end = grid_triangles(-3.0);
    let mut bvh = build(&start, 3, KdopKind::Aabb8);

    for (slot, (from, to)) in start.iter().zip(end.iter()).enumerate() {
        bvh.update_node(slot, from, Some(to)).unwrap();
    }
    bvh.update_tree();
    bvh.assert_well_formed();

    let root = bvh.root_volume().unwrap();
    assert_relative_eq!(root.min(2), -3.01);
    assert_relative_eq!(root.max(2), 0.01);

    // The middle of the motion is enclosed by the leaf volumes.
    let query = Point::new(5.5, 5.25, -1.5);
    let found = bvh.find_nearest_bounds(&query, Real::MAX).unwrap();
    assert_eq!(found.dist_sq, 0.0);
    assert_eq!(found.point, query);

    let count = bvh.range_query(&query, 0.1, |index, _| {
        assert!(index == quad_triangle(5, 5) || index == quad_triangle(5, 5) + 1);
    });
    assert_eq!(count, 2);
}

#[test]
fn grids_of_different_kinds() {
    let triangles = grid_triangles(0.0);
    let shifted: Vec<_> = triangles
        .iter()
        .map(|tri| tri.map(|pt| pt + Vector::new(GRID as Real - 0.5, 0.0, 0.0)))
        .collect();

    let aabb = build(&triangles, 2, KdopKind::Aabb8);
    let kdop26 = build(&shifted, 8, KdopKind::Kdop26);
    let kdop14 = build(&shifted, 8, KdopKind::Kdop14);

    // Only the last column of quads of the first grid overlaps the second one.
    let pairs = aabb.overlap(&kdop26);
    assert!(!pairs.is_empty());
    assert!(pairs
        .iter()
        .all(|p| p.index1 as usize >= (GRID - 1) * GRID * 2));

    assert!(aabb.overlap(&kdop14).is_empty());
    assert!(kdop14.overlap(&aabb).is_empty());
}
