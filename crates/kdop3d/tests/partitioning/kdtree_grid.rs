use kdop3d::math::{Point, Real, Vector};
use kdop3d::partitioning::KdTree;

const GRID: usize = 10;

fn grid_index(i: usize, j: usize, k: usize) -> u32 {
    ((i * GRID + j) * GRID + k) as u32
}

fn grid_tree() -> KdTree {
    let mut tree = KdTree::new(GRID * GRID * GRID);
    for i in 0..GRID {
        for j in 0..GRID {
            for k in 0..GRID {
                let co = Point::new(i as Real, j as Real, k as Real);
                tree.insert(grid_index(i, j, k), co).unwrap();
            }
        }
    }
    tree.balance();
    tree
}

#[test]
fn nearest_grid_point() {
    let tree = grid_tree();

    for (i, j, k) in [(0, 0, 0), (3, 4, 5), (9, 9, 9), (7, 1, 8)] {
        let co = Point::new(i as Real + 0.1, j as Real - 0.2, k as Real + 0.3);
        let nearest = tree.find_nearest(&co, None).unwrap();
        assert_eq!(nearest.index, grid_index(i, j, k));
        assert_eq!(nearest.co, Point::new(i as Real, j as Real, k as Real));
        assert_relative_eq!(nearest.dist, (0.14 as Real).sqrt(), epsilon = 1.0e-5);
    }
}

#[test]
fn nearest_facing_grid_point() {
    let tree = grid_tree();
    let co = Point::new(4.4, 4.0, 4.0);

    assert_eq!(tree.find_nearest(&co, None).unwrap().index, grid_index(4, 4, 4));
    // With a normal along +x, the grid point behind the query costs 10 times more.
    let nearest = tree.find_nearest(&co, Some(&Vector::x())).unwrap();
    assert_eq!(nearest.index, grid_index(5, 4, 4));
    assert_relative_eq!(nearest.dist, 0.6, epsilon = 1.0e-5);
}

#[test]
fn grid_neighborhoods() {
    let tree = grid_tree();
    let co = Point::new(5.0, 5.0, 5.0);

    let nearest = tree.find_n_nearest(7, &co, None);
    assert_eq!(nearest.len(), 7);
    assert_eq!(nearest[0].index, grid_index(5, 5, 5));
    assert_eq!(nearest[0].dist, 0.0);
    for neighbor in &nearest[1..] {
        assert_relative_eq!(neighbor.dist, 1.0);
    }

    let in_range = tree.range_search(&co, None, 1.0);
    assert_eq!(in_range.len(), 7);
    assert_eq!(in_range[0].index, grid_index(5, 5, 5));

    let mut found: Vec<_> = in_range.iter().map(|n| n.index).collect();
    found.sort_unstable();
    let mut expected = vec![
        grid_index(5, 5, 5),
        grid_index(4, 5, 5),
        grid_index(6, 5, 5),
        grid_index(5, 4, 5),
        grid_index(5, 6, 5),
        grid_index(5, 5, 4),
        grid_index(5, 5, 6),
    ];
    expected.sort_unstable();
    assert_eq!(found, expected);

    // Corner points have only three direct neighbors.
    let corner = tree.range_search(&Point::origin(), None, 1.0);
    assert_eq!(corner.len(), 4);
}
