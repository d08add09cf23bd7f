use super::{KdopBvh, MAX_TREE_TYPE};

impl KdopBvh {
    /// Panics if the tree isn’t well-formed.
    ///
    /// The tree is well-formed if it is topologically correct (parent and children
    /// indices agree, every leaf is reachable exactly once from the root, every
    /// branch has between 1 and `tree_type` children) and geometrically correct
    /// (every volume is valid and the volume of each branch encloses the ones of
    /// its children along the active axes).
    ///
    /// Volumes are only guaranteed to be nested after [`KdopBvh::balance`] or
    /// [`KdopBvh::update_tree`], not right after [`KdopBvh::update_node`].
    pub fn assert_well_formed(&self) {
        assert_eq!(self.nodes.len(), self.bvs.len());
        assert_eq!(self.nodes.len(), self.leaf_count + self.branch_count);
        assert!(self.leaf_count <= self.capacity);
        assert!((2..=MAX_TREE_TYPE).contains(&self.tree_type));

        for (slot, bv) in self.bvs.iter().enumerate() {
            assert!(bv.is_valid(self.kind), "Invalid volume at slot {}.", slot);
        }

        let Some(root) = self.root() else {
            for leaf in &self.nodes {
                assert!(leaf.is_leaf());
                assert_eq!(leaf.parent, None);
            }
            return;
        };

        assert_eq!(self.nodes[root as usize].parent, None);

        let mut visited = vec![false; self.nodes.len()];
        let reached_leaves = self.assert_well_formed_recurse(root, &mut visited);
        assert_eq!(reached_leaves, self.leaf_count);
        assert!(
            visited.iter().all(|v| *v),
            "Some nodes are not reachable from the root."
        );
    }

    fn assert_well_formed_recurse(&self, id: u32, visited: &mut [bool]) -> usize {
        if std::mem::replace(&mut visited[id as usize], true) {
            panic!("Detected loop. Node {} visited twice.", id);
        }

        let node = &self.nodes[id as usize];

        if (id as usize) < self.leaf_count {
            assert!(node.is_leaf(), "Leaf slot {} has children.", id);
            return 1;
        }

        assert!(!node.children.is_empty() && node.children.len() <= self.tree_type);
        let bv = &self.bvs[id as usize];
        let mut leaf_count = 0;

        for child in &node.children {
            assert_eq!(self.nodes[*child as usize].parent, Some(id));
            assert!(
                bv.contains_axes(&self.bvs[*child as usize], self.kind.axis_range()),
                "Branch {} does not enclose its child {}.",
                id,
                child
            );
            leaf_count += self.assert_well_formed_recurse(*child, visited);
        }

        leaf_count
    }
}
