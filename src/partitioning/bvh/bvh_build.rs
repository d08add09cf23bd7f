use super::KdopBvh;
use crate::utils::{partition_nth, DEFAULT_INSERTION_THRESHOLD};

impl KdopBvh {
    /// Builds the branches of this tree from its leaves.
    ///
    /// The tree is built top-down: the leaves of each node are cut into runs of
    /// `ceil(len / tree_type)` leaves (the last run holding the rest) along the
    /// coordinate axis where the node's volume is the largest. Runs of a single
    /// leaf are linked directly to their parent, other runs become new branches
    /// that get split recursively.
    ///
    /// Does nothing if the tree is empty or already balanced. New leaves can't be
    /// inserted once this is done.
    pub fn balance(&mut self) {
        if self.leaf_count == 0 {
            log::debug!("Balancing an empty k-DOP BVH: nothing to do.");
            return;
        }

        if self.is_balanced() {
            log::debug!("The k-DOP BVH is already balanced.");
            return;
        }

        let mut leaves: Vec<u32> = (0..self.leaf_count as u32).collect();
        let root = self.push_branch(None);
        self.refit_from(root, &leaves);
        self.divide(root, &mut leaves);

        log::debug!(
            "Balanced k-DOP BVH: {} leaves, {} branches.",
            self.leaf_count,
            self.branch_count
        );
    }

    /// Splits `leaves` among the children of the branch `id`.
    ///
    /// The volume of `id` must already enclose all of `leaves`.
    fn divide(&mut self, id: u32, leaves: &mut [u32]) {
        let axis = self.bvs[id as usize].largest_axis(self.kind);
        self.nodes[id as usize].main_axis = axis as u8;

        let len = leaves.len();
        let run_len = len.div_ceil(self.tree_type);
        let mut start = 0;

        while start < len {
            let end = (start + run_len).min(len);

            if end != len {
                let bvs = &self.bvs;
                partition_nth(
                    &mut leaves[start..],
                    end - start,
                    |leaf| bvs[*leaf as usize].max(axis),
                    DEFAULT_INSERTION_THRESHOLD,
                );
            }

            let run = &mut leaves[start..end];

            if run.len() == 1 {
                let leaf = run[0];
                self.nodes[leaf as usize].parent = Some(id);
                self.nodes[id as usize].children.push(leaf);
            } else {
                let child = self.push_branch(Some(id));
                self.refit_from(child, run);
                self.divide(child, run);
            }

            start = end;
        }
    }
}
