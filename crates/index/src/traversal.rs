//! Presentation walk over the DAG.
//!
//! Produces a depth-first preorder over every indexed block: first from each
//! genesis block in insertion order, then from any block not yet reached
//! (orphans and late-parented blocks) as an extra root. Each block appears
//! exactly once. An explicit work stack is used so very deep chains do not
//! grow the call stack.

use dagscope_protocol::{Block, Gossip, TransactionInfo};
use serde::Serialize;

use crate::index::DagIndex;

/// One visited block, with everything a renderer needs.
#[derive(Debug, Clone, Serialize)]
pub struct WalkEntry<'a> {
    /// Distance from the root this block was reached from
    pub depth: usize,
    pub block: &'a Block,
    pub transaction: Option<TransactionInfo>,
    pub gossips: Vec<&'a Gossip>,
}

impl DagIndex {
    /// Walk the whole DAG in presentation order.
    pub fn walk(&self) -> Vec<WalkEntry<'_>> {
        let mut visited = vec![false; self.blocks.len()];
        let mut entries = Vec::with_capacity(self.blocks.len());

        let genesis = (0..self.blocks.len()).filter(|&position| self.blocks[position].is_genesis());
        let remaining = 0..self.blocks.len();

        for root in genesis.chain(remaining) {
            self.walk_from(root, &mut visited, &mut entries);
        }

        entries
    }

    fn walk_from<'a>(&'a self, root: usize, visited: &mut [bool], entries: &mut Vec<WalkEntry<'a>>) {
        let mut stack = vec![(root, 0)];

        while let Some((position, depth)) = stack.pop() {
            if visited[position] {
                continue;
            }
            visited[position] = true;

            let block = &self.blocks[position];
            let links = &self.links[position];
            entries.push(WalkEntry {
                depth,
                block,
                transaction: block.transaction(),
                gossips: self.gossips_at(&links.gossips),
            });

            // Reversed so the first child is popped first.
            for &child in links.children.iter().rev() {
                if !visited[child] {
                    stack.push((child, depth + 1));
                }
            }
        }
    }
}
