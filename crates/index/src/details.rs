//! Query-by-id detail records.

use dagscope_protocol::{Block, Gossip, TransactionInfo};
use serde::Serialize;

use crate::index::DagIndex;

/// Everything an operator sees when asking about a single block.
#[derive(Debug, Clone, Serialize)]
pub struct BlockDetails<'a> {
    pub block: &'a Block,
    /// Transaction parsed from the block payload
    pub transaction: Option<TransactionInfo>,
    /// Gossips linked to the block, in insertion order
    pub gossips: Vec<&'a Gossip>,
    /// Ids of linked children, in insertion order
    pub children: Vec<&'a str>,
}

impl DagIndex {
    /// Resolve an operator-supplied id. `None` means the block is not indexed.
    pub fn block_details(&self, block_id: &str) -> Option<BlockDetails<'_>> {
        let position = self.position(block_id.trim())?;
        let block = &self.blocks[position];
        let links = &self.links[position];

        Some(BlockDetails {
            block,
            transaction: block.transaction(),
            gossips: self.gossips_at(&links.gossips),
            children: links
                .children
                .iter()
                .map(|&child| self.blocks[child].id())
                .collect(),
        })
    }
}
