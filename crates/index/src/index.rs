//! Block DAG Index Module
//!
//! An append-only, in-memory index over decoded messages. Blocks are stored
//! in insertion order; parent→child and block→gossip links are resolved when
//! the referencing message is added, against whatever has been indexed so far.
//!
//! A block that names a parent which arrives later is therefore *not* linked
//! to it in [`LinkMode::SinglePass`]. [`LinkMode::Reconciled`] rebuilds every
//! link once all messages are loaded.

use std::collections::{HashMap, HashSet};

use dagscope_protocol::{Block, DagStats, Gossip, Message};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Link resolution policy used when building an index from a message list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    /// Resolve each reference at insertion time only
    #[default]
    SinglePass,
    /// Resolve all references after every message has been added
    Reconciled,
}

/// What a dangling reference was pointing from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Parent,
    HeardAbout,
}

/// A reference that did not resolve to an indexed block when it was linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedRef {
    /// Id of the block or gossip holding the reference
    pub referrer: String,
    /// Id that could not be found
    pub target: String,
    pub kind: ReferenceKind,
}

/// Resolved links for one block, as positions into the index tables.
#[derive(Debug, Clone, Default)]
pub(crate) struct BlockLinks {
    pub(crate) parents: Vec<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) gossips: Vec<usize>,
}

/// In-memory block DAG built from decoded messages.
#[derive(Debug, Default)]
pub struct DagIndex {
    /// Blocks in insertion order
    pub(crate) blocks: Vec<Block>,
    /// Block id -> position in `blocks`
    pub(crate) positions: HashMap<String, usize>,
    /// Links for each block, parallel to `blocks`
    pub(crate) links: Vec<BlockLinks>,
    /// Gossip messages in insertion order
    pub(crate) gossips: Vec<Gossip>,
    /// References that did not resolve when linked
    unresolved: Vec<UnresolvedRef>,
}

impl DagIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from messages using the given link policy.
    pub fn from_messages<I>(messages: I, mode: LinkMode) -> Self
    where
        I: IntoIterator<Item = Message>,
    {
        let mut index: Self = messages.into_iter().collect();
        if mode == LinkMode::Reconciled {
            index.reconcile();
        }
        index
    }

    /// Add one message, linking it against the blocks indexed so far.
    ///
    /// Never fails. Unknown references are recorded in [`Self::unresolved`]
    /// and otherwise ignored. A block whose id is already indexed is dropped.
    pub fn add(&mut self, message: impl Into<Message>) {
        match message.into() {
            Message::Block(block) => self.add_block(block),
            Message::Gossip(gossip) => self.add_gossip(gossip),
        }
    }

    fn add_block(&mut self, block: Block) {
        if self.positions.contains_key(block.id()) {
            warn!(id = block.id(), "Ignoring duplicate block id");
            return;
        }

        let position = self.blocks.len();
        self.positions.insert(block.id().to_string(), position);
        self.blocks.push(block);
        self.links.push(BlockLinks::default());

        self.link_block(position);
    }

    fn add_gossip(&mut self, gossip: Gossip) {
        let index = self.gossips.len();
        self.gossips.push(gossip);

        self.link_gossip(index);
    }

    /// A parent named more than once is linked or recorded as unresolved once.
    fn link_block(&mut self, position: usize) {
        let block = &self.blocks[position];
        let mut seen = HashSet::new();

        for parent in &block.parents {
            if !seen.insert(parent.as_str()) {
                continue;
            }
            match self.positions.get(parent) {
                Some(&parent_position) => {
                    self.links[parent_position].children.push(position);
                    self.links[position].parents.push(parent_position);
                    debug!(parent = parent.as_str(), child = block.id(), "Linked block");
                }
                None => {
                    debug!(parent = parent.as_str(), child = block.id(), "Parent not indexed");
                    self.unresolved.push(UnresolvedRef {
                        referrer: block.id().to_string(),
                        target: parent.clone(),
                        kind: ReferenceKind::Parent,
                    });
                }
            }
        }
    }

    fn link_gossip(&mut self, index: usize) {
        let gossip = &self.gossips[index];
        let Some(target) = &gossip.heard_about else {
            return;
        };

        match self.positions.get(target) {
            Some(&position) => {
                self.links[position].gossips.push(index);
                debug!(gossip = gossip.id(), block = target.as_str(), "Linked gossip");
            }
            None => {
                debug!(gossip = gossip.id(), block = target.as_str(), "Gossip target not indexed");
                self.unresolved.push(UnresolvedRef {
                    referrer: gossip.id().to_string(),
                    target: target.clone(),
                    kind: ReferenceKind::HeardAbout,
                });
            }
        }
    }

    /// Rebuild every link with the full block set known.
    ///
    /// Children and gossips keep insertion order. Only references to ids that
    /// were never indexed remain unresolved afterwards.
    pub fn reconcile(&mut self) {
        for links in &mut self.links {
            *links = BlockLinks::default();
        }
        self.unresolved.clear();

        for position in 0..self.blocks.len() {
            self.link_block(position);
        }
        for index in 0..self.gossips.len() {
            self.link_gossip(index);
        }
    }

    pub(crate) fn position(&self, block_id: &str) -> Option<usize> {
        self.positions.get(block_id).copied()
    }

    pub(crate) fn blocks_at(&self, positions: &[usize]) -> Vec<&Block> {
        positions.iter().map(|&position| &self.blocks[position]).collect()
    }

    pub(crate) fn gossips_at(&self, indices: &[usize]) -> Vec<&Gossip> {
        indices.iter().map(|&index| &self.gossips[index]).collect()
    }

    /// Look up a block by id
    pub fn lookup(&self, block_id: &str) -> Option<&Block> {
        self.position(block_id).map(|position| &self.blocks[position])
    }

    /// Blocks with no declared parents, in insertion order.
    pub fn genesis_blocks(&self) -> Vec<&Block> {
        self.blocks.iter().filter(|block| block.is_genesis()).collect()
    }

    /// Children linked to `block_id`, in the order they were inserted.
    pub fn children_of(&self, block_id: &str) -> Vec<&Block> {
        self.position(block_id)
            .map(|position| self.blocks_at(&self.links[position].children))
            .unwrap_or_default()
    }

    /// Parents of `block_id` that resolved to indexed blocks.
    pub fn parents_of(&self, block_id: &str) -> Vec<&Block> {
        self.position(block_id)
            .map(|position| self.blocks_at(&self.links[position].parents))
            .unwrap_or_default()
    }

    /// Gossips linked to `block_id`, in insertion order.
    pub fn gossips_of(&self, block_id: &str) -> Vec<&Gossip> {
        self.position(block_id)
            .map(|position| self.gossips_at(&self.links[position].gossips))
            .unwrap_or_default()
    }

    /// All blocks in insertion order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// All gossip messages in insertion order, linked or not
    pub fn gossips(&self) -> &[Gossip] {
        &self.gossips
    }

    /// References that did not resolve when they were linked
    pub fn unresolved(&self) -> &[UnresolvedRef] {
        &self.unresolved
    }

    /// Number of indexed blocks. Gossips are counted by [`Self::gossips`].
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when no block is indexed
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Compute statistics over the current index
    pub fn stats(&self) -> DagStats {
        let nodes: HashSet<&str> = self
            .blocks
            .iter()
            .map(|block| block.envelope.from_node.as_str())
            .chain(self.gossips.iter().map(|gossip| gossip.envelope.from_node.as_str()))
            .collect();

        let timestamps = self
            .blocks
            .iter()
            .map(|block| block.envelope.timestamp)
            .chain(self.gossips.iter().map(|gossip| gossip.envelope.timestamp));

        DagStats {
            block_count: self.blocks.len(),
            gossip_count: self.gossips.len(),
            genesis_count: self.blocks.iter().filter(|block| block.is_genesis()).count(),
            tip_count: self.links.iter().filter(|links| links.children.is_empty()).count(),
            orphan_count: self
                .blocks
                .iter()
                .zip(&self.links)
                .filter(|(block, links)| !block.is_genesis() && links.parents.is_empty())
                .count(),
            unresolved_count: self.unresolved.len(),
            node_count: nodes.len(),
            earliest_timestamp: timestamps.clone().min(),
            latest_timestamp: timestamps.max(),
        }
    }
}

impl Extend<Message> for DagIndex {
    fn extend<I: IntoIterator<Item = Message>>(&mut self, messages: I) {
        for message in messages {
            self.add(message);
        }
    }
}

impl FromIterator<Message> for DagIndex {
    fn from_iter<I: IntoIterator<Item = Message>>(messages: I) -> Self {
        let mut index = DagIndex::new();
        index.extend(messages);
        index
    }
}
