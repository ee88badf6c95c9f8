//! Shared DAG-related structures.
//!
//! Snapshot types that the index produces and the command line renders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// DAG statistics for a decoded log.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DagStats {
    /// Total number of indexed blocks
    pub block_count: usize,
    /// Total number of gossip messages
    pub gossip_count: usize,
    /// Blocks with no declared parents
    pub genesis_count: usize,
    /// Blocks with no linked children
    pub tip_count: usize,
    /// Non-genesis blocks with no linked parent
    pub orphan_count: usize,
    /// Parent or gossip references that never resolved to a block
    pub unresolved_count: usize,
    /// Number of unique nodes seen across all messages
    pub node_count: usize,
    /// Earliest message timestamp
    pub earliest_timestamp: Option<DateTime<Utc>>,
    /// Latest message timestamp
    pub latest_timestamp: Option<DateTime<Utc>>,
}
