//! In-memory BlockDAG index
//!
//! This crate turns a decoded message list into a navigable DAG: blocks by
//! id, parent→child links, genesis detection and per-block gossip, plus the
//! preorder walk used to render the DAG as a tree.

pub mod details;
pub mod index;
pub mod traversal;

// Re-export key types
pub use details::BlockDetails;
pub use index::{DagIndex, LinkMode, ReferenceKind, UnresolvedRef};
pub use traversal::WalkEntry;
