//! Dagscope protocol types and log decoding
//!
//! This crate defines the message model for BlockDAG simulation logs and
//! the decoder that turns a raw log into typed [`Message`]s, including the
//! payload sub-grammars for transactions and gossip references.

pub mod config;
pub mod dag;
pub mod decoder;
pub mod errors;
pub mod message;
pub mod payload;

pub use config::{DecoderConfig, IdNumbering, DEFAULT_ID_PREFIX};
pub use dag::DagStats;
pub use decoder::{decode, MessageDecoder};
pub use errors::{DecodeError, RecordDiagnostics};
pub use message::{Block, Envelope, Gossip, Message, BLOCK_TYPE};
pub use payload::{extract_transaction, HeardAboutPattern, TransactionInfo};

/// Result type for decode operations
pub type Result<T> = std::result::Result<T, DecodeError>;
