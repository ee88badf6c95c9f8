//! Decoder configuration.

use serde::{Deserialize, Serialize};

/// Default prefix for assigned message ids (`BDG-001`, `BDG-002`, ...).
pub const DEFAULT_ID_PREFIX: &str = "BDG";

/// How sequential ordinals are assigned to segmented records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdNumbering {
    /// The first record is `001`
    #[default]
    Sequential,
    /// The first record is `002`, matching logs produced by older tooling
    Legacy,
}

impl IdNumbering {
    /// Ordinal for the record at zero-based `index`.
    pub fn ordinal(self, index: usize) -> usize {
        match self {
            IdNumbering::Sequential => index + 1,
            IdNumbering::Legacy => index + 2,
        }
    }
}

/// Configuration for [`crate::MessageDecoder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Prefix of assigned ids and of recognised `heard about` references
    pub id_prefix: String,
    /// Ordinal assignment policy
    pub numbering: IdNumbering,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            numbering: IdNumbering::default(),
        }
    }
}

impl DecoderConfig {
    /// Id for the record at zero-based `index`.
    pub fn message_id(&self, index: usize) -> String {
        format!("{}-{:03}", self.id_prefix, self.numbering.ordinal(index))
    }
}
