//! Decoder errors module

use serde::Serialize;
use thiserror::Error;

/// Raw record content captured when a record cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordDiagnostics {
    /// The record exactly as segmented from the log
    pub raw: String,
    /// The record split into lines, untrimmed
    pub lines: Vec<String>,
}

impl RecordDiagnostics {
    pub fn capture(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            lines: raw.split('\n').map(str::to_string).collect(),
        }
    }
}

/// Errors raised while decoding a message log.
///
/// Every variant aborts the whole decode; no partial message list is produced.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("No valid messages found. Check your message separators ('---')")]
    NoMessagesFound,

    #[error("Required field '{field}' not found in record {record}")]
    MissingField {
        field: String,
        /// 1-based position of the record in the log
        record: usize,
        diagnostics: RecordDiagnostics,
    },

    #[error("Invalid timestamp '{value}' in record {record}: {reason}")]
    InvalidTimestamp {
        value: String,
        record: usize,
        reason: String,
    },
}

impl DecodeError {
    /// Diagnostic context for the failing record, if the error carries one.
    pub fn diagnostics(&self) -> Option<&RecordDiagnostics> {
        match self {
            DecodeError::MissingField { diagnostics, .. } => Some(diagnostics),
            _ => None,
        }
    }

    /// Position of the offending record, if the error is record-scoped.
    pub fn record(&self) -> Option<usize> {
        match self {
            DecodeError::NoMessagesFound => None,
            DecodeError::MissingField { record, .. } | DecodeError::InvalidTimestamp { record, .. } => {
                Some(*record)
            }
        }
    }
}
