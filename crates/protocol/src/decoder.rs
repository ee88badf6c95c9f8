//! Message Decoder Module
//!
//! Turns a raw log blob into an ordered list of typed messages. Decoding
//! happens in three steps:
//!
//! 1. Segmentation: line endings are normalised and the text is split on
//!    separator lines consisting of exactly `---`. Blank fragments are dropped.
//! 2. Field extraction: header fields are looked up line by line, accepting
//!    `# NAME:`, `#NAME:` and `NAME:` prefixes in that order.
//! 3. Classification: `TYPE: BLOCK` records become blocks, everything else
//!    becomes gossip.
//!
//! Any failure aborts the whole decode.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::{debug, info, warn};

use crate::config::DecoderConfig;
use crate::errors::{DecodeError, RecordDiagnostics};
use crate::message::{Block, Envelope, Gossip, Message, BLOCK_TYPE};
use crate::payload::{extract_payload, HeardAboutPattern};
use crate::Result;

/// Fixed timestamp layout: UTC, second precision, literal `Z`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Digit positions are `D`, everything else is literal.
const TIMESTAMP_LAYOUT: &str = "DDDD-DD-DDTDD:DD:DDZ";

/// Separator line between records, including its line break.
const SEPARATOR: &str = "---\n";

/// Decoder for BlockDAG simulation logs.
#[derive(Debug, Clone)]
pub struct MessageDecoder {
    config: DecoderConfig,
    heard_about: HeardAboutPattern,
}

impl Default for MessageDecoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

impl MessageDecoder {
    /// Create a decoder with the given configuration
    pub fn new(config: DecoderConfig) -> Self {
        let heard_about = HeardAboutPattern::new(&config.id_prefix);
        Self { config, heard_about }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a whole log into messages, in log order.
    pub fn decode(&self, raw_log: &str) -> Result<Vec<Message>> {
        let records = segment(raw_log);
        if records.is_empty() {
            warn!("Log contains no records");
            return Err(DecodeError::NoMessagesFound);
        }

        info!("Found {} messages to parse", records.len());

        records
            .iter()
            .enumerate()
            .map(|(index, record)| self.decode_record(index, record))
            .collect()
    }

    /// Decode one segmented record. `index` is its zero-based log position.
    pub fn decode_record(&self, index: usize, record: &str) -> Result<Message> {
        let position = index + 1;
        let id = self.config.message_id(index);

        let from_node = required_field(record, "FROM", position)?;
        let message_type = required_field(record, "TYPE", position)?;
        let timestamp = parse_timestamp(required_field(record, "TIMESTAMP", position)?, position)?;
        let payload = extract_payload(record);

        let envelope = Envelope {
            id,
            from_node: from_node.to_string(),
            message_type: message_type.to_string(),
            timestamp,
            payload,
        };

        let message = if message_type == BLOCK_TYPE {
            let parents = extract_field(record, "PARENTS")
                .map(parse_parents)
                .ok_or_else(|| missing_field("PARENTS", position, record))?;
            Message::Block(Block { envelope, parents })
        } else {
            let heard_about = self.heard_about.find(&envelope.payload);
            Message::Gossip(Gossip {
                envelope,
                heard_about,
            })
        };

        debug!(
            id = message.id(),
            message_type = message.message_type(),
            from = message.from_node(),
            "Decoded record {}",
            position
        );

        Ok(message)
    }
}

/// Decode a log with the default configuration.
pub fn decode(raw_log: &str) -> Result<Vec<Message>> {
    MessageDecoder::default().decode(raw_log)
}

/// Split a raw log into trimmed, non-empty records.
pub fn segment(raw_log: &str) -> Vec<String> {
    let normalized = raw_log.replace("\r\n", "\n").replace('\r', "\n");

    let mut records = Vec::new();
    let mut current = String::new();

    for line in normalized.split_inclusive('\n') {
        if line == SEPARATOR {
            push_record(&mut records, &mut current);
        } else {
            current.push_str(line);
        }
    }
    push_record(&mut records, &mut current);

    records
}

fn push_record(records: &mut Vec<String>, current: &mut String) {
    let record = current.trim();
    if !record.is_empty() {
        records.push(record.to_string());
    }
    current.clear();
}

/// Find a header field value in a record.
///
/// Lines are trimmed before matching. For each line the prefixes `# NAME:`,
/// `#NAME:` and `NAME:` are tried in that order; the first matching line wins.
pub fn extract_field<'a>(record: &'a str, name: &str) -> Option<&'a str> {
    let prefixes = [
        format!("# {}:", name),
        format!("#{}:", name),
        format!("{}:", name),
    ];

    record.lines().map(str::trim).find_map(|line| {
        prefixes
            .iter()
            .find_map(|prefix| line.strip_prefix(prefix.as_str()))
            .map(str::trim)
    })
}

fn required_field<'a>(record: &'a str, name: &str, position: usize) -> Result<&'a str> {
    match extract_field(record, name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(missing_field(name, position, record)),
    }
}

fn missing_field(name: &str, position: usize, record: &str) -> DecodeError {
    let diagnostics = RecordDiagnostics::capture(record);
    warn!(
        field = name,
        record = position,
        raw = ?diagnostics.raw,
        lines = ?diagnostics.lines,
        "Required field not found"
    );
    DecodeError::MissingField {
        field: name.to_string(),
        record: position,
        diagnostics,
    }
}

/// Parse a `YYYY-MM-DDTHH:MM:SSZ` timestamp.
pub fn parse_timestamp(value: &str, position: usize) -> Result<DateTime<Utc>> {
    let invalid = |reason: String| DecodeError::InvalidTimestamp {
        value: value.to_string(),
        record: position,
        reason,
    };

    if !has_timestamp_shape(value) {
        return Err(invalid(format!("expected format {}", TIMESTAMP_FORMAT)));
    }

    let naive = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map_err(|e| invalid(e.to_string()))?;

    Ok(Utc.from_utc_datetime(&naive))
}

/// Byte-level layout check. chrono alone accepts signs and one-digit fields.
fn has_timestamp_shape(value: &str) -> bool {
    value.len() == TIMESTAMP_LAYOUT.len()
        && value
            .bytes()
            .zip(TIMESTAMP_LAYOUT.bytes())
            .all(|(byte, expected)| match expected {
                b'D' => byte.is_ascii_digit(),
                _ => byte == expected,
            })
}

/// Parse a bracketed parent list such as `[BDG-001, BDG-002]`.
///
/// Order and duplicates are preserved. Blank input or `[]` yields no parents.
pub fn parse_parents(value: &str) -> Vec<String> {
    let value = value.trim();
    let inner = value
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(value);

    if inner.trim().is_empty() {
        return Vec::new();
    }

    inner.split(',').map(|parent| parent.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdNumbering;
    use crate::payload::TransactionInfo;
    use chrono::TimeZone;

    const TWO_BLOCKS: &str = "FROM: n1\nTYPE: BLOCK\nTIMESTAMP: 2024-01-01T00:00:00Z\nPARENTS: []\nPAYLOAD: genesis\n---\nFROM: n2\nTYPE: BLOCK\nTIMESTAMP: 2024-01-01T00:00:05Z\nPARENTS: [BDG-001]\nPAYLOAD: tx { from: a, to: b, amount: 5 }\n";

    #[test]
    fn test_segment_counts_non_empty_records() {
        let log = "A: 1\n---\n\n   \n---\nB: 2\n---\n---\nC: 3";
        assert_eq!(segment(log), vec!["A: 1", "B: 2", "C: 3"]);
    }

    #[test]
    fn test_segment_normalizes_line_endings() {
        let log = "A: 1\r\n---\r\nB: 2\r---\rC: 3\r\n";
        assert_eq!(segment(log), vec!["A: 1", "B: 2", "C: 3"]);
    }

    #[test]
    fn test_segment_requires_exact_separator_line() {
        let log = "A: 1\n --- \nstill A\n----\nstill A\n---\nB: 2";
        let records = segment(log);
        assert_eq!(records.len(), 2);
        assert!(records[0].ends_with("still A"));
    }

    #[test]
    fn test_extract_field_prefix_variants() {
        assert_eq!(extract_field("# FROM: n1", "FROM"), Some("n1"));
        assert_eq!(extract_field("#FROM:n2", "FROM"), Some("n2"));
        assert_eq!(extract_field("   FROM:   n3   ", "FROM"), Some("n3"));
        assert_eq!(extract_field("TYPE: BLOCK", "FROM"), None);
        assert_eq!(extract_field("FROM_NODE: x", "FROM"), None);
    }

    #[test]
    fn test_extract_field_first_line_wins() {
        let record = "FROM: first\n# FROM: second";
        assert_eq!(extract_field(record, "FROM"), Some("first"));
    }

    #[test]
    fn test_parse_parents() {
        assert!(parse_parents("[]").is_empty());
        assert!(parse_parents("").is_empty());
        assert!(parse_parents("[  ]").is_empty());
        assert_eq!(parse_parents("[P1, P2]"), vec!["P1", "P2"]);
        assert_eq!(parse_parents("[P2,P1 , P2]"), vec!["P2", "P1", "P2"]);
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2024-03-05T12:34:56Z", 1).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 5, 12, 34, 56).unwrap());

        for bad in [
            "2024-03-05 12:34:56Z",
            "2024-03-05T12:34:56",
            "2024-03-05T12:34:56.123Z",
            "2024-03-05T12:34:56+00:00",
            "2024-13-05T12:34:56Z",
            "+2024-01-01T0:00:00Z",
            "+2024-1-01T00:00:00Z",
            "2024-01-01t00:00:00Z",
            "２024-01-01T00:00:00Z",
            "yesterday",
        ] {
            let err = parse_timestamp(bad, 4).unwrap_err();
            assert!(
                matches!(err, DecodeError::InvalidTimestamp { record: 4, .. }),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_decode_end_to_end() {
        let messages = decode(TWO_BLOCKS).unwrap();
        assert_eq!(messages.len(), 2);

        let first = messages[0].as_block().unwrap();
        assert_eq!(first.id(), "BDG-001");
        assert!(first.is_genesis());
        assert_eq!(first.envelope.payload, "genesis");

        let second = messages[1].as_block().unwrap();
        assert_eq!(second.id(), "BDG-002");
        assert_eq!(second.parents, vec!["BDG-001"]);
        assert_eq!(
            second.transaction(),
            Some(TransactionInfo {
                from: "a".to_string(),
                to: "b".to_string(),
                amount: "5".to_string(),
            })
        );
    }

    #[test]
    fn test_legacy_numbering_starts_at_two() {
        let decoder = MessageDecoder::new(DecoderConfig {
            numbering: IdNumbering::Legacy,
            ..DecoderConfig::default()
        });
        let messages = decoder.decode(TWO_BLOCKS).unwrap();
        assert_eq!(messages[0].id(), "BDG-002");
        assert_eq!(messages[1].id(), "BDG-003");
    }

    #[test]
    fn test_hyphenated_prefix_keeps_gossip_reference() {
        let decoder = MessageDecoder::new(DecoderConfig {
            id_prefix: "SIM-A".to_string(),
            ..DecoderConfig::default()
        });
        let log = "FROM: n1\nTYPE: BLOCK\nTIMESTAMP: 2024-01-01T00:00:00Z\nPARENTS: []\n---\nFROM: n2\nTYPE: GOSSIP\nTIMESTAMP: 2024-01-01T00:00:01Z\nPAYLOAD: heard about SIM-A-001\n";
        let messages = decoder.decode(log).unwrap();

        assert_eq!(messages[0].id(), "SIM-A-001");
        let gossip = messages[1].as_gossip().unwrap();
        assert_eq!(gossip.heard_about.as_deref(), Some("SIM-A-001"));
    }

    #[test]
    fn test_decode_gossip_and_unknown_types() {
        let log = "# FROM: n3\n# TYPE: GOSSIP\n# TIMESTAMP: 2024-01-01T00:00:07Z\nPAYLOAD: node3 heard about BDG-002\n---\nFROM: n4\nTYPE: PING\nTIMESTAMP: 2024-01-01T00:00:08Z\n";
        let messages = decode(log).unwrap();

        let gossip = messages[0].as_gossip().unwrap();
        assert_eq!(gossip.heard_about.as_deref(), Some("BDG-002"));
        assert_eq!(gossip.envelope.message_type, "GOSSIP");

        let ping = messages[1].as_gossip().unwrap();
        assert_eq!(ping.envelope.message_type, "PING");
        assert!(ping.heard_about.is_none());
        assert_eq!(ping.envelope.payload, "");
    }

    #[test]
    fn test_gossip_does_not_need_parents() {
        let log = "FROM: n3\nTYPE: GOSSIP\nTIMESTAMP: 2024-01-01T00:00:07Z\nPAYLOAD: nothing to report";
        assert!(decode(log).is_ok());
    }

    #[test]
    fn test_missing_timestamp_fails_whole_decode() {
        let log = "FROM: n1\nTYPE: BLOCK\nTIMESTAMP: 2024-01-01T00:00:00Z\nPARENTS: []\n---\nFROM: n2\nTYPE: BLOCK\nPARENTS: []\nPAYLOAD: x";
        let err = decode(log).unwrap_err();
        match &err {
            DecodeError::MissingField { field, record, diagnostics } => {
                assert_eq!(field, "TIMESTAMP");
                assert_eq!(*record, 2);
                assert_eq!(diagnostics.lines.len(), 4);
                assert_eq!(diagnostics.lines[0], "FROM: n2");
                assert!(diagnostics.raw.contains("PARENTS: []"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.record(), Some(2));
        assert!(err.diagnostics().is_some());
    }

    #[test]
    fn test_block_requires_parents() {
        let log = "FROM: n1\nTYPE: BLOCK\nTIMESTAMP: 2024-01-01T00:00:00Z\nPAYLOAD: genesis";
        let err = decode(log).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { ref field, .. } if field == "PARENTS"));
    }

    #[test]
    fn test_blank_field_counts_as_missing() {
        let log = "FROM:\nTYPE: GOSSIP\nTIMESTAMP: 2024-01-01T00:00:00Z";
        let err = decode(log).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { ref field, .. } if field == "FROM"));
    }

    #[test]
    fn test_empty_log() {
        assert!(matches!(decode(""), Err(DecodeError::NoMessagesFound)));
        assert!(matches!(decode("\n---\n  \n---\n"), Err(DecodeError::NoMessagesFound)));
    }
}
