//! Payload sub-grammars.
//!
//! Message payloads are free text. Two embedded patterns are recognised:
//! transaction records (`tx { from: X, to: Y, amount: N }`, optionally
//! prefixed with `mint`) and gossip references (`heard about <PREFIX>-<digits>`).
//! A payload that matches neither is still valid; it simply carries no
//! structured data.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Transaction patterns, tried in order. The first match wins.
static TRANSACTION_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(
            r"tx\s*\{\s*from\s*:\s*(?P<from>\w+)\s*,\s*to\s*:\s*(?P<to>\w+)\s*,\s*amount\s*:\s*(?P<amount>\d+)",
        )
        .expect("transaction pattern is valid"),
        Regex::new(
            r"mint tx\s*\{\s*from\s*:\s*(?P<from>\w+)\s*,\s*to\s*:\s*(?P<to>\w+)\s*,\s*amount\s*:\s*(?P<amount>\d+)",
        )
        .expect("mint transaction pattern is valid"),
    ]
});

/// Transaction fields extracted from a payload.
///
/// The amount is kept as the decimal text found in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
    pub from: String,
    pub to: String,
    pub amount: String,
}

/// Extract transaction info from a payload, if it contains one.
pub fn extract_transaction(payload: &str) -> Option<TransactionInfo> {
    TRANSACTION_PATTERNS.iter().find_map(|pattern| {
        pattern.captures(payload).map(|caps| TransactionInfo {
            from: caps["from"].to_string(),
            to: caps["to"].to_string(),
            amount: caps["amount"].to_string(),
        })
    })
}

/// Matcher for `heard about <prefix>-<digits>` gossip references.
///
/// The prefix is matched literally, so prefixes containing `-` or regex
/// metacharacters are recognised as written.
#[derive(Debug, Clone)]
pub struct HeardAboutPattern {
    regex: Regex,
}

impl HeardAboutPattern {
    pub fn new(prefix: &str) -> Self {
        let pattern = format!(r"heard about (?P<id>{}-\d+)", regex::escape(prefix));
        Self {
            regex: Regex::new(&pattern).expect("escaped heard-about pattern is valid"),
        }
    }

    /// Find the first reference in a payload.
    pub fn find(&self, payload: &str) -> Option<String> {
        self.regex
            .captures(payload)
            .map(|caps| caps["id"].to_string())
    }
}

/// Extract the text following the `PAYLOAD:` marker.
///
/// The payload ends at the next `---` or at the end of the record and is
/// trimmed. A record without the marker has an empty payload.
pub fn extract_payload(record: &str) -> String {
    const MARKER: &str = "PAYLOAD:";

    let Some(start) = record.find(MARKER) else {
        return String::new();
    };
    let rest = &record[start + MARKER.len()..];
    let end = rest.find("---").unwrap_or(rest.len());
    rest[..end].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_extraction() {
        let tx = extract_transaction("tx { from: alice, to: bob, amount: 10 }").unwrap();
        assert_eq!(
            tx,
            TransactionInfo {
                from: "alice".to_string(),
                to: "bob".to_string(),
                amount: "10".to_string(),
            }
        );
    }

    #[test]
    fn test_transaction_whitespace_tolerance() {
        let tx = extract_transaction("note tx{from:carol ,to :dave,  amount:  007}").unwrap();
        assert_eq!(tx.from, "carol");
        assert_eq!(tx.to, "dave");
        assert_eq!(tx.amount, "007");
    }

    #[test]
    fn test_mint_transaction() {
        let tx = extract_transaction("mint tx { from: treasury, to: n4, amount: 500 }").unwrap();
        assert_eq!(tx.from, "treasury");
        assert_eq!(tx.to, "n4");
        assert_eq!(tx.amount, "500");
    }

    #[test]
    fn test_no_transaction() {
        assert!(extract_transaction("genesis").is_none());
        assert!(extract_transaction("tx { from: a, to: b, amount: lots }").is_none());
        assert!(extract_transaction("").is_none());
    }

    #[test]
    fn test_heard_about() {
        let pattern = HeardAboutPattern::new("BDG");
        assert_eq!(
            pattern.find("node3 heard about BDG-002"),
            Some("BDG-002".to_string())
        );
        assert_eq!(
            pattern.find("heard about BDG-7 and heard about BDG-9"),
            Some("BDG-7".to_string())
        );
        assert!(pattern.find("node3 saw BDG-002").is_none());
        assert!(pattern.find("heard about BDG-").is_none());
    }

    #[test]
    fn test_heard_about_respects_prefix() {
        let payload = "heard about XYZ-001, later heard about BDG-004";
        assert_eq!(HeardAboutPattern::new("BDG").find(payload), Some("BDG-004".to_string()));
        assert_eq!(HeardAboutPattern::new("XYZ").find(payload), Some("XYZ-001".to_string()));
    }

    #[test]
    fn test_heard_about_hyphenated_prefix() {
        let pattern = HeardAboutPattern::new("SIM-A");
        assert_eq!(
            pattern.find("n2 heard about SIM-A-001"),
            Some("SIM-A-001".to_string())
        );
        assert!(pattern.find("heard about SIM-B-001").is_none());

        let dotted = HeardAboutPattern::new("a.b");
        assert_eq!(dotted.find("heard about a.b-12"), Some("a.b-12".to_string()));
        assert!(dotted.find("heard about axb-12").is_none());
    }

    #[test]
    fn test_payload_extraction() {
        let record = "FROM: n1\nTYPE: BLOCK\nPAYLOAD:   tx { from: a, to: b, amount: 5 }\n";
        assert_eq!(extract_payload(record), "tx { from: a, to: b, amount: 5 }");
    }

    #[test]
    fn test_payload_multiline_stops_at_separator() {
        let record = "FROM: n1\nPAYLOAD: first line\nsecond line\n---";
        assert_eq!(extract_payload(record), "first line\nsecond line");
    }

    #[test]
    fn test_missing_payload_is_empty() {
        assert_eq!(extract_payload("FROM: n1\nTYPE: GOSSIP"), "");
        assert_eq!(extract_payload("FROM: n1\nPAYLOAD:"), "");
    }
}
