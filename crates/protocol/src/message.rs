//! Decoded log messages.
//!
//! A log record decodes into exactly one of two shapes. `TYPE: BLOCK`
//! records become [`Block`]s; every other type string becomes a [`Gossip`],
//! keeping the original string for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::payload::{extract_transaction, TransactionInfo};

/// The `TYPE` value that marks a block record.
pub const BLOCK_TYPE: &str = "BLOCK";

/// Header fields shared by every message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Sequential id assigned by decode order
    pub id: String,
    /// Originating node
    pub from_node: String,
    /// `TYPE` field exactly as it appeared in the log
    pub message_type: String,
    /// Parsed `TIMESTAMP` field
    pub timestamp: DateTime<Utc>,
    /// Trimmed text after the `PAYLOAD:` marker
    pub payload: String,
}

/// A node announcing a new block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(flatten)]
    pub envelope: Envelope,
    /// Parent block ids in source order, duplicates kept
    pub parents: Vec<String>,
}

impl Block {
    pub fn id(&self) -> &str {
        &self.envelope.id
    }

    /// A block with no declared parents.
    pub fn is_genesis(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn transaction(&self) -> Option<TransactionInfo> {
        extract_transaction(&self.envelope.payload)
    }
}

/// A node reporting that it heard about a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gossip {
    #[serde(flatten)]
    pub envelope: Envelope,
    /// Block referenced by `heard about <id>` in the payload
    pub heard_about: Option<String>,
}

impl Gossip {
    pub fn id(&self) -> &str {
        &self.envelope.id
    }

    pub fn transaction(&self) -> Option<TransactionInfo> {
        extract_transaction(&self.envelope.payload)
    }
}

/// A single decoded log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Message {
    Block(Block),
    Gossip(Gossip),
}

impl Message {
    pub fn envelope(&self) -> &Envelope {
        match self {
            Message::Block(block) => &block.envelope,
            Message::Gossip(gossip) => &gossip.envelope,
        }
    }

    pub fn id(&self) -> &str {
        &self.envelope().id
    }

    pub fn from_node(&self) -> &str {
        &self.envelope().from_node
    }

    pub fn message_type(&self) -> &str {
        &self.envelope().message_type
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.envelope().timestamp
    }

    pub fn payload(&self) -> &str {
        &self.envelope().payload
    }

    /// Transaction info embedded in the payload, computed on demand.
    pub fn transaction(&self) -> Option<TransactionInfo> {
        extract_transaction(self.payload())
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Message::Block(_))
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Message::Block(block) => Some(block),
            Message::Gossip(_) => None,
        }
    }

    pub fn as_gossip(&self) -> Option<&Gossip> {
        match self {
            Message::Gossip(gossip) => Some(gossip),
            Message::Block(_) => None,
        }
    }
}

impl From<Block> for Message {
    fn from(block: Block) -> Self {
        Message::Block(block)
    }
}

impl From<Gossip> for Message {
    fn from(gossip: Gossip) -> Self {
        Message::Gossip(gossip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn envelope(id: &str, message_type: &str, payload: &str) -> Envelope {
        Envelope {
            id: id.to_string(),
            from_node: "node1".to_string(),
            message_type: message_type.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            payload: payload.to_string(),
        }
    }

    #[test]
    fn test_block_accessors() {
        let block = Block {
            envelope: envelope("BDG-001", BLOCK_TYPE, "tx { from: a, to: b, amount: 5 }"),
            parents: vec![],
        };
        assert!(block.is_genesis());
        assert_eq!(block.id(), "BDG-001");
        assert_eq!(block.transaction().unwrap().amount, "5");

        let message = Message::from(block);
        assert!(message.is_block());
        assert!(message.as_gossip().is_none());
        assert_eq!(message.message_type(), "BLOCK");
        assert_eq!(message.from_node(), "node1");
    }

    #[test]
    fn test_gossip_keeps_original_type() {
        let gossip = Gossip {
            envelope: envelope("BDG-002", "ECHO", "heard about BDG-001"),
            heard_about: Some("BDG-001".to_string()),
        };
        let message = Message::from(gossip);
        assert!(!message.is_block());
        assert_eq!(message.message_type(), "ECHO");
        assert_eq!(message.as_gossip().unwrap().heard_about.as_deref(), Some("BDG-001"));
        assert!(message.transaction().is_none());
    }

    #[test]
    fn test_message_json_shape() {
        let message = Message::from(Block {
            envelope: envelope("BDG-001", BLOCK_TYPE, "genesis"),
            parents: vec!["BDG-000".to_string()],
        });
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["kind"], "block");
        assert_eq!(json["id"], "BDG-001");
        assert_eq!(json["parents"][0], "BDG-000");
    }
}
