//! Human-readable output for the DAG walk, block details and statistics.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use dagscope_index::{BlockDetails, WalkEntry};
use dagscope_protocol::decoder::TIMESTAMP_FORMAT;
use dagscope_protocol::DagStats;

/// Render a timestamp in the same layout the log uses.
fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Write the walk as an indented tree, two spaces per level.
pub fn write_summary<W: Write>(out: &mut W, entries: &[WalkEntry<'_>]) -> io::Result<()> {
    for entry in entries {
        let prefix = "  ".repeat(entry.depth);
        let block = entry.block;

        let parents = if block.parents.is_empty() {
            "(no parents)".to_string()
        } else {
            format!("(parents: {})", block.parents.join(", "))
        };
        writeln!(
            out,
            "{}BLOCK: {} from {} {}",
            prefix,
            block.id(),
            block.envelope.from_node,
            parents
        )?;

        if let Some(tx) = &entry.transaction {
            writeln!(out, "{}  Transaction: {} → {} : {}", prefix, tx.from, tx.to, tx.amount)?;
        }

        for gossip in &entry.gossips {
            writeln!(
                out,
                "{}  - GOSSIP: {} heard about {}",
                prefix,
                gossip.envelope.from_node,
                gossip.heard_about.as_deref().unwrap_or("?")
            )?;
        }
    }

    Ok(())
}

/// Write the full detail view for one block.
pub fn write_details<W: Write>(out: &mut W, details: &BlockDetails<'_>) -> io::Result<()> {
    let block = details.block;
    let envelope = &block.envelope;

    writeln!(out, "\nDetails for {}:", block.id())?;
    writeln!(out, "From: {}", envelope.from_node)?;
    writeln!(out, "Type: {}", envelope.message_type)?;
    writeln!(out, "Timestamp: {}", timestamp(&envelope.timestamp))?;
    if block.parents.is_empty() {
        writeln!(out, "Parents: None")?;
    } else {
        writeln!(out, "Parents: {}", block.parents.join(", "))?;
    }
    writeln!(out, "Payload: {}", envelope.payload)?;

    if let Some(tx) = &details.transaction {
        writeln!(out, "\nTransaction Details:")?;
        writeln!(out, "From: {}", tx.from)?;
        writeln!(out, "To: {}", tx.to)?;
        writeln!(out, "Amount: {}", tx.amount)?;
    }

    if !details.children.is_empty() {
        writeln!(out, "\nChildren: {}", details.children.join(", "))?;
    }

    if !details.gossips.is_empty() {
        writeln!(out, "\nAssociated Gossips:")?;
        for gossip in &details.gossips {
            writeln!(
                out,
                "- {} at {}",
                gossip.envelope.from_node,
                timestamp(&gossip.envelope.timestamp)
            )?;
        }
    }

    Ok(())
}

pub fn write_not_found<W: Write>(out: &mut W, block_id: &str) -> io::Result<()> {
    writeln!(out, "Block {} not found.", block_id)
}

pub fn write_stats<W: Write>(out: &mut W, stats: &DagStats) -> io::Result<()> {
    writeln!(out, "DAG Statistics:")?;
    writeln!(out, "   Blocks: {}", stats.block_count)?;
    writeln!(out, "   Gossips: {}", stats.gossip_count)?;
    writeln!(out, "   Genesis blocks: {}", stats.genesis_count)?;
    writeln!(out, "   Tips: {}", stats.tip_count)?;
    writeln!(out, "   Orphans: {}", stats.orphan_count)?;
    writeln!(out, "   Unresolved references: {}", stats.unresolved_count)?;
    writeln!(out, "   Nodes: {}", stats.node_count)?;
    if let (Some(earliest), Some(latest)) = (&stats.earliest_timestamp, &stats.latest_timestamp) {
        writeln!(out, "   Time span: {} .. {}", timestamp(earliest), timestamp(latest))?;
    }
    Ok(())
}
