//! Query command implementation
//!
//! Looks blocks up by operator-supplied id, either from the command line or
//! from an interactive prompt. Unknown ids are reported, never treated as
//! errors.

use anyhow::{Context, Result};
use dagscope_index::{BlockDetails, DagIndex};
use serde::Serialize;
use std::io::{self, BufRead, Write};

use super::load::{load_index, LoadOptions};
use crate::render::{write_details, write_not_found};

/// JSON shape for one queried id
#[derive(Serialize)]
struct QueryResult<'a> {
    id: &'a str,
    details: Option<BlockDetails<'a>>,
}

/// Execute the query command
pub fn execute_query_command(options: &LoadOptions, ids: &[String], json: bool) -> Result<()> {
    let index = load_index(options)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if ids.is_empty() {
        let stdin = io::stdin();
        run_interactive(&index, stdin.lock(), &mut out)?;
        return Ok(());
    }

    if json {
        let results: Vec<QueryResult<'_>> = ids
            .iter()
            .map(|id| QueryResult {
                id,
                details: index.block_details(id),
            })
            .collect();
        serde_json::to_writer_pretty(&mut out, &results).context("Failed to serialize query results")?;
        writeln!(out)?;
        return Ok(());
    }

    for id in ids {
        show_block(&index, id, &mut out)?;
    }
    Ok(())
}

fn show_block<W: Write>(index: &DagIndex, block_id: &str, out: &mut W) -> io::Result<()> {
    match index.block_details(block_id) {
        Some(details) => write_details(out, &details),
        None => write_not_found(out, block_id),
    }
}

/// Prompt for block ids until `quit` or end of input
pub fn run_interactive<R: BufRead, W: Write>(index: &DagIndex, input: R, out: &mut W) -> io::Result<()> {
    writeln!(out, "\nInteractive mode (type 'quit' to exit)")?;

    let mut lines = input.lines();
    loop {
        write!(out, "\nQuery block ID: ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;
        let block_id = line.trim();

        if block_id.eq_ignore_ascii_case("quit") {
            break;
        }
        if block_id.is_empty() {
            continue;
        }

        show_block(index, block_id, out)?;
    }

    Ok(())
}
