//! Summary and monitor command implementation
//!
//! `summary` prints the DAG as an indented tree. `monitor` does the same and
//! then drops into the interactive query loop.

use anyhow::{Context, Result};
use std::io::{self, Write};

use super::load::{load_index, LoadOptions};
use super::query::run_interactive;
use crate::render::write_summary;

/// Execute the summary command
pub fn execute_summary_command(options: &LoadOptions, json: bool) -> Result<()> {
    let index = load_index(options)?;
    let walk = index.walk();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if json {
        serde_json::to_writer_pretty(&mut out, &walk).context("Failed to serialize summary")?;
        writeln!(out)?;
    } else {
        write_summary(&mut out, &walk)?;
    }

    Ok(())
}

/// Execute the monitor command
pub fn execute_monitor_command(options: &LoadOptions) -> Result<()> {
    let index = load_index(options)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "\n=== BlockDAG Message Propagation Summary ===")?;
    write_summary(&mut out, &index.walk())?;

    run_interactive(&index, stdin.lock(), &mut out)?;
    Ok(())
}
