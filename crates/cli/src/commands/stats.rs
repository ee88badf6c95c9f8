//! Stats command implementation

use anyhow::{Context, Result};
use std::io::{self, Write};

use super::load::{load_index, LoadOptions};
use crate::render::write_stats;

/// Execute the stats command
pub fn execute_stats_command(options: &LoadOptions, json: bool) -> Result<()> {
    let stats = load_index(options)?.stats();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if json {
        serde_json::to_writer_pretty(&mut out, &stats).context("Failed to serialize stats")?;
        writeln!(out)?;
    } else {
        write_stats(&mut out, &stats)?;
    }

    Ok(())
}
