//! Log loading shared by every command
//!
//! Reads the log file, decodes it and builds the DAG index. Decoding is all
//! or nothing: a single bad record fails the load.

use anyhow::{Context, Result};
use dagscope_index::{DagIndex, LinkMode};
use dagscope_protocol::{DecoderConfig, MessageDecoder};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where to read the log from and how to interpret it
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Path to the message log
    pub path: PathBuf,
    /// Id assignment for decoded records
    pub decoder: DecoderConfig,
    /// Link resolution policy
    pub link_mode: LinkMode,
}

/// Read, decode and index a log file
pub fn load_index(options: &LoadOptions) -> Result<DagIndex> {
    let raw_log = read_log(&options.path)?;

    let messages = MessageDecoder::new(options.decoder.clone())
        .decode(&raw_log)
        .with_context(|| format!("Failed to decode log file: {}", options.path.display()))?;

    let index = DagIndex::from_messages(messages, options.link_mode);
    info!(
        blocks = index.len(),
        gossips = index.gossips().len(),
        unresolved = index.unresolved().len(),
        mode = ?options.link_mode,
        "Indexed log"
    );

    Ok(index)
}

/// Read a log file, reporting a missing file in operator terms
pub fn read_log(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(raw_log) => Ok(raw_log),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            anyhow::bail!("File '{}' not found", path.display())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read log file: {}", path.display())),
    }
}
