//! Interaction log persistence.
//!
//! The log is stored as a pretty-printed JSON array of interactions. Writes go
//! to a temp file next to the target and are renamed into place, so the file
//! is never left half-written.

use anyhow::{Context, Result};
use insight_common::{Agent, Interaction};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Write data to a file atomically using temp file + rename
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&temp_path, path)
}

pub fn save(path: &Path, interactions: &[Interaction]) -> Result<()> {
    let json = serde_json::to_string_pretty(interactions)
        .context("failed to serialize interaction log")?;
    atomic_write(path, json.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), count = interactions.len(), "interaction log saved");
    Ok(())
}

/// A missing file is an empty log
pub fn load(path: &Path) -> Result<Vec<Interaction>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid interaction log", path.display()))
}

/// Replace the agent's log with the file content; returns the kept count
pub fn load_into(agent: &mut Agent, path: &Path) -> Result<usize> {
    let interactions = load(path)?;
    agent.import_memory(interactions);
    let kept = agent.memory_summary().total;
    info!(path = %path.display(), kept, "interaction log loaded");
    Ok(kept)
}

pub fn save_from(agent: &Agent, path: &Path) -> Result<usize> {
    let interactions = agent.export_memory();
    save(path, &interactions)?;
    Ok(interactions.len())
}
