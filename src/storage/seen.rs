//! Seen-listing registry.
//!
//! Maps listing identifiers to the Unix timestamp they were first seen.
//! Entries are never removed: once an identifier is in here it is never
//! evaluated again. The whole map is rewritten after every scan via a
//! synced temp file and a rename, so a crash mid-write can't truncate it.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::types::FlipError;

#[derive(Debug, Clone, Default)]
pub struct SeenRegistry {
    /// Backing file; `None` for a registry that is never persisted.
    path: Option<PathBuf>,
    entries: BTreeMap<String, i64>,
}

impl SeenRegistry {
    /// A registry with no backing file. `flush` is a no-op.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the registry from a JSON file.
    /// A missing file is a fresh start, not an error. A blank file is
    /// treated as corrupt: `flush` never writes one.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!(path = %path.display(), "No seen registry found, starting fresh");
            return Ok(Self {
                path: Some(path.to_path_buf()),
                entries: BTreeMap::new(),
            });
        }

        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read seen registry from {}", path.display()))?;

        if json.trim().is_empty() {
            return Err(FlipError::Storage(format!(
                "seen registry {} is empty, refusing to start from scratch",
                path.display()
            ))
            .into());
        }

        let entries: BTreeMap<String, i64> = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse seen registry {}", path.display()))?;

        info!(path = %path.display(), entries = entries.len(), "Seen registry loaded");

        Ok(Self {
            path: Some(path.to_path_buf()),
            entries,
        })
    }

    pub fn has(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    /// Record `identifier` as seen at `timestamp` (in memory only).
    /// The first timestamp wins; returns `false` if it was already present.
    pub fn mark_seen(&mut self, identifier: &str, timestamp: i64) -> bool {
        if self.entries.contains_key(identifier) {
            return false;
        }
        self.entries.insert(identifier.to_string(), timestamp);
        true
    }

    pub fn first_seen(&self, identifier: &str) -> Option<i64> {
        self.entries.get(identifier).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Atomically replace the backing file with the current mapping.
    pub fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string(&self.entries)
            .context("Failed to serialise seen registry")?;

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = File::create(&tmp)
            .with_context(|| format!("Failed to create {}", tmp.display()))?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.sync_all())
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        drop(file);

        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        // Persist the rename itself; not supported for directories everywhere
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        debug!(path = %path.display(), entries = self.entries.len(), "Seen registry flushed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
