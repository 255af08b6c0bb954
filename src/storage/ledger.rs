//! Append-only deal ledger.
//!
//! One CSV row per accepted listing. The header is written when the file
//! is created (or found empty) and never again; existing rows are never
//! touched.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::types::DealRecord;

/// Ledger column names, in row order.
pub const LEDGER_HEADER: [&str; 9] = [
    "timestamp_utc",
    "listing_id",
    "price",
    "repair_est",
    "resale_est",
    "profit_est",
    "grade",
    "model_guess",
    "url",
];

#[derive(Debug, Clone)]
pub struct DealLedger {
    path: PathBuf,
}

impl DealLedger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, writing the header first if the file is new.
    pub fn append(&self, record: &DealRecord) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open ledger {}", self.path.display()))?;

        let needs_header = file
            .metadata()
            .with_context(|| format!("Failed to stat ledger {}", self.path.display()))?
            .len()
            == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer
                .write_record(LEDGER_HEADER)
                .context("Failed to write ledger header")?;
        }

        writer
            .write_record(record.to_row())
            .context("Failed to write ledger row")?;
        writer.flush().context("Failed to flush ledger")?;

        debug!(path = %self.path.display(), listing_id = %record.listing_id, "Deal recorded");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
