//! Shared types for the FLIPWATCH monitor.
//!
//! These types form the data model used across all modules.
//! Listing fragments, extracted fields and evaluations are transient
//! (rebuilt every scan); deal records are what ends up in the ledger.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Listing fragment
// ---------------------------------------------------------------------------

/// One candidate listing anchor parsed from a search results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFragment {
    /// Normalised absolute URL (no query string).
    pub url: String,
    /// Final non-empty path segment of the URL; the dedup key.
    pub identifier: String,
    /// Lowercased text content of the anchor.
    pub raw_text: String,
}

// ---------------------------------------------------------------------------
// Extracted fields
// ---------------------------------------------------------------------------

/// Structured data pulled out of a listing's raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    /// Asking price in whole currency units, if one was found.
    pub price: Option<i64>,
    /// Sum of matched defect surcharges (never negative).
    pub repair_cost: i64,
    pub model_guess: String,
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Qualitative profit bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Grade {
    Skip,
    Ok,
    Good,
}

impl Grade {
    /// Traffic-light marker used in alert messages.
    pub fn emoji(&self) -> &'static str {
        match self {
            Grade::Good => "🟢",
            Grade::Ok => "🟡",
            Grade::Skip => "🔴",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Good => write!(f, "GOOD"),
            Grade::Ok => write!(f, "OK"),
            Grade::Skip => write!(f, "SKIP"),
        }
    }
}

/// Result of scoring a priced listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub price: i64,
    pub repair_cost: i64,
    pub resale_estimate: i64,
    /// `resale_estimate - price - repair_cost`; may be negative.
    pub profit: i64,
    pub grade: Grade,
}

// ---------------------------------------------------------------------------
// Deal record
// ---------------------------------------------------------------------------

/// One accepted listing as written to the deal ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealRecord {
    pub timestamp: DateTime<Utc>,
    pub listing_id: String,
    pub price: i64,
    pub repair_cost: i64,
    pub resale_estimate: i64,
    pub profit: i64,
    pub grade: Grade,
    pub model_guess: String,
    pub url: String,
}

impl DealRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        fragment: &ListingFragment,
        model_guess: &str,
        evaluation: &Evaluation,
    ) -> Self {
        Self {
            timestamp,
            listing_id: fragment.identifier.clone(),
            price: evaluation.price,
            repair_cost: evaluation.repair_cost,
            resale_estimate: evaluation.resale_estimate,
            profit: evaluation.profit,
            grade: evaluation.grade,
            model_guess: model_guess.to_string(),
            url: fragment.url.clone(),
        }
    }

    /// Ledger row in header column order.
    pub fn to_row(&self) -> [String; 9] {
        [
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, false),
            self.listing_id.clone(),
            self.price.to_string(),
            self.repair_cost.to_string(),
            self.resale_estimate.to_string(),
            self.profit.to_string(),
            self.grade.to_string(),
            self.model_guess.clone(),
            self.url.clone(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Scan report
// ---------------------------------------------------------------------------

/// Counters for a single scan over all search targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub targets_scanned: usize,
    pub targets_failed: usize,
    /// Anchors whose URL looked like a listing.
    pub candidates: usize,
    pub already_seen: usize,
    pub rejected: usize,
    /// Newly accepted listings (ledger rows written or attempted).
    pub accepted: usize,
    pub notifications_failed: usize,
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "targets={}/{} candidates={} seen={} rejected={} accepted={}",
            self.targets_scanned - self.targets_failed,
            self.targets_scanned,
            self.candidates,
            self.already_seen,
            self.rejected,
            self.accepted,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for FLIPWATCH.
#[derive(Debug, thiserror::Error)]
pub enum FlipError {
    #[error("Missing required credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("HTTP {status} from {target}")]
    HttpStatus { target: String, status: u16 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
