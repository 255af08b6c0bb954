//! Scheduler loop.
//!
//! Alternates between SCANNING and SLEEPING until a stop signal arrives.
//! The signal is only acted on between scans: a scan that has started
//! always finishes (and flushes the registry) before the loop exits.

use chrono::Utc;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use super::scanner::Scanner;
use crate::notify::format_heartbeat;
use crate::types::ScanReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Scanning,
    Sleeping,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Scanning => write!(f, "SCANNING"),
            Phase::Sleeping => write!(f, "SLEEPING"),
        }
    }
}

pub struct Scheduler {
    scanner: Scanner,
    interval: Duration,
    heartbeat_every: u64,
    phase: Phase,
    scan_count: u64,
    last_hits: usize,
}

impl Scheduler {
    pub fn new(scanner: Scanner, interval: Duration, heartbeat_every: u64) -> Self {
        Self {
            scanner,
            interval,
            heartbeat_every: heartbeat_every.max(1),
            phase: Phase::Sleeping,
            scan_count: 0,
            last_hits: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn scan_count(&self) -> u64 {
        self.scan_count
    }

    pub fn last_hits(&self) -> usize {
        self.last_hits
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    fn heartbeat_due(&self) -> bool {
        self.scan_count % self.heartbeat_every == 0
    }

    /// One SCANNING phase: scan every target, then send a heartbeat if due.
    pub async fn run_once(&mut self) -> ScanReport {
        self.phase = Phase::Scanning;
        self.scan_count += 1;
        info!(scan = self.scan_count, "Starting scan");

        let report = self.scanner.scan().await;
        self.last_hits = report.accepted;

        if self.heartbeat_due() {
            let text = format_heartbeat(self.scan_count, self.last_hits, Utc::now());
            match self.scanner.notifier().send(&text).await {
                Ok(()) => info!(scan = self.scan_count, hits = self.last_hits, "Heartbeat sent"),
                Err(e) => warn!(error = %format!("{e:#}"), "Heartbeat delivery failed"),
            }
        }

        report
    }

    /// Scan, sleep, repeat until `shutdown` resolves.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            interval_secs = self.interval.as_secs(),
            heartbeat_every = self.heartbeat_every,
            "Entering scan loop"
        );

        loop {
            self.run_once().await;

            self.phase = Phase::Sleeping;
            info!(secs = self.interval.as_secs(), "Sleeping");

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut shutdown => {
                    info!(scans = self.scan_count, "Shutdown signal received");
                    break;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
