//! Scan orchestrator.
//!
//! One scan walks every configured search target in order:
//! fetch → parse anchors → filter/score each listing → ledger + alert.
//! A failing target is logged and skipped; the others still run. The seen
//! registry is flushed once, after all targets.
//!
//! Accepted listings are marked seen *before* the alert goes out; a failed
//! delivery is never retried.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::config::SearchConfig;
use crate::evaluation::{Decision, ListingEvaluator};
use crate::marketplace::{parse_anchors, Anchor, PageSource};
use crate::notify::{format_deal_alert, Notifier};
use crate::storage::{DealLedger, SeenRegistry};
use crate::types::{DealRecord, Evaluation, ListingFragment, ScanReport};

pub struct Scanner {
    targets: Vec<String>,
    product_keyword: String,
    evaluator: ListingEvaluator,
    source: Box<dyn PageSource>,
    notifier: Box<dyn Notifier>,
    registry: SeenRegistry,
    ledger: DealLedger,
}

impl Scanner {
    pub fn new(
        search: &SearchConfig,
        evaluator: ListingEvaluator,
        source: Box<dyn PageSource>,
        notifier: Box<dyn Notifier>,
        registry: SeenRegistry,
        ledger: DealLedger,
    ) -> Self {
        Self {
            targets: search.urls.clone(),
            product_keyword: search.product_keyword.clone(),
            evaluator,
            source,
            notifier,
            registry,
            ledger,
        }
    }

    pub fn registry(&self) -> &SeenRegistry {
        &self.registry
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Run one full scan over all search targets.
    ///
    /// Never fails: every error is absorbed at the target, listing or
    /// transport level and reflected in the returned counters.
    pub async fn scan(&mut self) -> ScanReport {
        let mut report = ScanReport::default();
        let targets = self.targets.clone();

        info!(targets = targets.len(), known = self.registry.len(), "Scanning marketplace");

        for target in &targets {
            report.targets_scanned += 1;

            let html = match self.source.fetch_page(target).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(url = %target, error = %format!("{e:#}"), "Search target failed, skipping");
                    report.targets_failed += 1;
                    continue;
                }
            };

            for anchor in parse_anchors(&html) {
                self.process_anchor(&anchor, &mut report).await;
            }
        }

        // On failure the in-memory registry stays authoritative until restart
        if let Err(e) = self.registry.flush() {
            error!(error = %format!("{e:#}"), "Failed to persist seen registry");
        }

        info!(%report, notifications_failed = report.notifications_failed, "Scan complete");

        report
    }

    async fn process_anchor(&mut self, anchor: &Anchor, report: &mut ScanReport) {
        let Some(fragment) = self.evaluator.candidate(&anchor.href, &anchor.text) else {
            return;
        };
        report.candidates += 1;

        match self.evaluator.assess(&fragment, &self.registry) {
            Decision::AlreadySeen => report.already_seen += 1,
            Decision::Rejected { .. } => {
                self.registry.mark_seen(&fragment.identifier, Utc::now().timestamp());
                report.rejected += 1;
            }
            Decision::Accepted { model_guess, evaluation } => {
                self.record_deal(&fragment, &model_guess, &evaluation, report).await;
            }
        }
    }

    async fn record_deal(
        &mut self,
        fragment: &ListingFragment,
        model_guess: &str,
        evaluation: &Evaluation,
        report: &mut ScanReport,
    ) {
        let now = Utc::now();
        self.registry.mark_seen(&fragment.identifier, now.timestamp());
        report.accepted += 1;

        let deal = DealRecord::new(now, fragment, model_guess, evaluation);

        if let Err(e) = self.ledger.append(&deal) {
            error!(listing_id = %deal.listing_id, error = %format!("{e:#}"), "Failed to record deal in ledger");
        }

        info!(
            listing_id = %deal.listing_id,
            model = %deal.model_guess,
            price = deal.price,
            profit = deal.profit,
            grade = %deal.grade,
            "New deal"
        );

        let message = format_deal_alert(&self.product_keyword, &deal);
        match self.notifier.send(&message).await {
            Ok(()) => info!(listing_id = %deal.listing_id, "Alert sent"),
            Err(e) => {
                warn!(listing_id = %deal.listing_id, error = %format!("{e:#}"), "Alert delivery failed");
                report.notifications_failed += 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
