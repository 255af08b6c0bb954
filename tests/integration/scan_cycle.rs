//! End-to-end scan cycles.
//!
//! Drives the real scanner (evaluation, registry, ledger) against the
//! mock marketplace, including process "restarts" where the registry is
//! reloaded from disk between scans.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use flipwatch::config::AppConfig;
use flipwatch::engine::{Scanner, Scheduler};
use flipwatch::evaluation::ListingEvaluator;
use flipwatch::storage::{DealLedger, SeenRegistry};

use crate::mock_marketplace::{search_page, MockMarketplace, RecordingNotifier};

const TARGET_A: &str = "https://www.facebook.com/marketplace/search/?query=iphone";
const TARGET_B: &str = "https://www.facebook.com/marketplace/search/?query=iphone%2013";

const HEADER: &str =
    "timestamp_utc,listing_id,price,repair_est,resale_est,profit_est,grade,model_guess,url";

struct Harness {
    _dir: tempfile::TempDir,
    cfg: AppConfig,
    seen_path: PathBuf,
    ledger_path: PathBuf,
    market: MockMarketplace,
    notifier: RecordingNotifier,
}

impl Harness {
    fn new(targets: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = AppConfig::default();
        cfg.search.urls = targets.iter().map(|s| s.to_string()).collect();

        Self {
            seen_path: dir.path().join("seen.json"),
            ledger_path: dir.path().join("deals.csv"),
            _dir: dir,
            cfg,
            market: MockMarketplace::new(),
            notifier: RecordingNotifier::new(),
        }
    }

    /// Build a scanner the way `main` does: registry loaded from disk.
    fn scanner(&self) -> Scanner {
        Scanner::new(
            &self.cfg.search,
            ListingEvaluator::from_config(&self.cfg).unwrap(),
            Box::new(self.market.clone()),
            Box::new(self.notifier.clone()),
            SeenRegistry::load(&self.seen_path).unwrap(),
            DealLedger::new(&self.ledger_path),
        )
    }

    fn ledger_rows(&self) -> Vec<String> {
        read_lines(&self.ledger_path).into_iter().skip(1).collect()
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

#[tokio::test]
async fn test_cracked_screen_listing_end_to_end() {
    let h = Harness::new(&[TARGET_A]);
    h.market.set_page(TARGET_A, &search_page(&[("5551", "iPhone 13, cracked screen, $150")]));

    let report = h.scanner().scan().await;
    assert_eq!(report.accepted, 1);

    let lines = read_lines(&h.ledger_path);
    assert_eq!(lines[0], HEADER);
    let cols: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(cols.len(), 9);
    assert_eq!(cols[1], "5551");
    assert_eq!(cols[2], "150");
    assert_eq!(cols[3], "70");
    assert_eq!(cols[4], "250");
    assert_eq!(cols[5], "30");
    assert_eq!(cols[6], "OK");
    assert_eq!(cols[7], "Iphone 13");
    assert_eq!(cols[8], "https://facebook.com/marketplace/item/5551/");
    assert!(cols[0].ends_with("+00:00"));

    let alerts = h.notifier.deal_alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("🟡 OK"));
    assert!(alerts[0].contains("Repair est: $70"));
}

#[tokio::test]
async fn test_blocked_and_overpriced_never_reported() {
    let h = Harness::new(&[TARGET_A]);
    h.market.set_page(
        TARGET_A,
        &search_page(&[
            ("1", "iPhone 12 icloud locked $20"),
            ("2", "iPhone 15 Pro Max $999"),
            ("3", "iPhone 11 MDM managed $60"),
            ("4", "iPhone 8 for parts only $15"),
        ]),
    );

    let report = h.scanner().scan().await;
    assert_eq!(report.rejected, 4);
    assert_eq!(report.accepted, 0);
    assert!(h.notifier.deal_alerts().is_empty());
    assert!(!h.ledger_path.exists());
}

#[tokio::test]
async fn test_seen_survives_restart() {
    let h = Harness::new(&[TARGET_A]);
    let page = search_page(&[("100", "iPhone 12 $120"), ("101", "iPhone 11 $90")]);
    h.market.set_page(TARGET_A, &page);

    // First process
    assert_eq!(h.scanner().scan().await.accepted, 2);

    // Second process, registry reloaded from disk, same page
    let report = h.scanner().scan().await;
    assert_eq!(report.accepted, 0);
    assert_eq!(report.already_seen, 2);
    assert_eq!(h.notifier.deal_alerts().len(), 2);
    assert_eq!(h.ledger_rows().len(), 2);
}

#[tokio::test]
async fn test_listing_in_consecutive_pages_reported_once() {
    let h = Harness::new(&[TARGET_A]);

    h.market.set_page(TARGET_A, &search_page(&[("200", "iPhone XS $110")]));
    h.scanner().scan().await;

    // Next cycle: the old listing is still up, plus a new one
    h.market.set_page(
        TARGET_A,
        &search_page(&[("201", "iPhone 12 mini $130"), ("200", "iPhone XS $110")]),
    );
    let report = h.scanner().scan().await;

    assert_eq!(report.accepted, 1);
    let rows = h.ledger_rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows.iter().filter(|r| r.contains(",200,")).count(), 1);
    assert_eq!(rows.iter().filter(|r| r.contains(",201,")).count(), 1);
}

#[tokio::test]
async fn test_rejected_listing_not_reevaluated_after_price_drop() {
    let h = Harness::new(&[TARGET_A]);

    h.market.set_page(TARGET_A, &search_page(&[("300", "iPhone 14 $450")]));
    assert_eq!(h.scanner().scan().await.rejected, 1);

    h.market.set_page(TARGET_A, &search_page(&[("300", "iPhone 14 price drop $150")]));
    let report = h.scanner().scan().await;

    assert_eq!(report.already_seen, 1);
    assert_eq!(report.accepted, 0);
    assert!(h.notifier.deal_alerts().is_empty());
}

#[tokio::test]
async fn test_failed_target_does_not_stop_second_target() {
    let h = Harness::new(&[TARGET_A, TARGET_B]);
    h.market.set_failing(TARGET_A);
    h.market.set_page(TARGET_B, &search_page(&[("400", "iPhone 13 $160")]));

    let report = h.scanner().scan().await;

    assert_eq!(h.market.fetches(), vec![TARGET_A.to_string(), TARGET_B.to_string()]);
    assert_eq!(report.targets_failed, 1);
    assert_eq!(report.accepted, 1);
    assert_eq!(h.notifier.deal_alerts().len(), 1);
}

#[tokio::test]
async fn test_ledger_header_written_once_across_runs() {
    let h = Harness::new(&[TARGET_A]);

    h.market.set_page(TARGET_A, &search_page(&[("500", "iPhone 11 $80")]));
    h.scanner().scan().await;
    h.market.set_page(TARGET_A, &search_page(&[("501", "iPhone 11 Pro $95")]));
    h.scanner().scan().await;

    let lines = read_lines(&h.ledger_path);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines.iter().filter(|l| l.as_str() == HEADER).count(), 1);
}

#[tokio::test]
async fn test_notification_outage_does_not_cause_duplicates() {
    let h = Harness::new(&[TARGET_A]);
    h.market.set_page(TARGET_A, &search_page(&[("600", "iPhone 12 Pro $175")]));

    h.notifier.set_failing(true);
    let report = h.scanner().scan().await;
    assert_eq!(report.accepted, 1);
    assert_eq!(report.notifications_failed, 1);
    assert_eq!(h.ledger_rows().len(), 1);

    // Transport back up; listing is still on the page
    h.notifier.set_failing(false);
    let report = h.scanner().scan().await;
    assert_eq!(report.accepted, 0);
    assert_eq!(h.notifier.deal_alerts().len(), 1);
    assert_eq!(h.ledger_rows().len(), 1);
}

#[tokio::test]
async fn test_scheduler_runs_scan_and_heartbeat_then_stops() {
    let h = Harness::new(&[TARGET_A]);
    h.market.set_page(TARGET_A, &search_page(&[("700", "iPhone SE $60")]));

    let mut scheduler = Scheduler::new(h.scanner(), Duration::from_secs(300), 1);
    scheduler.run(std::future::ready(())).await;

    assert_eq!(scheduler.scan_count(), 1);
    let heartbeats = h.notifier.heartbeats();
    assert_eq!(heartbeats.len(), 1);
    assert!(heartbeats[0].contains("Scans run: 1"));
    assert!(heartbeats[0].contains("New hits last scan: 1"));

    let registry = SeenRegistry::load(&h.seen_path).unwrap();
    assert!(registry.has("700"));
}
