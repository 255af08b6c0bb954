//! FLIPWATCH — Marketplace listing monitor
//!
//! Entry point. Loads configuration, initialises structured logging,
//! resolves Telegram credentials (refusing to start without them),
//! restores the seen registry from disk, and runs the scan→alert loop
//! until Ctrl+C.

use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use flipwatch::config::AppConfig;
use flipwatch::engine::{Scanner, Scheduler};
use flipwatch::evaluation::ListingEvaluator;
use flipwatch::marketplace::HttpPageSource;
use flipwatch::notify::{Notifier, TelegramNotifier};
use flipwatch::storage::{DealLedger, SeenRegistry};

const BANNER: &str = r#"
  _____ _     ___ ______        ___  _____ ____ _   _
 |  ___| |   |_ _|  _ \ \      / / \|_   _/ ___| | | |
 | |_  | |    | || |_) \ \ /\ / / _ \ | || |   | |_| |
 |  _| | |___ | ||  __/ \ V  V / ___ \| || |___|  _  |
 |_|   |_____|___|_|     \_/\_/_/   \_\_| \____|_| |_|

  Marketplace flip monitor
  v0.1.0
"#;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path =
        std::env::var("FLIPWATCH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = if Path::new(&config_path).exists() {
        AppConfig::load(&config_path)?
    } else {
        warn!(path = %config_path, "Config file not found, using built-in defaults");
        let cfg = AppConfig::default();
        cfg.validate()?;
        cfg
    };

    // Fatal before anything else runs: no credentials, no monitor
    let credentials = cfg.alerts.resolve_credentials()?;

    println!("{BANNER}");
    info!(
        name = %cfg.scanner.name,
        targets = cfg.search.urls.len(),
        keyword = %cfg.search.product_keyword,
        max_price = cfg.search.max_price,
        scan_interval_secs = cfg.scanner.scan_interval_secs,
        "FLIPWATCH starting up"
    );

    // -- Restore state ---------------------------------------------------

    let registry = SeenRegistry::load(&cfg.storage.seen_file)?;
    let ledger = DealLedger::new(&cfg.storage.ledger_file);
    info!(
        known_listings = registry.len(),
        ledger = %ledger.path().display(),
        "State restored"
    );

    // -- Initialise components -------------------------------------------

    let source = HttpPageSource::new(&cfg.search)?;
    let notifier = TelegramNotifier::new(credentials, cfg.alerts.timeout_secs)?;
    info!(transport = notifier.name(), "Notifier ready");

    let scanner = Scanner::new(
        &cfg.search,
        ListingEvaluator::from_config(&cfg)?,
        Box::new(source),
        Box::new(notifier),
        registry,
        ledger,
    );

    let mut scheduler = Scheduler::new(
        scanner,
        Duration::from_secs(cfg.scanner.scan_interval_secs),
        cfg.scanner.heartbeat_every,
    );

    // -- Main loop -------------------------------------------------------

    // Register the handler up front so Ctrl+C during a scan is not lost
    let signal = tokio::spawn(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    });

    info!("Entering main loop. Press Ctrl+C to stop.");
    scheduler
        .run(async move {
            let _ = signal.await;
        })
        .await;

    info!(
        scans = scheduler.scan_count(),
        known_listings = scheduler.scanner().registry().len(),
        "FLIPWATCH shut down cleanly."
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("flipwatch=info"));

    let json_logging = std::env::var("FLIPWATCH_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
