//! Outbound notifications.
//!
//! Defines the `Notifier` trait plus the text of the two messages the
//! monitor sends: a deal alert per accepted listing and a periodic
//! heartbeat. Delivery failures are the caller's to log and swallow.

pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::DealRecord;

pub use telegram::TelegramNotifier;

/// Abstraction over a single notification destination.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one plain-text message.
    async fn send(&self, text: &str) -> Result<()>;

    /// Transport name for logging.
    fn name(&self) -> &str;
}

/// Alert text for a newly accepted listing.
pub fn format_deal_alert(product_keyword: &str, deal: &DealRecord) -> String {
    format!(
        "🚨 JUST LISTED\n\n\
         📱 {product} FLIP ALERT\n\n\
         {emoji} {grade}\n\
         Model: {model}\n\
         Buy: ${price}\n\
         Repair est: ${repair}\n\
         Resale est: ~${resale}\n\
         💰 Est. Profit: ${profit}\n\n\
         {url}",
        product = product_keyword.to_uppercase(),
        emoji = deal.grade.emoji(),
        grade = deal.grade,
        model = deal.model_guess,
        price = deal.price,
        repair = deal.repair_cost,
        resale = deal.resale_estimate,
        profit = deal.profit,
        url = deal.url,
    )
}

/// Liveness message sent every N scans.
pub fn format_heartbeat(scan_count: u64, hits_last_scan: usize, now: DateTime<Utc>) -> String {
    format!(
        "🫀 HEARTBEAT\n\n\
         Scans run: {scan_count}\n\
         New hits last scan: {hits_last_scan}\n\
         UTC time: {}",
        now.format("%Y-%m-%d %H:%M:%S"),
    )
}
