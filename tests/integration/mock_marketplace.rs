//! Mock marketplace and notifier for integration testing.
//!
//! Provides a deterministic `PageSource` that serves canned HTML per
//! search URL (or a forced failure), and a `Notifier` that records every
//! message instead of sending it. All state is in-memory and shared via
//! `Arc`, so test code keeps a handle after boxing them into a `Scanner`.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use flipwatch::marketplace::PageSource;
use flipwatch::notify::Notifier;

/// A mock marketplace serving fixed pages keyed by search URL.
#[derive(Clone, Default)]
pub struct MockMarketplace {
    pages: Arc<Mutex<HashMap<String, String>>>,
    failing: Arc<Mutex<Vec<String>>>,
    fetches: Arc<Mutex<Vec<String>>>,
}

impl MockMarketplace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url` (replaces any previous page).
    pub fn set_page(&self, url: &str, html: &str) {
        self.pages.lock().unwrap().insert(url.to_string(), html.to_string());
        self.failing.lock().unwrap().retain(|u| u != url);
    }

    /// Make every fetch of `url` fail.
    pub fn set_failing(&self, url: &str) {
        self.failing.lock().unwrap().push(url.to_string());
    }

    /// URLs fetched so far, in order.
    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for MockMarketplace {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.fetches.lock().unwrap().push(url.to_string());

        if self.failing.lock().unwrap().iter().any(|u| u == url) {
            return Err(anyhow!("HTTP 503 from {url}"));
        }

        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("HTTP 404 from {url}"))
    }
}

/// A notifier that records messages; optionally fails every send.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// Every message passed to `send`, delivered or not.
    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn deal_alerts(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|m| m.starts_with("🚨 JUST LISTED"))
            .collect()
    }

    pub fn heartbeats(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|m| m.starts_with("🫀 HEARTBEAT"))
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        if *self.fail.lock().unwrap() {
            return Err(anyhow!("notification transport unavailable"));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Wrap listing anchors in a minimal search results page.
pub fn search_page(listings: &[(&str, &str)]) -> String {
    let anchors: String = listings
        .iter()
        .map(|(id, text)| {
            format!(r#"<a href="/marketplace/item/{id}/?ref=search_results"><span>{text}</span></a>"#)
        })
        .collect();
    format!(
        r#"<html><body><nav><a href="/marketplace/">Marketplace</a></nav><div>{anchors}</div></body></html>"#
    )
}
