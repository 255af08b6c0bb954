//! HTTP page source.
//!
//! Fetches search pages with a fixed mobile User-Agent and
//! Accept-Language so the marketplace serves its plain rendered HTML.
//! Every request has a timeout; a slow target fails on its own without
//! holding up the rest of the scan for longer than that.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::PageSource;
use crate::config::SearchConfig;
use crate::types::FlipError;

pub struct HttpPageSource {
    http: Client,
}

impl HttpPageSource {
    pub fn new(search: &SearchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&search.accept_language)
                .context("Invalid search.accept_language header value")?,
        );

        let http = Client::builder()
            .timeout(Duration::from_secs(search.fetch_timeout_secs))
            .user_agent(search.user_agent.as_str())
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client for marketplace")?;

        Ok(Self { http })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        debug!(url, "Fetching search page");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FlipError::HttpStatus {
                target: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = resp
            .text()
            .await
            .with_context(|| format!("Failed to read body from {url}"))?;

        debug!(url, bytes = body.len(), "Search page fetched");
        Ok(body)
    }
}
