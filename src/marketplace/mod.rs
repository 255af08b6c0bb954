//! Marketplace page access.
//!
//! Defines the `PageSource` trait (fetch a search results page as HTML)
//! and the HTML anchor parser that turns a page into candidate anchors.

pub mod http;
pub mod parser;

use anyhow::Result;
use async_trait::async_trait;

pub use http::HttpPageSource;
pub use parser::{parse_anchors, Anchor};

/// Abstraction over where search result pages come from.
///
/// The live implementation is a plain HTTP GET; tests substitute canned
/// pages or forced failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the rendered HTML of a search results page.
    /// Network errors, timeouts and non-2xx statuses are all errors.
    async fn fetch_page(&self, url: &str) -> Result<String>;
}
