//! Listing filter chain.
//!
//! Decides, in a fixed order, whether an anchor on a search page is a
//! listing worth scoring:
//!
//! 1. the URL must point at a listing-detail page (otherwise the anchor
//!    is not a candidate at all),
//! 2. the identifier must not be in the seen registry,
//! 3. the text must mention the product keyword,
//! 4. the text must not contain any block keyword,
//! 5. a price must be present and within the ceiling.
//!
//! The first failing check wins.

use anyhow::{Context, Result};
use std::fmt;
use url::Url;

use crate::config::SearchConfig;
use crate::evaluation::extractor::TextExtractor;
use crate::storage::SeenRegistry;
use crate::types::ListingFragment;

/// Why a candidate listing was dropped at steps 3–5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Text doesn't mention the product at all.
    MissingKeyword,
    /// Text hit a block keyword (locked, stolen, parts only, ...).
    Blocked { keyword: String },
    NoPrice,
    OverBudget { price: i64, max_price: i64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingKeyword => write!(f, "product keyword missing"),
            RejectReason::Blocked { keyword } => write!(f, "blocked keyword '{keyword}'"),
            RejectReason::NoPrice => write!(f, "no price found"),
            RejectReason::OverBudget { price, max_price } => {
                write!(f, "price ${price} over ceiling ${max_price}")
            }
        }
    }
}

/// Outcome of running a candidate through steps 2–5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterVerdict {
    AlreadySeen,
    Rejected(RejectReason),
    /// Survived every check; carries the extracted price.
    Passed { price: i64 },
}

#[derive(Debug, Clone)]
pub struct FilterChain {
    base_url: Url,
    listing_path: String,
    product_keyword: String,
    block_keywords: Vec<String>,
    max_price: i64,
}

impl FilterChain {
    pub fn new(search: &SearchConfig) -> Result<Self> {
        let base_url = Url::parse(&search.base_url)
            .with_context(|| format!("Invalid search.base_url: {}", search.base_url))?;

        Ok(Self {
            base_url,
            listing_path: search.listing_path.clone(),
            product_keyword: search.product_keyword.trim().to_lowercase(),
            block_keywords: search
                .block_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            max_price: search.max_price,
        })
    }

    /// Step 1: turn an anchor into a listing fragment, or `None` when its
    /// href is not a listing-detail URL.
    ///
    /// Relative hrefs are resolved against the base URL; query strings and
    /// fragments are dropped so tracking parameters don't split identities.
    pub fn candidate(&self, href: &str, text: &str) -> Option<ListingFragment> {
        if !href.contains(&self.listing_path) {
            return None;
        }

        let mut url = self.base_url.join(href).ok()?;
        url.set_query(None);
        url.set_fragment(None);

        // The identifier must live after the listing path, not be part of it
        let (_, tail) = url.path().split_once(self.listing_path.as_str())?;
        let identifier = tail.split('/').filter(|s| !s.is_empty()).next_back()?.to_string();

        Some(ListingFragment {
            url: url.to_string(),
            identifier,
            raw_text: text.to_lowercase(),
        })
    }

    /// Steps 2–5 for a candidate fragment.
    pub fn check(
        &self,
        fragment: &ListingFragment,
        seen: &SeenRegistry,
        extractor: &TextExtractor,
    ) -> FilterVerdict {
        if seen.has(&fragment.identifier) {
            return FilterVerdict::AlreadySeen;
        }

        let text = fragment.raw_text.as_str();

        if !text.contains(&self.product_keyword) {
            return FilterVerdict::Rejected(RejectReason::MissingKeyword);
        }

        if let Some(hit) = self.block_keywords.iter().find(|k| text.contains(k.as_str())) {
            return FilterVerdict::Rejected(RejectReason::Blocked { keyword: hit.clone() });
        }

        match extractor.extract_price(text) {
            None => FilterVerdict::Rejected(RejectReason::NoPrice),
            Some(price) if price > self.max_price => {
                FilterVerdict::Rejected(RejectReason::OverBudget {
                    price,
                    max_price: self.max_price,
                })
            }
            Some(price) => FilterVerdict::Passed { price },
        }
    }
}
