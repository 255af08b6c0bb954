//! Search page parsing.
//!
//! Extracts every `<a href>` with its visible text. Deciding which of
//! those anchors are listings is the filter chain's job, not the parser's.

use scraper::{Html, Selector};

/// A raw anchor from a search results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    /// Text nodes, trimmed and joined with single spaces.
    pub text: String,
}

/// Parse all anchors with an `href` out of an HTML document, in document order.
pub fn parse_anchors(html: &str) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            let text = el
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            Some(Anchor {
                href: href.to_string(),
                text,
            })
        })
        .collect()
}
