//! Text extraction.
//!
//! Pulls the asking price, a repair-cost estimate and a model name out of
//! the free-form text of a listing. Nothing here fails on odd input: a
//! missing price is `None`, a missing model falls back to a generic label.

use anyhow::{Context, Result};
use regex::Regex;

use crate::config::{PricingConfig, SearchConfig};
use crate::types::ExtractedFields;

/// Extracts structured fields from lowercased listing text.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    price_re: Regex,
    model_re: Regex,
    /// Defect keyword → surcharge, sorted by keyword for stable logging.
    repair_table: Vec<(String, i64)>,
    model_fallback: String,
}

impl TextExtractor {
    pub fn new(search: &SearchConfig, pricing: &PricingConfig) -> Result<Self> {
        let price_re = Regex::new(r"\$(\d{1,4})").context("Invalid price pattern")?;

        let keyword = regex::escape(&search.product_keyword.trim().to_lowercase());
        let model_re = Regex::new(&format!(r"{keyword}\s+[a-z0-9\s]+"))
            .with_context(|| format!("Invalid model pattern for keyword {keyword}"))?;

        let mut repair_table: Vec<(String, i64)> = pricing
            .repair_costs
            .iter()
            .map(|(k, v)| (k.to_lowercase(), (*v).max(0)))
            .collect();
        repair_table.sort();

        Ok(Self {
            price_re,
            model_re,
            repair_table,
            model_fallback: search.model_fallback.clone(),
        })
    }

    /// Fill in the remaining fields for a listing whose price is already known.
    pub fn extract(&self, text: &str, price: i64) -> ExtractedFields {
        ExtractedFields {
            price: Some(price),
            repair_cost: self.estimate_repair(text),
            model_guess: self.model_guess(text),
        }
    }

    /// First `$` followed by 1–4 digits, after thousands separators are removed.
    pub fn extract_price(&self, text: &str) -> Option<i64> {
        let cleaned = text.replace(',', "");
        self.price_re
            .captures(&cleaned)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Sum of surcharges for every defect keyword found in `text`.
    ///
    /// Keywords are matched independently: "cracked screen" pays for both
    /// "cracked" and "screen".
    pub fn estimate_repair(&self, text: &str) -> i64 {
        self.repair_table
            .iter()
            .filter(|(keyword, _)| text.contains(keyword.as_str()))
            .map(|(_, cost)| cost)
            .sum()
    }

    pub fn model_guess(&self, text: &str) -> String {
        self.model_re
            .find(text)
            .map(|m| title_case(m.as_str().trim()))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.model_fallback.clone())
    }
}

/// Upper-case every letter that doesn't follow another letter.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
