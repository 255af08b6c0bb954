//! Listing evaluation: filter chain → text extraction → profit estimate.

pub mod extractor;
pub mod filter;
pub mod profit;

use anyhow::Result;
use tracing::debug;

use crate::config::AppConfig;
use crate::storage::SeenRegistry;
use crate::types::{Evaluation, ListingFragment};
use extractor::TextExtractor;
use filter::{FilterChain, FilterVerdict, RejectReason};
use profit::ProfitEstimator;

/// What happened to a single candidate listing.
#[derive(Debug, Clone)]
pub enum Decision {
    /// Identifier already in the registry; nothing else was looked at.
    AlreadySeen,
    /// Failed a keyword or price check. Still gets marked seen.
    Rejected { reason: RejectReason },
    /// Passed every check and was scored.
    Accepted {
        model_guess: String,
        evaluation: Evaluation,
    },
}

/// Runs a candidate fragment through the full evaluation pipeline.
///
/// Build once from config; the evaluator holds no per-scan state.
#[derive(Debug, Clone)]
pub struct ListingEvaluator {
    filter: FilterChain,
    extractor: TextExtractor,
    estimator: ProfitEstimator,
}

impl ListingEvaluator {
    pub fn new(filter: FilterChain, extractor: TextExtractor, estimator: ProfitEstimator) -> Self {
        Self {
            filter,
            extractor,
            estimator,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            FilterChain::new(&cfg.search)?,
            TextExtractor::new(&cfg.search, &cfg.pricing)?,
            ProfitEstimator::new(&cfg.pricing),
        ))
    }

    /// Step 1 of the filter chain: anchor → candidate fragment.
    pub fn candidate(&self, href: &str, text: &str) -> Option<ListingFragment> {
        self.filter.candidate(href, text)
    }

    /// Filter, extract and score one candidate. Does not touch the registry.
    pub fn assess(&self, fragment: &ListingFragment, seen: &SeenRegistry) -> Decision {
        let price = match self.filter.check(fragment, seen, &self.extractor) {
            FilterVerdict::AlreadySeen => return Decision::AlreadySeen,
            FilterVerdict::Rejected(reason) => {
                debug!(listing_id = %fragment.identifier, %reason, "Listing rejected");
                return Decision::Rejected { reason };
            }
            FilterVerdict::Passed { price } => price,
        };

        let fields = self.extractor.extract(&fragment.raw_text, price);
        let Some(evaluation) = self.estimator.evaluate(&fields) else {
            return Decision::Rejected { reason: RejectReason::NoPrice };
        };

        debug!(
            listing_id = %fragment.identifier,
            price,
            repair = fields.repair_cost,
            profit = evaluation.profit,
            grade = %evaluation.grade,
            "Listing accepted"
        );

        Decision::Accepted {
            model_guess: fields.model_guess,
            evaluation,
        }
    }
}
