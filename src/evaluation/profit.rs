//! Profit estimation and grading.
//!
//! `profit = resale − price − repair`. The grade is informational only:
//! every listing that survives the filter chain is reported, whatever
//! its grade.

use crate::config::PricingConfig;
use crate::types::{Evaluation, ExtractedFields, Grade};

#[derive(Debug, Clone)]
pub struct ProfitEstimator {
    resale_estimate: i64,
    green_threshold: i64,
    yellow_threshold: i64,
}

impl ProfitEstimator {
    pub fn new(pricing: &PricingConfig) -> Self {
        Self {
            resale_estimate: pricing.default_resale,
            green_threshold: pricing.profit_green,
            yellow_threshold: pricing.profit_yellow,
        }
    }

    pub fn profit(&self, price: i64, repair_cost: i64) -> i64 {
        self.resale_estimate - price - repair_cost
    }

    pub fn grade(&self, profit: i64) -> Grade {
        if profit >= self.green_threshold {
            Grade::Good
        } else if profit >= self.yellow_threshold {
            Grade::Ok
        } else {
            Grade::Skip
        }
    }

    /// Score extracted fields. Unpriced listings can't be scored.
    pub fn evaluate(&self, fields: &ExtractedFields) -> Option<Evaluation> {
        fields.price.map(|price| self.score(price, fields.repair_cost))
    }

    pub fn score(&self, price: i64, repair_cost: i64) -> Evaluation {
        let profit = self.profit(price, repair_cost);
        Evaluation {
            price,
            repair_cost,
            resale_estimate: self.resale_estimate,
            profit,
            grade: self.grade(profit),
        }
    }
}
