//! Risk scoring: page signals to an additive score to a categorical level.
//!
//! The score is a pure function of the analysis signals and the local
//! wall-clock instant. Checkout context dominates the weights because it
//! is closest to financial harm; dark patterns scale with the volume of
//! manipulation present, uncapped; temporal signals (late night, weekend)
//! are minor but nonzero.

use chrono::{DateTime, Datelike, Local, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::extractor::PageAnalysis;

/// Categorical risk bucket derived from the additive score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Ordinary browsing, no pressure signals worth acting on.
    #[default]
    Low,
    /// Shopping context present.
    Medium,
    /// Strong shopping context or manipulation present.
    High,
    /// Imminent-purchase context, interrupt-worthy on its own.
    Critical,
}

impl RiskLevel {
    /// Numeric rank for comparisons (higher = riskier).
    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Critical => 3,
        }
    }
}

/// Compute the additive risk score for an analysis at a local instant.
///
/// Reads only the signal fields of `analysis`; the derived `risk_score`
/// and `risk_level` fields are ignored. The total has no fixed maximum.
pub fn score_page(analysis: &PageAnalysis, local: DateTime<Local>) -> u32 {
    let mut score: u32 = 0;

    if analysis.is_shopping_site {
        score = score.saturating_add(catalog::WEIGHT_SHOPPING_SITE);
    }

    if analysis.is_checkout_page {
        score = score.saturating_add(catalog::WEIGHT_CHECKOUT_PAGE);
    }

    if analysis.is_product_page {
        score = score.saturating_add(catalog::WEIGHT_PRODUCT_PAGE);
    }

    if analysis
        .prices
        .iter()
        .any(|&p| p > catalog::HIGH_PRICE_THRESHOLD)
    {
        score = score.saturating_add(catalog::WEIGHT_HIGH_PRICE);
    }

    let tactic_count = u32::try_from(analysis.tactics.len()).unwrap_or(u32::MAX);
    score = score.saturating_add(tactic_count.saturating_mul(catalog::WEIGHT_PER_TACTIC));

    if analysis.cart_items > 0 {
        score = score.saturating_add(catalog::WEIGHT_CART_ACTIVITY);
    }

    if is_late_night(local) {
        score = score.saturating_add(catalog::WEIGHT_LATE_NIGHT);
    }

    if is_weekend(local) {
        score = score.saturating_add(catalog::WEIGHT_WEEKEND);
    }

    score
}

/// Map a score to its categorical risk level.
pub fn risk_level(score: u32) -> RiskLevel {
    if score >= catalog::THRESHOLD_CRITICAL {
        RiskLevel::Critical
    } else if score >= catalog::THRESHOLD_HIGH {
        RiskLevel::High
    } else if score >= catalog::THRESHOLD_MEDIUM {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Late-night window: 22:00 through 05:59 local time.
pub fn is_late_night(local: DateTime<Local>) -> bool {
    let hour = local.hour();
    hour >= 22 || hour <= 5
}

/// Weekend: local Saturday or Sunday.
pub fn is_weekend(local: DateTime<Local>) -> bool {
    matches!(local.weekday(), Weekday::Sat | Weekday::Sun)
}
