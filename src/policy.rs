//! Intervention-trigger policy.
//!
//! Decides whether an analysis warrants interrupting the user. The level
//! gate is adjustable through a [`ThresholdPreset`] injected from the
//! settings provider; the tactic-density override is not — a sufficiently
//! dense concentration of manipulation is independent evidence of
//! exploitative design regardless of the computed score.

use serde::{Deserialize, Serialize};

use crate::extractor::PageAnalysis;
use crate::scorer::RiskLevel;

/// Number of matched dark patterns at which intervention fires
/// regardless of risk level.
pub const TACTIC_OVERRIDE_COUNT: usize = 3;

/// Sensitivity preset for the risk-level gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdPreset {
    /// Sensitive: intervene on medium risk and above.
    Low,
    /// Default: intervene on critical risk, or high risk on a checkout page.
    #[default]
    Medium,
    /// Permissive: intervene on critical risk only.
    High,
}

/// Decide whether to interrupt the user for this analysis.
///
/// Under the default preset: critical always interrupts; high alone does
/// not (avoids over-triggering on merely busy shopping pages) unless
/// checkout is imminent. Three or more matched tactics override the level
/// gate entirely under every preset.
pub fn should_intervene(analysis: &PageAnalysis, preset: ThresholdPreset) -> bool {
    if analysis.tactics.len() >= TACTIC_OVERRIDE_COUNT {
        return true;
    }

    let level = analysis.risk_level;
    match preset {
        ThresholdPreset::Low => level.rank() >= RiskLevel::Medium.rank(),
        ThresholdPreset::Medium => {
            level == RiskLevel::Critical
                || (level == RiskLevel::High && analysis.is_checkout_page)
        }
        ThresholdPreset::High => level == RiskLevel::Critical,
    }
}
