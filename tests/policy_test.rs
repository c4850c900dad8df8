//! Tests for the intervention-trigger policy.

use straylight::catalog::TacticKind;
use straylight::extractor::{PageAnalysis, TacticMatch};
use straylight::policy::{should_intervene, ThresholdPreset, TACTIC_OVERRIDE_COUNT};
use straylight::scorer::RiskLevel;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn analysis_with(level: RiskLevel, checkout: bool, tactic_count: usize) -> PageAnalysis {
    let tactics = (0..tactic_count)
        .map(|_| TacticMatch {
            phrase: "hurry".to_owned(),
            kind: TacticKind::Urgency,
        })
        .collect();

    PageAnalysis {
        is_checkout_page: checkout,
        tactics,
        risk_level: level,
        ..PageAnalysis::default()
    }
}

// ---------------------------------------------------------------------------
// Default preset
// ---------------------------------------------------------------------------

#[test]
fn critical_always_intervenes() {
    let a = analysis_with(RiskLevel::Critical, false, 0);
    assert!(should_intervene(&a, ThresholdPreset::Medium));
}

#[test]
fn high_without_checkout_does_not_intervene() {
    // High alone would over-trigger on merely busy shopping pages.
    let a = analysis_with(RiskLevel::High, false, 1);
    assert!(!should_intervene(&a, ThresholdPreset::Medium));
}

#[test]
fn high_with_checkout_intervenes() {
    let a = analysis_with(RiskLevel::High, true, 0);
    assert!(should_intervene(&a, ThresholdPreset::Medium));
}

#[test]
fn medium_and_low_do_not_intervene() {
    for level in [RiskLevel::Low, RiskLevel::Medium] {
        let a = analysis_with(level, true, 0);
        assert!(!should_intervene(&a, ThresholdPreset::Medium));
    }
}

// ---------------------------------------------------------------------------
// Tactic-count override
// ---------------------------------------------------------------------------

#[test]
fn three_tactics_override_a_low_risk_level() {
    let a = analysis_with(RiskLevel::Low, false, TACTIC_OVERRIDE_COUNT);
    assert!(should_intervene(&a, ThresholdPreset::Medium));
}

#[test]
fn two_tactics_do_not_override() {
    let a = analysis_with(RiskLevel::Low, false, 2);
    assert!(!should_intervene(&a, ThresholdPreset::Medium));
}

#[test]
fn tactic_override_fires_under_every_preset() {
    for preset in [
        ThresholdPreset::Low,
        ThresholdPreset::Medium,
        ThresholdPreset::High,
    ] {
        let a = analysis_with(RiskLevel::Low, false, 4);
        assert!(should_intervene(&a, preset), "preset {preset:?}");
    }
}

// ---------------------------------------------------------------------------
// Presets widen or narrow the level gate
// ---------------------------------------------------------------------------

#[test]
fn low_preset_intervenes_on_medium() {
    let a = analysis_with(RiskLevel::Medium, false, 0);
    assert!(should_intervene(&a, ThresholdPreset::Low));
    assert!(!should_intervene(&a, ThresholdPreset::Medium));
}

#[test]
fn low_preset_still_ignores_low_risk() {
    let a = analysis_with(RiskLevel::Low, false, 0);
    assert!(!should_intervene(&a, ThresholdPreset::Low));
}

#[test]
fn high_preset_requires_critical() {
    let high_on_checkout = analysis_with(RiskLevel::High, true, 0);
    assert!(!should_intervene(&high_on_checkout, ThresholdPreset::High));

    let critical = analysis_with(RiskLevel::Critical, false, 0);
    assert!(should_intervene(&critical, ThresholdPreset::High));
}

// ---------------------------------------------------------------------------
// Checkout gating is necessary for the high-risk branch
// ---------------------------------------------------------------------------

#[test]
fn high_risk_never_triggers_through_the_checkout_clause_without_checkout() {
    // Sweep tactic counts below the override: without a checkout page,
    // high risk must never intervene under the default preset.
    for tactic_count in 0..TACTIC_OVERRIDE_COUNT {
        let a = analysis_with(RiskLevel::High, false, tactic_count);
        assert!(
            !should_intervene(&a, ThresholdPreset::Medium),
            "intervened with {tactic_count} tactics and no checkout"
        );
    }
}

#[test]
fn preset_serde_round_trips_lowercase() {
    let json = serde_json::to_string(&ThresholdPreset::High).expect("serialize");
    assert_eq!(json, r#""high""#);
    let preset: ThresholdPreset = serde_json::from_str(r#""low""#).expect("deserialize");
    assert_eq!(preset, ThresholdPreset::Low);
}
