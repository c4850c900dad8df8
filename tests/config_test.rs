//! Tests for configuration loading and validation.

use std::time::Duration;

use straylight::config::{load_config, ConfigError, StraylightConfig};
use straylight::policy::ThresholdPreset;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn empty_config_uses_defaults_everywhere() {
    let config: StraylightConfig = toml::from_str("").expect("parse");

    assert!(config.protection.enabled);
    assert_eq!(config.protection.preset, ThresholdPreset::Medium);
    assert_eq!(config.protection.leave_url, "about:blank");
    assert!(config.aggregator.endpoint.is_none());
    assert!(config.autonomy.endpoint.is_none());
    assert_eq!(config.autonomy.timeout_ms, 1500);
    assert_eq!(config.watch.poll_interval_secs, 2);
    assert_eq!(config.watch.session_tick_secs, 5);

    config.validate().expect("defaults validate");
}

#[test]
fn partial_sections_fill_in_missing_fields() {
    let config: StraylightConfig = toml::from_str(
        r#"
        [protection]
        preset = "high"

        [autonomy]
        endpoint = "http://localhost:8787/autonomy"
        "#,
    )
    .expect("parse");

    assert!(config.protection.enabled, "enabled defaults to true");
    assert_eq!(config.protection.preset, ThresholdPreset::High);
    assert_eq!(
        config.autonomy.endpoint.as_deref(),
        Some("http://localhost:8787/autonomy")
    );
    assert_eq!(config.autonomy.timeout_ms, 1500);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn bad_leave_url_is_rejected() {
    let config: StraylightConfig = toml::from_str(
        r#"
        [protection]
        leave_url = "not a url"
        "#,
    )
    .expect("parse");

    match config.validate() {
        Err(ConfigError::InvalidUrl { field, .. }) => {
            assert_eq!(field, "protection.leave_url");
        }
        other => panic!("expected InvalidUrl, got {other:?}"),
    }
}

#[test]
fn bad_endpoint_urls_are_rejected() {
    let config: StraylightConfig = toml::from_str(
        r#"
        [aggregator]
        endpoint = "::"
        "#,
    )
    .expect("parse");
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidUrl { field, .. }) if field == "aggregator.endpoint"
    ));
}

#[test]
fn autonomy_timeout_must_be_within_bounds() {
    for (ms, ok) in [(99_u64, false), (100, true), (10_000, true), (10_001, false)] {
        let config: StraylightConfig =
            toml::from_str(&format!("[autonomy]\ntimeout_ms = {ms}")).expect("parse");
        assert_eq!(config.validate().is_ok(), ok, "timeout_ms = {ms}");
    }
}

#[test]
fn zero_intervals_are_rejected() {
    let config: StraylightConfig =
        toml::from_str("[watch]\npoll_interval_secs = 0").expect("parse");
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OutOfRange { field, .. }) if field == "watch.poll_interval_secs"
    ));

    let config: StraylightConfig =
        toml::from_str("[watch]\nsession_tick_secs = 0").expect("parse");
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OutOfRange { field, .. }) if field == "watch.session_tick_secs"
    ));
}

// ---------------------------------------------------------------------------
// File loading
// ---------------------------------------------------------------------------

#[test]
fn load_config_reads_and_validates_a_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("straylight.toml");
    std::fs::write(
        &path,
        r#"
        [protection]
        enabled = false
        preset = "low"

        [watch]
        poll_interval_secs = 10
        "#,
    )
    .expect("write config");

    let config = load_config(&path).expect("load");
    assert!(!config.protection.enabled);
    assert_eq!(config.protection.preset, ThresholdPreset::Low);
    assert_eq!(config.watch.poll_interval_secs, 10);
}

#[test]
fn load_config_rejects_invalid_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("straylight.toml");
    std::fs::write(&path, "[autonomy]\ntimeout_ms = 5").expect("write config");

    assert!(load_config(&path).is_err());
}

#[test]
fn load_config_fails_on_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(load_config(&dir.path().join("absent.toml")).is_err());
}

// ---------------------------------------------------------------------------
// Engine settings mapping
// ---------------------------------------------------------------------------

#[test]
fn engine_settings_mirror_the_config() {
    let config: StraylightConfig = toml::from_str(
        r#"
        [protection]
        enabled = false
        preset = "high"
        leave_url = "https://example.org/calm"

        [autonomy]
        timeout_ms = 250
        "#,
    )
    .expect("parse");

    let settings = config.engine_settings();
    assert!(!settings.enabled);
    assert_eq!(settings.preset, ThresholdPreset::High);
    assert_eq!(settings.leave_url, "https://example.org/calm");
    assert_eq!(settings.autonomy_timeout, Duration::from_millis(250));
}
