//! Straylight — heuristic risk-scoring and intervention engine for
//! impulse-shopping pages.
//!
//! Classifies a page snapshot (shopping site, checkout page, product page,
//! cart state, manipulative "dark pattern" language), combines the signals
//! into an additive risk score, decides whether to interrupt the user, and
//! owns the interruption lifecycle: overlay, 30-second reflect countdown,
//! and the continue / pause / leave exits.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Remote autonomy check capability (fail-open).
pub mod autonomy;
/// Static pattern tables: domains, keywords, dark patterns, weights.
pub mod catalog;
/// Configuration loading and validation.
pub mod config;
/// Pipeline owner: analysis, policy, overlay, and reporting per trigger.
pub mod engine;
/// Page signal extraction: snapshot to `PageAnalysis`.
pub mod extractor;
/// Structured logging setup.
pub mod logging;
/// Overlay state machine for the interruption lifecycle.
pub mod overlay;
/// Host-environment page snapshot types.
pub mod page;
/// Intervention-trigger policy with threshold presets.
pub mod policy;
/// Fire-and-forget event reporting to the external aggregator.
pub mod reporter;
/// Risk scoring: signals to score to categorical level.
pub mod scorer;
/// Per-document session bookkeeping.
pub mod session;
/// Change-batch significance and snapshot-directory polling.
pub mod watcher;
