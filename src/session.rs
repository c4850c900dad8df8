//! Per-document session bookkeeping.
//!
//! One [`SessionData`] per engine instance, created at content-script
//! injection and discarded on teardown. Mutated by every analysis pass
//! and every periodic tick; cross-session aggregation is the external
//! aggregator's job, not ours.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extractor::PageAnalysis;

/// Mutable per-tab session counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    /// Correlation id for the aggregator.
    pub id: Uuid,
    /// Session start instant.
    pub started_at: DateTime<Utc>,
    /// Pages analyzed this session.
    pub pages_visited: u64,
    /// Analyzed pages classified as shopping sites.
    pub shopping_sites_visited: u64,
    /// Every price seen this session, append-only.
    pub prices_viewed: Vec<f64>,
    /// Cart interactions observed by the host.
    pub cart_interactions: u64,
    /// Accumulated seconds spent on shopping sites.
    pub shopping_secs: u64,
}

impl SessionData {
    /// Start a fresh session.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            pages_visited: 0,
            shopping_sites_visited: 0,
            prices_viewed: Vec::new(),
            cart_interactions: 0,
            shopping_secs: 0,
        }
    }

    /// Fold one analysis pass into the counters.
    pub fn record_analysis(&mut self, analysis: &PageAnalysis) {
        self.pages_visited = self.pages_visited.saturating_add(1);
        if analysis.is_shopping_site {
            self.shopping_sites_visited = self.shopping_sites_visited.saturating_add(1);
        }
        self.prices_viewed.extend_from_slice(&analysis.prices);
    }

    /// Accumulate time spent on a shopping site (periodic tick).
    pub fn add_shopping_time(&mut self, secs: u64) {
        self.shopping_secs = self.shopping_secs.saturating_add(secs);
    }

    /// Count one cart interaction.
    pub fn record_cart_interaction(&mut self) {
        self.cart_interactions = self.cart_interactions.saturating_add(1);
    }
}

impl Default for SessionData {
    fn default() -> Self {
        Self::new()
    }
}
