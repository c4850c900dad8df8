//! Pipeline owner: analysis, policy, overlay, and reporting per trigger.
//!
//! One [`Engine`] per document. Every trigger (initial load, significant
//! mutation batch) runs extract, score, policy, and the overlay trigger as
//! one synchronous sequence; the only await on the intervention path is
//! the bounded, fail-open autonomy check. Reports ship in parallel on
//! spawned tasks and never influence the outcome.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tracing::{debug, info};

use crate::autonomy::{self, AutonomyCheck};
use crate::catalog::Catalog;
use crate::extractor::{self, PageAnalysis};
use crate::overlay::{Overlay, OverlayEffect};
use crate::policy::{self, ThresholdPreset};
use crate::reporter::{CartEvent, CheckoutEvent, Report, Reporter};
use crate::session::SessionData;
use crate::watcher::{self, ChangeBatch};

/// Engine settings injected from the settings provider.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Master protection toggle. When off, analyses still run and report
    /// but never intervene.
    pub enabled: bool,
    /// Risk-level gate preset.
    pub preset: ThresholdPreset,
    /// Neutral destination for the "Leave Site" action.
    pub leave_url: String,
    /// Upper bound on the autonomy call.
    pub autonomy_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            preset: ThresholdPreset::default(),
            leave_url: "about:blank".to_owned(),
            autonomy_timeout: Duration::from_millis(1500),
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct EngineOutcome {
    /// The analysis produced by this trigger.
    pub analysis: PageAnalysis,
    /// Whether the policy decided to interrupt.
    pub intervened: bool,
    /// Host effects to apply, in order.
    pub effects: Vec<OverlayEffect>,
}

/// The per-document risk engine.
pub struct Engine {
    catalog: Catalog,
    settings: EngineSettings,
    session: SessionData,
    overlay: Overlay,
    reporter: Reporter,
    autonomy: Arc<dyn AutonomyCheck>,
    last_analysis: Option<PageAnalysis>,
}

impl Engine {
    /// Create an engine for a freshly loaded document.
    pub fn new(
        settings: EngineSettings,
        reporter: Reporter,
        autonomy: Arc<dyn AutonomyCheck>,
    ) -> Self {
        Self {
            catalog: Catalog::new(),
            settings,
            session: SessionData::new(),
            overlay: Overlay::new(),
            reporter,
            autonomy,
            last_analysis: None,
        }
    }

    /// Current session counters.
    pub fn session(&self) -> &SessionData {
        &self.session
    }

    /// The overlay state machine.
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// The most recent analysis, if any trigger has run.
    pub fn last_analysis(&self) -> Option<&PageAnalysis> {
        self.last_analysis.as_ref()
    }

    /// Handle the initial page load.
    pub async fn handle_load(&mut self, snapshot: &crate::page::PageSnapshot) -> EngineOutcome {
        self.run_pipeline(snapshot).await
    }

    /// Handle a mutation batch. Returns `None` for insignificant batches.
    pub async fn handle_change(
        &mut self,
        snapshot: &crate::page::PageSnapshot,
        batch: &ChangeBatch,
    ) -> Option<EngineOutcome> {
        if !watcher::is_significant(batch) {
            debug!(
                added_nodes = batch.added_nodes,
                "insignificant mutation batch, skipping"
            );
            return None;
        }
        Some(self.run_pipeline(snapshot).await)
    }

    /// One full pipeline pass for the current document state.
    async fn run_pipeline(&mut self, snapshot: &crate::page::PageSnapshot) -> EngineOutcome {
        let analysis = extractor::analyze(&self.catalog, snapshot, Local::now());

        self.session.record_analysis(&analysis);
        self.reporter.emit(Report::PageAnalysis {
            data: Box::new(analysis.clone()),
            session: self.session.clone(),
        });

        let mut effects = Vec::new();
        let mut intervened = false;

        let should = self.settings.enabled
            && policy::should_intervene(&analysis, self.settings.preset)
            && !self.overlay.is_visible();

        if should {
            let decision = autonomy::bounded_check(
                self.autonomy.as_ref(),
                &analysis,
                self.settings.autonomy_timeout,
            )
            .await;

            if !decision.allow {
                if let Some(url) = decision.redirect {
                    info!(%url, "autonomy check redirected the tab");
                    effects.push(OverlayEffect::Navigate { url });
                    intervened = true;
                }
            }

            if !intervened {
                if let Some(effect) = self.overlay.trigger() {
                    info!(
                        score = analysis.risk_score,
                        level = ?analysis.risk_level,
                        tactics = analysis.tactics.len(),
                        "intervention triggered"
                    );
                    effects.push(effect);
                    intervened = true;
                }
            }
        }

        self.last_analysis = Some(analysis.clone());

        EngineOutcome {
            analysis,
            intervened,
            effects,
        }
    }

    /// Periodic session bookkeeping (5-second tick in the host).
    ///
    /// Accumulates shopping time when the last analysis classified the
    /// page as a shopping site, then ships a session update.
    pub fn session_tick(&mut self, secs: u64) {
        let on_shopping_site = self
            .last_analysis
            .as_ref()
            .is_some_and(|a| a.is_shopping_site);

        if on_shopping_site {
            self.session.add_shopping_time(secs);
        }

        self.reporter.emit(Report::SessionUpdate {
            session: self.session.clone(),
        });
    }

    /// Forward one second of reflect countdown to the overlay.
    pub fn reflect_tick(&mut self) -> Option<OverlayEffect> {
        self.overlay.tick()
    }

    /// User clicked "Pause & Reflect".
    pub fn begin_reflection(&mut self) -> Option<OverlayEffect> {
        self.overlay.begin_reflection()
    }

    /// User clicked "Continue Shopping" or the close control.
    pub fn dismiss_overlay(&mut self) -> Option<OverlayEffect> {
        self.overlay.dismiss()
    }

    /// User clicked "Leave Site".
    ///
    /// Emits the leave report before returning the navigate effect; the
    /// report is best-effort and the navigation does not wait for it.
    pub fn leave_site(&mut self) -> Option<OverlayEffect> {
        let effect = self.overlay.leave(&self.settings.leave_url)?;

        let url = self
            .last_analysis
            .as_ref()
            .map(|a| a.url.clone())
            .unwrap_or_default();
        self.reporter.emit(Report::LeaveSite { url });

        Some(effect)
    }

    /// Host observed a cart interaction (e.g. an add-to-cart click).
    pub fn record_cart_interaction(&mut self, url: &str, cart_items: u32) {
        self.session.record_cart_interaction();
        self.reporter.emit(Report::CartInteraction {
            data: CartEvent {
                url: url.to_owned(),
                cart_items,
            },
        });
    }

    /// Host observed a checkout form submission.
    pub fn record_checkout_attempt(&mut self) {
        let Some(analysis) = self.last_analysis.as_ref() else {
            return;
        };
        self.reporter.emit(Report::CheckoutAttempt {
            data: CheckoutEvent {
                url: analysis.url.clone(),
                prices: analysis.prices.clone(),
                risk_score: analysis.risk_score,
            },
        });
    }
}
