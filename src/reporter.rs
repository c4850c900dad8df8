//! Fire-and-forget event reporting to the external aggregator.
//!
//! The aggregator consumes classified events (page analysis, session
//! update, cart interaction, checkout attempt, leave) and maintains the
//! dashboard statistics. No core decision depends on its availability:
//! submissions run on spawned tasks, failures are logged and dropped, and
//! acks are ignored.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::extractor::PageAnalysis;
use crate::session::SessionData;

/// Cart-interaction details, supplied by the host's cart-add listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartEvent {
    /// Page URL at the time of the interaction.
    pub url: String,
    /// Cart item count after the interaction.
    pub cart_items: u32,
}

/// Checkout-attempt details, supplied by the host's submit listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutEvent {
    /// Checkout page URL.
    pub url: String,
    /// Prices visible on the checkout page.
    pub prices: Vec<f64>,
    /// Risk score of the triggering analysis.
    pub risk_score: u32,
}

/// A classified event shipped to the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Report {
    /// A completed page analysis with the current session state.
    PageAnalysis {
        /// The analysis result.
        data: Box<PageAnalysis>,
        /// Session counters after folding in the analysis.
        session: SessionData,
    },
    /// Periodic session bookkeeping.
    SessionUpdate {
        /// Current session counters.
        session: SessionData,
    },
    /// The user added something to a cart.
    CartInteraction {
        /// Interaction details.
        data: CartEvent,
    },
    /// The user submitted a checkout form.
    CheckoutAttempt {
        /// Attempt details.
        data: CheckoutEvent,
    },
    /// The user chose "Leave Site" from the overlay.
    LeaveSite {
        /// URL of the page being left.
        url: String,
    },
}

/// Acknowledgment returned by the aggregator. Ignored by the core.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ack {
    /// Whether the aggregator accepted the report.
    #[serde(default)]
    pub success: bool,
}

/// Destination for reports.
#[async_trait]
pub trait Aggregator: Send + Sync {
    /// Submit one report.
    async fn submit(&self, report: &Report) -> anyhow::Result<Ack>;
}

/// HTTP aggregator posting JSON reports to a single endpoint.
pub struct HttpAggregator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAggregator {
    /// Create an aggregator client for the given endpoint URL.
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl Aggregator for HttpAggregator {
    async fn submit(&self, report: &Report) -> anyhow::Result<Ack> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(report)
            .send()
            .await?;

        let status = response.status();
        anyhow::ensure!(status.is_success(), "aggregator returned {status}");

        // A missing or malformed ack body is fine; the ack is advisory.
        let ack = response.json::<Ack>().await.unwrap_or(Ack { success: true });
        Ok(ack)
    }
}

/// Fire-and-forget report emitter.
///
/// Holds an optional aggregator; without one, every emit is a no-op so
/// the engine works unchanged when reporting is not configured.
#[derive(Clone)]
pub struct Reporter {
    sink: Option<Arc<dyn Aggregator>>,
}

impl Reporter {
    /// Create a reporter backed by the given aggregator.
    pub fn new(sink: Arc<dyn Aggregator>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Create a reporter that drops every report.
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// Emit a report without waiting for the result.
    ///
    /// Submission runs on a spawned task. Failures are logged at `warn`
    /// and never retried; the engine's decisions are self-contained and
    /// must not depend on network availability.
    pub fn emit(&self, report: Report) {
        let Some(sink) = self.sink.clone() else {
            return;
        };

        tokio::spawn(async move {
            match sink.submit(&report).await {
                Ok(ack) => debug!(success = ack.success, "report delivered"),
                Err(e) => warn!(error = %e, "report delivery failed"),
            }
        });
    }
}
