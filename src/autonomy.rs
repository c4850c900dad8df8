//! Remote autonomy check — the one external call on the intervention path.
//!
//! Before interrupting, the engine may ask a host-proxied endpoint
//! "allow or redirect?" for the triggering analysis. The contract is
//! strictly fail-open: a network error, a non-OK response, or a timeout
//! all resolve to "allow". The safer failure mode for a
//! consumer-protection tool is to not block the user's browsing.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extractor::PageAnalysis;

/// Verdict from the autonomy endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the user may stay on the page.
    #[serde(default = "default_allow")]
    pub allow: bool,

    /// Destination to send the tab to instead, when not allowed.
    #[serde(default)]
    pub redirect: Option<String>,
}

impl Decision {
    /// The fail-open default: allow, no redirect.
    pub fn allow() -> Self {
        Self {
            allow: true,
            redirect: None,
        }
    }
}

fn default_allow() -> bool {
    true
}

/// Capability for asking "allow or redirect?" about an analysis.
///
/// Implementations may fail; the engine bounds every call with a timeout
/// and maps any failure to [`Decision::allow`].
#[async_trait]
pub trait AutonomyCheck: Send + Sync {
    /// Ask for a verdict on the given analysis.
    async fn check(&self, analysis: &PageAnalysis) -> anyhow::Result<Decision>;
}

/// Autonomy check that allows everything. Used when no endpoint is
/// configured.
pub struct AllowAll;

#[async_trait]
impl AutonomyCheck for AllowAll {
    async fn check(&self, _analysis: &PageAnalysis) -> anyhow::Result<Decision> {
        Ok(Decision::allow())
    }
}

/// HTTP autonomy check posting the analysis to a host-proxied endpoint.
pub struct HttpAutonomyCheck {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAutonomyCheck {
    /// Create a client for the given endpoint URL.
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl AutonomyCheck for HttpAutonomyCheck {
    async fn check(&self, analysis: &PageAnalysis) -> anyhow::Result<Decision> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(analysis)
            .send()
            .await?;

        let status = response.status();
        anyhow::ensure!(status.is_success(), "autonomy endpoint returned {status}");

        let decision = response.json::<Decision>().await?;
        Ok(decision)
    }
}

/// Run a bounded autonomy check, resolving every failure to allow.
///
/// This is the only place the intervention path awaits the network; the
/// timeout guarantees the decision resolves within bounded time.
pub async fn bounded_check(
    checker: &dyn AutonomyCheck,
    analysis: &PageAnalysis,
    timeout: Duration,
) -> Decision {
    match tokio::time::timeout(timeout, checker.check(analysis)).await {
        Ok(Ok(decision)) => decision,
        Ok(Err(e)) => {
            debug!(error = %e, "autonomy check failed, failing open");
            Decision::allow()
        }
        Err(_) => {
            debug!(?timeout, "autonomy check timed out, failing open");
            Decision::allow()
        }
    }
}
