//! Tests for the report wire format and the fire-and-forget emitter.

use std::sync::Arc;

use async_trait::async_trait;
use straylight::extractor::PageAnalysis;
use straylight::reporter::{Ack, Aggregator, CartEvent, Report, Reporter};
use straylight::session::SessionData;

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[test]
fn reports_are_tagged_by_type() {
    let report = Report::PageAnalysis {
        data: Box::new(PageAnalysis::default()),
        session: SessionData::new(),
    };
    let json = serde_json::to_value(&report).expect("serialize");
    assert_eq!(json["type"], "page_analysis");
    assert!(json["data"].is_object());
    assert!(json["session"].is_object());
}

#[test]
fn cart_interaction_carries_its_details() {
    let report = Report::CartInteraction {
        data: CartEvent {
            url: "https://shop.example.org/p/1".to_owned(),
            cart_items: 3,
        },
    };
    let json = serde_json::to_value(&report).expect("serialize");
    assert_eq!(json["type"], "cart_interaction");
    assert_eq!(json["data"]["cart_items"], 3);
}

#[test]
fn leave_site_carries_the_url() {
    let report = Report::LeaveSite {
        url: "https://shop.example.org/checkout".to_owned(),
    };
    let json = serde_json::to_value(&report).expect("serialize");
    assert_eq!(json["type"], "leave_site");
    assert_eq!(json["url"], "https://shop.example.org/checkout");
}

#[test]
fn ack_tolerates_an_empty_body() {
    let ack: Ack = serde_json::from_str("{}").expect("deserialize");
    assert!(!ack.success);
}

// ---------------------------------------------------------------------------
// Fire-and-forget emission
// ---------------------------------------------------------------------------

struct CapturingAggregator {
    sender: tokio::sync::mpsc::UnboundedSender<Report>,
}

#[async_trait]
impl Aggregator for CapturingAggregator {
    async fn submit(&self, report: &Report) -> anyhow::Result<Ack> {
        self.sender.send(report.clone())?;
        Ok(Ack { success: true })
    }
}

struct FailingAggregator;

#[async_trait]
impl Aggregator for FailingAggregator {
    async fn submit(&self, _report: &Report) -> anyhow::Result<Ack> {
        anyhow::bail!("aggregator unreachable")
    }
}

#[tokio::test]
async fn emit_delivers_on_a_background_task() {
    let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
    let reporter = Reporter::new(Arc::new(CapturingAggregator { sender }));

    reporter.emit(Report::SessionUpdate {
        session: SessionData::new(),
    });

    let delivered = tokio::time::timeout(std::time::Duration::from_secs(1), receiver.recv())
        .await
        .expect("delivery within a second")
        .expect("channel open");
    assert!(matches!(delivered, Report::SessionUpdate { .. }));
}

#[tokio::test]
async fn emit_preserves_order_per_sink() {
    let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
    let reporter = Reporter::new(Arc::new(CapturingAggregator { sender }));

    reporter.emit(Report::LeaveSite {
        url: "first".to_owned(),
    });

    // Each emit is its own task, so only drain what was already sent.
    let first = tokio::time::timeout(std::time::Duration::from_secs(1), receiver.recv())
        .await
        .expect("delivery within a second")
        .expect("channel open");
    assert!(matches!(first, Report::LeaveSite { url } if url == "first"));
}

#[tokio::test]
async fn delivery_failure_does_not_surface() {
    let reporter = Reporter::new(Arc::new(FailingAggregator));

    // The failure is logged on the spawned task; emit itself never errors.
    reporter.emit(Report::SessionUpdate {
        session: SessionData::new(),
    });
    tokio::task::yield_now().await;
}

#[tokio::test]
async fn disabled_reporter_drops_everything() {
    let reporter = Reporter::disabled();
    reporter.emit(Report::SessionUpdate {
        session: SessionData::new(),
    });
    tokio::task::yield_now().await;
}
