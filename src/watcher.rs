//! Change-batch significance and snapshot-directory polling.
//!
//! The engine does not assume a specific DOM API; the host delivers
//! batched change notifications as [`ChangeBatch`] values. A batch is
//! significant when it adds more than five nodes at once or touches an
//! element whose class name mentions the cart or checkout. Significant
//! batches re-drive the full pipeline; there is no incremental diffing.
//!
//! [`SnapshotWatcher`] is the filesystem-backed change source used by
//! daemon mode: it polls a drop directory for snapshot-event files and
//! hands new ones to the engine in modification order.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::page::PageSnapshot;

/// Number of added nodes above which a batch is significant.
pub const SIGNIFICANT_NODE_COUNT: usize = 5;

/// Class-name substrings that make a batch significant on their own.
pub const SIGNIFICANT_CLASS_SUBSTRINGS: &[&str] = &["cart", "checkout"];

/// One batch of document changes reported by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeBatch {
    /// Nodes added in this batch.
    #[serde(default)]
    pub added_nodes: usize,

    /// Class attribute values of elements touched by the batch.
    #[serde(default)]
    pub touched_classes: Vec<String>,
}

/// Whether a batch warrants a full recomputation.
pub fn is_significant(batch: &ChangeBatch) -> bool {
    if batch.added_nodes > SIGNIFICANT_NODE_COUNT {
        return true;
    }

    batch.touched_classes.iter().any(|class| {
        let lower = class.to_lowercase();
        SIGNIFICANT_CLASS_SUBSTRINGS
            .iter()
            .any(|substring| lower.contains(substring))
    })
}

/// A snapshot plus the change batch that produced it, as delivered by the
/// host. A missing batch means an initial page load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEvent {
    /// The document capture to analyze.
    pub snapshot: PageSnapshot,

    /// The mutation batch that prompted this capture, if any.
    #[serde(default)]
    pub change: Option<ChangeBatch>,
}

/// Polls a drop directory for snapshot-event files.
///
/// Tracks per-file modification times so each write is delivered once.
/// Files that fail to parse are skipped with a warning; they may be
/// partial writes.
pub struct SnapshotWatcher {
    dir: PathBuf,
    seen: HashMap<PathBuf, SystemTime>,
}

impl SnapshotWatcher {
    /// Create a watcher over the given drop directory.
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            seen: HashMap::new(),
        }
    }

    /// Collect snapshot events written since the last poll, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the drop directory cannot be read.
    pub fn poll(&mut self) -> anyhow::Result<Vec<SnapshotEvent>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("failed to read snapshot directory {}", self.dir.display()))?;

        let mut fresh: Vec<(PathBuf, SystemTime)> = Vec::new();

        for entry in entries {
            let entry = entry.context("failed to read directory entry")?;
            let path = entry.path();

            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .with_context(|| format!("failed to read mtime for {}", path.display()))?;

            let unseen = self
                .seen
                .get(&path)
                .is_none_or(|last| modified > *last);

            if unseen {
                fresh.push((path, modified));
            }
        }

        fresh.sort_by_key(|(_, modified)| *modified);

        let mut events = Vec::new();
        for (path, modified) in fresh {
            match read_snapshot_event(&path) {
                Ok(event) => events.push(event),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable snapshot"),
            }
            self.seen.insert(path, modified);
        }

        Ok(events)
    }
}

/// Read and parse one snapshot-event file.
///
/// A bare [`PageSnapshot`] document is accepted and treated as an initial
/// load.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed either way.
pub fn read_snapshot_event(path: &Path) -> anyhow::Result<SnapshotEvent> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot file {}", path.display()))?;

    if let Ok(event) = serde_json::from_str::<SnapshotEvent>(&contents) {
        return Ok(event);
    }

    let snapshot: PageSnapshot = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse snapshot file {}", path.display()))?;

    Ok(SnapshotEvent {
        snapshot,
        change: None,
    })
}
