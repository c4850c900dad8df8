//! Straylight CLI entry point.
//!
//! Provides `check`, `watch`, and `patterns` subcommands: a one-shot
//! analysis of a snapshot file, a daemon that polls a snapshot drop
//! directory and runs the full pipeline, and a catalog dump.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use straylight::autonomy::{AllowAll, AutonomyCheck, HttpAutonomyCheck};
use straylight::catalog::Catalog;
use straylight::config::{self, StraylightConfig};
use straylight::engine::Engine;
use straylight::reporter::{HttpAggregator, Reporter};
use straylight::watcher::{self, SnapshotWatcher};

/// Straylight — risk scoring and intervention for impulse-shopping pages.
#[derive(Parser)]
#[command(name = "straylight", version, about)]
struct Cli {
    /// Path to straylight.toml (defaults to the user config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Analyze one snapshot file and print the outcome as JSON.
    Check {
        /// Path to a snapshot or snapshot-event JSON file.
        snapshot: PathBuf,
    },
    /// Poll a snapshot drop directory and run the pipeline continuously.
    Watch {
        /// Directory the host writes snapshot-event files into.
        dir: PathBuf,
    },
    /// Print the dark-pattern catalog as JSON.
    Patterns,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Check { snapshot } => handle_check(&config, &snapshot).await,
        Command::Watch { dir } => handle_watch(&config, dir).await,
        Command::Patterns => handle_patterns(),
    }
}

/// Load configuration from the explicit path or the default location.
fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<StraylightConfig> {
    match path {
        Some(p) => config::load_config(p),
        None => config::load_or_default(),
    }
}

/// Build an engine from the loaded configuration.
fn build_engine(config: &StraylightConfig) -> Engine {
    let reporter = match &config.aggregator.endpoint {
        Some(endpoint) => Reporter::new(Arc::new(HttpAggregator::new(endpoint.clone()))),
        None => Reporter::disabled(),
    };

    let autonomy: Arc<dyn AutonomyCheck> = match &config.autonomy.endpoint {
        Some(endpoint) => Arc::new(HttpAutonomyCheck::new(endpoint.clone())),
        None => Arc::new(AllowAll),
    };

    Engine::new(config.engine_settings(), reporter, autonomy)
}

/// Run a single analysis pass and print the outcome.
async fn handle_check(config: &StraylightConfig, path: &std::path::Path) -> anyhow::Result<()> {
    straylight::logging::init_cli();

    let event = watcher::read_snapshot_event(path)?;
    let mut engine = build_engine(config);

    let outcome = match &event.change {
        Some(batch) => match engine.handle_change(&event.snapshot, batch).await {
            Some(outcome) => outcome,
            None => {
                info!("change batch below significance threshold, no analysis run");
                return Ok(());
            }
        },
        None => engine.handle_load(&event.snapshot).await,
    };

    let rendered = serde_json::json!({
        "analysis": outcome.analysis,
        "intervened": outcome.intervened,
        "effects": outcome.effects,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&rendered).context("failed to serialize outcome")?
    );

    Ok(())
}

/// Run the daemon: poll the drop directory, tick the session clock, and
/// advance any reflect countdown.
async fn handle_watch(config: &StraylightConfig, dir: PathBuf) -> anyhow::Result<()> {
    let logs_dir = config::default_log_dir()?;
    let _logging_guard = straylight::logging::init_daemon(&logs_dir)?;

    let mut engine = build_engine(config);
    let mut snapshots = SnapshotWatcher::new(dir.clone());
    let mut loaded = false;

    info!(dir = %dir.display(), "straylight watch started");

    let mut poll_interval = tokio::time::interval(tokio::time::Duration::from_secs(
        config.watch.poll_interval_secs,
    ));
    let mut session_interval = tokio::time::interval(tokio::time::Duration::from_secs(
        config.watch.session_tick_secs,
    ));
    let mut reflect_interval =
        tokio::time::interval(tokio::time::Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = poll_interval.tick() => {
                let events = match snapshots.poll() {
                    Ok(events) => events,
                    Err(e) => {
                        warn!(error = %e, "snapshot poll failed");
                        continue;
                    }
                };

                for event in events {
                    let outcome = if let (true, Some(batch)) = (loaded, event.change.as_ref()) {
                        engine.handle_change(&event.snapshot, batch).await
                    } else {
                        loaded = true;
                        Some(engine.handle_load(&event.snapshot).await)
                    };

                    if let Some(outcome) = outcome {
                        info!(
                            url = %outcome.analysis.url,
                            score = outcome.analysis.risk_score,
                            level = ?outcome.analysis.risk_level,
                            intervened = outcome.intervened,
                            "analysis complete"
                        );
                        for effect in &outcome.effects {
                            info!(?effect, "host effect");
                        }
                    }
                }
            }
            _ = session_interval.tick() => {
                engine.session_tick(config.watch.session_tick_secs);
            }
            _ = reflect_interval.tick() => {
                if let Some(effect) = engine.reflect_tick() {
                    info!(?effect, "reflect countdown");
                }
            }
        }
    }
}

/// Print the compiled dark-pattern catalog.
fn handle_patterns() -> anyhow::Result<()> {
    let catalog = Catalog::new();

    let entries: Vec<_> = catalog
        .tactics()
        .iter()
        .map(|pattern| {
            serde_json::json!({
                "phrase": pattern.phrase,
                "kind": pattern.kind,
            })
        })
        .collect();

    println!(
        "{}",
        serde_json::to_string_pretty(&entries).context("failed to serialize catalog")?
    );

    Ok(())
}
