//! Atlas replay tool
//!
//! Replays a JSON inventory snapshot through a cluster view and reports what
//! a query router would see. Useful for inspecting overshadow resolution
//! offline: feed it the segment listings of each server and ask which
//! replicas are visible for a dataset and interval.
//!
//! Snapshot format: a JSON array of `{ "server": {...}, "segments": [...] }`
//! entries, one per server.

use anyhow::{bail, Context};
use atlas::{ClusterView, Config, Interval, Segment, ServerMeta};
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "atlas",
    version,
    about = "Replay an inventory snapshot and inspect the resolved segment view"
)]
struct Args {
    /// Path to a JSON inventory snapshot (array of servers with their segments)
    #[arg(long)]
    snapshot: PathBuf,

    /// Dataset to resolve after the replay
    #[arg(long, requires = "interval")]
    dataset: Option<String>,

    /// Interval to resolve, as start/end (RFC 3339 or milliseconds per side)
    #[arg(long, requires = "dataset")]
    interval: Option<String>,

    /// Path to a TOML config file (defaults to the standard search paths)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// One server's segment listing in the snapshot file
#[derive(Debug, Deserialize)]
struct InventoryEntry {
    server: ServerMeta,
    segments: Vec<Segment>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("atlas={}", config.logging.level)),
    );
    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Atlas replay tool v{}", env!("CARGO_PKG_VERSION"));

    let content = std::fs::read_to_string(&args.snapshot)
        .with_context(|| format!("failed to read snapshot {:?}", args.snapshot))?;
    let entries: Vec<InventoryEntry> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse snapshot {:?}", args.snapshot))?;

    let view = Arc::new(ClusterView::new(config.view.clone()));
    let feed = view.subscribe()?;

    for entry in entries {
        tracing::debug!(server = %entry.server, segments = entry.segments.len(), "Replaying server");
        for segment in entry.segments {
            feed.segment_added(entry.server.clone(), segment).await?;
        }
    }
    feed.initial_sync_complete().await?;
    wait_initialized(&view).await?;

    tracing::info!("View stats: {}", view.stats());
    tracing::info!("Datasets: {:?}", view.datasets());

    if let (Some(dataset), Some(interval)) = (&args.dataset, &args.interval) {
        let interval = Interval::parse(interval)
            .with_context(|| format!("invalid interval literal {interval:?}"))?;
        resolve(&view, dataset, interval)?;
    }

    view.stop().await;
    Ok(())
}

/// Wait until the replayed snapshot has been fully applied
async fn wait_initialized(view: &ClusterView) -> anyhow::Result<()> {
    let result = tokio::time::timeout(Duration::from_secs(30), async {
        while !view.is_initialized() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;

    if result.is_err() {
        bail!("timed out waiting for the inventory replay to apply");
    }
    Ok(())
}

/// Print the visible ranges for one dataset and interval as JSON
fn resolve(view: &ClusterView, dataset: &str, interval: Interval) -> anyhow::Result<()> {
    let snapshot = view.timeline(dataset);
    let ranges = snapshot.lookup(interval);

    tracing::info!(
        dataset,
        %interval,
        visible_ranges = ranges.len(),
        "Resolved lookup"
    );
    println!("{}", serde_json::to_string_pretty(&ranges)?);
    Ok(())
}
