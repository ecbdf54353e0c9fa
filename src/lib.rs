//! # Atlas
//!
//! Segment Location Atlas - an in-memory, continuously-updated catalog that
//! maps each immutable data segment to the set of servers currently hosting
//! it, and composes per-dataset versioned interval timelines so a query
//! router can resolve "which segment replicas are live and non-overshadowed
//! for this time range" without touching the network on the query path.
//!
//! ## Design
//!
//! - **Single-writer discipline**: an external inventory transport pushes
//!   typed events onto a channel; one worker task applies them in order, so
//!   interleaved adds/removes from different servers never race inside the
//!   index.
//! - **Lazy overshadow resolution**: timelines store `(interval, version)`
//!   entries as reported; a higher version hides a lower one on shared
//!   sub-ranges only when a lookup asks, keeping mutations cheap under
//!   rebalancing churn.
//! - **Rebuildable cache**: nothing is persisted; on restart the view is
//!   reconstructed from a fresh inventory snapshot.
//!
//! ## Modules
//!
//! - [`segment`]: immutable value types (intervals, segments, servers, chunks)
//! - [`timeline`]: the versioned interval timeline and its lookup algorithm
//! - [`view`]: inventory events, the location index, and the facade
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use atlas::{ClusterView, Interval, Segment, ServerMeta};
//! use atlas::config::ViewConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let view = Arc::new(ClusterView::new(ViewConfig::default()));
//!     let feed = view.subscribe()?;
//!
//!     // The inventory transport reports what each server holds...
//!     let server = ServerMeta::new("historical-1", "10.0.0.5:8083");
//!     let segment = Segment::new("events", Interval::new(0, 86_400_000), "v1");
//!     feed.segment_added(server, segment).await?;
//!     feed.initial_sync_complete().await?;
//!
//!     // ...and query planners resolve visibility from snapshots
//!     let snapshot = view.timeline("events");
//!     for range in snapshot.lookup(Interval::new(0, 86_400_000)) {
//!         println!("{} @ {}: {} chunk(s)", range.interval, range.version, range.segments.len());
//!     }
//!
//!     view.stop().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod segment;
pub mod timeline;
pub mod view;

// Re-export top-level types for convenience
pub use segment::{Interval, PartitionChunk, Segment, SegmentId, ServerMeta};

pub use timeline::{TimelineSlice, VersionedTimeline};

pub use view::{
    ClusterView, InventoryEvent, InventoryFeed, LocationIndex, SegmentLocation, TimelineSnapshot,
    ViewError, ViewStats, VisibleRange,
};

pub use config::{Config, ConfigError, LoggingConfig, ViewConfig};
