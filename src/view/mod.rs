//! Cluster view: inventory events in, timeline snapshots out
//!
//! - **events**: the inventory feed boundary (typed events on a bounded
//!   channel, single consumer)
//! - **index**: `LocationIndex`, the selector sets and per-dataset timelines
//!   under one lock
//! - **snapshot**: point-in-time read surface for query planners
//! - **cluster**: `ClusterView`, the facade a coordinator process wires up
//! - **error**: lifecycle and feed errors
//!
//! # Flow
//!
//! ```text
//! transport ──InventoryEvent──▶ worker ──▶ LocationIndex
//!                                              │
//! query planner ◀── TimelineSnapshot ◀── timeline(dataset)
//! ```

mod cluster;
mod error;
mod events;
mod index;
mod snapshot;

pub use cluster::{ClusterView, ViewStats};
pub use error::ViewError;
pub use events::{InventoryEvent, InventoryFeed};
pub use index::{IndexStats, LocationIndex};
pub use snapshot::{SegmentLocation, TimelineSnapshot, VisibleRange};
