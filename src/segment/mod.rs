//! Segment data model
//!
//! Immutable values describing what is stored in the cluster:
//!
//! - **types**: `Interval`, `Segment`, `ServerMeta`
//! - **chunk**: `PartitionChunk`, the unit held inside a timeline entry
//!
//! Segments never mutate after creation; a replacement is modeled as an add
//! of the new segment followed by an eventual remove of the old one.

mod chunk;
mod types;

pub use chunk::PartitionChunk;
pub use types::{Interval, Segment, SegmentId, ServerMeta};
