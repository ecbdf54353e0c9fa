//! Versioned interval timelines
//!
//! One `VersionedTimeline` per dataset turns overlapping, multi-versioned
//! segment intervals into a single coherent view:
//!
//! ```text
//! Stored:  [0 ──────────── v1 ──────────── 100)
//!               [30 ───── v2 ───── 70)
//!
//! lookup([0, 100)):
//!   [0, 30)  → v1 chunks
//!   [30, 70) → v2 chunks     (v2 overshadows v1 where they overlap)
//!   [70,100) → v1 chunks
//! ```
//!
//! Mutations store data as given; overshadow resolution happens lazily at
//! lookup time.

mod versioned;

pub use versioned::{TimelineSlice, VersionedTimeline};
