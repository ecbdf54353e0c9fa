//! Core value types for the segment location atlas
//!
//! This module defines the immutable values flowing through the view:
//! - `Interval`: a half-open time range covered by a segment
//! - `Segment`: one immutable unit of stored data
//! - `ServerMeta`: identity of a physical server hosting segments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a segment, derived from its identity fields
pub type SegmentId = String;

/// A half-open time interval `[start, end)` in Unix milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// Start timestamp (inclusive), in milliseconds
    pub start: i64,
    /// End timestamp (exclusive), in milliseconds
    pub end: i64,
}

impl Interval {
    /// Create a new interval
    ///
    /// # Panics
    /// Panics if start >= end
    pub fn new(start: i64, end: i64) -> Self {
        assert!(start < end, "Interval: start must be less than end");
        Self { start, end }
    }

    /// Create an interval, returning None if invalid
    pub fn try_new(start: i64, end: i64) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Create an interval from UTC datetime endpoints
    pub fn utc(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        Self::try_new(start.timestamp_millis(), end.timestamp_millis())
    }

    /// Parse an interval literal of the form `start/end`
    ///
    /// Each side may be an RFC 3339 datetime or a raw millisecond timestamp:
    /// `2024-01-01T00:00:00Z/2024-01-02T00:00:00Z` or `0/86400000`.
    pub fn parse(s: &str) -> Option<Self> {
        let (start, end) = s.split_once('/')?;
        Self::try_new(parse_endpoint(start)?, parse_endpoint(end)?)
    }

    /// Check if a timestamp falls within this interval
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp < self.end
    }

    /// Check if this interval fully encloses another
    pub fn encloses(&self, other: &Interval) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// Check if this interval overlaps with another
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Get intersection with another interval, if any
    pub fn intersection(&self, other: &Interval) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        Self::try_new(start, end)
    }

    /// Get the duration in milliseconds
    pub fn duration_millis(&self) -> i64 {
        self.end - self.start
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.start, self.end)
    }
}

fn parse_endpoint(s: &str) -> Option<i64> {
    if let Ok(millis) = s.parse::<i64>() {
        return Some(millis);
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

/// One immutable unit of stored data
///
/// A segment covers one interval of one dataset at one version. Segments
/// never mutate after creation; replacement is modeled as an add of the new
/// segment followed by an eventual remove of the old one.
///
/// Versions are compared lexicographically. ISO-8601 timestamp versions
/// (the usual choice) order chronologically under that comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Segment {
    /// Logical dataset this segment belongs to
    pub dataset: String,
    /// Time range covered, half-open
    pub interval: Interval,
    /// Ordering key among segments covering overlapping intervals
    pub version: String,
    /// Partition number within the interval+version group
    #[serde(default)]
    pub partition: u32,
    /// Total partitions in the interval+version group
    #[serde(default = "default_partition_count")]
    pub partition_count: u32,
}

fn default_partition_count() -> u32 {
    1
}

impl Segment {
    /// Create an unpartitioned segment (partition 0 of 1)
    pub fn new(dataset: impl Into<String>, interval: Interval, version: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            interval,
            version: version.into(),
            partition: 0,
            partition_count: 1,
        }
    }

    /// Builder: set the partition descriptor
    pub fn partition(mut self, number: u32, of: u32) -> Self {
        self.partition = number;
        self.partition_count = of;
        self
    }

    /// Derive the canonical segment identifier
    pub fn id(&self) -> SegmentId {
        format!(
            "{}_{}_{}_{}_{}",
            self.dataset, self.interval.start, self.interval.end, self.version, self.partition
        )
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Identity of a physical server hosting segments
///
/// The atlas only references servers; it never owns or manages them.
/// `name` is the identity key within a cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServerMeta {
    /// Unique server name within the cluster
    pub name: String,
    /// Host and port the server answers on
    pub host: String,
}

impl ServerMeta {
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
        }
    }
}

impl std::fmt::Display for ServerMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
