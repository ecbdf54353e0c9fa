//! Point-in-time read surface handed to query planners
//!
//! A snapshot pairs a cloned timeline with the server sets resolved for its
//! segments at the instant the snapshot was taken, so lookups keep working
//! (and stay internally consistent) no matter what the event worker does
//! afterwards.

use crate::segment::{Interval, Segment, SegmentId, ServerMeta};
use crate::timeline::VersionedTimeline;
use serde::Serialize;
use std::collections::HashMap;

/// Consistent copy of one dataset's timeline and segment locations
#[derive(Debug, Clone, Default)]
pub struct TimelineSnapshot {
    timeline: VersionedTimeline,
    servers: HashMap<SegmentId, Vec<ServerMeta>>,
}

/// One visible sub-range of a queried interval, with located segments
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VisibleRange {
    /// The visible portion of the queried interval
    pub interval: Interval,
    /// Version visible on this portion
    pub version: String,
    /// The partition chunks of that version, with their serving servers
    pub segments: Vec<SegmentLocation>,
}

/// A segment replica set: where one segment can currently be read from
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SegmentLocation {
    pub segment: Segment,
    /// Servers reported as serving the segment when the snapshot was taken,
    /// sorted by name
    pub servers: Vec<ServerMeta>,
}

impl TimelineSnapshot {
    pub(crate) fn new(
        timeline: VersionedTimeline,
        servers: HashMap<SegmentId, Vec<ServerMeta>>,
    ) -> Self {
        Self { timeline, servers }
    }

    /// Resolve the visible, non-overshadowed coverage of `interval`
    ///
    /// Returns one entry per visible sub-range, ordered by start. Empty for
    /// datasets with no stored entries or queries outside all coverage.
    pub fn lookup(&self, interval: Interval) -> Vec<VisibleRange> {
        self.timeline
            .lookup(interval)
            .into_iter()
            .map(|slice| VisibleRange {
                interval: slice.interval,
                version: slice.version,
                segments: slice
                    .chunks
                    .into_iter()
                    .map(|chunk| {
                        let servers = self
                            .servers
                            .get(&chunk.segment_id())
                            .cloned()
                            .unwrap_or_default();
                        SegmentLocation {
                            segment: chunk.into_segment(),
                            servers,
                        }
                    })
                    .collect(),
            })
            .collect()
    }

    /// Whether the snapshot holds no timeline entries
    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    /// Number of (interval, version) entries in the snapshot
    pub fn entry_count(&self) -> usize {
        self.timeline.entry_count()
    }

    /// Number of segments tracked by the snapshot
    pub fn segment_count(&self) -> usize {
        self.timeline.chunk_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::PartitionChunk;

    #[test]
    fn test_default_snapshot_is_empty() {
        let snapshot = TimelineSnapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.entry_count(), 0);
        assert!(snapshot.lookup(Interval::new(0, 100)).is_empty());
    }

    #[test]
    fn test_lookup_attaches_servers() {
        let segment = Segment::new("events", Interval::new(0, 100), "v1");
        let mut timeline = VersionedTimeline::new();
        timeline.add(segment.interval, "v1", PartitionChunk::new(segment.clone()));

        let mut servers = HashMap::new();
        servers.insert(
            segment.id(),
            vec![ServerMeta::new("a", "a:8083"), ServerMeta::new("b", "b:8083")],
        );

        let snapshot = TimelineSnapshot::new(timeline, servers);
        let ranges = snapshot.lookup(Interval::new(0, 100));

        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].segments.len(), 1);
        assert_eq!(ranges[0].segments[0].segment, segment);
        assert_eq!(ranges[0].segments[0].servers.len(), 2);
    }

    #[test]
    fn test_lookup_serializes_to_json() {
        let segment = Segment::new("events", Interval::new(0, 100), "v1");
        let mut timeline = VersionedTimeline::new();
        timeline.add(segment.interval, "v1", PartitionChunk::new(segment.clone()));

        let mut servers = HashMap::new();
        servers.insert(segment.id(), vec![ServerMeta::new("a", "a:8083")]);

        let snapshot = TimelineSnapshot::new(timeline, servers);
        let json = serde_json::to_string(&snapshot.lookup(Interval::new(0, 100))).unwrap();

        assert!(json.contains("\"version\":\"v1\""));
        assert!(json.contains("\"name\":\"a\""));
    }
}
