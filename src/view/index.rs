//! Segment location index
//!
//! Owns the two maps at the heart of the atlas: `segment id → serving
//! servers` (the selector sets) and `dataset → timeline`. Both live behind a
//! single mutex so that every mutation and every multi-step read is one
//! exclusive critical section - a reader can never observe a chunk whose
//! selector set has already been emptied, or vice versa.
//!
//! The selectors map is the sole owner of each server set; timeline chunks
//! carry only the segment, and reads join the two maps by segment id inside
//! the same critical section. All work here is pure in-memory structure
//! manipulation, so the lock is held only for short, bounded stretches.

use crate::segment::{PartitionChunk, Segment, SegmentId, ServerMeta};
use crate::timeline::VersionedTimeline;
use crate::view::snapshot::TimelineSnapshot;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Both maps, mutated together under one lock
#[derive(Debug, Default)]
struct IndexState {
    /// Segment id → servers currently reported as serving it.
    /// An entry exists iff its set is non-empty iff the segment has a chunk
    /// in its dataset's timeline.
    selectors: HashMap<SegmentId, HashSet<ServerMeta>>,
    /// Dataset → versioned timeline, created lazily on first segment
    timelines: HashMap<String, VersionedTimeline>,
}

/// Concurrent index mapping segments to locations and datasets to timelines
#[derive(Debug, Default)]
pub struct LocationIndex {
    state: Mutex<IndexState>,
}

/// Size counters for the index, taken in one critical section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Datasets with a (possibly empty) timeline
    pub datasets: usize,
    /// Segments currently served by at least one server
    pub segments: usize,
    /// Distinct servers appearing in any selector set
    pub servers: usize,
    /// Total (interval, version) entries across all timelines
    pub timeline_entries: usize,
}

impl LocationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// A panicking reader must never wedge the event worker, so a poisoned
    /// lock is recovered rather than propagated.
    fn state(&self) -> MutexGuard<'_, IndexState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record that `server` is serving `segment`
    ///
    /// Idempotent: the first sighting of a segment creates its selector set
    /// and timeline chunk; re-adding an already-present server is a no-op.
    pub fn segment_added(&self, server: &ServerMeta, segment: &Segment) {
        let segment_id = segment.id();
        let mut guard = self.state();
        let state = &mut *guard;

        tracing::debug!(segment = %segment_id, server = %server, "Adding segment");

        if !state.selectors.contains_key(&segment_id) {
            state
                .timelines
                .entry(segment.dataset.clone())
                .or_default()
                .add(
                    segment.interval,
                    segment.version.clone(),
                    PartitionChunk::new(segment.clone()),
                );
            state.selectors.insert(segment_id.clone(), HashSet::new());
        }

        if let Some(servers) = state.selectors.get_mut(&segment_id) {
            servers.insert(server.clone());
        }
    }

    /// Record that `server` stopped serving `segment`
    ///
    /// Removing a server that was never recorded is logged, not an error.
    /// When the last server goes away the selector entry and the timeline
    /// chunk are removed together, in the same critical section.
    pub fn segment_removed(&self, server: &ServerMeta, segment: &Segment) {
        let segment_id = segment.id();
        let mut guard = self.state();
        let state = &mut *guard;

        tracing::debug!(segment = %segment_id, server = %server, "Removing segment");

        let Some(servers) = state.selectors.get_mut(&segment_id) else {
            tracing::warn!(segment = %segment_id, "Told to remove segment that is not tracked");
            return;
        };

        servers.remove(server);
        if !servers.is_empty() {
            return;
        }
        state.selectors.remove(&segment_id);

        let removed = state
            .timelines
            .get_mut(&segment.dataset)
            .and_then(|timeline| {
                timeline.remove(segment.interval, &segment.version, segment.partition)
            });

        if removed.is_none() {
            tracing::warn!(
                dataset = %segment.dataset,
                interval = %segment.interval,
                version = %segment.version,
                "Asked to remove timeline entry that doesn't exist"
            );
        }
    }

    /// Drop every segment previously reported as hosted by `server`
    pub fn server_removed(&self, server: &ServerMeta, segments: &[Segment]) {
        tracing::debug!(server = %server, segments = segments.len(), "Removing server");
        for segment in segments {
            self.segment_removed(server, segment);
        }
    }

    /// Atomically empty both maps
    pub fn clear(&self) {
        let mut state = self.state();
        state.timelines.clear();
        state.selectors.clear();
    }

    /// Servers currently serving `segment_id`, sorted by name
    pub fn servers_for(&self, segment_id: &str) -> Vec<ServerMeta> {
        let state = self.state();
        let mut servers: Vec<ServerMeta> = state
            .selectors
            .get(segment_id)
            .map(|servers| servers.iter().cloned().collect())
            .unwrap_or_default();
        servers.sort();
        servers
    }

    /// Datasets with a registered timeline, sorted
    pub fn datasets(&self) -> Vec<String> {
        let state = self.state();
        let mut datasets: Vec<String> = state.timelines.keys().cloned().collect();
        datasets.sort();
        datasets
    }

    /// Point-in-time copy of one dataset's timeline with server sets resolved
    ///
    /// Unknown datasets yield an empty snapshot; reads never fail. The
    /// snapshot is taken in one critical section and stays valid and
    /// consistent while further mutations proceed.
    pub fn snapshot(&self, dataset: &str) -> TimelineSnapshot {
        let state = self.state();
        let Some(timeline) = state.timelines.get(dataset) else {
            return TimelineSnapshot::default();
        };

        let mut servers = HashMap::new();
        for chunk in timeline.chunks() {
            let segment_id = chunk.segment_id();
            let mut held: Vec<ServerMeta> = state
                .selectors
                .get(&segment_id)
                .map(|servers| servers.iter().cloned().collect())
                .unwrap_or_default();
            held.sort();
            servers.insert(segment_id, held);
        }

        TimelineSnapshot::new(timeline.clone(), servers)
    }

    /// Size counters, taken in one critical section
    pub fn stats(&self) -> IndexStats {
        let state = self.state();
        let servers: HashSet<&ServerMeta> = state.selectors.values().flatten().collect();

        IndexStats {
            datasets: state.timelines.len(),
            segments: state.selectors.len(),
            servers: servers.len(),
            timeline_entries: state
                .timelines
                .values()
                .map(|timeline| timeline.entry_count())
                .sum(),
        }
    }
}
