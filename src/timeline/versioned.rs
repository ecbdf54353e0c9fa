//! Versioned interval timeline with lazy overshadow resolution
//!
//! One timeline exists per dataset. It stores `(interval, version)` entries,
//! each holding the partition chunks reported for that group, and answers
//! "what is visible over this range" at query time: a higher version hides a
//! lower version on the portion of the range they share, while the lower
//! version stays visible on any sub-ranges no higher version covers.
//!
//! Insertion does no overshadow work. Chunks arrive from independent servers
//! in uncontrollable order, so an eagerly flattened view would have to be
//! re-derived on every mutation; resolving lazily keeps the write path cheap
//! during rebalancing churn and pushes the cost onto the far rarer reads.

use crate::segment::{Interval, PartitionChunk};
use serde::Serialize;
use std::collections::BTreeMap;

/// Identity of one timeline entry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct EntryKey {
    interval: Interval,
    version: String,
}

/// A versioned interval index over one dataset's segments
#[derive(Debug, Clone, Default)]
pub struct VersionedTimeline {
    /// (interval, version) → partition number → chunk
    entries: BTreeMap<EntryKey, BTreeMap<u32, PartitionChunk>>,
}

/// One visible sub-range produced by a lookup
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimelineSlice {
    /// The visible portion of the queried interval
    pub interval: Interval,
    /// Version whose chunks are visible on this portion
    pub version: String,
    /// Chunks of that entry, ordered by partition number
    pub chunks: Vec<PartitionChunk>,
}

impl VersionedTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a chunk into the entry for `(interval, version)`
    ///
    /// The entry is created if absent. Re-adding a partition that is already
    /// present replaces it, so replayed add events are idempotent.
    pub fn add(&mut self, interval: Interval, version: impl Into<String>, chunk: PartitionChunk) {
        let key = EntryKey {
            interval,
            version: version.into(),
        };
        self.entries
            .entry(key)
            .or_default()
            .insert(chunk.partition(), chunk);
    }

    /// Remove the chunk at `partition` from the `(interval, version)` entry
    ///
    /// Returns the removed chunk, or `None` when no such entry or partition
    /// exists (duplicate remove events race a prior successful remove; the
    /// caller logs and moves on). An entry that empties is pruned.
    pub fn remove(
        &mut self,
        interval: Interval,
        version: &str,
        partition: u32,
    ) -> Option<PartitionChunk> {
        let key = EntryKey {
            interval,
            version: version.to_string(),
        };
        let chunks = self.entries.get_mut(&key)?;
        let removed = chunks.remove(&partition);
        if chunks.is_empty() {
            self.entries.remove(&key);
        }
        removed
    }

    /// Resolve the visible coverage of `query`
    ///
    /// Intersecting entries are walked from highest version to lowest. The
    /// highest version's intersection with `query` is fully visible; each
    /// lower version contributes only the sub-ranges not already claimed by a
    /// strictly higher version, split into as many pieces as needed. A
    /// version whose intersection is entirely covered contributes nothing.
    /// The result is ordered by sub-range start, ascending.
    pub fn lookup(&self, query: Interval) -> Vec<TimelineSlice> {
        let mut candidates: Vec<(&EntryKey, &BTreeMap<u32, PartitionChunk>)> = self
            .entries
            .iter()
            .filter(|(key, chunks)| key.interval.overlaps(&query) && !chunks.is_empty())
            .collect();

        // Highest version first; interval order breaks ties deterministically.
        candidates.sort_by(|(a, _), (b, _)| {
            b.version
                .cmp(&a.version)
                .then_with(|| a.interval.cmp(&b.interval))
        });

        // Sub-ranges of the query not yet covered by a higher version.
        let mut holes = vec![query];
        let mut slices = Vec::new();

        for (key, chunks) in candidates {
            if holes.is_empty() {
                break;
            }

            let mut remaining = Vec::with_capacity(holes.len());
            for hole in holes {
                match hole.intersection(&key.interval) {
                    Some(visible) => {
                        slices.push(TimelineSlice {
                            interval: visible,
                            version: key.version.clone(),
                            chunks: chunks.values().cloned().collect(),
                        });
                        if let Some(left) = Interval::try_new(hole.start, visible.start) {
                            remaining.push(left);
                        }
                        if let Some(right) = Interval::try_new(visible.end, hole.end) {
                            remaining.push(right);
                        }
                    }
                    None => remaining.push(hole),
                }
            }
            holes = remaining;
        }

        slices.sort_by_key(|slice| slice.interval.start);
        slices
    }

    /// Whether the timeline holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of (interval, version) entries
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Total chunks across all entries
    pub fn chunk_count(&self) -> usize {
        self.entries.values().map(|chunks| chunks.len()).sum()
    }

    /// Iterate over every stored chunk
    pub fn chunks(&self) -> impl Iterator<Item = &PartitionChunk> {
        self.entries.values().flat_map(|chunks| chunks.values())
    }
}
