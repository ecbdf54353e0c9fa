//! Partition chunks - the unit stored inside a timeline entry
//!
//! Chunks belonging to the same (dataset, interval, version) group form a
//! complete partition set. The atlas tracks presence and absence of chunks;
//! validating partition completeness is the chunk abstraction's concern.

use crate::segment::types::{Segment, SegmentId};
use serde::{Deserialize, Serialize};

/// One shard of a segment group sharing the same dataset, interval and version
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartitionChunk {
    segment: Segment,
}

impl PartitionChunk {
    pub fn new(segment: Segment) -> Self {
        Self { segment }
    }

    /// Partition number within the interval+version group
    pub fn partition(&self) -> u32 {
        self.segment.partition
    }

    /// Identifier of the wrapped segment
    pub fn segment_id(&self) -> SegmentId {
        self.segment.id()
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn into_segment(self) -> Segment {
        self.segment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::types::Interval;

    #[test]
    fn test_chunk_accessors() {
        let segment = Segment::new("events", Interval::new(0, 100), "v1").partition(3, 8);
        let chunk = PartitionChunk::new(segment.clone());

        assert_eq!(chunk.partition(), 3);
        assert_eq!(chunk.segment_id(), segment.id());
        assert_eq!(chunk.into_segment(), segment);
    }
}
