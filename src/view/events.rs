//! Inventory feed boundary
//!
//! The external inventory transport (cluster membership / metadata watch)
//! reports changes by pushing typed events onto a bounded channel. The view's
//! worker is the sole consumer, so events are applied strictly in the order
//! they were produced and no two mutations ever run concurrently.

use crate::segment::{Segment, ServerMeta};
use crate::view::error::ViewError;
use tokio::sync::mpsc;

/// One change reported by the inventory transport
#[derive(Debug, Clone)]
pub enum InventoryEvent {
    /// A server started serving a segment
    SegmentAdded {
        server: ServerMeta,
        segment: Segment,
    },
    /// A server stopped serving a segment
    SegmentRemoved {
        server: ServerMeta,
        segment: Segment,
    },
    /// A server dropped out of the cluster; carries the segments it was
    /// last reported as holding
    ServerRemoved {
        server: ServerMeta,
        segments: Vec<Segment>,
    },
    /// The initial full snapshot of all servers/segments has been delivered.
    /// Fired exactly once per subscription.
    InitialSyncComplete,
}

/// Producer handle for pushing inventory events into a cluster view
///
/// Cloneable; all clones feed the same single-consumer channel. Publishing
/// applies backpressure once the queue is full and fails with
/// [`ViewError::FeedClosed`] after the view has been stopped.
#[derive(Debug, Clone)]
pub struct InventoryFeed {
    sender: mpsc::Sender<InventoryEvent>,
}

impl InventoryFeed {
    pub(crate) fn new(sender: mpsc::Sender<InventoryEvent>) -> Self {
        Self { sender }
    }

    /// Report that `server` started serving `segment`
    pub async fn segment_added(&self, server: ServerMeta, segment: Segment) -> Result<(), ViewError> {
        self.send(InventoryEvent::SegmentAdded { server, segment })
            .await
    }

    /// Report that `server` stopped serving `segment`
    pub async fn segment_removed(
        &self,
        server: ServerMeta,
        segment: Segment,
    ) -> Result<(), ViewError> {
        self.send(InventoryEvent::SegmentRemoved { server, segment })
            .await
    }

    /// Report that `server` left the cluster along with the segments it held
    pub async fn server_removed(
        &self,
        server: ServerMeta,
        segments: Vec<Segment>,
    ) -> Result<(), ViewError> {
        self.send(InventoryEvent::ServerRemoved { server, segments })
            .await
    }

    /// Signal that the initial full snapshot has been delivered
    pub async fn initial_sync_complete(&self) -> Result<(), ViewError> {
        self.send(InventoryEvent::InitialSyncComplete).await
    }

    async fn send(&self, event: InventoryEvent) -> Result<(), ViewError> {
        self.sender
            .send(event)
            .await
            .map_err(|_| ViewError::FeedClosed)
    }
}
