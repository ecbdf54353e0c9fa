//! Cluster view facade
//!
//! `ClusterView` is the piece a coordinator process wires up: it consumes the
//! inventory feed through a single-worker event serializer and exposes the
//! read surface (timeline snapshots, the initialization gate, `clear`) to
//! query planning and operational callers.
//!
//! ```text
//! InventoryFeed ──channel──▶ worker ──▶ LocationIndex ──▶ TimelineSnapshot
//!  (transport)             (1 task,       (selectors +       (readers)
//!                           in order)      timelines)
//! ```

use crate::config::ViewConfig;
use crate::segment::ServerMeta;
use crate::view::error::ViewError;
use crate::view::events::{InventoryEvent, InventoryFeed};
use crate::view::index::LocationIndex;
use crate::view::snapshot::TimelineSnapshot;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Live view of which servers host which segments, per dataset
pub struct ClusterView {
    index: LocationIndex,
    /// One-shot gate: set once the initial inventory snapshot has been fully
    /// applied, reset only by `clear`
    initialized: AtomicBool,
    events_applied: AtomicU64,
    worker: Mutex<Option<JoinHandle<()>>>,
    config: ViewConfig,
}

/// Point-in-time counters for the whole view
#[derive(Debug, Clone, Copy)]
pub struct ViewStats {
    /// Datasets with a registered timeline
    pub datasets: usize,
    /// Segments currently served by at least one server
    pub segments: usize,
    /// Distinct servers serving anything
    pub servers: usize,
    /// Total (interval, version) timeline entries
    pub timeline_entries: usize,
    /// Events applied since construction (survives `clear`)
    pub events_applied: u64,
    /// Whether the initial snapshot has been applied
    pub initialized: bool,
}

impl std::fmt::Display for ViewStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Datasets: {}, Segments: {}, Servers: {}, Entries: {}, Events: {}, Initialized: {}",
            self.datasets,
            self.segments,
            self.servers,
            self.timeline_entries,
            self.events_applied,
            self.initialized
        )
    }
}

impl ClusterView {
    /// Create an unsubscribed view
    pub fn new(config: ViewConfig) -> Self {
        Self {
            index: LocationIndex::new(),
            initialized: AtomicBool::new(false),
            events_applied: AtomicU64::new(0),
            worker: Mutex::new(None),
            config,
        }
    }

    /// Wire the view to an inventory transport
    ///
    /// Creates the event channel, spawns the single serializer worker that
    /// applies events in arrival order, and returns the producer handle for
    /// the transport to publish into. Fails with `AlreadyStarted` if the
    /// view already has a worker.
    pub fn subscribe(self: &Arc<Self>) -> Result<InventoryFeed, ViewError> {
        let mut worker = self.worker_slot();
        if worker.is_some() {
            return Err(ViewError::AlreadyStarted);
        }

        let (tx, mut rx) = mpsc::channel(self.config.event_queue_capacity);
        let view = Arc::clone(self);

        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                view.apply(event);
            }
            tracing::debug!("Inventory feed closed, event worker exiting");
        });

        *worker = Some(handle);
        tracing::info!(
            queue_capacity = self.config.event_queue_capacity,
            "Cluster view subscribed to inventory feed"
        );
        Ok(InventoryFeed::new(tx))
    }

    /// Apply one event; runs only on the worker task
    fn apply(&self, event: InventoryEvent) {
        match event {
            InventoryEvent::SegmentAdded { server, segment } => {
                self.index.segment_added(&server, &segment);
            }
            InventoryEvent::SegmentRemoved { server, segment } => {
                self.index.segment_removed(&server, &segment);
            }
            InventoryEvent::ServerRemoved { server, segments } => {
                self.index.server_removed(&server, &segments);
            }
            InventoryEvent::InitialSyncComplete => {
                // Set after everything queued ahead of the marker has been
                // applied; readers seeing true see at least that state
                if !self.initialized.swap(true, Ordering::SeqCst) {
                    tracing::info!("Initial inventory snapshot applied, cluster view initialized");
                }
            }
        }
        self.events_applied.fetch_add(1, Ordering::Relaxed);
    }

    /// Whether the initial inventory snapshot has been fully applied
    ///
    /// False until `InitialSyncComplete` is processed, true from then on
    /// until an explicit [`clear`](Self::clear). Staleness is the only
    /// failure mode readers ever observe; this flag is how it is reported.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Wipe the index and reset the initialization gate
    ///
    /// Recovery path for a full resynchronization: after `clear`, the caller
    /// replays a fresh inventory snapshot ending in `InitialSyncComplete`.
    pub fn clear(&self) {
        self.initialized.store(false, Ordering::SeqCst);
        self.index.clear();
        tracing::info!("Cluster view cleared, awaiting fresh inventory snapshot");
    }

    /// Point-in-time snapshot of one dataset's timeline
    ///
    /// Empty snapshot for unknown datasets; never an error.
    pub fn timeline(&self, dataset: &str) -> TimelineSnapshot {
        self.index.snapshot(dataset)
    }

    /// Servers currently serving `segment_id`, sorted by name
    pub fn servers_for(&self, segment_id: &str) -> Vec<ServerMeta> {
        self.index.servers_for(segment_id)
    }

    /// Datasets with a registered timeline, sorted
    pub fn datasets(&self) -> Vec<String> {
        self.index.datasets()
    }

    /// Counters across the whole view
    pub fn stats(&self) -> ViewStats {
        let index = self.index.stats();
        ViewStats {
            datasets: index.datasets,
            segments: index.segments,
            servers: index.servers,
            timeline_entries: index.timeline_entries,
            events_applied: self.events_applied.load(Ordering::Relaxed),
            initialized: self.is_initialized(),
        }
    }

    /// Stop the event worker
    ///
    /// In-flight and queued events are dropped; the index keeps its last
    /// applied state. Fine for shutdown - the view is a rebuildable cache
    /// and a restart begins with a fresh snapshot anyway.
    pub async fn stop(&self) {
        let handle = self.worker_slot().take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
            tracing::info!("Inventory event worker stopped");
        }
    }

    fn worker_slot(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{Interval, Segment};
    use std::time::Duration;

    fn server(name: &str) -> ServerMeta {
        ServerMeta::new(name, format!("{name}:8083"))
    }

    fn segment(interval: Interval, version: &str) -> Segment {
        Segment::new("events", interval, version)
    }

    fn test_view() -> Arc<ClusterView> {
        Arc::new(ClusterView::new(ViewConfig::default()))
    }

    /// Ordering guarantee: once the sync marker is applied, everything
    /// published before it has been applied too
    async fn wait_initialized(view: &ClusterView) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !view.is_initialized() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("view did not initialize in time");
    }

    #[tokio::test]
    async fn test_initialization_gate() {
        let view = test_view();
        let feed = view.subscribe().unwrap();

        assert!(!view.is_initialized());

        feed.segment_added(server("a"), segment(Interval::new(0, 100), "v1"))
            .await
            .unwrap();
        feed.initial_sync_complete().await.unwrap();
        wait_initialized(&view).await;

        // Everything delivered ahead of the marker is visible
        let ranges = view.timeline("events").lookup(Interval::new(0, 100));
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].segments[0].servers, vec![server("a")]);

        // Further incremental events leave the gate set
        feed.segment_added(server("b"), segment(Interval::new(100, 200), "v1"))
            .await
            .unwrap();
        assert!(view.is_initialized());

        view.stop().await;
    }

    #[tokio::test]
    async fn test_overshadow_through_the_feed() {
        let view = test_view();
        let feed = view.subscribe().unwrap();

        let a = segment(Interval::new(0, 100), "v1");
        let b = segment(Interval::new(30, 70), "v2");
        let c = segment(Interval::new(0, 100), "v3");

        for seg in [&a, &b, &c] {
            feed.segment_added(server("a"), seg.clone()).await.unwrap();
        }
        feed.initial_sync_complete().await.unwrap();
        wait_initialized(&view).await;

        // c fully overshadows a and b
        let ranges = view.timeline("events").lookup(Interval::new(0, 100));
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].version, "v3");

        // Removing c's last replica reverts to the three-slice view
        feed.segment_removed(server("a"), c).await.unwrap();
        feed.segment_added(server("a"), Segment::new("marker", Interval::new(0, 1), "v1"))
            .await
            .unwrap();
        // The marker add is ordered after the remove; once visible, so is
        // the removal
        tokio::time::timeout(Duration::from_secs(5), async {
            while view.timeline("marker").is_empty() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();

        let ranges = view.timeline("events").lookup(Interval::new(0, 100));
        let versions: Vec<&str> = ranges.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, vec!["v1", "v2", "v1"]);

        view.stop().await;
    }

    #[tokio::test]
    async fn test_server_removed_event_drops_all_its_segments() {
        let view = test_view();
        let feed = view.subscribe().unwrap();

        let segments: Vec<Segment> = (0..3)
            .map(|i| segment(Interval::new(i * 100, (i + 1) * 100), "v1"))
            .collect();
        for seg in &segments {
            feed.segment_added(server("a"), seg.clone()).await.unwrap();
            feed.segment_added(server("b"), seg.clone()).await.unwrap();
        }
        feed.server_removed(server("a"), segments.clone()).await.unwrap();
        feed.initial_sync_complete().await.unwrap();
        wait_initialized(&view).await;

        for seg in &segments {
            assert_eq!(view.servers_for(&seg.id()), vec![server("b")]);
        }

        view.stop().await;
    }

    #[tokio::test]
    async fn test_clear_resets_state_and_gate() {
        let view = test_view();
        let feed = view.subscribe().unwrap();

        feed.segment_added(server("a"), segment(Interval::new(0, 100), "v1"))
            .await
            .unwrap();
        feed.initial_sync_complete().await.unwrap();
        wait_initialized(&view).await;

        view.clear();

        assert!(!view.is_initialized());
        assert!(view.timeline("events").is_empty());
        assert!(view.datasets().is_empty());

        // A fresh replay re-initializes
        feed.segment_added(server("a"), segment(Interval::new(0, 100), "v2"))
            .await
            .unwrap();
        feed.initial_sync_complete().await.unwrap();
        wait_initialized(&view).await;
        assert_eq!(view.timeline("events").entry_count(), 1);

        view.stop().await;
    }

    #[tokio::test]
    async fn test_subscribe_twice_fails() {
        let view = test_view();
        let _feed = view.subscribe().unwrap();

        assert!(matches!(view.subscribe(), Err(ViewError::AlreadyStarted)));

        view.stop().await;
    }

    #[tokio::test]
    async fn test_publish_after_stop_fails() {
        let view = test_view();
        let feed = view.subscribe().unwrap();

        view.stop().await;

        let result = feed.initial_sync_complete().await;
        assert!(matches!(result, Err(ViewError::FeedClosed)));
    }

    #[tokio::test]
    async fn test_duplicate_events_are_idempotent() {
        let view = test_view();
        let feed = view.subscribe().unwrap();
        let seg = segment(Interval::new(0, 100), "v1");

        feed.segment_added(server("a"), seg.clone()).await.unwrap();
        feed.segment_added(server("a"), seg.clone()).await.unwrap();
        feed.segment_removed(server("b"), seg.clone()).await.unwrap();
        feed.initial_sync_complete().await.unwrap();
        wait_initialized(&view).await;

        assert_eq!(view.servers_for(&seg.id()), vec![server("a")]);
        let stats = view.stats();
        assert_eq!(stats.segments, 1);
        assert_eq!(stats.events_applied, 4);

        view.stop().await;
    }

    #[tokio::test]
    async fn test_stats_display() {
        let view = test_view();
        let rendered = view.stats().to_string();
        assert!(rendered.contains("Initialized: false"));
        assert!(rendered.contains("Datasets: 0"));
    }
}
