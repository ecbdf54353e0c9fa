//! Cluster view error types
//!
//! Mutation-path anomalies (duplicate removes, missing timeline entries) are
//! deliberately NOT errors - the event stream is the sole source of truth and
//! must keep flowing, so they are logged and skipped. These variants cover
//! the lifecycle and feed boundary only.

use thiserror::Error;

/// Errors that can occur wiring up or feeding the cluster view
#[derive(Debug, Error)]
pub enum ViewError {
    /// The view's worker has stopped and the feed channel is closed
    #[error("inventory feed is closed")]
    FeedClosed,

    /// `subscribe` was called on a view that already has a worker
    #[error("cluster view is already subscribed to a feed")]
    AlreadyStarted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ViewError::FeedClosed.to_string(), "inventory feed is closed");
        assert_eq!(
            ViewError::AlreadyStarted.to_string(),
            "cluster view is already subscribed to a feed"
        );
    }
}
