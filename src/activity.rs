//! Connection-count activity predicate.
//!
//! A server is considered active while it has at least one open connection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::heartbeat::{activity_check, ActivityCheck};

/// Counts open connections. Cloning shares the count.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    open: Arc<AtomicUsize>,
}

/// Keeps one connection counted until dropped.
#[derive(Debug)]
pub struct ConnectionGuard {
    open: Arc<AtomicUsize>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a new connection for as long as the returned guard lives.
    pub fn track(&self) -> ConnectionGuard {
        self.open.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard {
            open: Arc::clone(&self.open),
        }
    }

    /// Number of currently open connections.
    pub fn active(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub async fn is_active(&self) -> anyhow::Result<bool> {
        let count = self.active();
        debug!(
            "{} active connection{}",
            count,
            if count == 1 { "" } else { "s" }
        );
        Ok(count > 0)
    }

    /// Predicate for [`crate::heartbeat::Heart`] backed by this tracker.
    pub fn activity_check(&self) -> ActivityCheck {
        let tracker = self.clone();
        activity_check(move || {
            let tracker = tracker.clone();
            async move { tracker.is_active().await }
        })
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}
