//! Deduplication of raw candidates before validation

use crate::proxy::models::Candidate;
use crate::shutdown::Shutdown;
use crate::stats::RunStats;
use dashmap::DashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Candidates already admitted during this run.
///
/// `admit` is a single insert-if-absent, so racing producers on the same
/// candidate get exactly one `true` between them.
#[derive(Debug, Default)]
pub struct SeenSet {
    inner: DashSet<Candidate>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `candidate`, returning `true` only the first time it is seen
    pub fn admit(&self, candidate: &Candidate) -> bool {
        if self.inner.contains(candidate) {
            return false;
        }
        self.inner.insert(candidate.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Forward each distinct candidate from `raw` to `jobs` exactly once.
///
/// Returns when `raw` is closed and drained, or when the run is cancelled.
/// Dropping `jobs` on return closes the job channel for the workers.
pub async fn dispatch(
    mut raw: mpsc::Receiver<Candidate>,
    seen: Arc<SeenSet>,
    jobs: mpsc::Sender<Candidate>,
    stats: Arc<RunStats>,
    shutdown: Shutdown,
) {
    loop {
        let candidate = tokio::select! {
            _ = shutdown.cancelled() => break,
            next = raw.recv() => match next {
                Some(candidate) => candidate,
                None => break,
            },
        };

        if !seen.admit(&candidate) {
            continue;
        }
        stats.record_enqueued();

        let sent = tokio::select! {
            _ = shutdown.cancelled() => false,
            res = jobs.send(candidate) => res.is_ok(),
        };
        if !sent {
            break;
        }
    }
    info!(unique = seen.len(), "dispatch finished");
}
