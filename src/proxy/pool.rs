//! Worker pool draining the validation queue

use crate::proxy::checker::ProxyChecker;
use crate::proxy::models::Candidate;
use crate::shutdown::{Shutdown, Trigger};
use crate::stats::RunStats;
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

/// Validation pool settings
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of concurrent workers
    pub workers: usize,
    /// Cancel the run once this many candidates validated
    pub max_valid: Option<usize>,
}

struct Worker {
    id: usize,
    jobs: Arc<Mutex<mpsc::Receiver<Candidate>>>,
    results: mpsc::Sender<Candidate>,
    checker: Arc<ProxyChecker>,
    stats: Arc<RunStats>,
    valid_count: Arc<AtomicUsize>,
    max_valid: Option<usize>,
    shutdown: Shutdown,
}

impl Worker {
    async fn run(self) {
        let mut checked = 0usize;
        loop {
            if self.shutdown.is_cancelled() {
                break;
            }
            let next = tokio::select! {
                _ = self.shutdown.cancelled() => None,
                job = async { self.jobs.lock().await.recv().await } => job,
            };
            let Some(candidate) = next else {
                break;
            };

            checked += 1;
            let valid = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                valid = self.checker.check(&candidate) => valid,
            };
            if !valid {
                continue;
            }

            self.stats.record_valid();
            let count = self.valid_count.fetch_add(1, Ordering::AcqRel) + 1;
            debug!(worker = self.id, proxy = %candidate, "proxy valid");

            let sent = tokio::select! {
                biased;
                res = self.results.send(candidate) => res.is_ok(),
                _ = self.shutdown.cancelled() => false,
            };
            if !sent {
                break;
            }

            if self.max_valid.is_some_and(|target| count >= target) {
                self.shutdown.cancel(Trigger::TargetReached);
                break;
            }
        }
        debug!(worker = self.id, checked, "worker stopped");
    }
}

/// Run `config.workers` validators over `jobs`, sending passing candidates
/// to `results`.
///
/// Returns only after every worker has stopped; `results` is dropped at that
/// point, closing the channel for the collector.
pub async fn validate_all(
    jobs: mpsc::Receiver<Candidate>,
    results: mpsc::Sender<Candidate>,
    checker: Arc<ProxyChecker>,
    config: PoolConfig,
    stats: Arc<RunStats>,
    shutdown: Shutdown,
) {
    let jobs = Arc::new(Mutex::new(jobs));
    let valid_count = Arc::new(AtomicUsize::new(0));
    let workers = config.workers.max(1);

    let tasks: Vec<_> = (0..workers)
        .map(|id| {
            let worker = Worker {
                id,
                jobs: Arc::clone(&jobs),
                results: results.clone(),
                checker: Arc::clone(&checker),
                stats: Arc::clone(&stats),
                valid_count: Arc::clone(&valid_count),
                max_valid: config.max_valid,
                shutdown: shutdown.clone(),
            };
            tokio::spawn(worker.run())
        })
        .collect();

    for result in join_all(tasks).await {
        if let Err(e) = result {
            warn!(error = %e, "validation worker failed");
        }
    }
    drop(results);
    info!(
        workers,
        valid = valid_count.load(Ordering::Acquire),
        "validation finished"
    );
}
