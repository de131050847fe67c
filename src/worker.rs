// Background refresher: keeps the job store current independently of scrapes.
// Incremental watch events merge one snapshot at a time; a periodic resync merges the full list.

use crate::job_store::{JobStore, RefreshSummary};
use crate::models::JobSnapshot;
use crate::source::{JobSource, SourceError};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, interval};

/// Store, source, channels, and shutdown for the refresher.
pub struct RefresherDeps {
    pub source: Arc<dyn JobSource>,
    pub store: Arc<JobStore>,
    /// Incremental snapshots from the watcher; `None` runs on resyncs alone.
    pub events_rx: Option<mpsc::Receiver<JobSnapshot>>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

pub struct RefresherConfig {
    pub resync_interval_secs: u64,
    pub stats_log_interval_secs: u64,
    /// Drop records whose job is absent from the latest full list.
    pub evict_missing: bool,
}

/// Waits for the next event, or forever once the channel is gone.
async fn next_event(events_rx: &mut Option<mpsc::Receiver<JobSnapshot>>) -> Option<JobSnapshot> {
    match events_rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// One full list + refresh (+ eviction). Source failures leave the store untouched.
/// `NotSynced` is expected until the watcher's initial list lands and logs at DEBUG only.
pub fn resync(
    source: &dyn JobSource,
    store: &JobStore,
    evict_missing: bool,
) -> Result<RefreshSummary, SourceError> {
    let snapshots = match source.list() {
        Ok(s) => s,
        Err(SourceError::NotSynced) => {
            tracing::debug!(operation = "list_jobs", "job cache not synced yet; resync deferred");
            return Err(SourceError::NotSynced);
        }
        Err(e) => {
            tracing::warn!(error = %e, operation = "list_jobs", "job resync failed");
            return Err(e);
        }
    };
    let summary = store.refresh(&snapshots);
    if evict_missing {
        let live = store.live_keys(&snapshots);
        let evicted = store.retain_keys(&live);
        if evicted > 0 {
            tracing::info!(evicted, "evicted records for jobs no longer listed");
        }
    }
    tracing::debug!(
        operation = "resync",
        snapshots_count = snapshots.len(),
        accepted = summary.accepted(),
        stale = summary.stale,
        "job resync complete"
    );
    Ok(summary)
}

pub fn spawn(deps: RefresherDeps, config: RefresherConfig) -> tokio::task::JoinHandle<()> {
    let RefresherDeps {
        source,
        store,
        mut events_rx,
        mut shutdown_rx,
    } = deps;
    let RefresherConfig {
        resync_interval_secs,
        stats_log_interval_secs,
        evict_missing,
    } = config;

    let span = tracing::span!(tracing::Level::DEBUG, "refresher", resync_interval_secs);

    tokio::spawn(tracing::Instrument::instrument(
        async move {
            let mut resync_tick = interval(Duration::from_secs(resync_interval_secs));
            resync_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
            stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            let mut resyncs_total: u64 = 0;
            let mut resync_failures_total: u64 = 0;
            let mut events_total: u64 = 0;

            loop {
                tokio::select! {
                    event = next_event(&mut events_rx) => {
                        match event {
                            Some(snapshot) => {
                                store.refresh(std::slice::from_ref(&snapshot));
                                events_total += 1;
                            }
                            None => {
                                tracing::debug!("Watch event channel closed; resync only");
                                events_rx = None;
                            }
                        }
                    }
                    _ = resync_tick.tick() => {
                        match resync(source.as_ref(), &store, evict_missing) {
                            Ok(_) => resyncs_total += 1,
                            Err(SourceError::NotSynced) => {}
                            Err(_) => resync_failures_total += 1,
                        }
                    }
                    _ = stats_log_tick.tick() => {
                        tracing::info!(
                            records = store.len(),
                            resyncs_total,
                            resync_failures_total,
                            events_total,
                            "job store stats"
                        );
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Refresher shutting down");
                        break;
                    }
                }
            }
        },
        span,
    ))
}
