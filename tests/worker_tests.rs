// Refresher tests: resync, incremental events, eviction, failure tolerance, shutdown

mod common;

use common::{CREATED_BY, StaticSource, job};
use kube_job_exporter::job_store::JobStore;
use kube_job_exporter::models::{JobSnapshot, JobStatus};
use kube_job_exporter::source::SourceError;
use kube_job_exporter::worker::{RefresherConfig, RefresherDeps, resync, spawn};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, sleep};

fn config(evict_missing: bool) -> RefresherConfig {
    RefresherConfig {
        resync_interval_secs: 3600,
        stats_log_interval_secs: 3600,
        evict_missing,
    }
}

#[test]
fn resync_failure_leaves_store_untouched() {
    let source = StaticSource::new(vec![job("a", "job1", 0, 0, Some(100))]);
    let store = JobStore::new(CREATED_BY);
    assert_eq!(resync(&source, &store, false).unwrap().inserted, 1);
    source.set_failing(true);
    assert!(matches!(
        resync(&source, &store, true),
        Err(SourceError::Unavailable(_))
    ));
    assert_eq!(store.len(), 1);
}

#[test]
fn resync_before_initial_sync_is_deferred() {
    let unsynced = || -> Result<Vec<JobSnapshot>, SourceError> { Err(SourceError::NotSynced) };
    let store = JobStore::new(CREATED_BY);
    store.refresh(&[job("a", "job1", 0, 0, Some(100))]);
    assert!(matches!(
        resync(&unsynced, &store, true),
        Err(SourceError::NotSynced)
    ));
    assert_eq!(store.len(), 1);
}

#[test]
fn resync_with_eviction_drops_deleted_jobs() {
    let source = StaticSource::new(vec![
        job("a", "job1", 0, 0, Some(100)),
        job("a", "job2", 0, 0, Some(100)),
    ]);
    let store = JobStore::new(CREATED_BY);
    resync(&source, &store, true).unwrap();
    assert_eq!(store.len(), 2);

    source.set_jobs(vec![job("a", "job1", 0, 0, Some(100))]);
    resync(&source, &store, true).unwrap();
    assert_eq!(store.len(), 1);
    assert!(store.get("a/job2").is_none());
}

#[test]
fn late_watch_event_for_evicted_job_is_dropped_by_next_resync() {
    let source = StaticSource::new(vec![
        job("a", "job1", 0, 0, Some(100)),
        job("a", "job2", 0, 0, Some(100)),
    ]);
    let store = JobStore::new(CREATED_BY);
    resync(&source, &store, true).unwrap();

    source.set_jobs(vec![job("a", "job1", 0, 0, Some(100))]);
    resync(&source, &store, true).unwrap();
    // Event queued before the delete lands after the evicting resync.
    store.refresh(&[job("a", "job2", 0, 0, Some(100))]);
    assert!(store.get("a/job2").is_some());

    resync(&source, &store, true).unwrap();
    assert!(store.get("a/job2").is_none());
    assert_eq!(store.len(), 1);
}

#[test]
fn resync_without_eviction_keeps_deleted_jobs() {
    let source = StaticSource::new(vec![job("a", "job2", 0, 0, Some(100))]);
    let store = JobStore::new(CREATED_BY);
    resync(&source, &store, false).unwrap();
    source.set_jobs(vec![]);
    resync(&source, &store, false).unwrap();
    assert!(store.get("a/job2").is_some());
}

#[tokio::test]
async fn refresher_resyncs_on_start_and_stops_on_shutdown() {
    let source = Arc::new(StaticSource::new(vec![job("a", "job1", 0, 0, Some(100))]));
    let store = Arc::new(JobStore::new(CREATED_BY));
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let handle = spawn(
        RefresherDeps {
            source: source.clone(),
            store: store.clone(),
            events_rx: None,
            shutdown_rx,
        },
        config(false),
    );
    sleep(Duration::from_millis(100)).await;
    assert_eq!(store.len(), 1);
    assert_eq!(source.calls(), 1);

    let _ = shutdown_tx.send(());
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("refresher should stop after shutdown")
        .unwrap();
}

#[tokio::test]
async fn refresher_merges_watch_events_between_resyncs() {
    let source = Arc::new(StaticSource::default());
    let store = Arc::new(JobStore::new(CREATED_BY));
    let (events_tx, events_rx) = mpsc::channel(8);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let handle = spawn(
        RefresherDeps {
            source,
            store: store.clone(),
            events_rx: Some(events_rx),
            shutdown_rx,
        },
        config(false),
    );

    events_tx.send(job("a", "job1", 0, 0, Some(100))).await.unwrap();
    events_tx.send(job("a", "job1", 0, 1, Some(50))).await.unwrap();
    events_tx.send(job("a", "job9", 1, 0, None)).await.unwrap();
    sleep(Duration::from_millis(100)).await;

    assert_eq!(store.len(), 1);
    let stored = store.get("a/job1").unwrap();
    assert_eq!(stored.status, JobStatus::Succeeded);
    assert_eq!(stored.completion_time, 100);

    // Closed event channel falls back to resync-only; the loop keeps running.
    drop(events_tx);
    sleep(Duration::from_millis(50)).await;
    assert!(!handle.is_finished());

    let _ = shutdown_tx.send(());
    handle.await.unwrap();
}
