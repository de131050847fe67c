// Watch-backed job source: kube reflector cache kept current by a background watch loop.
// Applied jobs are also forwarded to the refresher so the store updates between resyncs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::StreamExt;
use k8s_openapi::api::batch::v1::Job;
use kube::runtime::reflector::{self, Store};
use kube::runtime::{WatchStreamExt, watcher};
use kube::{Api, Client};
use tokio::sync::{mpsc, oneshot};
use tracing::{Instrument, debug, info, warn};

use super::{JobSource, SourceError, snapshot_from_job};
use crate::models::JobSnapshot;

/// Which jobs to watch.
#[derive(Debug, Clone, Default)]
pub struct WatchConfig {
    /// Watch a single namespace; all namespaces when `None`.
    pub namespace: Option<String>,
    pub label_selector: Option<String>,
}

/// Lists jobs from the reflector cache. Fails with `NotSynced` until the initial list is in.
#[derive(Clone)]
pub struct ReflectorSource {
    store: Store<Job>,
    synced: Arc<AtomicBool>,
}

impl ReflectorSource {
    pub fn is_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }
}

impl JobSource for ReflectorSource {
    fn list(&self) -> Result<Vec<JobSnapshot>, SourceError> {
        if !self.is_synced() {
            return Err(SourceError::NotSynced);
        }
        Ok(self
            .store
            .state()
            .iter()
            .map(|job| snapshot_from_job(job))
            .collect())
    }
}

/// Spawns the watch loop. `events_tx` (if any) receives a snapshot per applied job.
/// Exits on shutdown, when the stream ends, or when the event receiver is gone.
pub fn spawn_watcher(
    client: Client,
    config: WatchConfig,
    events_tx: Option<mpsc::Sender<JobSnapshot>>,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> (ReflectorSource, tokio::task::JoinHandle<()>) {
    let api: Api<Job> = match config.namespace.as_deref() {
        Some(ns) => Api::namespaced(client, ns),
        None => Api::all(client),
    };
    let mut watcher_config = watcher::Config::default();
    if let Some(selector) = config.label_selector.as_deref() {
        watcher_config = watcher_config.labels(selector);
    }

    let (reader, writer) = reflector::store::<Job>();
    let source = ReflectorSource {
        store: reader,
        synced: Arc::new(AtomicBool::new(false)),
    };
    let synced = source.synced.clone();

    let watch_span = tracing::span!(
        tracing::Level::DEBUG,
        "job_watcher",
        namespace = config.namespace.as_deref().unwrap_or("*")
    );
    let handle = tokio::spawn(async move {
        let stream = reflector::reflector(writer, watcher(api, watcher_config)).default_backoff();
        let mut stream = std::pin::pin!(stream);

        loop {
            tokio::select! {
                event = stream.next() => {
                    match event {
                        Some(Ok(watcher::Event::Apply(job) | watcher::Event::InitApply(job))) => {
                            if let Some(tx) = &events_tx
                                && tx.send(snapshot_from_job(&job)).await.is_err()
                            {
                                debug!("refresher channel closed");
                                break;
                            }
                        }
                        Some(Ok(watcher::Event::InitDone)) => {
                            if !synced.swap(true, Ordering::AcqRel) {
                                info!("initial job list synced");
                            }
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!(
                                error = %e,
                                operation = "watch_jobs",
                                "job watch failed; retrying with backoff"
                            );
                        }
                        None => {
                            warn!("job watch stream ended");
                            break;
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    debug!("Job watcher shutting down");
                    break;
                }
            }
        }
    }
    .instrument(watch_span));

    (source, handle)
}
