// Job snapshot sources: the synchronous list contract plus the kube watch-backed implementation

mod watch;

pub use watch::{ReflectorSource, WatchConfig, spawn_watcher};

use crate::models::JobSnapshot;
use k8s_openapi::api::batch::v1::Job;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("job cache has not completed its initial list yet")]
    NotSynced,
    #[error("job source unavailable: {0}")]
    Unavailable(String),
}

/// Supplies the current set of Job snapshots.
pub trait JobSource: Send + Sync {
    fn list(&self) -> Result<Vec<JobSnapshot>, SourceError>;
}

/// Any list closure is a source.
impl<F> JobSource for F
where
    F: Fn() -> Result<Vec<JobSnapshot>, SourceError> + Send + Sync,
{
    fn list(&self) -> Result<Vec<JobSnapshot>, SourceError> {
        self()
    }
}

/// Converts a Job object into the immutable snapshot the aggregation core works on.
pub fn snapshot_from_job(job: &Job) -> JobSnapshot {
    let status = job.status.as_ref();
    let count = |v: Option<i32>| v.unwrap_or(0).max(0) as u32;
    JobSnapshot {
        namespace: job.metadata.namespace.clone().unwrap_or_default(),
        object_name: job.metadata.name.clone().unwrap_or_default(),
        annotations: job.metadata.annotations.clone().unwrap_or_default(),
        active_count: count(status.and_then(|s| s.active)),
        failed_count: count(status.and_then(|s| s.failed)),
        start_time: status
            .and_then(|s| s.start_time.as_ref())
            .map(|t| t.0.timestamp()),
        completion_time: status
            .and_then(|s| s.completion_time.as_ref())
            .map(|t| t.0.timestamp()),
    }
}
