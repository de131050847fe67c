// Shared test helpers
#![allow(dead_code)]

use kube_job_exporter::models::JobSnapshot;
use kube_job_exporter::source::{JobSource, SourceError};
use std::collections::BTreeMap;
use std::sync::Mutex;

pub const CREATED_BY: &str = "kubernetes.io/created-by";

pub fn created_by(owner: &str) -> String {
    format!(
        r#"{{"kind":"SerializedReference","apiVersion":"v1","reference":{{"kind":"CronJob","namespace":"a","name":"{}","uid":"0b7c","apiVersion":"batch/v2alpha1","resourceVersion":"42"}}}}"#,
        owner
    )
}

/// Job owned by `owner` in `namespace`, with the created-by annotation set.
pub fn job(
    namespace: &str,
    owner: &str,
    active: u32,
    failed: u32,
    completion_time: Option<i64>,
) -> JobSnapshot {
    let mut annotations = BTreeMap::new();
    annotations.insert(CREATED_BY.to_string(), created_by(owner));
    JobSnapshot {
        namespace: namespace.to_string(),
        object_name: format!("{}-{}", owner, completion_time.unwrap_or(0)),
        annotations,
        active_count: active,
        failed_count: failed,
        start_time: completion_time.map(|t| t - 10),
        completion_time,
    }
}

/// In-memory source; `fail` makes every list return `Unavailable`.
#[derive(Default)]
pub struct StaticSource {
    jobs: Mutex<Vec<JobSnapshot>>,
    fail: Mutex<bool>,
    calls: Mutex<usize>,
}

impl StaticSource {
    pub fn new(jobs: Vec<JobSnapshot>) -> Self {
        Self {
            jobs: Mutex::new(jobs),
            ..Default::default()
        }
    }

    pub fn set_jobs(&self, jobs: Vec<JobSnapshot>) {
        *self.jobs.lock().unwrap() = jobs;
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl JobSource for StaticSource {
    fn list(&self) -> Result<Vec<JobSnapshot>, SourceError> {
        *self.calls.lock().unwrap() += 1;
        if *self.fail.lock().unwrap() {
            return Err(SourceError::Unavailable("apiserver down".into()));
        }
        Ok(self.jobs.lock().unwrap().clone())
    }
}
