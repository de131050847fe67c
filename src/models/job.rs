// Observed Job snapshot (immutable view of one Job object at list/watch time)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Coarse lifecycle status of a Job; serializes to lowercase JSON (e.g. "running").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Failed,
    Succeeded,
}

impl JobStatus {
    /// Gauge value exported as `kube_job_status`.
    /// Higher value = higher precedence when counters overlap.
    pub fn as_gauge(self) -> f64 {
        match self {
            JobStatus::Running => 2.0,
            JobStatus::Failed => 1.0,
            JobStatus::Succeeded => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub namespace: String,
    pub object_name: String,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub active_count: u32,
    #[serde(default)]
    pub failed_count: u32,
    /// Unix seconds.
    pub start_time: Option<i64>,
    /// Unix seconds.
    pub completion_time: Option<i64>,
}
