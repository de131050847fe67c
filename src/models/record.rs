// Aggregated per-job record held by the job store

use serde::{Deserialize, Serialize};

use super::JobStatus;

/// Last accepted observation for one logical job. Times are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub display_name: String,
    pub namespace: String,
    pub status: JobStatus,
    pub start_time: i64,
    pub completion_time: i64,
}
