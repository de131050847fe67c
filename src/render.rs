// Metric renderer: aggregated job records -> labeled gauge samples.
// Read-only over the store; works on a copied record set.

use crate::job_store::JobStore;
use crate::models::JobRecord;

pub const JOB_STATUS: &str = "kube_job_status";
pub const JOB_START_TIME: &str = "kube_job_start_time";
pub const JOB_COMPLETION_TIME: &str = "kube_job_completion_time";

/// Label names shared by every job gauge, in value order.
pub const LABELS: [&str; 2] = ["namespace", "name"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: &'static str,
    pub help: &'static str,
}

pub const DESCRIPTORS: [MetricDescriptor; 3] = [
    MetricDescriptor {
        name: JOB_STATUS,
        help: "The last run status of a job (2 = running, 1 = failed, 0 = succeeded)",
    },
    MetricDescriptor {
        name: JOB_START_TIME,
        help: "The start time for a job",
    },
    MetricDescriptor {
        name: JOB_COMPLETION_TIME,
        help: "The completion time for a job",
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub metric: &'static str,
    pub namespace: String,
    pub name: String,
    pub value: f64,
}

/// Renders the store as it is at call time (records copied under the read lock first).
pub fn render(store: &JobStore) -> Vec<MetricSample> {
    render_records(&store.records())
}

/// Three samples per record: status, start time, completion time.
pub fn render_records(records: &[JobRecord]) -> Vec<MetricSample> {
    let mut samples = Vec::with_capacity(records.len() * DESCRIPTORS.len());
    for record in records {
        let sample = |metric: &'static str, value: f64| MetricSample {
            metric,
            namespace: record.namespace.clone(),
            name: record.display_name.clone(),
            value,
        };
        samples.push(sample(JOB_STATUS, record.status.as_gauge()));
        samples.push(sample(JOB_START_TIME, record.start_time as f64));
        samples.push(sample(JOB_COMPLETION_TIME, record.completion_time as f64));
    }
    samples
}
