// Domain models: observed Job snapshots and the aggregated per-job view

mod annotation;
mod job;
mod record;

pub use annotation::{CREATED_BY_ANNOTATION, CreatedByAnnotation, ObjectReference};
pub use job::{JobSnapshot, JobStatus};
pub use record::JobRecord;
