// Identity + status resolution for observed Job snapshots.
// Pure functions: no store access, no I/O.

use crate::models::{CreatedByAnnotation, JobRecord, JobSnapshot, JobStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("annotation {0} is missing or empty")]
    MissingAnnotation(String),
    #[error("annotation {annotation} has no reference name")]
    EmptyReferenceName { annotation: String },
    #[error("annotation {annotation} is malformed: {source}")]
    MalformedAnnotation {
        annotation: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Why a snapshot was not considered for aggregation at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoAnnotations,
    NotCompleted,
    NoIdentity,
}

/// Stable identity of a logical job across retries/recreations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub key: String,
    pub display_name: String,
}

/// Outcome of resolving one snapshot.
#[derive(Debug)]
pub enum Resolution {
    Accepted { key: String, record: JobRecord },
    Skipped(SkipReason),
    Rejected(ResolveError),
}

/// Active beats failed beats succeeded. Counters can overlap while a Job transitions.
pub fn resolve_status(snapshot: &JobSnapshot) -> JobStatus {
    if snapshot.active_count > 0 {
        JobStatus::Running
    } else if snapshot.failed_count > 0 {
        JobStatus::Failed
    } else {
        JobStatus::Succeeded
    }
}

/// Key is "<namespace>/<owner name>" so every Job spawned by the same owner collapses to one record.
pub fn resolve_identity(
    snapshot: &JobSnapshot,
    annotation: &str,
) -> Result<Identity, ResolveError> {
    let raw = snapshot
        .annotations
        .get(annotation)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ResolveError::MissingAnnotation(annotation.to_string()))?;
    let decoded =
        CreatedByAnnotation::decode(raw).map_err(|source| ResolveError::MalformedAnnotation {
            annotation: annotation.to_string(),
            source,
        })?;
    let name = decoded.reference.name;
    if name.is_empty() {
        return Err(ResolveError::EmptyReferenceName {
            annotation: annotation.to_string(),
        });
    }
    Ok(Identity {
        key: format!("{}/{}", snapshot.namespace, name),
        display_name: name,
    })
}

/// Filters, resolves and builds the candidate record for one snapshot.
pub fn resolve(snapshot: &JobSnapshot, annotation: &str) -> Resolution {
    if snapshot.annotations.is_empty() {
        return Resolution::Skipped(SkipReason::NoAnnotations);
    }
    let Some(completion_time) = snapshot.completion_time else {
        return Resolution::Skipped(SkipReason::NotCompleted);
    };
    let identity = match resolve_identity(snapshot, annotation) {
        Ok(identity) => identity,
        Err(ResolveError::MissingAnnotation(_)) => {
            return Resolution::Skipped(SkipReason::NoIdentity);
        }
        Err(e) => return Resolution::Rejected(e),
    };
    Resolution::Accepted {
        key: identity.key,
        record: JobRecord {
            display_name: identity.display_name,
            namespace: snapshot.namespace.clone(),
            status: resolve_status(snapshot),
            start_time: snapshot.start_time.unwrap_or(0),
            completion_time,
        },
    }
}
