// In-memory aggregation store: one record per logical job, merged monotonically on completion time.
// Shared between the background refresher (writer) and scrape handlers (readers).

use std::collections::{BTreeMap, HashSet};
use std::sync::{PoisonError, RwLock};

use crate::models::{JobRecord, JobSnapshot};
use crate::resolver::{self, Resolution};
use tracing::{debug, instrument, warn};

/// Result of merging one candidate record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    Updated,
    /// Candidate completed before the stored record; discarded.
    Stale,
}

/// Per-batch counters returned by [`JobStore::refresh`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub inserted: usize,
    pub updated: usize,
    pub stale: usize,
    pub skipped: usize,
    pub rejected: usize,
}

impl RefreshSummary {
    pub fn accepted(&self) -> usize {
        self.inserted + self.updated
    }
}

pub struct JobStore {
    annotation: String,
    records: RwLock<BTreeMap<String, JobRecord>>,
}

impl JobStore {
    /// `annotation` is the annotation key holding the serialized owner reference.
    pub fn new(annotation: impl Into<String>) -> Self {
        Self {
            annotation: annotation.into(),
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// First observation for a key is inserted as-is; later ones only replace it
    /// when their completion time is >= the stored one.
    pub fn merge(&self, key: &str, candidate: JobRecord) -> MergeOutcome {
        // Every mutation is a single insert/assign, so a poisoned map is still consistent.
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = records.get_mut(key) {
            if existing.completion_time > candidate.completion_time {
                return MergeOutcome::Stale;
            }
            *existing = candidate;
            return MergeOutcome::Updated;
        }
        records.insert(key.to_string(), candidate);
        MergeOutcome::Inserted
    }

    /// Resolves and merges each snapshot. A bad snapshot never aborts the batch.
    #[instrument(skip(self, snapshots), fields(operation = "refresh", snapshots_count = snapshots.len()))]
    pub fn refresh(&self, snapshots: &[JobSnapshot]) -> RefreshSummary {
        let mut summary = RefreshSummary::default();
        for snapshot in snapshots {
            match resolver::resolve(snapshot, &self.annotation) {
                Resolution::Accepted { key, record } => match self.merge(&key, record) {
                    MergeOutcome::Inserted => summary.inserted += 1,
                    MergeOutcome::Updated => summary.updated += 1,
                    MergeOutcome::Stale => summary.stale += 1,
                },
                Resolution::Skipped(reason) => {
                    debug!(
                        namespace = %snapshot.namespace,
                        job = %snapshot.object_name,
                        ?reason,
                        "job is either not done or unrecognized; skipped"
                    );
                    summary.skipped += 1;
                }
                Resolution::Rejected(e) => {
                    warn!(
                        namespace = %snapshot.namespace,
                        job = %snapshot.object_name,
                        error = %e,
                        "cannot resolve job identity; skipped"
                    );
                    summary.rejected += 1;
                }
            }
        }
        debug!(
            inserted = summary.inserted,
            updated = summary.updated,
            stale = summary.stale,
            skipped = summary.skipped,
            rejected = summary.rejected,
            "refresh complete"
        );
        summary
    }

    /// Point-in-time copy of all records, ordered by key.
    pub fn records(&self) -> Vec<JobRecord> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.values().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<JobRecord> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every record whose key is not in `live`. Returns the number evicted.
    pub fn retain_keys(&self, live: &HashSet<String>) -> usize {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let before = records.len();
        records.retain(|key, _| live.contains(key));
        before - records.len()
    }

    /// Keys the given snapshots resolve to (accepted ones only).
    pub fn live_keys(&self, snapshots: &[JobSnapshot]) -> HashSet<String> {
        snapshots
            .iter()
            .filter_map(|s| match resolver::resolve(s, &self.annotation) {
                Resolution::Accepted { key, .. } => Some(key),
                _ => None,
            })
            .collect()
    }
}
