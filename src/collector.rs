// Collector facade: the pull-side entry point used by the metrics registry.
// Scrape mode lists + refreshes on every collect; background mode only renders.

use std::sync::{Arc, Mutex, PoisonError};

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, Opts};
use serde::Deserialize;
use tracing::warn;

use crate::job_store::JobStore;
use crate::render::{
    self, DESCRIPTORS, JOB_COMPLETION_TIME, JOB_START_TIME, JOB_STATUS, LABELS, MetricDescriptor,
    MetricSample,
};
use crate::source::JobSource;

/// Where store refreshes happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectMode {
    /// Every scrape runs list + refresh + render.
    Scrape,
    /// A background refresher keeps the store current; scrapes only render.
    #[default]
    Background,
}

pub struct JobsCollector {
    source: Arc<dyn JobSource>,
    store: Arc<JobStore>,
    mode: CollectMode,
    status: GaugeVec,
    start_time: GaugeVec,
    completion_time: GaugeVec,
    /// Serializes scrapes: gauge vectors are reset and refilled per collect.
    scrape_lock: Mutex<()>,
}

impl JobsCollector {
    pub fn new(
        source: Arc<dyn JobSource>,
        store: Arc<JobStore>,
        mode: CollectMode,
    ) -> prometheus::Result<Self> {
        let gauge = |d: &MetricDescriptor| GaugeVec::new(Opts::new(d.name, d.help), &LABELS);
        let [status, start_time, completion_time] = &DESCRIPTORS;
        Ok(Self {
            source,
            store,
            mode,
            status: gauge(status)?,
            start_time: gauge(start_time)?,
            completion_time: gauge(completion_time)?,
            scrape_lock: Mutex::new(()),
        })
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    /// Static descriptors; independent of store state.
    pub fn describe(&self) -> Vec<MetricDescriptor> {
        DESCRIPTORS.to_vec()
    }

    /// Samples for one scrape. A failed list yields no samples for this call only.
    pub fn collect_samples(&self) -> Vec<MetricSample> {
        if self.mode == CollectMode::Scrape {
            match self.source.list() {
                Ok(snapshots) => {
                    self.store.refresh(&snapshots);
                }
                Err(e) => {
                    warn!(error = %e, operation = "list_jobs", "listing jobs failed");
                    return Vec::new();
                }
            }
        }
        render::render(&self.store)
    }

    fn gauges(&self) -> [&GaugeVec; 3] {
        [&self.status, &self.start_time, &self.completion_time]
    }

    fn gauge_for(&self, metric: &str) -> Option<&GaugeVec> {
        match metric {
            JOB_STATUS => Some(&self.status),
            JOB_START_TIME => Some(&self.start_time),
            JOB_COMPLETION_TIME => Some(&self.completion_time),
            _ => None,
        }
    }
}

impl Collector for JobsCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.gauges().into_iter().flat_map(|g| g.desc()).collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let _guard = self.scrape_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let samples = self.collect_samples();
        for gauge in self.gauges() {
            gauge.reset();
        }
        for sample in &samples {
            if let Some(gauge) = self.gauge_for(sample.metric) {
                gauge
                    .with_label_values(&[sample.namespace.as_str(), sample.name.as_str()])
                    .set(sample.value);
            }
        }
        self.gauges()
            .into_iter()
            .flat_map(|g| g.collect())
            .collect()
    }
}
