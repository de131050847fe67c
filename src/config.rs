use serde::Deserialize;

use crate::collector::CollectMode;
use crate::models::CREATED_BY_ANNOTATION;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub kubernetes: KubernetesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    #[serde(default)]
    pub mode: CollectMode,
    /// Full list + refresh period for background mode.
    #[serde(default = "default_resync_interval_secs")]
    pub resync_interval_secs: u64,
    /// Buffered watch events between the watcher and the refresher.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
    /// How often to log store stats (records, refreshes) at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
    /// Drop records for jobs absent from the latest full list (background mode only).
    #[serde(default)]
    pub evict_missing: bool,
    /// Annotation carrying the serialized owner reference used as job identity.
    #[serde(default = "default_identity_annotation")]
    pub identity_annotation: String,
}

fn default_resync_interval_secs() -> u64 {
    30
}

fn default_event_channel_capacity() -> usize {
    256
}

fn default_stats_log_interval_secs() -> u64 {
    300
}

fn default_identity_annotation() -> String {
    CREATED_BY_ANNOTATION.to_string()
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            mode: CollectMode::default(),
            resync_interval_secs: default_resync_interval_secs(),
            event_channel_capacity: default_event_channel_capacity(),
            stats_log_interval_secs: default_stats_log_interval_secs(),
            evict_missing: false,
            identity_annotation: default_identity_annotation(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KubernetesConfig {
    /// Watch only this namespace; all namespaces when omitted.
    pub namespace: Option<String>,
    pub label_selector: Option<String>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.server.host.is_empty(),
            "server.host must be non-empty"
        );
        anyhow::ensure!(
            self.collector.resync_interval_secs > 0,
            "collector.resync_interval_secs must be > 0, got {}",
            self.collector.resync_interval_secs
        );
        anyhow::ensure!(
            self.collector.event_channel_capacity > 0,
            "collector.event_channel_capacity must be > 0, got {}",
            self.collector.event_channel_capacity
        );
        anyhow::ensure!(
            self.collector.stats_log_interval_secs > 0,
            "collector.stats_log_interval_secs must be > 0, got {}",
            self.collector.stats_log_interval_secs
        );
        anyhow::ensure!(
            !self.collector.identity_annotation.trim().is_empty(),
            "collector.identity_annotation must be non-empty"
        );
        anyhow::ensure!(
            !(self.collector.evict_missing && self.collector.mode == CollectMode::Scrape),
            "collector.evict_missing requires collector.mode = \"background\""
        );
        if let Some(ns) = &self.kubernetes.namespace {
            anyhow::ensure!(!ns.is_empty(), "kubernetes.namespace must be non-empty when set");
        }
        Ok(())
    }
}
