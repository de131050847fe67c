use anyhow::Result;
use kube_job_exporter::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let collector_config = &app_config.collector;
    tracing::info!(
        mode = ?collector_config.mode,
        namespace = app_config.kubernetes.namespace.as_deref().unwrap_or("*"),
        "starting {}",
        version::banner()
    );

    let client = kube::Client::try_default()
        .await
        .map_err(|e| anyhow::anyhow!("kubernetes client: {}", e))?;

    let background = collector_config.mode == collector::CollectMode::Background;
    let (events_tx, events_rx) = if background {
        let (tx, rx) = tokio::sync::mpsc::channel(collector_config.event_channel_capacity);
        (Some(tx), Some(rx))
    } else {
        (None, None)
    };

    let (watcher_shutdown_tx, watcher_shutdown_rx) = tokio::sync::oneshot::channel();
    let (source, watcher_handle) = source::spawn_watcher(
        client,
        source::WatchConfig {
            namespace: app_config.kubernetes.namespace.clone(),
            label_selector: app_config.kubernetes.label_selector.clone(),
        },
        events_tx,
        watcher_shutdown_rx,
    );
    let source: Arc<dyn source::JobSource> = Arc::new(source);
    let store = Arc::new(job_store::JobStore::new(
        collector_config.identity_annotation.clone(),
    ));

    let (refresher_shutdown_tx, refresher_shutdown_rx) = tokio::sync::oneshot::channel();
    let refresher_handle = background.then(|| {
        worker::spawn(
            worker::RefresherDeps {
                source: source.clone(),
                store: store.clone(),
                events_rx,
                shutdown_rx: refresher_shutdown_rx,
            },
            worker::RefresherConfig {
                resync_interval_secs: collector_config.resync_interval_secs,
                stats_log_interval_secs: collector_config.stats_log_interval_secs,
                evict_missing: collector_config.evict_missing,
            },
        )
    });

    let registry = prometheus::Registry::new();
    let jobs_collector =
        collector::JobsCollector::new(source, store, collector_config.mode)?;
    registry.register(Box::new(jobs_collector))?;

    let app = routes::app(registry);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}/metrics", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Received shutdown signal");
    let _ = refresher_shutdown_tx.send(());
    let _ = watcher_shutdown_tx.send(());
    if let Some(handle) = refresher_handle {
        let _ = handle.await;
    }
    let _ = watcher_handle.await;

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
