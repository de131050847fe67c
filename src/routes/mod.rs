// HTTP routes: Prometheus scrape endpoint plus small service endpoints

mod http;

use axum::{Router, routing::get};
use prometheus::Registry;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) registry: Registry,
}

/// `registry` must already have the jobs collector registered.
pub fn app(registry: Registry) -> Router {
    let state = AppState { registry };
    Router::new()
        .route("/", get(http::root_handler)) // GET /
        .route("/metrics", get(http::metrics_handler)) // GET /metrics
        .route("/version", get(http::version_handler)) // GET /version
        .route("/healthz", get(|| async { "ok" })) // GET /healthz
        .with_state(state)
}
