// GET handlers: metrics, version, banner

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, TextEncoder};

use super::AppState;
use crate::version::{NAME, VERSION, banner};

pub(super) async fn root_handler() -> impl IntoResponse {
    banner()
}

/// GET /metrics — gathers the registry off the async runtime (scrape mode lists jobs inside collect).
pub(super) async fn metrics_handler(State(state): State<AppState>) -> Response {
    let registry = state.registry.clone();
    let gathered = tokio::task::spawn_blocking(move || {
        let encoder = TextEncoder::new();
        encoder
            .encode_to_string(&registry.gather())
            .map(|body| (encoder.format_type().to_string(), body))
    })
    .await;

    match gathered {
        Ok(Ok((content_type, body))) => ([(header::CONTENT_TYPE, content_type)], body).into_response(),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, operation = "encode_metrics", "metrics encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, operation = "gather_metrics", "metrics gather task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// GET /version — service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}
