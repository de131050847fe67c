// Integration tests: HTTP endpoints over a registry with the jobs collector

mod common;

use axum_test::TestServer;
use common::{CREATED_BY, StaticSource, job};
use kube_job_exporter::collector::{CollectMode, JobsCollector};
use kube_job_exporter::job_store::JobStore;
use kube_job_exporter::routes;
use prometheus::Registry;
use std::sync::Arc;

fn test_server(source: Arc<StaticSource>) -> TestServer {
    let store = Arc::new(JobStore::new(CREATED_BY));
    let collector = JobsCollector::new(source, store, CollectMode::Scrape).unwrap();
    let registry = Registry::new();
    registry.register(Box::new(collector)).unwrap();
    TestServer::new(routes::app(registry))
}

#[tokio::test]
async fn test_root_endpoint() {
    let server = test_server(Arc::new(StaticSource::default()));
    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("/metrics"));
}

#[tokio::test]
async fn test_healthz_endpoint() {
    let server = test_server(Arc::new(StaticSource::default()));
    let response = server.get("/healthz").await;
    response.assert_status_ok();
    response.assert_text("ok");
}

#[tokio::test]
async fn test_version_endpoint() {
    let server = test_server(Arc::new(StaticSource::default()));
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json.get("name").and_then(|v| v.as_str()),
        Some("kube-job-exporter")
    );
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_job_gauges() {
    let source = Arc::new(StaticSource::new(vec![
        job("a", "job1", 0, 0, Some(100)),
        job("a", "job2", 1, 0, None),
    ]));
    let server = test_server(source);
    let response = server.get("/metrics").await;
    response.assert_status_ok();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"), "{}", content_type);

    let body = response.text();
    let completion = body
        .lines()
        .find(|l| l.starts_with("kube_job_completion_time{"))
        .expect("completion gauge");
    assert!(completion.contains(r#"name="job1""#));
    assert!(completion.contains(r#"namespace="a""#));
    assert!(completion.ends_with(" 100"));
    assert!(body.contains("kube_job_start_time{"));
    assert!(!body.contains("job2"));
}

#[tokio::test]
async fn test_metrics_endpoint_survives_source_failure() {
    let source = Arc::new(StaticSource::new(vec![job("a", "job1", 0, 0, Some(100))]));
    source.set_failing(true);
    let server = test_server(source.clone());
    let response = server.get("/metrics").await;
    response.assert_status_ok();
    assert!(!response.text().contains("kube_job_status{"));

    source.set_failing(false);
    let response = server.get("/metrics").await;
    response.assert_status_ok();
    assert!(response.text().contains("kube_job_status{"));
}
