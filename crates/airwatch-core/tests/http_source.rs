//! Integration tests for the HTTP readings source.
//!
//! Each test starts a throwaway axum server on a random local port.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Json;
use serde_json::json;
use time::macros::datetime;

use airwatch_core::{
    Band, Error, HttpSource, ManualClock, Monitor, MonitorConfig, ReadingsSource,
};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/api/lectura", addr)
}

fn readings_router() -> Router {
    Router::new().route(
        "/api/lectura",
        get(|| async {
            Json(json!([
                {"valor": 250, "fecha": "2025-01-01T12:00:00"},
                {"valor": 410.5, "fecha": "2025-01-01 11:59:55"},
                {"valor": 700, "fecha": "2025-01-01T11:59:50.125000"}
            ]))
        }),
    )
}

#[tokio::test]
async fn test_fetch_parses_readings() {
    let url = serve(readings_router()).await;
    let source = HttpSource::new(&url).unwrap();

    let readings = source.fetch().await.unwrap();
    assert_eq!(readings.len(), 3);
    assert_eq!(readings[0].value, 250.0);
    assert_eq!(readings[0].timestamp, datetime!(2025-01-01 12:00:00 UTC));
    assert_eq!(readings[1].timestamp, datetime!(2025-01-01 11:59:55 UTC));
    assert_eq!(readings[2].value, 700.0);
}

#[tokio::test]
async fn test_fetch_empty_list() {
    let router = Router::new().route("/api/lectura", get(|| async { Json(json!([])) }));
    let url = serve(router).await;
    let source = HttpSource::new(&url).unwrap();

    assert!(source.fetch().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_drops_malformed_records() {
    let router = Router::new().route(
        "/api/lectura",
        get(|| async {
            Json(json!([
                {"valor": 250, "fecha": "2025-01-01T12:00:00"},
                {"valor": null, "fecha": "2025-01-01T11:59:55"},
                {"valor": 300, "fecha": "yesterday"}
            ]))
        }),
    );
    let url = serve(router).await;
    let source = HttpSource::new(&url).unwrap();

    let readings = source.fetch().await.unwrap();
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].value, 250.0);
}

#[tokio::test]
async fn test_server_error_uses_error_field() {
    let router = Router::new().route(
        "/api/lectura",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "db down"})),
            )
        }),
    );
    let url = serve(router).await;
    let source = HttpSource::new(&url).unwrap();

    match source.fetch().await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "db down");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_without_body() {
    let router = Router::new().route(
        "/api/lectura",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let url = serve(router).await;
    let source = HttpSource::new(&url).unwrap();

    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 503, .. }));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_non_array_body_is_invalid() {
    let router = Router::new().route(
        "/api/lectura",
        get(|| async { Json(json!({"valor": 250, "fecha": "2025-01-01T12:00:00"})) }),
    );
    let url = serve(router).await;
    let source = HttpSource::new(&url).unwrap();

    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)));
}

#[tokio::test]
async fn test_non_json_body_fails() {
    let router = Router::new().route("/api/lectura", get(|| async { "not json" }));
    let url = serve(router).await;
    let source = HttpSource::new(&url).unwrap();

    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, Error::Request(_)));
}

#[tokio::test]
async fn test_unreachable_source() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("http://{}/api/lectura", addr);
    let source = HttpSource::with_timeout(&url, Duration::from_secs(2)).unwrap();

    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, Error::NotReachable { .. }));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_monitor_over_http() {
    let url = serve(readings_router()).await;
    let source = Arc::new(HttpSource::new(&url).unwrap());
    let clock = Arc::new(ManualClock::new(datetime!(2025-01-01 12:00:00 UTC)));

    let handle = Monitor::spawn_with_clock(source, MonitorConfig::default(), clock).unwrap();
    let mut rx = handle.subscribe();
    let snapshot = tokio::time::timeout(Duration::from_secs(10), rx.wait_for(|s| s.has_data()))
        .await
        .expect("timed out waiting for first poll")
        .expect("monitor stopped")
        .clone();

    assert_eq!(snapshot.current_value, Some(250.0));
    assert_eq!(snapshot.current_band, Some(Band::Good));
    assert!(snapshot.is_online);
    assert_eq!(snapshot.seconds_since_last, 0);
    assert_eq!(snapshot.window.values(), vec![700.0, 410.5, 250.0]);
    assert_eq!(
        snapshot.last_reading_at,
        Some(datetime!(2025-01-01 06:00:00 UTC))
    );

    handle.shutdown().await;
}
