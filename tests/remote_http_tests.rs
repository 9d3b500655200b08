//! HTTP collaborator tests against an in-process axum server.

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use pechenka::catalog::{CatalogError, CatalogSource, HttpCatalogSource};
use pechenka::remote::{
    DebugAuthority, HttpDebugAuthority, HttpLogSink, LogSink, PredictionLogEntry, StaticIdentity,
};
use pechenka::storage::MemoryStore;
use pechenka::{FixedClock, PredictionSession, SessionConfig, SessionDeps};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Option<Duration> = Some(Duration::from_secs(5));

type Received = Arc<Mutex<Vec<Value>>>;

fn catalog_doc() -> Value {
    json!({
        "Любовь": ["A", "B"],
        "Нейтральные и универсальные": ["N"]
    })
}

/// Starts a mock host and returns its base URL and the log bodies it receives
async fn spawn_host() -> (String, Received) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();

    let app = Router::new()
        .route("/pechenka.json", get(|| async { Json(catalog_doc()) }))
        .route("/broken.json", get(|| async { "{ not json" }))
        .route("/missing.json", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/debug-status",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                Json(json!({ "isDebug": q.get("userId").map(String::as_str) == Some("42") }))
            }),
        )
        .route(
            "/log-prediction",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    sink.lock().push(body);
                    StatusCode::NO_CONTENT
                }
            }),
        )
        .route(
            "/down/debug-status",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        )
        .route(
            "/down/log-prediction",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), received)
}

fn entry(user_id: Option<&str>) -> PredictionLogEntry {
    PredictionLogEntry {
        user_id: user_id.map(str::to_string),
        prediction: "A".to_string(),
        category: "Любовь".to_string(),
        timestamp: Utc::now(),
        is_debug: false,
    }
}

// === Catalog ===

#[tokio::test]
async fn test_http_catalog_loads() {
    let (base, _) = spawn_host().await;
    let source = HttpCatalogSource::new(format!("{base}/pechenka.json"), TIMEOUT);
    let catalog = source.fetch_catalog().await.unwrap();
    assert_eq!(catalog.categories(), vec!["Любовь"]);
}

#[tokio::test]
async fn test_http_catalog_status_error() {
    let (base, _) = spawn_host().await;
    let source = HttpCatalogSource::new(format!("{base}/missing.json"), TIMEOUT);
    match source.fetch_catalog().await {
        Err(CatalogError::Status { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_catalog_malformed() {
    let (base, _) = spawn_host().await;
    let source = HttpCatalogSource::new(format!("{base}/broken.json"), TIMEOUT);
    assert!(matches!(
        source.fetch_catalog().await,
        Err(CatalogError::Malformed(_))
    ));
}

// === Debug authority ===

#[tokio::test]
async fn test_debug_status_per_user() {
    let (base, _) = spawn_host().await;
    let authority = HttpDebugAuthority::new(&base, TIMEOUT);
    assert!(authority.debug_status("42").await.unwrap().is_debug);
    assert!(!authority.debug_status("7").await.unwrap().is_debug);
}

#[tokio::test]
async fn test_debug_status_error_status() {
    let (base, _) = spawn_host().await;
    let authority = HttpDebugAuthority::new(&format!("{base}/down/"), TIMEOUT);
    assert!(authority.debug_status("42").await.is_err());
}

#[tokio::test]
async fn test_debug_status_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let authority = HttpDebugAuthority::new(&format!("http://{addr}"), TIMEOUT);
    assert!(authority.debug_status("42").await.is_err());
}

// === Logging sink ===

#[tokio::test]
async fn test_log_entry_is_posted() {
    let (base, received) = spawn_host().await;
    let sink = HttpLogSink::new(&base, TIMEOUT);
    sink.log_prediction(&entry(Some("42"))).await.unwrap();

    let bodies = received.lock();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["userId"], "42");
    assert_eq!(bodies[0]["category"], "Любовь");
    assert_eq!(bodies[0]["isDebug"], false);
}

#[tokio::test]
async fn test_log_sink_error_status() {
    let (base, _) = spawn_host().await;
    let sink = HttpLogSink::new(&format!("{base}/down"), TIMEOUT);
    assert!(sink.log_prediction(&entry(None)).await.is_err());
}

// === Whole session over HTTP ===

#[tokio::test]
async fn test_session_with_remote_services() {
    let (base, received) = spawn_host().await;
    let now = NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();

    let mut deps = SessionDeps::new(Arc::new(HttpCatalogSource::new(
        format!("{base}/pechenka.json"),
        TIMEOUT,
    )));
    deps.store = Arc::new(MemoryStore::new());
    deps.identity = Arc::new(StaticIdentity::new("42"));
    deps.debug_authority = Some(Arc::new(HttpDebugAuthority::new(&base, TIMEOUT)));
    deps.log_sink = Some(Arc::new(HttpLogSink::new(&base, TIMEOUT)));
    deps.clock = Arc::new(FixedClock::new(now));

    let mut session = PredictionSession::initialize(deps, SessionConfig::default()).await;
    assert!(session.is_ready());
    assert!(session.is_debug());

    // debug users may play repeatedly within one slot
    for _ in 0..3 {
        let outcome = session.request_prediction(None).await.unwrap();
        assert_eq!(outcome.category, "Любовь");
    }
    session.flush_logs().await;

    let bodies = received.lock();
    assert_eq!(bodies.len(), 3);
    assert!(bodies.iter().all(|b| b["isDebug"] == true));
}
