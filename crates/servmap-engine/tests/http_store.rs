//! Integration tests for `HttpSnapshotStore` against a wiremock cache
//! service.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use servmap_core::types::{Bounds, GridCell, TerritorySnapshot};
use servmap_engine::{HttpSnapshotStore, SnapshotStore, StoreError};

fn test_store(base_url: &str) -> HttpSnapshotStore {
    HttpSnapshotStore::new(base_url, 5).expect("failed to build HttpSnapshotStore")
}

fn sample_snapshot() -> TerritorySnapshot {
    TerritorySnapshot::finished(
        vec![GridCell {
            lat: 47.5,
            lng: 10.25,
            territory_index: 1,
        }],
        "cafe12345678".to_string(),
        vec!["kempten".to_string(), "memmingen".to_string()],
        1,
        32,
        Bounds {
            min_lat: 47.0,
            max_lat: 48.0,
            min_lng: 10.0,
            max_lng: 11.0,
        },
    )
}

#[tokio::test]
async fn get_missing_snapshot_returns_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/territories/towing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = test_store(&server.uri());
    let result = store.get("towing").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn get_returns_parsed_snapshot() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/territories/towing"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(&serde_json::to_value(sample_snapshot()).unwrap()),
        )
        .mount(&server)
        .await;

    let store = test_store(&server.uri());
    let snapshot = store.get("towing").await.unwrap().unwrap();
    assert!(snapshot.is_complete());
    assert_eq!(snapshot.locations_fingerprint, "cafe12345678");
    assert_eq!(snapshot.grid.len(), 1);
    assert_eq!(snapshot.grid[0].territory_index, 1);
}

#[tokio::test]
async fn get_server_error_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/territories/towing"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = test_store(&server.uri());
    let result = store.get("towing").await;
    assert!(
        matches!(result, Err(StoreError::UnexpectedStatus { status: 500, .. })),
        "expected UnexpectedStatus(500), got: {result:?}"
    );
}

#[tokio::test]
async fn get_malformed_body_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/territories/towing"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not valid"))
        .mount(&server)
        .await;

    let store = test_store(&server.uri());
    let result = store.get("towing").await;
    assert!(
        matches!(result, Err(StoreError::Malformed { .. })),
        "expected Malformed, got: {result:?}"
    );
}

#[tokio::test]
async fn put_posts_camel_case_snapshot_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/territories/towing"))
        .and(body_partial_json(json!({
            "isPartial": false,
            "totalPoints": 1,
            "gridSize": 32,
            "locationsFingerprint": "cafe12345678"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"status": "saved"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = test_store(&server.uri());
    store.put("towing", &sample_snapshot()).await.unwrap();
}

#[tokio::test]
async fn put_failure_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/territories/towing"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = test_store(&server.uri());
    let result = store.put("towing", &sample_snapshot()).await;
    assert!(
        matches!(result, Err(StoreError::UnexpectedStatus { status: 503, .. })),
        "expected UnexpectedStatus(503), got: {result:?}"
    );
}
