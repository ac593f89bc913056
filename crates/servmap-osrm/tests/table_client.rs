//! Integration tests for `OsrmClient::duration_table`.
//!
//! Uses `wiremock` to stand up a local HTTP server per test so no real
//! network traffic is made. Covers the happy path, unreachable (null)
//! entries, and every error variant the engine's skip-the-batch failure
//! handling depends on.

use serde_json::json;
use wiremock::matchers::{method, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use servmap_core::types::LatLng;
use servmap_osrm::{OsrmClient, OsrmError, MAX_SOURCES_PER_REQUEST};

fn test_client(base_url: &str) -> OsrmClient {
    OsrmClient::new(base_url, "driving", 5).expect("failed to build test OsrmClient")
}

fn p(lat: f64, lng: f64) -> LatLng {
    LatLng { lat, lng }
}

#[tokio::test]
async fn returns_duration_matrix_on_ok_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/table/v1/driving/.*"))
        .and(query_param("annotations", "duration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "code": "Ok",
            "durations": [[120.0, 300.5], [90.0, 60.0]]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let table = client
        .duration_table(&[p(47.5, 10.0), p(47.6, 10.1)], &[p(48.0, 11.0), p(47.0, 9.0)])
        .await
        .expect("expected Ok table");

    assert_eq!(table.len(), 2);
    assert_eq!(table[0], vec![Some(120.0), Some(300.5)]);
    assert_eq!(table[1], vec![Some(90.0), Some(60.0)]);
}

#[tokio::test]
async fn null_entries_become_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/table/v1/driving/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "code": "Ok",
            "durations": [[null, 300.0]]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let table = client
        .duration_table(&[p(47.5, 10.0)], &[p(48.0, 11.0), p(47.0, 9.0)])
        .await
        .unwrap();

    assert_eq!(table[0], vec![None, Some(300.0)]);
}

#[tokio::test]
async fn empty_sources_short_circuits_without_request() {
    // No mock mounted: any request would fail the test with a connection
    // to an endpoint that returns 404.
    let server = MockServer::start().await;
    let client = test_client(&server.uri());

    let table = client
        .duration_table(&[], &[p(48.0, 11.0)])
        .await
        .unwrap();
    assert!(table.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn non_ok_code_is_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/table/v1/driving/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "code": "NoTable",
            "message": "no route between points"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.duration_table(&[p(47.5, 10.0)], &[p(48.0, 11.0)]).await;

    assert!(
        matches!(result, Err(OsrmError::Api { ref code }) if code == "NoTable"),
        "expected Api error, got: {result:?}"
    );
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/table/v1/driving/.*"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.duration_table(&[p(47.5, 10.0)], &[p(48.0, 11.0)]).await;

    assert!(
        matches!(result, Err(OsrmError::UnexpectedStatus { status: 503, .. })),
        "expected UnexpectedStatus(503), got: {result:?}"
    );
}

#[tokio::test]
async fn malformed_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/table/v1/driving/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.duration_table(&[p(47.5, 10.0)], &[p(48.0, 11.0)]).await;

    assert!(
        matches!(result, Err(OsrmError::Deserialize { .. })),
        "expected Deserialize error, got: {result:?}"
    );
}

#[tokio::test]
async fn ok_without_durations_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/table/v1/driving/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"code": "Ok"})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.duration_table(&[p(47.5, 10.0)], &[p(48.0, 11.0)]).await;

    assert!(
        matches!(result, Err(OsrmError::MalformedMatrix { .. })),
        "expected MalformedMatrix, got: {result:?}"
    );
}

#[tokio::test]
async fn row_count_mismatch_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/table/v1/driving/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "code": "Ok",
            "durations": [[100.0]]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    // two sources, but the matrix only has one row
    let result = client
        .duration_table(&[p(47.5, 10.0), p(47.6, 10.1)], &[p(48.0, 11.0)])
        .await;

    assert!(
        matches!(result, Err(OsrmError::MalformedMatrix { .. })),
        "expected MalformedMatrix, got: {result:?}"
    );
}

#[tokio::test]
async fn column_count_mismatch_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/table/v1/driving/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "code": "Ok",
            "durations": [[100.0]]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    // one source, two destinations, but the row only has one column
    let result = client
        .duration_table(&[p(47.5, 10.0)], &[p(48.0, 11.0), p(47.0, 9.0)])
        .await;

    assert!(
        matches!(result, Err(OsrmError::MalformedMatrix { .. })),
        "expected MalformedMatrix, got: {result:?}"
    );
}

#[tokio::test]
async fn rejects_oversized_source_batches_without_request() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());

    let sources: Vec<LatLng> = (0..=MAX_SOURCES_PER_REQUEST)
        .map(|i| {
            let offset = f64::from(u32::try_from(i).unwrap()) * 0.01;
            p(47.0 + offset, 10.0)
        })
        .collect();
    let result = client.duration_table(&sources, &[p(48.0, 11.0)]).await;

    assert!(
        matches!(result, Err(OsrmError::TooManySources { .. })),
        "expected TooManySources, got: {result:?}"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}
