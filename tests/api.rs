//! Integration tests for the company catalog REST API
//!
//! Drives the router in-process with `oneshot`, backed by an in-memory
//! SQLite store.

#![cfg(feature = "server")]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use company_catalog::{create_router, CompanyService, CsvRecordSource, NameMatch, SqliteCompanyStore};

const BOUNDARY: &str = "catalog-test-boundary";

fn setup_router(name_match: NameMatch) -> axum::Router {
    let store = Arc::new(SqliteCompanyStore::open_in_memory().expect("in-memory store"));
    let service = CompanyService::new(store, Arc::new(CsvRecordSource::new())).with_name_match(name_match);
    create_router(service)
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn json_request(app: &axum::Router, method: &str, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &axum::Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder().method("GET").uri(path).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn upload(app: &axum::Router, field: &str, csv: &str) -> (StatusCode, Value) {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"q2_clientData.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
        b = BOUNDARY,
        field = field,
        csv = csv
    );
    let request = Request::builder()
        .method("POST")
        .uri("/v1/companies/merge-all-companies")
        .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_health() {
    let app = setup_router(NameMatch::Exact);
    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], "OK");
}

#[tokio::test]
async fn test_create_then_list() {
    let app = setup_router(NameMatch::Exact);

    let (status, body) = json_request(
        &app,
        "POST",
        "/v1/companies",
        json!({"name": "acme corp", "zipCode": "10001", "website": "http://acme.com"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "ACME CORP");
    assert!(body["data"]["_id"].is_string());

    let (status, body) = get(&app, "/v1/companies").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_duplicate_is_conflict() {
    let app = setup_router(NameMatch::Exact);
    let company = json!({"name": "ACME", "zipCode": "10001"});

    json_request(&app, "POST", "/v1/companies", company.clone()).await;
    let (status, body) = json_request(&app, "POST", "/v1/companies", company).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "already_exists");
}

#[tokio::test]
async fn test_create_invalid_is_bad_request() {
    let app = setup_router(NameMatch::Exact);

    let (status, body) = json_request(
        &app,
        "POST",
        "/v1/companies",
        json!({"name": "ACME2", "zipCode": "10001"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation_failed");
}

#[tokio::test]
async fn test_update_unknown_is_not_found() {
    let app = setup_router(NameMatch::Exact);

    let (status, body) = json_request(
        &app,
        "PUT",
        "/v1/companies",
        json!({"name": "GHOST", "zipCode": "10001"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn test_search_and_find_by_name() {
    let app = setup_router(NameMatch::Exact);
    json_request(&app, "POST", "/v1/companies", json!({"name": "TOLA SALES GROUP", "zipCode": "78229"})).await;

    let (status, body) = get(&app, "/v1/companies/search?name=tola%20sales%20group&zip=78229").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["zipCode"], "78229");

    let (status, _) = get(&app, "/v1/companies/search?name=TOLA%20SALES%20GROUP&zip=00000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(&app, "/v1/companies/search?name=tola%20sales%20group").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "TOLA SALES GROUP");

    let (status, body) = get(&app, "/v1/companies/Tola%20Sales%20Group").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "TOLA SALES GROUP");
}

#[tokio::test]
async fn test_search_contains_mode() {
    let app = setup_router(NameMatch::Contains);
    json_request(&app, "POST", "/v1/companies", json!({"name": "ACME SUBSIDIARY", "zipCode": "10001"})).await;

    let (status, body) = get(&app, "/v1/companies/search?name=acme&zip=10001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "ACME SUBSIDIARY");
}

#[tokio::test]
async fn test_merge_upload_updates_existing() {
    let app = setup_router(NameMatch::Exact);
    let (_, created) =
        json_request(&app, "POST", "/v1/companies", json!({"name": "ACME CORP", "zipCode": "10001"})).await;
    let original_id = created["data"]["_id"].clone();

    let (status, body) = upload(
        &app,
        "csv",
        "name;addresszip;website\nacme corp;10001;http://acme.com\nghost;10001;\n",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["written"], 1);
    assert_eq!(body["data"]["failures"][0]["kind"], "not_found");

    let (_, found) = get(&app, "/v1/companies/ACME%20CORP").await;
    assert_eq!(found["data"]["website"], "http://acme.com");
    assert_eq!(found["data"]["_id"], original_id);
}

#[tokio::test]
async fn test_merge_requires_csv_field() {
    let app = setup_router(NameMatch::Exact);
    let (status, body) = upload(&app, "other", "name;zip\nACME;10001\n").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_merge_rejects_empty_file() {
    let app = setup_router(NameMatch::Exact);
    let (status, _) = upload(&app, "csv", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
