//! # Integration Tests for people-api
//!
//! Drives the full router with `tower::ServiceExt::oneshot` against the
//! in-memory store. The three lookup services are served by wiremock so
//! that enrichment success and failure can be controlled per test.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use std::sync::Arc;

use async_trait::async_trait;
use people_api::db::{PersonFilter, PersonStore, StoreError};
use people_api::state::{AppState, Person};
use people_enrich::{EnrichConfig, EnrichmentClient};

// -- Helpers ------------------------------------------------------------------

/// Build the app with every lookup pointed at `mock_server`.
fn test_app(mock_server: &MockServer) -> axum::Router {
    let mut config = EnrichConfig::with_base_url(&mock_server.uri()).unwrap();
    config.timeout_secs = 2;
    app_with_config(config)
}

fn app_with_config(config: EnrichConfig) -> axum::Router {
    let enrichment = EnrichmentClient::new(config).unwrap();
    people_api::app(AppState::in_memory(enrichment))
}

/// Serve all three lookups with fixed answers.
async fn mount_lookups(mock_server: &MockServer, age: i32, gender: &str, country: &str) {
    Mock::given(method("GET"))
        .and(path("/age"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"age": age})))
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gender"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"gender": gender})))
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nationality"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "country": [{"country_id": country, "probability": 0.8}]
        })))
        .mount(mock_server)
        .await;
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn create(app: &axum::Router, name: &str, surname: &str) -> Value {
    let (status, body) = send(
        app,
        json_request("POST", "/api/people", json!({"name": name, "surname": surname})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let mock_server = MockServer::start().await;
    let app = test_app(&mock_server);
    let (status, body) = send(&app, empty_request("GET", "/health/liveness")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}

#[tokio::test]
async fn test_readiness_probe() {
    let mock_server = MockServer::start().await;
    let app = test_app(&mock_server);
    let (status, body) = send(&app, empty_request("GET", "/health/readiness")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ready"));
}

// -- Create -------------------------------------------------------------------

#[tokio::test]
async fn test_create_enriches_record() {
    let mock_server = MockServer::start().await;
    mount_lookups(&mock_server, 35, "male", "RU").await;
    let app = test_app(&mock_server);

    let body = create(&app, "Ivan", "Petrov").await;
    assert_eq!(body["name"], "Ivan");
    assert_eq!(body["surname"], "Petrov");
    assert_eq!(body["age"], 35);
    assert_eq!(body["gender"], "male");
    assert_eq!(body["nationality"], "RU");
    assert!(body["id"].as_i64().unwrap() > 0);
    assert!(body.get("patronymic").is_none());
    assert!(body["created_at"].is_string());
}

#[tokio::test]
async fn test_create_then_get_returns_input_names() {
    let mock_server = MockServer::start().await;
    mount_lookups(&mock_server, 35, "male", "RU").await;
    let app = test_app(&mock_server);

    let (status, created) = send(
        &app,
        json_request(
            "POST",
            "/api/people",
            json!({"name": "Ivan", "surname": "Petrov", "patronymic": "Sergeevich"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) = send(&app, empty_request("GET", &format!("/api/people/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Ivan");
    assert_eq!(fetched["surname"], "Petrov");
    assert_eq!(fetched["patronymic"], "Sergeevich");
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_with_unreachable_age_service_still_succeeds() {
    let mock_server = MockServer::start().await;
    mount_lookups(&mock_server, 35, "female", "KZ").await;

    let mut config = EnrichConfig::with_base_url(&mock_server.uri()).unwrap();
    config.age_url = "http://127.0.0.1:1/age".parse().unwrap();
    config.timeout_secs = 2;
    let app = app_with_config(config);

    let body = create(&app, "Anna", "Ivanova").await;
    assert_eq!(body["age"], 0);
    assert_eq!(body["gender"], "female");
    assert_eq!(body["nationality"], "KZ");
}

#[tokio::test]
async fn test_create_with_all_lookups_failing_persists_zero_values() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    let app = test_app(&mock_server);

    let body = create(&app, "Ivan", "Petrov").await;
    assert_eq!(body["age"], 0);
    assert_eq!(body["gender"], "");
    assert_eq!(body["nationality"], "");
}

#[tokio::test]
async fn test_create_missing_surname_returns_400() {
    let mock_server = MockServer::start().await;
    let app = test_app(&mock_server);

    let (status, body) =
        send(&app, json_request("POST", "/api/people", json!({"name": "Ivan"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_empty_name_returns_400() {
    let mock_server = MockServer::start().await;
    let app = test_app(&mock_server);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/people", json!({"name": " ", "surname": "Petrov"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn test_create_malformed_json_returns_400() {
    let mock_server = MockServer::start().await;
    let app = test_app(&mock_server);

    let request = Request::builder()
        .method("POST")
        .uri("/api/people")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// -- List ---------------------------------------------------------------------

#[tokio::test]
async fn test_list_filters_by_name_case_insensitively() {
    let mock_server = MockServer::start().await;
    mount_lookups(&mock_server, 30, "female", "RU").await;
    let app = test_app(&mock_server);

    create(&app, "Anna", "Ivanova").await;
    create(&app, "Ivan", "Petrov").await;
    create(&app, "Marianna", "Sidorova").await;
    create(&app, "ANNABEL", "Smith").await;

    let (status, body) = send(&app, empty_request("GET", "/api/people?name=Anna")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    for person in data {
        let name = person["name"].as_str().unwrap().to_lowercase();
        assert!(name.contains("anna"), "unexpected match: {name}");
    }
}

#[tokio::test]
async fn test_list_filters_are_and_combined() {
    let mock_server = MockServer::start().await;
    mount_lookups(&mock_server, 30, "male", "RU").await;
    let app = test_app(&mock_server);

    create(&app, "Ivan", "Petrov").await;
    create(&app, "Ivan", "Sidorov").await;
    create(&app, "Oleg", "Petrov").await;

    let (status, body) = send(
        &app,
        empty_request("GET", "/api/people?name=ivan&surname=PETROV"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["name"], "Ivan");
    assert_eq!(body["data"][0]["surname"], "Petrov");
}

#[tokio::test]
async fn test_list_second_page() {
    let mock_server = MockServer::start().await;
    mount_lookups(&mock_server, 30, "male", "RU").await;
    let app = test_app(&mock_server);

    let mut ids = Vec::new();
    for i in 1..=15 {
        let body = create(&app, &format!("Person{i}"), "Test").await;
        ids.push(body["id"].as_i64().unwrap());
    }

    let (status, body) = send(&app, empty_request("GET", "/api/people?page=2&limit=10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 15);
    assert_eq!(body["page"], 2);
    assert_eq!(body["limit"], 10);
    let page_ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(page_ids, ids[10..].to_vec());
}

#[tokio::test]
async fn test_list_invalid_pagination_uses_defaults() {
    let mock_server = MockServer::start().await;
    mount_lookups(&mock_server, 30, "male", "RU").await;
    let app = test_app(&mock_server);

    for i in 1..=12 {
        create(&app, &format!("Person{i}"), "Test").await;
    }

    let (status, body) =
        send(&app, empty_request("GET", "/api/people?page=abc&limit=-3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 10);
    assert_eq!(body["total"], 12);
    assert_eq!(body["data"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_list_empty_store() {
    let mock_server = MockServer::start().await;
    let app = test_app(&mock_server);

    let (status, body) = send(&app, empty_request("GET", "/api/people")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": [], "total": 0, "page": 1, "limit": 10}));
}

// -- Update -------------------------------------------------------------------

#[tokio::test]
async fn test_update_overwrites_names_and_reenriches() {
    let mock_server = MockServer::start().await;
    mount_lookups(&mock_server, 35, "male", "RU").await;
    let app = test_app(&mock_server);

    let created = create(&app, "Ivan", "Petrov").await;
    let id = created["id"].as_i64().unwrap();

    mock_server.reset().await;
    mount_lookups(&mock_server, 28, "female", "UA").await;

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/people/{id}"),
            json!({"name": "Olena", "surname": "Kovalenko", "patronymic": "Ivanivna"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["name"], "Olena");
    assert_eq!(body["surname"], "Kovalenko");
    assert_eq!(body["patronymic"], "Ivanivna");
    assert_eq!(body["age"], 28);
    assert_eq!(body["gender"], "female");
    assert_eq!(body["nationality"], "UA");
    assert_eq!(body["created_at"], created["created_at"]);
}

#[tokio::test]
async fn test_update_with_failing_nationality_preserves_previous_value() {
    let mock_server = MockServer::start().await;
    mount_lookups(&mock_server, 35, "male", "RU").await;
    let app = test_app(&mock_server);

    let created = create(&app, "Ivan", "Petrov").await;
    let id = created["id"].as_i64().unwrap();

    mock_server.reset().await;
    Mock::given(method("GET"))
        .and(path("/age"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"age": 40})))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gender"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"gender": "male"})))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nationality"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/people/{id}"),
            json!({"name": "Ivan", "surname": "Petrov"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["age"], 40);
    assert_eq!(body["nationality"], "RU");

    let (_, fetched) = send(&app, empty_request("GET", &format!("/api/people/{id}"))).await;
    assert_eq!(fetched["nationality"], "RU");
    assert_eq!(fetched["age"], 40);
}

#[tokio::test]
async fn test_update_missing_person_returns_404() {
    let mock_server = MockServer::start().await;
    let app = test_app(&mock_server);

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/people/999",
            json!({"name": "Ivan", "surname": "Petrov"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn test_update_invalid_body_returns_400() {
    let mock_server = MockServer::start().await;
    mount_lookups(&mock_server, 35, "male", "RU").await;
    let app = test_app(&mock_server);

    let created = create(&app, "Ivan", "Petrov").await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        json_request("PUT", &format!("/api/people/{id}"), json!({"name": "Ivan", "surname": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, fetched) = send(&app, empty_request("GET", &format!("/api/people/{id}"))).await;
    assert_eq!(fetched["surname"], "Petrov");
}

// -- Get / Delete -------------------------------------------------------------

#[tokio::test]
async fn test_get_missing_person_returns_404() {
    let mock_server = MockServer::start().await;
    let app = test_app(&mock_server);

    let (status, _) = send(&app, empty_request("GET", "/api/people/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_id_returns_400() {
    let mock_server = MockServer::start().await;
    let app = test_app(&mock_server);

    let (status, body) = send(&app, empty_request("GET", "/api/people/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, empty_request("DELETE", "/api/people/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_removes_person() {
    let mock_server = MockServer::start().await;
    mount_lookups(&mock_server, 35, "male", "RU").await;
    let app = test_app(&mock_server);

    let created = create(&app, "Ivan", "Petrov").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(&app, empty_request("DELETE", &format!("/api/people/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, empty_request("GET", &format!("/api/people/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_person_returns_204() {
    let mock_server = MockServer::start().await;
    let app = test_app(&mock_server);

    let (status, _) = send(&app, empty_request("DELETE", "/api/people/12345")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

// -- Store Failures -----------------------------------------------------------

/// A store whose every operation fails as if the pool were exhausted.
struct FailingStore;

fn pool_timeout() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl PersonStore for FailingStore {
    async fn create(&self, _person: &Person) -> Result<Person, StoreError> {
        Err(pool_timeout())
    }

    async fn find_many(
        &self,
        _filter: &PersonFilter,
        _offset: i64,
        _limit: i64,
    ) -> Result<(Vec<Person>, i64), StoreError> {
        Err(pool_timeout())
    }

    async fn find_one(&self, _id: i64) -> Result<Option<Person>, StoreError> {
        Err(pool_timeout())
    }

    async fn save(&self, _person: &Person) -> Result<Person, StoreError> {
        Err(pool_timeout())
    }

    async fn delete(&self, _id: i64) -> Result<(), StoreError> {
        Err(pool_timeout())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(pool_timeout())
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

fn failing_app(mock_server: &MockServer) -> axum::Router {
    let mut config = EnrichConfig::with_base_url(&mock_server.uri()).unwrap();
    config.timeout_secs = 2;
    let enrichment = EnrichmentClient::new(config).unwrap();
    people_api::app(AppState::new(Arc::new(FailingStore), enrichment))
}

fn assert_internal_error(status: StatusCode, body: &Value) {
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, &json!({"error": "An internal error occurred"}));
}

#[tokio::test]
async fn test_create_store_failure_returns_500() {
    let mock_server = MockServer::start().await;
    mount_lookups(&mock_server, 35, "male", "RU").await;
    let app = failing_app(&mock_server);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/people", json!({"name": "Ivan", "surname": "Petrov"})),
    )
    .await;
    assert_internal_error(status, &body);
}

#[tokio::test]
async fn test_list_store_failure_returns_500() {
    let mock_server = MockServer::start().await;
    let app = failing_app(&mock_server);

    let (status, body) = send(&app, empty_request("GET", "/api/people?name=iv")).await;
    assert_internal_error(status, &body);
}

#[tokio::test]
async fn test_update_store_failure_returns_500() {
    let mock_server = MockServer::start().await;
    mount_lookups(&mock_server, 35, "male", "RU").await;
    let app = failing_app(&mock_server);

    let (status, body) = send(
        &app,
        json_request("PUT", "/api/people/1", json!({"name": "Ivan", "surname": "Petrov"})),
    )
    .await;
    assert_internal_error(status, &body);
}

#[tokio::test]
async fn test_delete_store_failure_returns_500() {
    let mock_server = MockServer::start().await;
    let app = failing_app(&mock_server);

    let (status, body) = send(&app, empty_request("DELETE", "/api/people/1")).await;
    assert_internal_error(status, &body);
}

#[tokio::test]
async fn test_readiness_store_failure_returns_503() {
    let mock_server = MockServer::start().await;
    let app = failing_app(&mock_server);

    let (status, body) = send(&app, empty_request("GET", "/health/readiness")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!("store unreachable"));

    let (status, _) = send(&app, empty_request("GET", "/health/liveness")).await;
    assert_eq!(status, StatusCode::OK);
}
