//! End-to-end tests for the todo API over an in-process router backed by a
//! real SQLite database.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use taskboard_core::TaskService;
use taskboard_http::{AppState, HttpConfig, router};
use taskboard_store::SqliteGateway;

fn test_app() -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let gateway = SqliteGateway::open(dir.path().join("api.db")).unwrap();
    let state = AppState::new(TaskService::new(gateway));
    let app = router(state, &HttpConfig::default());
    (app, dir)
}

async fn send(app: &Router, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_full_crud_scenario() {
    let (app, _dir) = test_app();

    // Create "Buy milk": 201, id assigned, not completed.
    let (status, body) = send(&app, "POST", "/todos", Some(json!({ "description": "Buy milk" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["completed"], false);
    assert_eq!(body["data"]["description"], "Buy milk");

    // Toggle: completed flips, id and description survive.
    let (status, body) = send(&app, "PATCH", "/todos/1/toggle", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["completed"], true);
    assert_eq!(body["data"]["description"], "Buy milk");
    assert_eq!(body["message"], "Todo marked completed");

    // Delete, then the record is gone.
    let (status, body) = send(&app, "DELETE", "/todos/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Todo deleted");

    let (status, body) = send(&app, "GET", "/todos/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "TODO_NOT_FOUND");
    assert_eq!(body["path"], "/todos/1");
}

#[tokio::test]
async fn test_create_trims_description() {
    let (app, _dir) = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/todos",
        Some(json!({ "description": "  tidy desk  " })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["description"], "tidy desk");

    // created_at == updated_at on a fresh record.
    assert_eq!(body["data"]["created_at"], body["data"]["updated_at"]);
}

#[tokio::test]
async fn test_create_rejects_whitespace_description() {
    let (app, _dir) = test_app();

    let (status, body) = send(&app, "POST", "/todos", Some(json!({ "description": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "EMPTY_DESCRIPTION");
    assert_eq!(body["path"], "/todos");
}

#[tokio::test]
async fn test_create_rejects_missing_and_mistyped_description() {
    let (app, _dir) = test_app();

    let (status, body) = send(&app, "POST", "/todos", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MISSING_DESCRIPTION");

    let (status, body) = send(&app, "POST", "/todos", Some(json!({ "description": 7 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_DESCRIPTION_TYPE");
}

#[tokio::test]
async fn test_create_rejects_overlong_description() {
    let (app, _dir) = test_app();

    let long = "x".repeat(501);
    let (status, body) = send(&app, "POST", "/todos", Some(json!({ "description": long }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "DESCRIPTION_TOO_LONG");
}

#[tokio::test]
async fn test_update_nonexistent_is_404() {
    let (app, _dir) = test_app();

    let (status, body) = send(
        &app,
        "PUT",
        "/todos/999",
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "TODO_NOT_FOUND");
}

#[tokio::test]
async fn test_update_requires_a_field() {
    let (app, _dir) = test_app();

    send(&app, "POST", "/todos", Some(json!({ "description": "a" }))).await;

    let (status, body) = send(&app, "PUT", "/todos/1", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "NO_UPDATE_FIELDS");

    let (status, body) = send(&app, "PUT", "/todos/1", Some(json!({ "completed": "yes" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_COMPLETED_TYPE");
}

#[tokio::test]
async fn test_invalid_id_is_rejected_before_storage() {
    let (app, _dir) = test_app();

    for bad in ["abc", "0", "-2", "1.5"] {
        let (status, body) = send(&app, "GET", &format!("/todos/{bad}"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "id {bad}");
        assert_eq!(body["error"]["code"], "INVALID_TODO_ID", "id {bad}");
    }
}

#[tokio::test]
async fn test_list_is_newest_first_with_count() {
    let (app, _dir) = test_app();

    send(&app, "POST", "/todos", Some(json!({ "description": "first" }))).await;
    send(&app, "POST", "/todos", Some(json!({ "description": "second" }))).await;
    send(&app, "POST", "/todos", Some(json!({ "description": "third" }))).await;

    let (status, body) = send(&app, "GET", "/todos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    let descriptions: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["description"].as_str().unwrap())
        .collect();
    assert_eq!(descriptions, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_stats_route_wins_over_id_route() {
    let (app, _dir) = test_app();

    send(&app, "POST", "/todos", Some(json!({ "description": "a" }))).await;
    send(&app, "POST", "/todos", Some(json!({ "description": "b" }))).await;
    send(&app, "POST", "/todos", Some(json!({ "description": "c" }))).await;
    send(&app, "PATCH", "/todos/1/toggle", None).await;

    let (status, body) = send(&app, "GET", "/todos/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["completed"], 1);
    assert_eq!(body["data"]["pending"], 2);
}

#[tokio::test]
async fn test_delete_twice_is_404() {
    let (app, _dir) = test_app();

    send(&app, "POST", "/todos", Some(json!({ "description": "once" }))).await;

    let (status, _) = send(&app, "DELETE", "/todos/1", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, "DELETE", "/todos/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "TODO_NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_json_body_gets_envelope() {
    let (app, _dir) = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/todos")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_route_gets_envelope() {
    let (app, _dir) = test_app();

    let (status, body) = send(&app, "GET", "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "ROUTE_NOT_FOUND");
    assert_eq!(body["path"], "/nope");
}

#[tokio::test]
async fn test_health_reports_uptime() {
    let (app, _dir) = test_app();

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (app, _dir) = test_app();

    let (status, body) = send(&app, "GET", "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Taskboard API");
    assert!(body["paths"]["/todos"].is_object());
}
