//! HTTP handlers for the todo API.
//!
//! Handlers validate the raw payload first (no storage access on invalid
//! input), delegate to the task service, and render results through the
//! envelope module. Each handler is generic over the storage gateway so the
//! same surface serves production SQLite and test doubles.

use std::sync::OnceLock;
use std::time::Instant;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri};
use serde_json::Value;

use taskboard_core::validate::{parse_task_id, validate_create, validate_update};
use taskboard_core::{ServiceError, Task, TaskGateway, TaskStats};

use crate::AppState;
use crate::envelope::{ApiError, ApiResult, ApiSuccess, Rejection, reject};

// Service start time for uptime reporting.
static START_TIME: OnceLock<Instant> = OnceLock::new();

pub(crate) fn mark_started() {
    START_TIME.get_or_init(Instant::now);
}

fn uptime_seconds() -> u64 {
    START_TIME.get_or_init(Instant::now).elapsed().as_secs()
}

/// GET /health - liveness and uptime
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = serde_json::Value)
    )
)]
pub async fn health_check() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "taskboard-http",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// GET /todos - all todos, newest first
#[utoipa::path(
    get,
    path = "/todos",
    responses(
        (status = 200, description = "All todos ordered by creation time, most recent first", body = serde_json::Value)
    )
)]
pub async fn list_todos<G: TaskGateway + 'static>(
    State(state): State<AppState<G>>,
    uri: Uri,
) -> ApiResult<Json<ApiSuccess<Vec<Task>>>> {
    let todos = state.service().list().map_err(|e| reject(&e, uri.path()))?;
    let count = todos.len();
    Ok(Json(ApiSuccess::new(todos).with_count(count)))
}

/// GET /todos/stats - aggregate counts
#[utoipa::path(
    get,
    path = "/todos/stats",
    responses(
        (status = 200, description = "Aggregate task counts", body = TaskStats)
    )
)]
pub async fn get_stats<G: TaskGateway + 'static>(
    State(state): State<AppState<G>>,
    uri: Uri,
) -> ApiResult<Json<ApiSuccess<TaskStats>>> {
    let stats = state.service().stats().map_err(|e| reject(&e, uri.path()))?;
    Ok(Json(ApiSuccess::new(stats)))
}

/// GET /todos/{id} - one todo
#[utoipa::path(
    get,
    path = "/todos/{id}",
    params(("id" = String, Path, description = "Todo identifier, a positive integer")),
    responses(
        (status = 200, description = "The todo", body = Task),
        (status = 400, description = "Invalid id", body = ApiError),
        (status = 404, description = "Todo not found", body = ApiError)
    )
)]
pub async fn get_todo<G: TaskGateway + 'static>(
    State(state): State<AppState<G>>,
    uri: Uri,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiSuccess<Task>>> {
    let id = parse_task_id(&id).map_err(|e| reject(&ServiceError::from(e), uri.path()))?;
    let todo = state.service().get(id).map_err(|e| reject(&e, uri.path()))?;
    Ok(Json(ApiSuccess::new(todo)))
}

/// POST /todos - create a todo
#[utoipa::path(
    post,
    path = "/todos",
    request_body = serde_json::Value,
    responses(
        (status = 201, description = "Todo created", body = Task),
        (status = 400, description = "Validation failed", body = ApiError)
    )
)]
pub async fn create_todo<G: TaskGateway + 'static>(
    State(state): State<AppState<G>>,
    uri: Uri,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiSuccess<Task>>)> {
    let Json(payload) = payload.map_err(|rejection| bad_body(&rejection, uri.path()))?;

    let description =
        validate_create(&payload).map_err(|e| reject(&ServiceError::from(e), uri.path()))?;
    let todo = state
        .service()
        .create(&description)
        .map_err(|e| reject(&e, uri.path()))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiSuccess::new(todo).with_message("Todo created")),
    ))
}

/// PUT /todos/{id} - partial update
#[utoipa::path(
    put,
    path = "/todos/{id}",
    params(("id" = String, Path, description = "Todo identifier, a positive integer")),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Todo updated", body = Task),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "Todo not found", body = ApiError)
    )
)]
pub async fn update_todo<G: TaskGateway + 'static>(
    State(state): State<AppState<G>>,
    uri: Uri,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ApiSuccess<Task>>> {
    let id = parse_task_id(&id).map_err(|e| reject(&ServiceError::from(e), uri.path()))?;
    let Json(payload) = payload.map_err(|rejection| bad_body(&rejection, uri.path()))?;

    let patch =
        validate_update(&payload).map_err(|e| reject(&ServiceError::from(e), uri.path()))?;
    let todo = state
        .service()
        .update(id, &patch)
        .map_err(|e| reject(&e, uri.path()))?;

    Ok(Json(ApiSuccess::new(todo).with_message("Todo updated")))
}

/// PATCH /todos/{id}/toggle - atomically flip completion
#[utoipa::path(
    patch,
    path = "/todos/{id}/toggle",
    params(("id" = String, Path, description = "Todo identifier, a positive integer")),
    responses(
        (status = 200, description = "Todo toggled", body = Task),
        (status = 400, description = "Invalid id", body = ApiError),
        (status = 404, description = "Todo not found", body = ApiError)
    )
)]
pub async fn toggle_todo<G: TaskGateway + 'static>(
    State(state): State<AppState<G>>,
    uri: Uri,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiSuccess<Task>>> {
    let id = parse_task_id(&id).map_err(|e| reject(&ServiceError::from(e), uri.path()))?;
    let todo = state
        .service()
        .toggle(id)
        .map_err(|e| reject(&e, uri.path()))?;

    let message = if todo.completed {
        "Todo marked completed"
    } else {
        "Todo reopened"
    };
    Ok(Json(ApiSuccess::new(todo).with_message(message)))
}

/// DELETE /todos/{id} - hard delete
#[utoipa::path(
    delete,
    path = "/todos/{id}",
    params(("id" = String, Path, description = "Todo identifier, a positive integer")),
    responses(
        (status = 200, description = "Todo deleted", body = serde_json::Value),
        (status = 400, description = "Invalid id", body = ApiError),
        (status = 404, description = "Todo not found", body = ApiError)
    )
)]
pub async fn delete_todo<G: TaskGateway + 'static>(
    State(state): State<AppState<G>>,
    uri: Uri,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiSuccess<()>>> {
    let id = parse_task_id(&id).map_err(|e| reject(&ServiceError::from(e), uri.path()))?;
    state
        .service()
        .delete(id)
        .map_err(|e| reject(&e, uri.path()))?;

    Ok(Json(ApiSuccess::message_only("Todo deleted")))
}

/// Fallback for unknown routes, rendered in the standard error envelope.
pub async fn route_not_found(method: Method, uri: Uri) -> Rejection {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(
            "ROUTE_NOT_FOUND",
            format!("Route {method} {} was not found", uri.path()),
            uri.path(),
        )),
    )
}

/// Malformed request bodies never reach validation; they are rendered as a
/// 400 in the same envelope as every other failure.
fn bad_body(rejection: &JsonRejection, path: &str) -> Rejection {
    tracing::warn!(path, reason = %rejection, "rejected unparseable request body");
    (
        StatusCode::BAD_REQUEST,
        Json(
            ApiError::new("VALIDATION_ERROR", "Request body is not valid JSON", path)
                .with_details(serde_json::json!({ "reason": rejection.body_text() })),
        ),
    )
}
