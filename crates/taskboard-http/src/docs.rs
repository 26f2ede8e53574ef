//! OpenAPI specification endpoint.

use axum::response::Json;
use utoipa::OpenApi;

use taskboard_core::{Task, TaskId, TaskPatch, TaskStats};

use crate::envelope::{ApiError, ErrorBody};

/// GET /api-docs/openapi.json - OpenAPI specification
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    #[derive(OpenApi)]
    #[openapi(
        paths(
            crate::handlers::health_check,
            crate::handlers::list_todos,
            crate::handlers::get_stats,
            crate::handlers::get_todo,
            crate::handlers::create_todo,
            crate::handlers::update_todo,
            crate::handlers::toggle_todo,
            crate::handlers::delete_todo,
        ),
        components(schemas(Task, TaskId, TaskPatch, TaskStats, ApiError, ErrorBody)),
        tags(
            (name = "todos", description = "Todo CRUD and statistics"),
            (name = "health", description = "Liveness")
        ),
        info(
            title = "Taskboard API",
            description = "Task-tracking CRUD API with aggregate statistics"
        ),
        servers(
            (url = "http://localhost:3000", description = "Local development server")
        )
    )]
    struct ApiDoc;

    Json(ApiDoc::openapi())
}
