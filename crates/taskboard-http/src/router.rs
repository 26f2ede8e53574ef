//! Router construction.

use axum::{
    Router,
    routing::{get, patch},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use taskboard_core::TaskGateway;

use crate::config::HttpConfig;
use crate::docs::openapi_spec;
use crate::handlers::{
    create_todo, delete_todo, get_stats, get_todo, health_check, list_todos, mark_started,
    route_not_found, toggle_todo, update_todo,
};
use crate::AppState;

/// Build the axum router for the todo API.
///
/// The `/todos/stats` route is registered alongside `/todos/{id}`; the
/// static segment wins, so `stats` is never parsed as an id.
pub fn router<G: TaskGateway + 'static>(state: AppState<G>, config: &HttpConfig) -> Router {
    mark_started();

    let api = Router::new()
        .route("/todos", get(list_todos::<G>).post(create_todo::<G>))
        .route("/todos/stats", get(get_stats::<G>))
        .route(
            "/todos/{id}",
            get(get_todo::<G>)
                .put(update_todo::<G>)
                .delete(delete_todo::<G>),
        )
        .route("/todos/{id}/toggle", patch(toggle_todo::<G>))
        .with_state(state);

    let mut router = Router::new()
        .route("/health", get(health_check))
        .merge(api)
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    if config.enable_openapi {
        router = router.route("/api-docs/openapi.json", get(openapi_spec));
    }

    router
}
